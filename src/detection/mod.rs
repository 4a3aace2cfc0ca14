//! Detection result types: signals, verdicts and reports

mod result;
mod verdict;

pub use result::{DetectionReport, Severity, Signal, NOTABLE_SCORE};
pub use verdict::{BandLabel, Domain, ImageVerdict, RiskLevel, UrlVerdict, Verdict};
