//! ThreatCheckr - Explainable threat scoring for images, URLs and files
//!
//! Every artifact runs through a domain pipeline of independent heuristic
//! analyzers. Each analyzer emits a scored [`Signal`]; the scores are combined
//! by a weighted sum, mapped onto verdict bands and returned as a
//! [`DetectionReport`] with a calibrated confidence, explanations and
//! remediation steps.
//!
//! ## Module Structure
//!
//! - `core` - Artifacts, analyzers, pipeline, aggregation and reporting
//! - `config` - Domain presets, weight tables and threshold bands
//! - `detection` - Signal, verdict and report types
//! - `history` - Report sinks and scan statistics
//! - `cli` - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use threatcheckr::config::DomainPreset;
//! use threatcheckr::core::{Artifact, DomainConfig};
//!
//! let config = DomainConfig::from_preset(DomainPreset::Url)?;
//! let report = config.detect(&Artifact::url("http://paypal-secure-login.xyz/verify"))?;
//!
//! println!("{} ({:.0}%)", report.verdict.description(), report.confidence);
//! ```
//!
//! ## Domains
//!
//! | Domain | Verdicts                                        | Analyzers |
//! |--------|-------------------------------------------------|-----------|
//! | Image  | Authentic, Suspicious, Manipulated              | 6 (7 with a classifier) |
//! | URL    | Safe, Warning, Suspected/Confirmed Phishing     | 6         |
//! | File   | Threat level None..Critical, encryption flag    | 5         |
//!
//! A failing analyzer never fails a request: it contributes a neutral,
//! degraded signal instead. Only inputs that cannot be parsed or decoded are
//! rejected with [`DetectError`].

// Detection engine
pub mod core;

// Command-line interface
pub mod cli;

// Configuration and presets
pub mod config;

// Detection result types
pub mod detection;

pub mod error;

pub mod history;

// Re-export commonly used types at crate root for convenience
pub use config::{AnalyzerKind, DomainBuilder, DomainPreset, DomainSettings};
pub use crate::core::{detect, Analyzer, Artifact, Classifier, DomainConfig};
pub use detection::{DetectionReport, Domain, ImageVerdict, RiskLevel, Severity, Signal, UrlVerdict, Verdict};
pub use error::{AnalyzerError, ClassifierError, ConfigError, DetectError, InputError};
pub use history::{ReportSink, ScanLedger};
