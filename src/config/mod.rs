//! Configuration: domain presets, weight tables and verdict thresholds

mod profiles;
mod thresholds;
mod weights;

pub use profiles::{
    AnalyzerKind, DomainBuilder, DomainPreset, DomainSettings, DEFAULT_CLASSIFIER_TIMEOUT_MS,
};
pub use thresholds::{Band, ConfidenceCurve, ConfidenceModel, ThresholdTable};
pub use weights::{WeightEntry, WeightTable, WEIGHT_EPSILON};
