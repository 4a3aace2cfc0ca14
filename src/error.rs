//! Error taxonomy
//!
//! Only [`DetectError`] ever reaches a caller of `detect`. Analyzer failures
//! are absorbed by the pipeline and configuration errors are raised when a
//! pipeline is built, never while a request is running.

use thiserror::Error;

use crate::config::AnalyzerKind;
use crate::detection::Domain;

/// Failure of a whole detection call
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
}

/// The artifact could not be parsed or decoded at all
#[derive(Debug, Error)]
pub enum InputError {
    #[error("URL is empty")]
    EmptyUrl,

    #[error("URL '{0}' could not be parsed")]
    InvalidUrl(String),

    #[error("unsupported URL scheme '{0}' (only http and https are analyzed)")]
    UnsupportedScheme(String),

    #[error("image '{0}' is empty")]
    EmptyImage(String),

    #[error("image is {size} bytes, limit is {limit} bytes")]
    ImageTooLarge { size: usize, limit: usize },

    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("{artifact:?} artifact cannot be analyzed by the {pipeline:?} pipeline")]
    DomainMismatch { artifact: Domain, pipeline: Domain },
}

/// Reason a single analyzer could not produce a real signal
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("timed out after {0} ms")]
    Timeout(u128),

    #[error("classifier failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("unexpected artifact shape")]
    UnexpectedArtifact,

    #[error("{0}")]
    Degenerate(String),

    #[error("analyzer panicked")]
    Panicked,
}

/// Error reported by an external learned classifier
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier returned out-of-range probability {0}")]
    OutOfRange(f64),
}

/// Inconsistent domain configuration, fatal at pipeline construction
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("weights sum to {0:.6}, expected 1.0")]
    WeightSum(f64),

    #[error("analyzer {0:?} has no weight entry")]
    MissingWeight(AnalyzerKind),

    #[error("analyzer {0:?} has more than one weight entry")]
    DuplicateWeight(AnalyzerKind),

    #[error("weight given for {0:?}, which the pipeline does not run")]
    UnexpectedWeight(AnalyzerKind),

    #[error("weight {weight} for {kind:?} is outside [0, 1]")]
    WeightOutOfRange { kind: AnalyzerKind, weight: f64 },

    #[error("analyzer {kind:?} belongs to the {analyzer:?} domain, not {domain:?}")]
    AnalyzerDomain { kind: AnalyzerKind, analyzer: Domain, domain: Domain },

    #[error("threshold table is empty")]
    EmptyThresholds,

    #[error("first threshold band must start at 0.0, found {0}")]
    ThresholdStart(f64),

    #[error("threshold bands must be strictly increasing ({previous} then {next})")]
    ThresholdOrder { previous: f64, next: f64 },

    #[error("threshold {0} is outside [0, 1]")]
    ThresholdRange(f64),

    #[error("threshold band label does not belong to the {0:?} domain")]
    LabelDomain(Domain),

    #[error("learned classifier analyzer configured without a classifier")]
    MissingClassifier,

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}
