//! Core detection engine: artifacts, analyzers, pipeline and scoring

pub mod aggregate;
pub mod analysis;
pub mod artifact;
pub mod confidence;
pub mod detector;
pub mod dsp;
pub mod pipeline;
pub mod report;

pub use aggregate::{aggregate, resolve, Resolution};
pub use analysis::{build_analyzer, Classifier, ClassifierAnalyzer};
pub use artifact::{
    Artifact, FileSubject, ImageSubject, ParsedUrl, PreparedArtifact, MAX_ANALYSIS_DIMENSION, MAX_IMAGE_BYTES,
};
pub use confidence::confidence;
pub use detector::{detect, DomainConfig};
pub use pipeline::{Analyzer, Pipeline};
pub use report::ReportBuilder;
