//! Analyzer catalogue
//!
//! Contains the heuristics behind every [`AnalyzerKind`]:
//! - Image: learned classifier adapter, color spread, local noise, edge
//!   gradients, 2-D spectrum, filename keywords, encoded size
//! - URL: TLD reputation, keyword tiers, brand impersonation, structure,
//!   protocol, known patterns
//! - File: ransomware extension, header signature, byte entropy, ransom note,
//!   random header

mod classifier;
mod file_detection;
mod image_detection;
mod url_detection;

use std::sync::Arc;
use std::time::Duration;

pub use classifier::{Classifier, ClassifierAnalyzer};
pub use file_detection::{
    extensions, ByteEntropyAnalyzer, HeaderSignatureAnalyzer, RandomHeaderAnalyzer, RansomExtensionAnalyzer,
    RansomNoteAnalyzer, NOTE_SCAN_LIMIT, RANSOM_EXTENSIONS, RANSOM_NOTE_SIGNATURES,
};
pub use image_detection::{
    ColorDistributionAnalyzer, CompressionSizeAnalyzer, EdgeConsistencyAnalyzer, FilenameMetadataAnalyzer,
    FrequencySpectrumAnalyzer, NoisePatternAnalyzer, AI_KEYWORDS,
};
pub use url_detection::{
    BrandImpersonationAnalyzer, KeywordCategoryAnalyzer, KnownPatternAnalyzer, ProtocolAnalyzer,
    TldReputationAnalyzer, UrlStructureAnalyzer, BRANDS, CREDENTIAL_KEYWORDS, HIGH_RISK_TLDS,
    MALICIOUS_KEYWORDS, PROMOTIONAL_KEYWORDS,
};

use super::artifact::{FileSubject, ImageSubject, ParsedUrl, PreparedArtifact};
use super::Analyzer;
use crate::config::AnalyzerKind;
use crate::error::{AnalyzerError, ConfigError};

/// Built-in analyzer for `kind`.
///
/// The learned classifier needs an injected [`Classifier`]; without one this
/// returns [`ConfigError::MissingClassifier`].
pub fn build_analyzer(
    kind: AnalyzerKind,
    classifier: Option<&Arc<dyn Classifier>>,
    timeout: Duration,
) -> Result<Arc<dyn Analyzer>, ConfigError> {
    let analyzer: Arc<dyn Analyzer> = match kind {
        AnalyzerKind::LearnedClassifier => {
            let classifier = classifier.ok_or(ConfigError::MissingClassifier)?;
            Arc::new(ClassifierAnalyzer::new(Arc::clone(classifier), timeout))
        }
        AnalyzerKind::ColorDistribution => Arc::new(ColorDistributionAnalyzer::new()),
        AnalyzerKind::NoisePattern => Arc::new(NoisePatternAnalyzer::new()),
        AnalyzerKind::EdgeConsistency => Arc::new(EdgeConsistencyAnalyzer::new()),
        AnalyzerKind::FrequencySpectrum => Arc::new(FrequencySpectrumAnalyzer::new()),
        AnalyzerKind::FilenameMetadata => Arc::new(FilenameMetadataAnalyzer),
        AnalyzerKind::CompressionSize => Arc::new(CompressionSizeAnalyzer::new()),
        AnalyzerKind::TldReputation => Arc::new(TldReputationAnalyzer),
        AnalyzerKind::KeywordCategory => Arc::new(KeywordCategoryAnalyzer),
        AnalyzerKind::BrandImpersonation => Arc::new(BrandImpersonationAnalyzer),
        AnalyzerKind::UrlStructure => Arc::new(UrlStructureAnalyzer),
        AnalyzerKind::Protocol => Arc::new(ProtocolAnalyzer),
        AnalyzerKind::KnownPattern => Arc::new(KnownPatternAnalyzer),
        AnalyzerKind::RansomExtension => Arc::new(RansomExtensionAnalyzer),
        AnalyzerKind::HeaderSignature => Arc::new(HeaderSignatureAnalyzer),
        AnalyzerKind::ByteEntropy => Arc::new(ByteEntropyAnalyzer::new()),
        AnalyzerKind::RansomNote => Arc::new(RansomNoteAnalyzer),
        AnalyzerKind::RandomHeader => Arc::new(RandomHeaderAnalyzer),
    };
    Ok(analyzer)
}

fn image_of<'a, 'b>(artifact: &'a PreparedArtifact<'b>) -> Result<&'a ImageSubject<'b>, AnalyzerError> {
    match artifact {
        PreparedArtifact::Image(image) => Ok(image),
        _ => Err(AnalyzerError::UnexpectedArtifact),
    }
}

fn url_of<'a>(artifact: &'a PreparedArtifact<'_>) -> Result<&'a ParsedUrl, AnalyzerError> {
    match artifact {
        PreparedArtifact::Url(url) => Ok(url),
        _ => Err(AnalyzerError::UnexpectedArtifact),
    }
}

fn file_of<'a, 'b>(artifact: &'a PreparedArtifact<'b>) -> Result<&'a FileSubject<'b>, AnalyzerError> {
    match artifact {
        PreparedArtifact::File(file) => Ok(file),
        _ => Err(AnalyzerError::UnexpectedArtifact),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_builds() {
        for kind in AnalyzerKind::all() {
            let result = build_analyzer(kind, None, Duration::from_secs(1));
            if kind == AnalyzerKind::LearnedClassifier {
                assert!(matches!(result, Err(ConfigError::MissingClassifier)));
            } else {
                assert_eq!(result.unwrap().kind(), kind);
            }
        }
    }
}
