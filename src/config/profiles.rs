// src/config/profiles.rs
//
// Domain presets: analyzer weights, verdict bands, remediation text and
// confidence tuning for the image, URL and file pipelines.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::thresholds::{Band, ConfidenceCurve, ConfidenceModel};
use super::weights::WeightEntry;
use crate::core::{Analyzer, Classifier, DomainConfig};
use crate::detection::{BandLabel, Domain, ImageVerdict, RiskLevel, UrlVerdict, NOTABLE_SCORE};
use crate::error::ConfigError;

/// Default bound on the external classifier call
pub const DEFAULT_CLASSIFIER_TIMEOUT_MS: u64 = 5_000;

/// Every analyzer the crate ships, grouped by domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    // Image
    LearnedClassifier,
    ColorDistribution,
    NoisePattern,
    EdgeConsistency,
    FrequencySpectrum,
    FilenameMetadata,
    CompressionSize,
    // URL
    TldReputation,
    KeywordCategory,
    BrandImpersonation,
    UrlStructure,
    Protocol,
    KnownPattern,
    // File
    RansomExtension,
    HeaderSignature,
    ByteEntropy,
    RansomNote,
    RandomHeader,
}

impl AnalyzerKind {
    pub fn all() -> Vec<Self> {
        vec![
            Self::LearnedClassifier,
            Self::ColorDistribution,
            Self::NoisePattern,
            Self::EdgeConsistency,
            Self::FrequencySpectrum,
            Self::FilenameMetadata,
            Self::CompressionSize,
            Self::TldReputation,
            Self::KeywordCategory,
            Self::BrandImpersonation,
            Self::UrlStructure,
            Self::Protocol,
            Self::KnownPattern,
            Self::RansomExtension,
            Self::HeaderSignature,
            Self::ByteEntropy,
            Self::RansomNote,
            Self::RandomHeader,
        ]
    }

    pub fn for_domain(domain: Domain) -> Vec<Self> {
        Self::all().into_iter().filter(|k| k.domain() == domain).collect()
    }

    pub fn domain(&self) -> Domain {
        match self {
            Self::LearnedClassifier
            | Self::ColorDistribution
            | Self::NoisePattern
            | Self::EdgeConsistency
            | Self::FrequencySpectrum
            | Self::FilenameMetadata
            | Self::CompressionSize => Domain::Image,
            Self::TldReputation
            | Self::KeywordCategory
            | Self::BrandImpersonation
            | Self::UrlStructure
            | Self::Protocol
            | Self::KnownPattern => Domain::Url,
            Self::RansomExtension
            | Self::HeaderSignature
            | Self::ByteEntropy
            | Self::RansomNote
            | Self::RandomHeader => Domain::File,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LearnedClassifier => "learned_classifier",
            Self::ColorDistribution => "color_distribution",
            Self::NoisePattern => "noise_pattern",
            Self::EdgeConsistency => "edge_consistency",
            Self::FrequencySpectrum => "frequency_spectrum",
            Self::FilenameMetadata => "filename_metadata",
            Self::CompressionSize => "compression_size",
            Self::TldReputation => "tld_reputation",
            Self::KeywordCategory => "keyword_category",
            Self::BrandImpersonation => "brand_impersonation",
            Self::UrlStructure => "url_structure",
            Self::Protocol => "protocol",
            Self::KnownPattern => "known_pattern",
            Self::RansomExtension => "ransom_extension",
            Self::HeaderSignature => "header_signature",
            Self::ByteEntropy => "byte_entropy",
            Self::RansomNote => "ransom_note",
            Self::RandomHeader => "random_header",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase().replace('-', "_");
        Self::all().into_iter().find(|k| k.name() == name)
    }

    /// Human-readable category shown in reports
    pub fn category(&self) -> &'static str {
        match self {
            Self::LearnedClassifier => "CNN Detection",
            Self::ColorDistribution => "Color Analysis",
            Self::NoisePattern => "Noise Analysis",
            Self::EdgeConsistency => "Edge Detection",
            Self::FrequencySpectrum => "Frequency Analysis",
            Self::FilenameMetadata => "Metadata Analysis",
            Self::CompressionSize => "Compression Analysis",
            Self::TldReputation => "Domain Reputation",
            Self::KeywordCategory => "Keyword Analysis",
            Self::BrandImpersonation => "Brand Impersonation",
            Self::UrlStructure => "URL Structure",
            Self::Protocol => "Protocol Security",
            Self::KnownPattern => "Known Patterns",
            Self::RansomExtension => "Extension Analysis",
            Self::HeaderSignature => "Header Analysis",
            Self::ByteEntropy => "Entropy Analysis",
            Self::RansomNote => "Content Analysis",
            Self::RandomHeader => "Header Randomness",
        }
    }

    /// Score reported when the analyzer cannot complete
    pub fn neutral_score(&self) -> f64 {
        match self.domain() {
            Domain::Image | Domain::Url => 0.3,
            Domain::File => 0.4,
        }
    }
}

/// Built-in domain configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainPreset {
    /// Heuristic image analyzers only
    Image,
    /// Heuristic image analyzers plus an external learned classifier
    ImageWithClassifier,
    /// Phishing URL analyzers
    Url,
    /// Ransomware file analyzers
    File,
}

impl DomainPreset {
    pub fn all() -> Vec<Self> {
        vec![Self::Image, Self::ImageWithClassifier, Self::Url, Self::File]
    }

    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::Image => Self::Image,
            Domain::Url => Self::Url,
            Domain::File => Self::File,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::ImageWithClassifier => "image-classifier",
            Self::Url => "url",
            Self::File => "file",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Image => "Deepfake and manipulation heuristics",
            Self::ImageWithClassifier => "Deepfake heuristics weighted with a learned classifier",
            Self::Url => "Phishing and malicious URL heuristics",
            Self::File => "Ransomware encryption heuristics",
        }
    }
}

/// Serializable description of one domain pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSettings {
    pub name: String,
    pub description: String,
    pub domain: Domain,
    /// Analyzers and their weights, in pipeline order
    pub weights: Vec<WeightEntry>,
    pub thresholds: Vec<Band>,
    #[serde(default = "default_notable")]
    pub notable_threshold: f64,
    /// Signals scoring above this contribute to the explanation list
    #[serde(default)]
    pub explain_above: f64,
    #[serde(default)]
    pub confidence: ConfidenceModel,
    /// Shown instead of explanations when nothing notable was found
    #[serde(default)]
    pub positive_indicators: Vec<String>,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default = "default_timeout")]
    pub classifier_timeout_ms: u64,
}

fn default_notable() -> f64 {
    NOTABLE_SCORE
}

fn default_parallel() -> bool {
    true
}

fn default_timeout() -> u64 {
    DEFAULT_CLASSIFIER_TIMEOUT_MS
}

impl DomainSettings {
    pub fn from_preset(preset: DomainPreset) -> Self {
        match preset {
            DomainPreset::Image => Self::image(false),
            DomainPreset::ImageWithClassifier => Self::image(true),
            DomainPreset::Url => Self::url(),
            DomainPreset::File => Self::file(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn image(with_classifier: bool) -> Self {
        use AnalyzerKind::*;

        let weights = if with_classifier {
            vec![
                WeightEntry::new(LearnedClassifier, 0.35),
                WeightEntry::new(ColorDistribution, 0.15),
                WeightEntry::new(NoisePattern, 0.15),
                WeightEntry::new(EdgeConsistency, 0.10),
                WeightEntry::new(FrequencySpectrum, 0.10),
                WeightEntry::new(FilenameMetadata, 0.10),
                WeightEntry::new(CompressionSize, 0.05),
            ]
        } else {
            vec![
                WeightEntry::new(ColorDistribution, 0.25),
                WeightEntry::new(NoisePattern, 0.20),
                WeightEntry::new(EdgeConsistency, 0.15),
                WeightEntry::new(FrequencySpectrum, 0.15),
                WeightEntry::new(FilenameMetadata, 0.15),
                WeightEntry::new(CompressionSize, 0.10),
            ]
        };

        let curve = ConfidenceCurve::rising(60.0, 35.0);
        let manipulated_steps: &[&str] = &[
            "Do NOT share this image - it may spread misinformation",
            "Report this content to the platform immediately",
            "Document the source URL for potential legal action",
            "Warn others who may have received this image",
            "If this depicts you, consider contacting authorities",
            "Use this evidence to educate others about deepfakes",
            "Consider consulting with a digital forensics expert",
            "Block and report the source account",
        ];

        let thresholds = vec![
            Band::new(0.0, BandLabel::Image(ImageVerdict::Authentic), RiskLevel::Low, curve).remediation(&[
                "Continue to verify images from unknown sources",
                "Use reverse image search to confirm origin",
                "Check EXIF metadata when available",
                "Be cautious of images that seem too perfect",
            ]),
            Band::new(0.25, BandLabel::Image(ImageVerdict::Suspicious), RiskLevel::Medium, curve).remediation(&[
                "Do not share this image without verification",
                "Use multiple deepfake detection tools for confirmation",
                "Check the original source of the image",
                "Look for the original unedited version online",
                "Report suspicious content to platform moderators",
                "Contact the depicted person for confirmation if possible",
            ]),
            Band::new(0.5, BandLabel::Image(ImageVerdict::Manipulated), RiskLevel::High, curve)
                .remediation(manipulated_steps),
            Band::new(0.75, BandLabel::Image(ImageVerdict::Manipulated), RiskLevel::Critical, curve)
                .remediation(manipulated_steps),
        ];

        Self {
            name: if with_classifier { "Image + Classifier" } else { "Image" }.to_string(),
            description: if with_classifier {
                DomainPreset::ImageWithClassifier
            } else {
                DomainPreset::Image
            }
            .description()
            .to_string(),
            domain: Domain::Image,
            weights,
            thresholds,
            notable_threshold: NOTABLE_SCORE,
            explain_above: NOTABLE_SCORE,
            confidence: ConfidenceModel {
                agreement_bonus: 10.0,
                ceiling: 98.5,
            },
            positive_indicators: strings(&[
                "Natural lighting patterns detected",
                "Consistent noise patterns matching camera sensors",
                "No manipulation artifacts found",
                "Frequency analysis shows natural image characteristics",
            ]),
            parallel: true,
            classifier_timeout_ms: DEFAULT_CLASSIFIER_TIMEOUT_MS,
        }
    }

    fn url() -> Self {
        use AnalyzerKind::*;

        let danger = ConfidenceCurve::rising(70.0, 30.0);
        let thresholds = vec![
            Band::new(0.0, BandLabel::Url(UrlVerdict::Safe), RiskLevel::Low, ConfidenceCurve::falling(90.0, 8.0))
                .remediation(&[
                    "Continue to verify links before entering credentials",
                    "Keep your browser and security software up to date",
                ]),
            Band::new(0.2, BandLabel::Url(UrlVerdict::Warning), RiskLevel::Medium, ConfidenceCurve::rising(50.0, 50.0))
                .remediation(&[
                    "Verify the sender or source of this link",
                    "Navigate to the site by typing its address manually",
                    "Do not enter passwords or payment details until verified",
                ]),
            Band::new(0.5, BandLabel::Url(UrlVerdict::SuspectedPhishing), RiskLevel::High, danger).remediation(&[
                "Do NOT enter personal information on this site",
                "Report the link to your security team or email provider",
                "Delete the message that contained this link",
            ]),
            Band::new(0.7, BandLabel::Url(UrlVerdict::ConfirmedPhishing), RiskLevel::Critical, danger).remediation(&[
                "Do NOT enter personal information on this site",
                "Report the link to your security team or email provider",
                "Delete the message that contained this link",
                "If you entered credentials, change your passwords immediately",
                "Enable multi-factor authentication on affected accounts",
            ]),
        ];

        Self {
            name: "URL".to_string(),
            description: DomainPreset::Url.description().to_string(),
            domain: Domain::Url,
            weights: vec![
                WeightEntry::new(TldReputation, 0.20),
                WeightEntry::new(KeywordCategory, 0.25),
                WeightEntry::new(BrandImpersonation, 0.25),
                WeightEntry::new(UrlStructure, 0.15),
                WeightEntry::new(Protocol, 0.10),
                WeightEntry::new(KnownPattern, 0.05),
            ],
            thresholds,
            notable_threshold: NOTABLE_SCORE,
            explain_above: 0.0,
            confidence: ConfidenceModel {
                agreement_bonus: 10.0,
                ceiling: 98.0,
            },
            positive_indicators: strings(&["Valid domain structure", "No suspicious patterns detected"]),
            parallel: true,
            classifier_timeout_ms: DEFAULT_CLASSIFIER_TIMEOUT_MS,
        }
    }

    fn file() -> Self {
        use AnalyzerKind::*;

        let elevated = ConfidenceCurve::rising(60.0, 40.0);
        let severe = ConfidenceCurve::rising(70.0, 30.0);
        let thresholds = vec![
            Band::new(0.0, BandLabel::File(RiskLevel::None), RiskLevel::None, ConfidenceCurve::falling(80.0, 15.0))
                .remediation(&[
                    "Keep regular offline backups",
                    "Keep your operating system and security software updated",
                ]),
            Band::new(0.1, BandLabel::File(RiskLevel::Low), RiskLevel::Low, elevated).remediation(&[
                "Verify the file with its sender",
                "Re-scan the file after updating your security software",
            ]),
            Band::new(0.25, BandLabel::File(RiskLevel::Medium), RiskLevel::Medium, elevated).remediation(&[
                "Quarantine the file until its origin is verified",
                "Compare the file against a known-good backup",
            ]),
            Band::new(0.45, BandLabel::File(RiskLevel::High), RiskLevel::High, severe).remediation(&[
                "Isolate the affected machine from the network",
                "Do not open or execute the file",
                "Restore the file from a clean backup",
            ]),
            Band::new(0.65, BandLabel::File(RiskLevel::Critical), RiskLevel::Critical, severe).remediation(&[
                "Disconnect the affected machine from the network immediately",
                "Do not pay the ransom",
                "Preserve the encrypted file and any ransom note for investigators",
                "Restore data from offline backups after the system is cleaned",
                "Report the incident to your security team or authorities",
            ]),
        ];

        Self {
            name: "File".to_string(),
            description: DomainPreset::File.description().to_string(),
            domain: Domain::File,
            weights: vec![
                WeightEntry::new(RansomExtension, 0.35),
                WeightEntry::new(HeaderSignature, 0.20),
                WeightEntry::new(ByteEntropy, 0.25),
                WeightEntry::new(RansomNote, 0.10),
                WeightEntry::new(RandomHeader, 0.10),
            ],
            thresholds,
            notable_threshold: NOTABLE_SCORE,
            explain_above: 0.0,
            confidence: ConfidenceModel {
                agreement_bonus: 10.0,
                ceiling: 98.0,
            },
            positive_indicators: strings(&[
                "File extension is not associated with ransomware",
                "File header is consistent with its type",
                "Byte entropy is within normal range",
            ]),
            parallel: true,
            classifier_timeout_ms: DEFAULT_CLASSIFIER_TIMEOUT_MS,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Builder for custom domain configurations
pub struct DomainBuilder {
    settings: DomainSettings,
    classifier: Option<Arc<dyn Classifier>>,
    overrides: Vec<Arc<dyn Analyzer>>,
}

impl DomainBuilder {
    pub fn from_preset(preset: DomainPreset) -> Self {
        Self::from_settings(DomainSettings::from_preset(preset))
    }

    pub fn from_settings(settings: DomainSettings) -> Self {
        Self {
            settings,
            classifier: None,
            overrides: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.settings.name = name.into();
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.settings.description = desc.into();
        self
    }

    /// Set (or add) the weight of an analyzer; weights are not renormalized
    pub fn weight(mut self, analyzer: AnalyzerKind, weight: f64) -> Self {
        match self.settings.weights.iter_mut().find(|e| e.analyzer == analyzer) {
            Some(entry) => entry.weight = weight,
            None => self.settings.weights.push(WeightEntry::new(analyzer, weight)),
        }
        self
    }

    pub fn remove_analyzer(mut self, analyzer: AnalyzerKind) -> Self {
        self.settings.weights.retain(|e| e.analyzer != analyzer);
        self.overrides.retain(|a| a.kind() != analyzer);
        self
    }

    pub fn thresholds(mut self, bands: Vec<Band>) -> Self {
        self.settings.thresholds = bands;
        self
    }

    pub fn confidence(mut self, model: ConfidenceModel) -> Self {
        self.settings.confidence = model;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.settings.parallel = parallel;
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn classifier_timeout(mut self, timeout: Duration) -> Self {
        self.settings.classifier_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Replace the built-in implementation of `analyzer.kind()`
    pub fn analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.overrides.retain(|a| a.kind() != analyzer.kind());
        self.overrides.push(analyzer);
        self
    }

    pub fn settings(&self) -> &DomainSettings {
        &self.settings
    }

    pub fn build(self) -> Result<DomainConfig, ConfigError> {
        DomainConfig::assemble(self.settings, self.classifier, self.overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_names_round_trip() {
        for kind in AnalyzerKind::all() {
            assert_eq!(AnalyzerKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(AnalyzerKind::from_name("byte-entropy"), Some(AnalyzerKind::ByteEntropy));
        assert_eq!(AnalyzerKind::from_name("nope"), None);
    }

    #[test]
    fn test_every_preset_analyzer_matches_domain() {
        for preset in DomainPreset::all() {
            let settings = DomainSettings::from_preset(preset);
            assert!(settings.weights.iter().all(|e| e.analyzer.domain() == settings.domain));
            assert!(settings.thresholds.iter().all(|b| b.label.domain() == settings.domain));
            assert!(!settings.positive_indicators.is_empty());
        }
    }

    #[test]
    fn test_settings_json_round_trip() {
        let settings = DomainSettings::from_preset(DomainPreset::File);
        let json = settings.to_json().unwrap();
        assert!(json.contains("\"ransom_extension\""));
        let parsed = DomainSettings::from_json_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_builder_rejects_unbalanced_weights() {
        let result = DomainBuilder::from_preset(DomainPreset::Url)
            .weight(AnalyzerKind::Protocol, 0.5)
            .build();
        assert!(matches!(result, Err(ConfigError::WeightSum(_))));
    }

    #[test]
    fn test_builder_reweights() {
        let config = DomainBuilder::from_preset(DomainPreset::Url)
            .name("Strict URL")
            .weight(AnalyzerKind::KnownPattern, 0.0)
            .weight(AnalyzerKind::Protocol, 0.15)
            .parallel(false)
            .build()
            .unwrap();
        assert_eq!(config.name(), "Strict URL");
        assert_eq!(config.pipeline().weights().get(AnalyzerKind::Protocol), Some(0.15));
    }

    #[test]
    fn test_classifier_preset_requires_classifier() {
        let result = DomainBuilder::from_preset(DomainPreset::ImageWithClassifier).build();
        assert!(matches!(result, Err(ConfigError::MissingClassifier)));
    }

    #[test]
    fn test_preset_descriptions_match() {
        for preset in [
            DomainPreset::Image,
            DomainPreset::ImageWithClassifier,
            DomainPreset::Url,
            DomainPreset::File,
        ] {
            assert_eq!(DomainSettings::from_preset(preset).description, preset.description());
        }
    }
}
