// tests/scenario_test.rs
//
// End-to-end detection scenarios across the three domains, plus the
// properties every pipeline must hold regardless of input.
//
// Usage:
//   cargo test --test scenario_test -- --nocapture

mod test_utils;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use image::RgbImage;
use threatcheckr::config::{AnalyzerKind, DomainPreset, DomainSettings, ThresholdTable};
use threatcheckr::core::dsp::shannon_entropy;
use threatcheckr::core::{detect, Analyzer, Artifact, Classifier, DomainConfig, PreparedArtifact};
use threatcheckr::detection::{ImageVerdict, RiskLevel, Signal, UrlVerdict, Verdict};
use threatcheckr::error::{AnalyzerError, ClassifierError, ConfigError, DetectError, InputError};

use test_utils::{gray_png, natural_png, noisy_png, pdf_bytes, random_bytes};

// ============================================================================
// Fixtures
// ============================================================================

fn config(preset: DomainPreset) -> DomainConfig {
    DomainConfig::from_preset(preset).expect("built-in preset is valid")
}

struct Failing(AnalyzerKind);

impl Analyzer for Failing {
    fn kind(&self) -> AnalyzerKind {
        self.0
    }

    fn analyze(&self, _: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        Err(AnalyzerError::Degenerate("fixture failure".to_string()))
    }
}

struct Panicking(AnalyzerKind);

impl Analyzer for Panicking {
    fn kind(&self) -> AnalyzerKind {
        self.0
    }

    fn analyze(&self, _: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError> {
        panic!("fixture panic")
    }
}

struct FixedClassifier(f64);

impl Classifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    fn classify(&self, _: &RgbImage) -> Result<f64, ClassifierError> {
        Ok(self.0)
    }
}

struct HungClassifier;

impl Classifier for HungClassifier {
    fn classify(&self, _: &RgbImage) -> Result<f64, ClassifierError> {
        thread::sleep(Duration::from_millis(500));
        Ok(1.0)
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_generated_image_filename() {
    let config = config(DomainPreset::Image);
    let pixels = natural_png(128, 0xface);

    // the same pixels under a plain name stay authentic
    let plain = detect(&Artifact::image(pixels.clone(), "holiday.png"), &config).unwrap();
    assert!(plain.aggregate_score < 0.25, "aggregate {}", plain.aggregate_score);
    assert_eq!(plain.verdict, Verdict::Image(ImageVerdict::Authentic));

    let report = detect(&Artifact::image(pixels, "deepfake_generated.png"), &config).unwrap();
    let metadata = report.signal(AnalyzerKind::FilenameMetadata).unwrap();
    assert!(metadata.score >= 0.7, "metadata score {}", metadata.score);

    assert_eq!(report.verdict, Verdict::Image(ImageVerdict::Suspicious));
    assert_eq!(report.risk_level, RiskLevel::Medium);
    assert!(report.fingerprint.is_some());
    assert_eq!(report.subject, "deepfake_generated.png");
}

#[test]
fn scenario_phishing_url() {
    let artifact = Artifact::url("http://paypal-secure-login.xyz/verify");
    let report = detect(&artifact, &config(DomainPreset::Url)).unwrap();

    for kind in [
        AnalyzerKind::TldReputation,
        AnalyzerKind::KeywordCategory,
        AnalyzerKind::BrandImpersonation,
    ] {
        assert!(report.signal(kind).unwrap().score > 0.5, "{} not flagged", kind.name());
    }
    assert!(report.signal(AnalyzerKind::Protocol).unwrap().score > 0.0);

    assert!((report.aggregate_score - 0.6075).abs() < 1e-9, "aggregate {}", report.aggregate_score);
    assert_eq!(report.verdict, Verdict::Url(UrlVerdict::SuspectedPhishing));
    assert_eq!(report.verdict.status(), "danger");
    assert!(report.confidence >= 90.0, "confidence {}", report.confidence);
    assert!(report.summary.starts_with("HIGH RISK:"));
    assert!(!report.remediation_steps.is_empty());
    assert_eq!(
        report.signal(AnalyzerKind::BrandImpersonation).unwrap().classification.as_deref(),
        Some("paypal")
    );
}

#[test]
fn scenario_encrypted_file() {
    let artifact = Artifact::file(random_bytes(10_000, 0x5eed), "invoice.pdf.locked");
    let report = detect(&artifact, &config(DomainPreset::File)).unwrap();

    assert!(report.signal(AnalyzerKind::RansomExtension).unwrap().score > 0.9);
    assert!(report.signal(AnalyzerKind::ByteEntropy).unwrap().score > 0.5);
    assert!(report.signal(AnalyzerKind::HeaderSignature).unwrap().score > 0.5);

    match &report.verdict {
        Verdict::File {
            threat_level,
            is_encrypted,
            encryption_type,
        } => {
            assert_eq!(*threat_level, RiskLevel::Critical);
            assert!(*is_encrypted);
            assert_eq!(encryption_type.as_deref(), Some("Ransomware (LOCKED)"));
        }
        other => panic!("unexpected verdict {:?}", other),
    }
    assert_eq!(report.risk_level, RiskLevel::Critical);
    assert!(report.summary.contains("encrypted by ransomware"));
}

#[test]
fn random_header_marks_file_encrypted() {
    // eight distinct leading bytes and no known signature
    let mut bytes = vec![9, 8, 7, 6, 5, 4, 3, 2];
    bytes.extend(random_bytes(10_000, 0xbeef));
    let report = detect(&Artifact::file(bytes, "data.bin"), &config(DomainPreset::File)).unwrap();

    assert_eq!(report.signal(AnalyzerKind::RandomHeader).unwrap().score, 0.6);
    match &report.verdict {
        Verdict::File { threat_level, is_encrypted, .. } => {
            assert!(*threat_level >= RiskLevel::High, "threat level {:?}", threat_level);
            assert!(*is_encrypted);
        }
        other => panic!("unexpected verdict {:?}", other),
    }
}

#[test]
fn empty_file_is_scored_not_rejected() {
    let config = config(DomainPreset::File);

    let report = detect(&Artifact::file(Vec::new(), "x.locked"), &config).unwrap();
    assert_eq!(report.risk_level, RiskLevel::Critical);
    assert!(matches!(report.verdict, Verdict::File { is_encrypted: true, .. }));

    let report = detect(&Artifact::file(Vec::new(), "empty.txt"), &config).unwrap();
    assert!(report.risk_level < RiskLevel::High, "risk {:?}", report.risk_level);
}

#[test]
fn scenario_clean_url() {
    let url_config = config(DomainPreset::Url);
    let report = detect(&Artifact::url("https://www.wikipedia.org"), &url_config).unwrap();

    assert!(report.signals.iter().all(|s| s.score <= 0.5));
    assert_eq!(report.aggregate_score, 0.0);
    assert_eq!(report.verdict, Verdict::Url(UrlVerdict::Safe));
    assert_eq!(report.explanations, url_config.positive_indicators().to_vec());
    assert_eq!(report.confidence, 98.0);
    assert_eq!(report.subject, "https://www.wikipedia.org");
}

#[test]
fn scenario_clean_document() {
    let report = detect(&Artifact::file(pdf_bytes(), "report.pdf"), &config(DomainPreset::File)).unwrap();
    assert_eq!(
        report.verdict,
        Verdict::File {
            threat_level: RiskLevel::None,
            is_encrypted: false,
            encryption_type: None,
        }
    );
    assert!(report.summary.starts_with("No ransomware encryption detected"));
}

#[test]
fn scenario_classifier_weighted_image() {
    let config = DomainConfig::builder(DomainPreset::ImageWithClassifier)
        .classifier(Arc::new(FixedClassifier(0.95)))
        .build()
        .unwrap();
    let report = config.detect(&Artifact::image(gray_png(64), "photo.png")).unwrap();

    let learned = report.signal(AnalyzerKind::LearnedClassifier).unwrap();
    assert_eq!(learned.score, 0.95);
    assert!(!learned.degraded);
    assert_eq!(report.verdict, Verdict::Image(ImageVerdict::Manipulated));
}

// ============================================================================
// Fault isolation
// ============================================================================

#[test]
fn failing_and_panicking_analyzers_degrade() {
    let config = DomainConfig::builder(DomainPreset::Url)
        .analyzer(Arc::new(Failing(AnalyzerKind::KnownPattern)))
        .analyzer(Arc::new(Panicking(AnalyzerKind::BrandImpersonation)))
        .build()
        .unwrap();
    let report = config.detect(&Artifact::url("https://www.wikipedia.org")).unwrap();

    assert_eq!(report.signals.len(), config.pipeline().weights().len());
    let degraded: Vec<_> = report.degraded_signals().map(|s| s.analyzer).collect();
    assert_eq!(
        degraded,
        vec![AnalyzerKind::BrandImpersonation, AnalyzerKind::KnownPattern]
    );
    for signal in report.degraded_signals() {
        assert_eq!(signal.score, 0.3);
    }
    // 0.25 * 0.3 + 0.05 * 0.3
    assert!((report.aggregate_score - 0.09).abs() < 1e-9);
    assert_eq!(report.verdict, Verdict::Url(UrlVerdict::Safe));
}

#[test]
fn classifier_timeout_degrades() {
    let config = DomainConfig::builder(DomainPreset::ImageWithClassifier)
        .classifier(Arc::new(HungClassifier))
        .classifier_timeout(Duration::from_millis(20))
        .build()
        .unwrap();
    let report = config.detect(&Artifact::image(noisy_png(32, 32, 7), "photo.png")).unwrap();

    let learned = report.signal(AnalyzerKind::LearnedClassifier).unwrap();
    assert!(learned.degraded);
    assert_eq!(learned.score, 0.3);
    assert_eq!(report.signals.len(), 7);
}

#[test]
fn only_unparseable_input_fails() {
    let url = config(DomainPreset::Url);
    assert!(matches!(
        detect(&Artifact::url("not a url"), &url),
        Err(DetectError::Input(InputError::InvalidUrl(_)))
    ));

    let image = config(DomainPreset::Image);
    assert!(matches!(
        detect(&Artifact::image(random_bytes(256, 3), "noise.png"), &image),
        Err(DetectError::Input(InputError::ImageDecode(_)))
    ));
    assert!(matches!(
        detect(&Artifact::file(b"x".to_vec(), "x.bin"), &image),
        Err(DetectError::Input(InputError::DomainMismatch { .. }))
    ));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn detection_is_deterministic() {
    let config = config(DomainPreset::File);
    let artifact = Artifact::file(random_bytes(4_096, 11), "backup.tar.crypt");

    let first = detect(&artifact, &config).unwrap();
    let second = detect(&artifact, &config).unwrap();

    assert_eq!(first.aggregate_score.to_bits(), second.aggregate_score.to_bits());
    assert_eq!(first.verdict, second.verdict);
    assert_eq!(first.signals, second.signals);
    assert_eq!(first.explanations, second.explanations);
    assert_ne!(first.report_id, second.report_id);
}

#[test]
fn sequential_matches_parallel() {
    let parallel = config(DomainPreset::Image);
    let sequential = DomainConfig::builder(DomainPreset::Image)
        .parallel(false)
        .build()
        .unwrap();
    let artifact = Artifact::image(noisy_png(48, 40, 99), "holiday.png");

    let a = parallel.detect(&artifact).unwrap();
    let b = sequential.detect(&artifact).unwrap();
    assert_eq!(a.signals, b.signals);
    assert_eq!(a.aggregate_score.to_bits(), b.aggregate_score.to_bits());
}

#[test]
fn signals_follow_configuration_order() {
    for preset in [DomainPreset::Image, DomainPreset::Url, DomainPreset::File] {
        let config = config(preset);
        let artifact = match preset {
            DomainPreset::Url => Artifact::url("example.com/login"),
            DomainPreset::File => Artifact::file(random_bytes(512, 5), "a.docx"),
            _ => Artifact::image(noisy_png(16, 16, 5), "a.png"),
        };
        let report = config.detect(&artifact).unwrap();
        let order: Vec<_> = report.signals.iter().map(|s| s.analyzer).collect();
        assert_eq!(order, config.pipeline().analyzers().collect::<Vec<_>>());
        assert!((0.0..=1.0).contains(&report.aggregate_score));
        assert!((0.0..=100.0).contains(&report.confidence));
    }
}

#[test]
fn entropy_bounds() {
    assert_eq!(shannon_entropy(&[0x41; 4_096]), 0.0);
    let random = shannon_entropy(&random_bytes(10_000, 42));
    assert!(random >= 7.9, "entropy {}", random);
}

#[test]
fn thresholds_partition_unit_interval() {
    for preset in DomainPreset::all() {
        let settings = DomainSettings::from_preset(preset);
        let table = ThresholdTable::new(settings.domain, settings.thresholds).unwrap();
        for band in table.bands() {
            // a boundary belongs to the band it opens
            assert_eq!(table.resolve(band.lower), band);
        }
        assert_eq!(table.resolve_index(1.0), table.bands().len() - 1);
    }
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut settings = DomainSettings::from_preset(DomainPreset::File);
    settings.weights[0].weight = 0.5;
    assert!(matches!(
        DomainConfig::from_settings(settings, None),
        Err(ConfigError::WeightSum(_))
    ));

    assert!(matches!(
        DomainConfig::from_preset(DomainPreset::ImageWithClassifier),
        Err(ConfigError::MissingClassifier)
    ));

    let mut settings = DomainSettings::from_preset(DomainPreset::Url);
    settings.thresholds.swap(1, 2);
    assert!(matches!(
        DomainConfig::from_settings(settings, None),
        Err(ConfigError::ThresholdOrder { .. })
    ));
}
