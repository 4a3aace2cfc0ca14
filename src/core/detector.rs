// src/core/detector.rs
//
// Validated domain configuration and the `detect` entry point.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::analysis::{build_analyzer, Classifier};
use super::artifact::Artifact;
use super::pipeline::{Analyzer, Pipeline};
use super::report::ReportBuilder;
use crate::config::{ConfidenceModel, DomainBuilder, DomainPreset, DomainSettings, ThresholdTable, WeightTable};
use crate::detection::{DetectionReport, Domain};
use crate::error::{ConfigError, DetectError, InputError};

/// Everything needed to turn one artifact into a report.
///
/// Only constructible through validation, so a `DomainConfig` in hand is
/// always consistent: weights sum to 1, every analyzer has exactly one
/// weight, and the threshold bands partition [0, 1].
#[derive(Debug)]
pub struct DomainConfig {
    name: String,
    description: String,
    pipeline: Pipeline,
    thresholds: ThresholdTable,
    notable_threshold: f64,
    explain_above: f64,
    confidence: ConfidenceModel,
    positive_indicators: Vec<String>,
}

impl DomainConfig {
    /// Built-in configuration. `ImageWithClassifier` fails here since it
    /// needs a classifier; use [`DomainConfig::builder`] for that.
    pub fn from_preset(preset: DomainPreset) -> Result<Self, ConfigError> {
        Self::from_settings(DomainSettings::from_preset(preset), None)
    }

    pub fn from_settings(
        settings: DomainSettings,
        classifier: Option<Arc<dyn Classifier>>,
    ) -> Result<Self, ConfigError> {
        Self::assemble(settings, classifier, Vec::new())
    }

    pub fn builder(preset: DomainPreset) -> DomainBuilder {
        DomainBuilder::from_preset(preset)
    }

    /// Validate settings and instantiate analyzers. Entries in `overrides`
    /// replace the built-in analyzer of the same kind.
    pub(crate) fn assemble(
        settings: DomainSettings,
        classifier: Option<Arc<dyn Classifier>>,
        overrides: Vec<Arc<dyn Analyzer>>,
    ) -> Result<Self, ConfigError> {
        for value in [settings.notable_threshold, settings.explain_above] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdRange(value));
            }
        }

        let weights = WeightTable::new(settings.domain, settings.weights)?;
        let thresholds = ThresholdTable::new(settings.domain, settings.thresholds)?;

        if let Some(extra) = overrides.iter().find(|a| !weights.contains(a.kind())) {
            return Err(ConfigError::MissingWeight(extra.kind()));
        }

        let timeout = Duration::from_millis(settings.classifier_timeout_ms);
        let analyzers = weights
            .analyzers()
            .map(|kind| match overrides.iter().find(|a| a.kind() == kind) {
                Some(custom) => Ok(Arc::clone(custom)),
                None => build_analyzer(kind, classifier.as_ref(), timeout),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pipeline = Pipeline::new(analyzers, weights, settings.parallel)?;

        log::debug!(
            "configured '{}' pipeline with {} analyzers",
            settings.name,
            pipeline.weights().len()
        );

        Ok(Self {
            name: settings.name,
            description: settings.description,
            pipeline,
            thresholds,
            notable_threshold: settings.notable_threshold,
            explain_above: settings.explain_above,
            confidence: settings.confidence,
            positive_indicators: settings.positive_indicators,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn domain(&self) -> Domain {
        self.pipeline.domain()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Score above which a signal counts as risky
    pub fn notable_threshold(&self) -> f64 {
        self.notable_threshold
    }

    pub fn explain_above(&self) -> f64 {
        self.explain_above
    }

    pub fn confidence(&self) -> &ConfidenceModel {
        &self.confidence
    }

    pub fn positive_indicators(&self) -> &[String] {
        &self.positive_indicators
    }

    pub fn detect(&self, artifact: &Artifact) -> Result<DetectionReport, DetectError> {
        detect(artifact, self)
    }
}

/// Analyze one artifact.
///
/// Fails only when the artifact cannot be parsed or decoded, or belongs to
/// another domain. Individual analyzer failures degrade to neutral signals
/// inside the report.
pub fn detect(artifact: &Artifact, config: &DomainConfig) -> Result<DetectionReport, DetectError> {
    let started = Instant::now();

    if artifact.domain() != config.domain() {
        return Err(InputError::DomainMismatch {
            artifact: artifact.domain(),
            pipeline: config.domain(),
        }
        .into());
    }

    let prepared = artifact.prepare()?;
    let signals = config.pipeline().run(&prepared);

    let report = ReportBuilder::new(config.domain(), prepared.subject())
        .fingerprint(artifact.fingerprint())
        .started(started)
        .signals(signals)
        .build(config);

    log::info!(
        "{}: {} (score {:.3}, confidence {:.1}%, {:.1} ms)",
        report.subject,
        report.verdict.status(),
        report.aggregate_score,
        report.confidence,
        report.analysis_time_ms
    );

    Ok(report)
}
