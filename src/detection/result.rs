//! Signal and report types produced by the detection pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::verdict::{Domain, RiskLevel, Verdict};
use crate::config::AnalyzerKind;
use crate::error::AnalyzerError;

/// Score above which a signal counts as evidence of risk
pub const NOTABLE_SCORE: f64 = 0.5;

/// Severity level of a single signal, derived from its score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Nothing found
    Info,
    /// Weak indicator
    Low,
    /// Notable indicator
    Medium,
    /// Strong indicator
    High,
}

impl Severity {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.8 => Severity::High,
            s if s > NOTABLE_SCORE => Severity::Medium,
            s if s > 0.0 => Severity::Low,
            _ => Severity::Info,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ",
            Severity::Low => "⚠",
            Severity::Medium => "⚠",
            Severity::High => "✗",
        }
    }

    pub fn color_code(&self) -> &'static str {
        match self {
            Severity::Info => "\x1b[36m",   // cyan
            Severity::Low => "\x1b[33m",    // yellow
            Severity::Medium => "\x1b[33m", // yellow
            Severity::High => "\x1b[31m",   // red
        }
    }
}

/// One analyzer's scored opinion about an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub analyzer: AnalyzerKind,
    pub category: String,
    pub finding: String,
    /// Risk score in [0, 1]
    pub score: f64,
    /// Analyzer's own confidence in [0, 100]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indicators: Vec<String>,
    /// Short machine label for what matched, e.g. a ransomware family
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// True when the analyzer could not complete and this is the neutral fallback
    #[serde(default)]
    pub degraded: bool,
}

impl Signal {
    pub fn new(analyzer: AnalyzerKind, score: f64, confidence: f64, finding: impl Into<String>) -> Self {
        Self {
            analyzer,
            category: analyzer.category().to_string(),
            finding: finding.into(),
            score: clamp_unit(score),
            confidence: if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 100.0) },
            indicators: Vec::new(),
            classification: None,
            degraded: false,
        }
    }

    /// Clean result: score 0 with the given confidence
    pub fn clear(analyzer: AnalyzerKind, confidence: f64, finding: impl Into<String>) -> Self {
        Self::new(analyzer, 0.0, confidence, finding)
    }

    /// Neutral fallback for an analyzer that could not complete
    pub fn neutral(analyzer: AnalyzerKind, reason: &AnalyzerError) -> Self {
        let mut signal = Self::new(
            analyzer,
            analyzer.neutral_score(),
            60.0,
            format!("inconclusive: {}", reason),
        );
        signal.degraded = true;
        signal
    }

    pub fn with_indicators(mut self, indicators: Vec<String>) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    pub fn is_notable(&self) -> bool {
        self.score > NOTABLE_SCORE
    }

    pub fn severity(&self) -> Severity {
        Severity::from_score(self.score)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Complete, explainable assessment of one artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    pub report_id: Uuid,
    pub domain: Domain,
    /// Filename or normalized URL
    pub subject: String,
    /// MD5 of the analyzed bytes (images and files only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    pub verdict: Verdict,
    pub risk_level: RiskLevel,
    pub aggregate_score: f64,
    /// Calibrated confidence in [0, 100]
    pub confidence: f64,
    pub summary: String,
    pub signals: Vec<Signal>,
    pub explanations: Vec<String>,
    pub remediation_steps: Vec<String>,
    pub analysis_time_ms: f64,
    pub analyzed_at: DateTime<Utc>,
}

impl DetectionReport {
    /// Signals that exceeded the notable threshold
    pub fn notable_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(|s| s.is_notable())
    }

    /// Signals produced by the neutral fallback
    pub fn degraded_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(|s| s.degraded)
    }

    pub fn is_clean(&self) -> bool {
        self.verdict.is_clean()
    }

    pub fn signal(&self, analyzer: AnalyzerKind) -> Option<&Signal> {
        self.signals.iter().find(|s| s.analyzer == analyzer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_score() {
        assert_eq!(Severity::from_score(0.9), Severity::High);
        assert_eq!(Severity::from_score(0.7), Severity::Medium);
        assert_eq!(Severity::from_score(0.5), Severity::Low);
        assert_eq!(Severity::from_score(0.0), Severity::Info);
    }

    #[test]
    fn test_signal_clamps_inputs() {
        let signal = Signal::new(AnalyzerKind::TldReputation, 1.7, 140.0, "x");
        assert_eq!(signal.score, 1.0);
        assert_eq!(signal.confidence, 100.0);

        let signal = Signal::new(AnalyzerKind::TldReputation, f64::NAN, -3.0, "x");
        assert_eq!(signal.score, 0.0);
        assert_eq!(signal.confidence, 0.0);
    }

    #[test]
    fn test_neutral_signal() {
        let signal = Signal::neutral(AnalyzerKind::LearnedClassifier, &AnalyzerError::Timeout(5000));
        assert!(signal.degraded);
        assert!(signal.finding.starts_with("inconclusive"));
        assert!((0.3..=0.5).contains(&signal.score));
        assert_eq!(signal.confidence, 60.0);
        assert!(!signal.is_notable());
    }
}
