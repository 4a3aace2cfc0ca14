// src/core/report.rs
//
// Assembles signals, score, verdict and explanations into a DetectionReport.

use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use super::aggregate::{aggregate, resolve, Resolution};
use super::confidence::confidence;
use super::detector::DomainConfig;
use crate::detection::{DetectionReport, Domain, ImageVerdict, RiskLevel, Signal, UrlVerdict, Verdict};

/// Number of findings quoted in a URL summary
const SUMMARY_FINDINGS: usize = 3;

pub struct ReportBuilder {
    domain: Domain,
    subject: String,
    fingerprint: Option<String>,
    started: Instant,
    signals: Vec<Signal>,
}

impl ReportBuilder {
    pub fn new(domain: Domain, subject: impl Into<String>) -> Self {
        Self {
            domain,
            subject: subject.into(),
            fingerprint: None,
            started: Instant::now(),
            signals: Vec::new(),
        }
    }

    pub fn fingerprint(mut self, fingerprint: Option<String>) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    /// When analysis began; `analysis_time_ms` is measured from here
    pub fn started(mut self, started: Instant) -> Self {
        self.started = started;
        self
    }

    pub fn signals(mut self, signals: Vec<Signal>) -> Self {
        self.signals = signals;
        self
    }

    pub fn build(self, config: &DomainConfig) -> DetectionReport {
        let notable = config.notable_threshold();
        let score = aggregate(&self.signals, config.pipeline().weights());
        let resolution = resolve(score, &self.signals, config.thresholds(), notable);
        let confidence = confidence(
            score,
            &self.signals,
            &resolution.band.confidence,
            config.confidence(),
            notable,
        );
        let explanations = explanations(&self.signals, &resolution, config);
        let summary = summary(&resolution.verdict, &explanations);

        DetectionReport {
            report_id: Uuid::new_v4(),
            domain: self.domain,
            subject: self.subject,
            fingerprint: self.fingerprint,
            risk_level: resolution.risk_level,
            aggregate_score: score,
            confidence,
            summary,
            remediation_steps: resolution.band.remediation.clone(),
            verdict: resolution.verdict,
            signals: self.signals,
            explanations,
            analysis_time_ms: self.started.elapsed().as_secs_f64() * 1000.0,
            analyzed_at: Utc::now(),
        }
    }
}

/// Findings (or their indicators) of signals above `explain_above`.
///
/// A lowest-band verdict with no notable signal gets the domain's positive
/// indicators instead, so a clean report still says what was checked.
pub fn explanations(signals: &[Signal], resolution: &Resolution<'_>, config: &DomainConfig) -> Vec<String> {
    let nothing_notable = signals.iter().all(|s| s.score <= config.notable_threshold());
    if config.thresholds().is_lowest(resolution.band) && nothing_notable {
        return config.positive_indicators().to_vec();
    }

    let mut out = Vec::new();
    for signal in signals.iter().filter(|s| s.score > config.explain_above()) {
        if signal.indicators.is_empty() {
            out.push(signal.finding.clone());
        } else {
            out.extend(signal.indicators.iter().cloned());
        }
    }
    out
}

/// One-line human summary of a verdict
pub fn summary(verdict: &Verdict, explanations: &[String]) -> String {
    match verdict {
        Verdict::Image(ImageVerdict::Authentic) => {
            "No manipulation detected. Image characteristics appear natural.".to_string()
        }
        Verdict::Image(ImageVerdict::Suspicious) => {
            "Some manipulation indicators found. Verify the source before sharing.".to_string()
        }
        Verdict::Image(ImageVerdict::Manipulated) => {
            "Strong evidence of manipulation or synthetic generation.".to_string()
        }
        Verdict::Url(UrlVerdict::Safe) => {
            "No threats detected. URL passes security checks and appears legitimate.".to_string()
        }
        Verdict::Url(UrlVerdict::Warning) => format!(
            "CAUTION: {}. Verify authenticity before proceeding.",
            top_findings(explanations)
        ),
        Verdict::Url(UrlVerdict::SuspectedPhishing | UrlVerdict::ConfirmedPhishing) => format!(
            "HIGH RISK: {}. Do NOT enter personal information.",
            top_findings(explanations)
        ),
        Verdict::File { is_encrypted: true, .. } => "This file appears to be encrypted by ransomware. \
             Original data may be unrecoverable without the decryption key."
            .to_string(),
        Verdict::File { threat_level: RiskLevel::None, .. } => {
            "No ransomware encryption detected. File appears to be safe.".to_string()
        }
        Verdict::File { .. } => {
            "Some suspicious characteristics detected. The file may have been modified.".to_string()
        }
    }
}

fn top_findings(explanations: &[String]) -> String {
    if explanations.is_empty() {
        return "Multiple weak risk indicators".to_string();
    }
    explanations
        .iter()
        .take(SUMMARY_FINDINGS)
        .map(|e| e.trim_end_matches('.'))
        .collect::<Vec<_>>()
        .join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalyzerKind, DomainPreset};

    fn url_config() -> DomainConfig {
        DomainConfig::from_preset(DomainPreset::Url).unwrap()
    }

    #[test]
    fn test_clean_report_uses_positive_indicators() {
        let config = url_config();
        let signals: Vec<Signal> = config
            .pipeline()
            .analyzers()
            .map(|k| Signal::clear(k, 80.0, "clean"))
            .collect();
        let report = ReportBuilder::new(Domain::Url, "https://example.org")
            .signals(signals)
            .build(&config);

        assert_eq!(report.verdict, Verdict::Url(UrlVerdict::Safe));
        assert_eq!(report.explanations, config.positive_indicators().to_vec());
        assert_eq!(report.confidence, 98.0);
        assert!(report.summary.starts_with("No threats detected"));
        assert!(report.fingerprint.is_none());
    }

    #[test]
    fn test_indicators_replace_findings() {
        let config = url_config();
        let signals = vec![
            Signal::new(AnalyzerKind::UrlStructure, 1.0, 90.0, "2 structural anomalies")
                .with_indicators(vec!["first".to_string(), "second".to_string()]),
            Signal::new(AnalyzerKind::KeywordCategory, 1.0, 90.0, "keyword"),
            Signal::new(AnalyzerKind::TldReputation, 0.7, 90.0, "tld"),
        ];
        let report = ReportBuilder::new(Domain::Url, "x").signals(signals).build(&config);

        assert_eq!(report.explanations, vec!["first", "second", "keyword", "tld"]);
        // 0.15 + 0.25 + 0.14
        assert!((report.aggregate_score - 0.54).abs() < 1e-9);
        assert_eq!(report.verdict, Verdict::Url(UrlVerdict::SuspectedPhishing));
        assert_eq!(
            report.summary,
            "HIGH RISK: first. second. keyword. Do NOT enter personal information."
        );
        assert!(!report.remediation_steps.is_empty());
    }

    #[test]
    fn test_lowest_band_with_notable_signal_keeps_explanations() {
        let config = url_config();
        let signals = vec![Signal::new(AnalyzerKind::KnownPattern, 0.6, 80.0, "pattern")];
        let report = ReportBuilder::new(Domain::Url, "x").signals(signals).build(&config);
        assert_eq!(report.verdict, Verdict::Url(UrlVerdict::Safe));
        assert_eq!(report.explanations, vec!["pattern"]);
    }

    #[test]
    fn test_warning_summary_without_explanations() {
        let summary = summary(&Verdict::Url(UrlVerdict::Warning), &[]);
        assert_eq!(
            summary,
            "CAUTION: Multiple weak risk indicators. Verify authenticity before proceeding."
        );
    }
}
