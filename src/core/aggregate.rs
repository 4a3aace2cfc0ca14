// src/core/aggregate.rs
//
// Weighted aggregation of signals and verdict resolution.

use crate::config::{AnalyzerKind, Band, ThresholdTable, WeightTable};
use crate::detection::{BandLabel, ImageVerdict, RiskLevel, Signal, Verdict};

/// Weighted sum of signal scores, clamped to [0, 1].
///
/// Terms are summed in weight-table order. An analyzer without a signal
/// contributes 0, and a signal without a weight is ignored.
pub fn aggregate(signals: &[Signal], weights: &WeightTable) -> f64 {
    let total: f64 = weights
        .entries()
        .iter()
        .map(|entry| {
            signals
                .iter()
                .find(|s| s.analyzer == entry.analyzer)
                .map_or(0.0, |s| entry.weight * s.score)
        })
        .sum();

    if total.is_nan() {
        0.0
    } else {
        total.clamp(0.0, 1.0)
    }
}

/// Verdict plus the band whose remediation and confidence curve apply
#[derive(Debug, Clone)]
pub struct Resolution<'t> {
    pub verdict: Verdict,
    pub risk_level: RiskLevel,
    pub band: &'t Band,
}

/// Map an aggregate score to a verdict, then apply domain overrides.
///
/// Overrides only ever raise risk. For images, a notable filename keyword
/// lifts an `Authentic` verdict to `Suspicious`. For files, a notable
/// ransomware extension forces `Critical`, and a notable header mismatch or
/// random-looking header forces at least `High`; all three mark the file as
/// encrypted.
pub fn resolve<'t>(
    aggregate: f64,
    signals: &[Signal],
    table: &'t ThresholdTable,
    notable_threshold: f64,
) -> Resolution<'t> {
    let band = table.resolve(aggregate);

    match band.label {
        BandLabel::Image(verdict) => resolve_image(verdict, signals, table, band, notable_threshold),
        BandLabel::Url(verdict) => Resolution {
            verdict: Verdict::Url(verdict),
            risk_level: band.risk_level,
            band,
        },
        BandLabel::File(level) => resolve_file(level, signals, table, band, notable_threshold),
    }
}

fn is_notable(signals: &[Signal], kind: AnalyzerKind, notable_threshold: f64) -> Option<&Signal> {
    signals
        .iter()
        .find(|s| s.analyzer == kind && s.score > notable_threshold)
}

fn resolve_image<'t>(
    verdict: ImageVerdict,
    signals: &[Signal],
    table: &'t ThresholdTable,
    band: &'t Band,
    notable_threshold: f64,
) -> Resolution<'t> {
    let named_synthetic = is_notable(signals, AnalyzerKind::FilenameMetadata, notable_threshold).is_some();

    if verdict == ImageVerdict::Authentic && named_synthetic {
        let raised = ImageVerdict::Suspicious;
        log::debug!("image verdict raised from {:?} to {:?} by filename", verdict, raised);
        let band = table.band_for(BandLabel::Image(raised)).unwrap_or(band);
        return Resolution {
            verdict: Verdict::Image(raised),
            risk_level: band.risk_level.max(RiskLevel::Medium),
            band,
        };
    }

    Resolution {
        verdict: Verdict::Image(verdict),
        risk_level: band.risk_level,
        band,
    }
}

fn resolve_file<'t>(
    level: RiskLevel,
    signals: &[Signal],
    table: &'t ThresholdTable,
    band: &'t Band,
    notable_threshold: f64,
) -> Resolution<'t> {
    let notable = |kind: AnalyzerKind| is_notable(signals, kind, notable_threshold);

    let mut threat_level = level;
    let mut is_encrypted = false;
    let mut encryption_type = None;

    if let Some(signal) = notable(AnalyzerKind::RansomExtension) {
        threat_level = threat_level.max(RiskLevel::Critical);
        is_encrypted = true;
        encryption_type = Some(
            signal
                .classification
                .clone()
                .unwrap_or_else(|| "Unknown ransomware".to_string()),
        );
    }

    if notable(AnalyzerKind::HeaderSignature).is_some() || notable(AnalyzerKind::RandomHeader).is_some() {
        threat_level = threat_level.max(RiskLevel::High);
        is_encrypted = true;
    }

    let band = if threat_level > level {
        log::debug!("file verdict raised from {} to {}", level.name(), threat_level.name());
        table.band_for(BandLabel::File(threat_level)).unwrap_or(band)
    } else {
        band
    };

    Resolution {
        verdict: Verdict::File {
            threat_level,
            is_encrypted,
            encryption_type,
        },
        risk_level: threat_level.max(band.risk_level),
        band,
    }
}
