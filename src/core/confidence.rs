//! Calibrated confidence for a resolved verdict

use crate::config::{ConfidenceCurve, ConfidenceModel};
use crate::detection::Signal;

/// Fraction of signals whose own risky/not-risky call matches the aggregate's
pub fn agreement(aggregate: f64, signals: &[Signal], notable_threshold: f64) -> f64 {
    if signals.is_empty() {
        return 0.0;
    }
    let risky = aggregate > notable_threshold;
    let agreeing = signals
        .iter()
        .filter(|s| (s.score > notable_threshold) == risky)
        .count();
    agreeing as f64 / signals.len() as f64
}

/// Band curve at `aggregate`, plus the agreement bonus, capped at the
/// domain ceiling and floored at 0
pub fn confidence(
    aggregate: f64,
    signals: &[Signal],
    curve: &ConfidenceCurve,
    model: &ConfidenceModel,
    notable_threshold: f64,
) -> f64 {
    let base = curve.base(aggregate);
    let bonus = model.agreement_bonus * agreement(aggregate, signals, notable_threshold);
    let value = (base + bonus).min(model.ceiling).max(0.0);
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerKind;

    fn signals(scores: &[f64]) -> Vec<Signal> {
        scores
            .iter()
            .map(|&s| Signal::new(AnalyzerKind::Protocol, s, 80.0, "x"))
            .collect()
    }

    #[test]
    fn test_agreement_fraction() {
        let s = signals(&[0.7, 0.7, 0.85, 0.0, 0.5, 0.6]);
        // 0.5 is not above the threshold
        assert!((agreement(0.6, &s, 0.5) - 4.0 / 6.0).abs() < 1e-12);
        assert!((agreement(0.1, &s, 0.5) - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(agreement(0.1, &[], 0.5), 0.0);
    }

    #[test]
    fn test_confidence_is_capped() {
        let model = ConfidenceModel {
            agreement_bonus: 10.0,
            ceiling: 98.0,
        };
        let clean = signals(&[0.0; 6]);
        let value = confidence(0.0, &clean, &ConfidenceCurve::falling(90.0, 8.0), &model, 0.5);
        assert_eq!(value, 98.0);
    }

    #[test]
    fn test_disagreement_lowers_confidence() {
        let model = ConfidenceModel::default();
        let curve = ConfidenceCurve::rising(70.0, 30.0);
        let unanimous = confidence(0.6, &signals(&[0.9, 0.9, 0.9]), &curve, &model, 0.5);
        let split = confidence(0.6, &signals(&[0.9, 0.1, 0.1]), &curve, &model, 0.5);
        assert!(unanimous > split);
        assert!((unanimous - 98.0).abs() < 1e-9);
        assert!(split >= 0.0);
    }

    #[test]
    fn test_confidence_floor() {
        let model = ConfidenceModel::default();
        let curve = ConfidenceCurve::rising(-50.0, 10.0);
        assert_eq!(confidence(0.0, &[], &curve, &model, 0.5), 0.0);
    }
}
