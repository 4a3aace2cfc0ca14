// src/config/thresholds.rs
//
// Ordered threshold bands mapping an aggregate score to a verdict label.
//
// Bands partition [0, 1]: band i covers [lower_i, lower_{i+1}) and the last
// band covers [lower_n, 1]. A score sitting exactly on a boundary belongs to
// the upper band.

use serde::{Deserialize, Serialize};

use crate::detection::{BandLabel, Domain, RiskLevel};
use crate::error::ConfigError;

/// Linear base-confidence curve for one band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceCurve {
    pub intercept: f64,
    pub slope: f64,
    /// Use `1 - aggregate` instead of `aggregate` (clean verdicts)
    #[serde(default)]
    pub inverted: bool,
}

impl ConfidenceCurve {
    pub fn rising(intercept: f64, slope: f64) -> Self {
        Self {
            intercept,
            slope,
            inverted: false,
        }
    }

    pub fn falling(intercept: f64, slope: f64) -> Self {
        Self {
            intercept,
            slope,
            inverted: true,
        }
    }

    pub fn base(&self, aggregate: f64) -> f64 {
        let x = if self.inverted { 1.0 - aggregate } else { aggregate };
        self.intercept + self.slope * x
    }
}

/// Domain-wide confidence tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceModel {
    /// Points added when every signal agrees with the overall classification
    pub agreement_bonus: f64,
    /// Upper bound; reports never claim absolute certainty
    pub ceiling: f64,
}

impl Default for ConfidenceModel {
    fn default() -> Self {
        Self {
            agreement_bonus: 10.0,
            ceiling: 98.0,
        }
    }
}

/// One verdict band of a threshold table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Inclusive lower bound of the band
    pub lower: f64,
    pub label: BandLabel,
    pub risk_level: RiskLevel,
    pub confidence: ConfidenceCurve,
    #[serde(default)]
    pub remediation: Vec<String>,
}

impl Band {
    pub fn new(lower: f64, label: BandLabel, risk_level: RiskLevel, confidence: ConfidenceCurve) -> Self {
        Self {
            lower,
            label,
            risk_level,
            confidence,
            remediation: Vec::new(),
        }
    }

    pub fn remediation(mut self, steps: &[&str]) -> Self {
        self.remediation = steps.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Validated, ordered set of bands for one domain
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    domain: Domain,
    bands: Vec<Band>,
}

impl ThresholdTable {
    pub fn new(domain: Domain, bands: Vec<Band>) -> Result<Self, ConfigError> {
        let first = bands.first().ok_or(ConfigError::EmptyThresholds)?;
        if first.lower != 0.0 {
            return Err(ConfigError::ThresholdStart(first.lower));
        }

        for band in &bands {
            if !(0.0..=1.0).contains(&band.lower) {
                return Err(ConfigError::ThresholdRange(band.lower));
            }
            if band.label.domain() != domain {
                return Err(ConfigError::LabelDomain(domain));
            }
        }

        for pair in bands.windows(2) {
            if pair[1].lower <= pair[0].lower {
                return Err(ConfigError::ThresholdOrder {
                    previous: pair[0].lower,
                    next: pair[1].lower,
                });
            }
        }

        Ok(Self { domain, bands })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Index of the band containing `score` (clamped to [0, 1]; NaN maps to the first band)
    pub fn resolve_index(&self, score: f64) -> usize {
        if score.is_nan() {
            return 0;
        }
        let score = score.clamp(0.0, 1.0);
        self.bands
            .iter()
            .rposition(|band| score >= band.lower)
            .unwrap_or(0)
    }

    pub fn resolve(&self, score: f64) -> &Band {
        &self.bands[self.resolve_index(score)]
    }

    /// First band carrying the given label
    pub fn band_for(&self, label: BandLabel) -> Option<&Band> {
        self.bands.iter().find(|b| b.label == label)
    }

    /// The lowest-risk band is the first one
    pub fn is_lowest(&self, band: &Band) -> bool {
        self.bands[0].label == band.label
    }
}
