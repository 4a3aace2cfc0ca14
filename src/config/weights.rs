// src/config/weights.rs
//
// Per-domain weight table. Validated once when a pipeline is built.

use serde::{Deserialize, Serialize};

use super::profiles::AnalyzerKind;
use crate::detection::Domain;
use crate::error::ConfigError;

/// Tolerance for the sum-to-one check
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Serializable weight entry, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub analyzer: AnalyzerKind,
    pub weight: f64,
}

impl WeightEntry {
    pub fn new(analyzer: AnalyzerKind, weight: f64) -> Self {
        Self { analyzer, weight }
    }
}

/// Validated mapping from analyzer to weight; weights sum to 1.0
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    domain: Domain,
    entries: Vec<WeightEntry>,
}

impl WeightTable {
    pub fn new(domain: Domain, entries: Vec<WeightEntry>) -> Result<Self, ConfigError> {
        for (i, entry) in entries.iter().enumerate() {
            let kind = entry.analyzer;
            if kind.domain() != domain {
                return Err(ConfigError::AnalyzerDomain {
                    kind,
                    analyzer: kind.domain(),
                    domain,
                });
            }
            if !(0.0..=1.0).contains(&entry.weight) {
                return Err(ConfigError::WeightOutOfRange {
                    kind,
                    weight: entry.weight,
                });
            }
            if entries[..i].iter().any(|e| e.analyzer == kind) {
                return Err(ConfigError::DuplicateWeight(kind));
            }
        }

        let sum: f64 = entries.iter().map(|e| e.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(ConfigError::WeightSum(sum));
        }

        Ok(Self { domain, entries })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Weight of an analyzer, `None` when it has no entry
    pub fn get(&self, analyzer: AnalyzerKind) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.analyzer == analyzer)
            .map(|e| e.weight)
    }

    pub fn contains(&self, analyzer: AnalyzerKind) -> bool {
        self.get(analyzer).is_some()
    }

    pub fn analyzers(&self) -> impl Iterator<Item = AnalyzerKind> + '_ {
        self.entries.iter().map(|e| e.analyzer)
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
