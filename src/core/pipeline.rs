// src/core/pipeline.rs
//
// Analyzer contract and the fan-out that turns one prepared artifact into
// one signal per configured analyzer.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;

use super::artifact::PreparedArtifact;
use crate::config::{AnalyzerKind, WeightTable};
use crate::detection::{Domain, Signal};
use crate::error::{AnalyzerError, ConfigError};

/// One independent heuristic over a prepared artifact.
///
/// Implementations must not block indefinitely. Returning `Err` (or
/// panicking) is allowed; the pipeline replaces the result with a neutral
/// signal.
pub trait Analyzer: Send + Sync {
    fn kind(&self) -> AnalyzerKind;

    fn analyze(&self, artifact: &PreparedArtifact<'_>) -> Result<Signal, AnalyzerError>;
}

/// Analyzer list plus the weight table that aggregates their scores
pub struct Pipeline {
    domain: Domain,
    analyzers: Vec<Arc<dyn Analyzer>>,
    weights: WeightTable,
    parallel: bool,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("domain", &self.domain)
            .field(
                "analyzers",
                &self.analyzers.iter().map(|a| a.kind()).collect::<Vec<_>>(),
            )
            .field("weights", &self.weights)
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl Pipeline {
    /// Pair every analyzer with exactly one weight entry of the same domain
    pub fn new(
        analyzers: Vec<Arc<dyn Analyzer>>,
        weights: WeightTable,
        parallel: bool,
    ) -> Result<Self, ConfigError> {
        let domain = weights.domain();

        for analyzer in &analyzers {
            let kind = analyzer.kind();
            if kind.domain() != domain {
                return Err(ConfigError::AnalyzerDomain {
                    kind,
                    analyzer: kind.domain(),
                    domain,
                });
            }
            if !weights.contains(kind) {
                return Err(ConfigError::MissingWeight(kind));
            }
        }

        for kind in weights.analyzers() {
            match analyzers.iter().filter(|a| a.kind() == kind).count() {
                0 => return Err(ConfigError::UnexpectedWeight(kind)),
                1 => {}
                _ => return Err(ConfigError::DuplicateWeight(kind)),
            }
        }

        Ok(Self {
            domain,
            analyzers,
            weights,
            parallel,
        })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn analyzers(&self) -> impl Iterator<Item = AnalyzerKind> + '_ {
        self.analyzers.iter().map(|a| a.kind())
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Run every analyzer; the result is in configuration order regardless
    /// of completion order
    pub fn run(&self, artifact: &PreparedArtifact<'_>) -> Vec<Signal> {
        if self.parallel {
            self.analyzers
                .par_iter()
                .map(|analyzer| run_isolated(analyzer.as_ref(), artifact))
                .collect()
        } else {
            self.analyzers
                .iter()
                .map(|analyzer| run_isolated(analyzer.as_ref(), artifact))
                .collect()
        }
    }
}

/// Run one analyzer, turning errors, panics and mislabelled signals into the
/// neutral fallback
fn run_isolated(analyzer: &dyn Analyzer, artifact: &PreparedArtifact<'_>) -> Signal {
    let kind = analyzer.kind();

    let result = catch_unwind(AssertUnwindSafe(|| analyzer.analyze(artifact)))
        .unwrap_or(Err(AnalyzerError::Panicked));

    match result {
        Ok(signal) if signal.analyzer == kind => {
            log::debug!(
                "{}: score {:.3}, confidence {:.1} ({})",
                kind.name(),
                signal.score,
                signal.confidence,
                signal.finding
            );
            signal
        }
        Ok(signal) => {
            let err = AnalyzerError::Degenerate(format!(
                "signal labelled {}",
                signal.analyzer.name()
            ));
            log::warn!("{} degraded: {}", kind.name(), err);
            Signal::neutral(kind, &err)
        }
        Err(err) => {
            log::warn!("{} degraded: {}", kind.name(), err);
            Signal::neutral(kind, &err)
        }
    }
}
