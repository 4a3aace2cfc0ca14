//! Scan history and statistics, kept outside the detection engine

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::detection::{DetectionReport, Domain, RiskLevel};

/// Entries kept by [`ScanLedger`]
pub const HISTORY_CAPACITY: usize = 100;

/// Receives every finished report
pub trait ReportSink {
    fn record(&mut self, report: &DetectionReport);
}

/// Condensed view of one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub report_id: Uuid,
    pub domain: Domain,
    pub subject: String,
    pub status: String,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub analyzed_at: DateTime<Utc>,
}

impl From<&DetectionReport> for HistoryEntry {
    fn from(report: &DetectionReport) -> Self {
        Self {
            report_id: report.report_id,
            domain: report.domain,
            subject: report.subject.clone(),
            status: report.verdict.status().to_string(),
            risk_level: report.risk_level,
            confidence: report.confidence,
            analyzed_at: report.analyzed_at,
        }
    }
}

/// In-memory statistics: counts per verdict status, a running average of
/// confidence, and the most recent entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanLedger {
    total: u64,
    by_status: BTreeMap<String, u64>,
    average_confidence: f64,
    recent: VecDeque<HistoryEntry>,
}

impl ScanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn count(&self, status: &str) -> u64 {
        self.by_status.get(status).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.by_status
    }

    pub fn average_confidence(&self) -> f64 {
        self.average_confidence
    }

    /// Newest first
    pub fn recent(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.recent.iter()
    }
}

impl ReportSink for ScanLedger {
    fn record(&mut self, report: &DetectionReport) {
        let entry = HistoryEntry::from(report);

        self.total += 1;
        *self.by_status.entry(entry.status.clone()).or_insert(0) += 1;
        self.average_confidence += (entry.confidence - self.average_confidence) / self.total as f64;

        self.recent.push_front(entry);
        self.recent.truncate(HISTORY_CAPACITY);
    }
}
