//! Session report and export functionality

use crate::analysis::{analyze, Analysis, ResultStatus, TestResult, Trend};
use crate::detector::{ClassifiedRecord, DetectorConfig};
use crate::history::HistoryStore;
use crate::keyboard::{Axis, KeyMapping};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Complete session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Settings the session ran with
    pub settings: ReportSettings,
    /// Summary statistics
    pub summary: SessionSummary,
    /// Per-axis analysis and records
    pub axes: Vec<AxisReport>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Session duration in seconds
    pub duration_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    pub detector: DetectorConfig,
    pub keys: KeyMapping,
    pub stats_window: usize,
}

/// Session summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Total key transitions seen by the UI
    pub total_events: u64,
    /// Records currently held in history, both axes
    pub total_records: usize,
    /// Axes whose analysis flagged a bias or instability
    pub issues_detected: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisReport {
    pub axis: Axis,
    pub analysis: Analysis,
    pub recommendation: Option<String>,
    pub results: Vec<ResultEntry>,
    pub records: Vec<ClassifiedRecord>,
}

/// Single result entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEntry {
    pub label: String,
    pub value: String,
    pub status: String,
}

impl From<&TestResult> for ResultEntry {
    fn from(result: &TestResult) -> Self {
        let status = match result.status {
            ResultStatus::Ok => "ok",
            ResultStatus::Warning => "warning",
            ResultStatus::Error => "error",
            ResultStatus::Info => "info",
        };
        Self {
            label: result.label.clone(),
            value: result.value.clone(),
            status: status.to_string(),
        }
    }
}

impl SessionReport {
    /// Create a new session report from the current history
    pub fn new(
        start_time: Instant,
        total_events: u64,
        history: &HistoryStore,
        detector: DetectorConfig,
        keys: KeyMapping,
        stats_window: usize,
    ) -> Self {
        let duration_secs = start_time.elapsed().as_secs_f64();
        let now: DateTime<Utc> = Utc::now();

        let axes: Vec<AxisReport> = Axis::ALL
            .iter()
            .map(|&axis| {
                let records = history.snapshot_all(axis);
                let window_start = records.len().saturating_sub(stats_window);
                let analysis = analyze(axis, &records[window_start..], detector.filter_threshold_ms);
                AxisReport {
                    axis,
                    recommendation: analysis.stats().map(|s| s.recommendation()),
                    results: analysis.results().iter().map(ResultEntry::from).collect(),
                    analysis,
                    records,
                }
            })
            .collect();

        let issues = axes
            .iter()
            .filter_map(|a| a.analysis.stats())
            .filter(|s| s.is_unstable() || s.trend() != Trend::Good)
            .count() as u32;

        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                duration_secs,
            },
            settings: ReportSettings {
                detector,
                keys,
                stats_window,
            },
            summary: SessionSummary {
                total_events,
                total_records: axes.iter().map(|a| a.records.len()).sum(),
                issues_detected: issues,
            },
            axes,
        }
    }

    /// Default file name for an export made now
    pub fn default_filename() -> PathBuf {
        PathBuf::from(format!(
            "counterstrafe_report_{}.json",
            Utc::now().format("%Y%m%d_%H%M%S")
        ))
    }

    /// Export report to JSON file
    pub fn export_json(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::records_with_offsets;

    fn sample_history() -> HistoryStore {
        let history = HistoryStore::new(50);
        for record in records_with_offsets(Axis::Horizontal, &[8.0, 9.0, 10.0, 11.0, 12.0, 130.0]) {
            history.append(Axis::Horizontal, record);
        }
        for record in records_with_offsets(Axis::Vertical, &[1.0, -1.0]) {
            history.append(Axis::Vertical, record);
        }
        history
    }

    fn sample_report() -> SessionReport {
        SessionReport::new(
            Instant::now(),
            42,
            &sample_history(),
            DetectorConfig::default(),
            KeyMapping::default(),
            20,
        )
    }

    #[test]
    fn report_summarises_both_axes() {
        let report = sample_report();

        assert_eq!(report.summary.total_events, 42);
        assert_eq!(report.summary.total_records, 8);
        assert_eq!(report.axes.len(), 2);

        let horizontal = &report.axes[0];
        assert_eq!(horizontal.axis, Axis::Horizontal);
        // 130 ms is outside the default 120 ms threshold
        assert_eq!(horizontal.analysis.stats().unwrap().count, 5);
        assert_eq!(horizontal.analysis.stats().unwrap().mean_ms, 10.0);
        assert!(horizontal.recommendation.as_deref().unwrap().contains("too late"));

        let vertical = &report.axes[1];
        assert!(vertical.analysis.stats().is_none());
        assert!(vertical.recommendation.is_none());
        assert_eq!(report.summary.issues_detected, 1);
    }

    #[test]
    fn report_json_contains_records_and_settings() {
        let json = sample_report().to_json().unwrap();

        assert!(json.contains("\"generated_at\""));
        assert!(json.contains("\"filter_threshold_ms\": 120.0"));
        assert!(json.contains("\"forward\": \"W\""));
        assert!(json.contains("\"time_diff_ms\": 130.0"));

        let parsed: SessionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.axes[0].records.len(), 6);
    }

    #[test]
    fn export_writes_file() {
        let path = std::env::temp_dir().join(format!(
            "counterstrafe-report-test-{}.json",
            std::process::id()
        ));
        sample_report().export_json(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"axes\""));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn default_filename_is_json() {
        let name = SessionReport::default_filename();
        let name = name.to_string_lossy();
        assert!(name.starts_with("counterstrafe_report_"));
        assert!(name.ends_with(".json"));
    }
}
