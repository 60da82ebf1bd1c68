//! Per-axis timing statistics and practice recommendations
//!
//! Statistics only consider the most recent `window` records whose offset
//! lies within the current filter threshold, so lowering the threshold
//! also narrows what the numbers describe.

use crate::detector::{Classification, ClassifiedRecord};
use crate::history::HistoryStore;
use crate::keyboard::Axis;
use crate::utils::MinMaxExt;
use serde::{Deserialize, Serialize};

/// Fewest valid records needed before statistics are shown
pub const MIN_RECORDS: usize = 5;

/// Mean offset beyond which timing is considered biased, in ms
pub const TREND_MARGIN_MS: f64 = 5.0;

/// Standard deviation above which timing is considered inconsistent, in ms
pub const UNSTABLE_STDEV_MS: f64 = 15.0;

/// Filter thresholds offered in the UI, in ms
pub const THRESHOLD_PRESETS_MS: [f64; 8] = [20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 150.0, 200.0];

/// Statistics window sizes offered in the UI
pub const STATS_WINDOW_PRESETS: [usize; 5] = [10, 20, 50, 100, 200];

/// Default number of recent records the statistics cover
pub const DEFAULT_STATS_WINDOW: usize = 20;

/// Next preset after `current`, wrapping to the first.
///
/// A value between presets moves to the next larger one.
pub fn next_preset<T: PartialOrd + Copy>(presets: &[T], current: T) -> Option<T> {
    presets
        .iter()
        .copied()
        .find(|p| *p > current)
        .or_else(|| presets.first().copied())
}

/// Direction of the average offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    /// Opposite key pressed too soon on average
    Early,
    /// Close to simultaneous
    Good,
    /// Opposite key pressed too late on average
    Late,
}

impl Trend {
    pub fn from_mean_ms(mean_ms: f64) -> Self {
        if mean_ms < -TREND_MARGIN_MS {
            Trend::Early
        } else if mean_ms > TREND_MARGIN_MS {
            Trend::Late
        } else {
            Trend::Good
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            Trend::Early => {
                "Pressing the opposite key too soon. Delay it slightly, or raise the actuation point."
            }
            Trend::Good => "Releases and presses are nearly simultaneous. Keep it up.",
            Trend::Late => {
                "Pressing the opposite key too late. Press it sooner, or shorten the actuation travel."
            }
        }
    }
}

/// Summary of the recent records on one axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisStats {
    pub axis: Axis,
    /// Records that passed the threshold filter
    pub count: usize,
    /// Mean offset in ms, rounded to 0.1
    pub mean_ms: f64,
    /// Sample standard deviation in ms, rounded to 0.1
    pub stdev_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub perfect: usize,
    pub early: usize,
    pub late: usize,
}

impl AxisStats {
    pub fn trend(&self) -> Trend {
        Trend::from_mean_ms(self.mean_ms)
    }

    pub fn is_unstable(&self) -> bool {
        self.stdev_ms > UNSTABLE_STDEV_MS
    }

    /// Share of Perfect records, in percent
    pub fn perfect_rate(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.perfect as f64 / self.count as f64 * 100.0
    }

    /// Advice text for the trend, plus a consistency note when unstable
    pub fn recommendation(&self) -> String {
        let mut text = self.trend().advice().to_string();
        if self.is_unstable() {
            text.push_str(" Offsets vary a lot; aim for a more consistent rhythm.");
        }
        text
    }
}

/// Outcome of analysing one axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Analysis {
    /// Fewer than [`MIN_RECORDS`] usable records
    Insufficient { axis: Axis, valid: usize },
    Ready(AxisStats),
}

impl Analysis {
    pub fn stats(&self) -> Option<&AxisStats> {
        match self {
            Analysis::Ready(stats) => Some(stats),
            Analysis::Insufficient { .. } => None,
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Analyse the records of one axis against `threshold_ms`
pub fn analyze(axis: Axis, records: &[ClassifiedRecord], threshold_ms: f64) -> Analysis {
    let valid: Vec<&ClassifiedRecord> = records
        .iter()
        .filter(|r| r.time_diff_ms.abs() <= threshold_ms)
        .collect();

    if valid.len() < MIN_RECORDS {
        return Analysis::Insufficient {
            axis,
            valid: valid.len(),
        };
    }

    let count = valid.len();
    let mean = valid.iter().map(|r| r.time_diff_ms).sum::<f64>() / count as f64;
    let variance = valid
        .iter()
        .map(|r| (r.time_diff_ms - mean).powi(2))
        .sum::<f64>()
        / (count - 1) as f64;

    let mut min_ms = None;
    let mut max_ms = None;
    let (mut perfect, mut early, mut late) = (0, 0, 0);
    for record in &valid {
        min_ms.update_min(record.time_diff_ms);
        max_ms.update_max(record.time_diff_ms);
        match record.classification {
            Classification::Perfect => perfect += 1,
            Classification::Early => early += 1,
            Classification::Late => late += 1,
        }
    }

    Analysis::Ready(AxisStats {
        axis,
        count,
        mean_ms: round_tenth(mean),
        stdev_ms: round_tenth(variance.sqrt()),
        min_ms: min_ms.unwrap_or(0.0),
        max_ms: max_ms.unwrap_or(0.0),
        perfect,
        early,
        late,
    })
}

/// Analyse the latest `window` records of an axis in the history store
pub fn analyze_history(
    history: &HistoryStore,
    axis: Axis,
    window: usize,
    threshold_ms: f64,
) -> Analysis {
    analyze(axis, &history.snapshot(axis, window), threshold_ms)
}

/// A single result entry for the results panel
#[derive(Debug, Clone)]
pub struct TestResult {
    pub label: String,
    pub value: String,
    pub status: ResultStatus,
}

impl TestResult {
    pub fn new(label: impl Into<String>, value: impl Into<String>, status: ResultStatus) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            status,
        }
    }

    pub fn ok(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Ok)
    }

    pub fn warning(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Warning)
    }

    pub fn info(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Info)
    }
}

/// Status of a result entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Ok,
    Warning,
    Error,
    Info,
}

impl Analysis {
    /// Result lines for the stats panel
    pub fn results(&self) -> Vec<TestResult> {
        let stats = match self {
            Analysis::Insufficient { valid, .. } => {
                return vec![TestResult::info(
                    "Samples",
                    format!("{}/{} needed", valid, MIN_RECORDS),
                )]
            }
            Analysis::Ready(stats) => stats,
        };

        let trend = stats.trend();
        let trend_result = match trend {
            Trend::Good => TestResult::ok("Trend", "Good"),
            Trend::Early => TestResult::warning("Trend", "Early"),
            Trend::Late => TestResult::warning("Trend", "Late"),
        };
        let stdev_result = if stats.is_unstable() {
            TestResult::warning("Std dev", format!("{:.1} ms (unstable)", stats.stdev_ms))
        } else {
            TestResult::ok("Std dev", format!("{:.1} ms", stats.stdev_ms))
        };

        vec![
            TestResult::info("Samples", stats.count.to_string()),
            TestResult::info("Mean", format!("{:+.1} ms", stats.mean_ms)),
            stdev_result,
            TestResult::info(
                "Range",
                format!("{:+.1} .. {:+.1} ms", stats.min_ms, stats.max_ms),
            ),
            TestResult::info(
                "P / E / L",
                format!(
                    "{} / {} / {} ({:.0}% perfect)",
                    stats.perfect,
                    stats.early,
                    stats.late,
                    stats.perfect_rate()
                ),
            ),
            trend_result,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::records_with_offsets;

    #[test]
    fn fewer_than_five_records_is_insufficient() {
        let records = records_with_offsets(Axis::Horizontal, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            analyze(Axis::Horizontal, &records, 120.0),
            Analysis::Insufficient {
                axis: Axis::Horizontal,
                valid: 4
            }
        );
    }

    #[test]
    fn records_over_threshold_are_excluded() {
        let records = records_with_offsets(Axis::Vertical, &[1.0, 2.0, 3.0, 4.0, 50.0, 90.0]);

        assert!(analyze(Axis::Vertical, &records, 120.0).stats().is_some());
        // Only four survive a 40 ms threshold
        assert_eq!(
            analyze(Axis::Vertical, &records, 40.0),
            Analysis::Insufficient {
                axis: Axis::Vertical,
                valid: 4
            }
        );
    }

    #[test]
    fn mean_stdev_and_counts() {
        let records = records_with_offsets(Axis::Horizontal, &[-10.0, -1.0, 0.0, 1.0, 10.0]);
        let analysis = analyze(Axis::Horizontal, &records, 120.0);
        let stats = analysis.stats().unwrap();

        assert_eq!(stats.count, 5);
        assert_eq!(stats.mean_ms, 0.0);
        // sqrt(202 / 4) = 7.106...
        assert_eq!(stats.stdev_ms, 7.1);
        assert_eq!(stats.min_ms, -10.0);
        assert_eq!(stats.max_ms, 10.0);
        assert_eq!((stats.perfect, stats.early, stats.late), (3, 1, 1));
        assert_eq!(stats.perfect_rate(), 60.0);
        assert_eq!(stats.trend(), Trend::Good);
        assert!(!stats.is_unstable());
    }

    #[test]
    fn trend_boundaries() {
        assert_eq!(Trend::from_mean_ms(-5.0), Trend::Good);
        assert_eq!(Trend::from_mean_ms(-5.1), Trend::Early);
        assert_eq!(Trend::from_mean_ms(5.0), Trend::Good);
        assert_eq!(Trend::from_mean_ms(5.1), Trend::Late);
    }

    #[test]
    fn late_and_unstable_recommendation() {
        let records = records_with_offsets(Axis::Vertical, &[0.0, 5.0, 10.0, 40.0, 60.0]);
        let analysis = analyze(Axis::Vertical, &records, 120.0);
        let stats = analysis.stats().unwrap();

        assert_eq!(stats.mean_ms, 23.0);
        assert_eq!(stats.trend(), Trend::Late);
        assert!(stats.is_unstable());
        let text = stats.recommendation();
        assert!(text.contains("too late"));
        assert!(text.contains("consistent"));
    }

    #[test]
    fn history_window_limits_records() {
        let history = HistoryStore::new(50);
        let offsets = [60.0, 60.0, 60.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        for record in records_with_offsets(Axis::Horizontal, &offsets) {
            history.append(Axis::Horizontal, record);
        }

        let analysis = analyze_history(&history, Axis::Horizontal, 5, 120.0);
        assert_eq!(analysis.stats().unwrap().mean_ms, 1.0);
    }

    #[test]
    fn presets_cycle_and_wrap() {
        assert_eq!(next_preset(&THRESHOLD_PRESETS_MS, 120.0), Some(150.0));
        assert_eq!(next_preset(&THRESHOLD_PRESETS_MS, 200.0), Some(20.0));
        assert_eq!(next_preset(&THRESHOLD_PRESETS_MS, 70.0), Some(80.0));
        assert_eq!(next_preset(&STATS_WINDOW_PRESETS, 20), Some(50));
        assert_eq!(next_preset::<usize>(&[], 5), None);
    }

    #[test]
    fn results_lines() {
        let insufficient = Analysis::Insufficient {
            axis: Axis::Horizontal,
            valid: 2,
        };
        let lines = insufficient.results();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].value, "2/5 needed");

        let records = records_with_offsets(Axis::Horizontal, &[-20.0, -15.0, -10.0, -12.0, -8.0]);
        let lines = analyze(Axis::Horizontal, &records, 120.0).results();
        let trend = lines.iter().find(|l| l.label == "Trend").unwrap();
        assert_eq!(trend.value, "Early");
        assert_eq!(trend.status, ResultStatus::Warning);
    }
}
