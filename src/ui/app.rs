//! Main application state and logic

use crate::analysis::{analyze_history, next_preset, Analysis, TestResult, STATS_WINDOW_PRESETS, THRESHOLD_PRESETS_MS};
use crate::config::Config;
use crate::detector::{CancelReason, ClassifiedRecord, DetectorEvent};
use crate::engine::EngineHandle;
use crate::history::HistoryStore;
use crate::keyboard::{Axis, LogicalKey};
use crate::report::SessionReport;
use std::path::Path;
use std::time::Instant;

/// Records listed in the history view
pub const RECENT_RECORDS: usize = 15;

/// Current view/tab in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    Practice,
    History,
    Help,
}

impl AppView {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Practice => "Practice",
            Self::History => "History",
            Self::Help => "Help",
        }
    }

    pub fn all() -> &'static [AppView] {
        &[Self::Practice, Self::History, Self::Help]
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Practice => 0,
            Self::History => 1,
            Self::Help => 2,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Practice,
            1 => Self::History,
            _ => Self::Help,
        }
    }
}

/// Application running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Quitting,
}

/// Up/down state and press counts of the four movement keys, as last
/// reported by the detector
#[derive(Debug, Clone, Default)]
pub struct KeyPadState {
    down: [bool; 4],
    presses: [u64; 4],
}

impl KeyPadState {
    pub fn set(&mut self, key: LogicalKey, is_down: bool) {
        if is_down && !self.down[key.index()] {
            self.presses[key.index()] += 1;
        }
        self.down[key.index()] = is_down;
    }

    pub fn is_down(&self, key: LogicalKey) -> bool {
        self.down[key.index()]
    }

    pub fn press_count(&self, key: LogicalKey) -> u64 {
        self.presses[key.index()]
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Main application
pub struct App {
    /// Current view
    pub view: AppView,
    /// Application state
    pub state: AppState,
    /// Configuration, kept in step with what the engine accepted
    pub config: Config,
    /// Movement key states
    pub key_pad: KeyPadState,
    /// Key each axis is waiting for, if a pairing is pending
    pub waiting: [Option<LogicalKey>; 2],
    /// Most recent classified record
    pub last_record: Option<ClassifiedRecord>,
    /// Most recent pairing that ended without a record
    pub last_cancel: Option<(Axis, CancelReason)>,
    /// Application start time
    pub start_time: Instant,
    /// Key transitions seen
    pub total_events: u64,
    /// Last status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
    history: HistoryStore,
    engine: EngineHandle,
}

impl App {
    pub fn new(config: Config, history: HistoryStore, engine: EngineHandle) -> Self {
        Self {
            view: AppView::Practice,
            state: AppState::Running,
            config,
            key_pad: KeyPadState::default(),
            waiting: [None, None],
            last_record: None,
            last_cancel: None,
            start_time: Instant::now(),
            total_events: 0,
            status_message: None,
            status_time: None,
            history,
            engine,
        }
    }

    /// Apply one detector notification to the displayed state
    pub fn process_event(&mut self, event: &DetectorEvent) {
        match event {
            DetectorEvent::KeyStateChanged { key, is_down } => {
                self.total_events += 1;
                self.key_pad.set(*key, *is_down);
            }
            DetectorEvent::PairingArmed { axis, expected } => {
                self.waiting[axis.index()] = Some(*expected);
            }
            DetectorEvent::PairingCancelled { axis, reason } => {
                self.waiting[axis.index()] = None;
                if *reason != CancelReason::Reset {
                    self.last_cancel = Some((*axis, *reason));
                }
            }
            DetectorEvent::RecordClassified { axis, record } => {
                self.waiting[axis.index()] = None;
                self.last_record = Some(record.clone());
                self.last_cancel = None;
            }
        }
    }

    /// Keys a pending pairing is waiting for
    pub fn expected_keys(&self) -> Vec<LogicalKey> {
        self.waiting.iter().flatten().copied().collect()
    }

    /// One-line feedback for the latest record
    pub fn feedback(&self) -> Option<String> {
        self.last_record.as_ref().map(|r| r.feedback())
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Switch to the next view
    pub fn next_view(&mut self) {
        let next = (self.view.index() + 1) % AppView::all().len();
        self.view = AppView::from_index(next);
    }

    /// Switch to the previous view
    pub fn prev_view(&mut self) {
        let current = self.view.index();
        let prev = if current == 0 {
            AppView::all().len() - 1
        } else {
            current - 1
        };
        self.view = AppView::from_index(prev);
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }

    /// Move to the next filter threshold preset
    pub fn cycle_threshold(&mut self) {
        let current = self.config.detector.filter_threshold_ms;
        let Some(next) = next_preset(&THRESHOLD_PRESETS_MS, current) else {
            return;
        };
        match self.engine.set_filter_threshold_ms(next) {
            Ok(()) => {
                self.config.detector.filter_threshold_ms = next;
                self.set_status(format!("Filter threshold: {:.0} ms", next));
            }
            Err(e) => self.set_status(format!("Threshold not changed: {}", e)),
        }
    }

    /// Move to the next statistics window preset
    pub fn cycle_stats_window(&mut self) {
        let current = self.config.history.stats_window;
        if let Some(next) = next_preset(&STATS_WINDOW_PRESETS, current) {
            self.config.history.stats_window = next;
            self.set_status(format!("Statistics window: last {} records", next));
        }
    }

    /// Clear detector state and history
    pub fn reset(&mut self) {
        match self.engine.reset() {
            Ok(()) => {
                self.key_pad.reset();
                self.waiting = [None, None];
                self.last_record = None;
                self.last_cancel = None;
                self.total_events = 0;
                self.set_status("History cleared".to_string());
            }
            Err(e) => self.set_status(format!("Reset failed: {}", e)),
        }
    }

    /// Set a status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_time = Some(Instant::now());
    }

    /// Get status message if still valid (within 3 seconds)
    pub fn get_status(&self) -> Option<&str> {
        match (&self.status_message, self.status_time) {
            (Some(msg), Some(time)) if time.elapsed().as_secs() < 3 => Some(msg),
            _ => None,
        }
    }

    pub fn analysis(&self, axis: Axis) -> Analysis {
        analyze_history(
            &self.history,
            axis,
            self.config.history.stats_window,
            self.config.detector.filter_threshold_ms,
        )
    }

    /// Stats panel lines for one axis
    pub fn axis_results(&self, axis: Axis) -> Vec<TestResult> {
        let mut results = self.analysis(axis).results();
        if let Some(latest) = self.history.latest(axis) {
            results.insert(
                0,
                TestResult::info(
                    "Last",
                    format!("{:+.1} ms ({})", latest.time_diff_ms, latest.classification),
                ),
            );
        }
        results
    }

    /// Latest records across both axes, newest first
    pub fn recent_records(&self, count: usize) -> Vec<ClassifiedRecord> {
        let mut records: Vec<ClassifiedRecord> = Axis::ALL
            .iter()
            .flat_map(|&axis| self.history.snapshot(axis, count))
            .collect();
        records.sort_by(|a, b| b.event_timestamp.total_cmp(&a.event_timestamp));
        records.truncate(count);
        records
    }

    /// Short settings summary for the status bar
    pub fn settings_summary(&self) -> String {
        format!(
            "Thr {:.0}ms | Win {}",
            self.config.detector.filter_threshold_ms, self.config.history.stats_window
        )
    }

    /// Get elapsed time formatted
    pub fn elapsed_formatted(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{:02}:{:02}", mins, secs)
    }

    /// Generate a session report
    pub fn generate_report(&self) -> SessionReport {
        SessionReport::new(
            self.start_time,
            self.total_events,
            &self.history,
            self.config.detector,
            self.config.keys.clone(),
            self.config.history.stats_window,
        )
    }

    /// Export session report to JSON file
    pub fn export_report(&mut self, path: &Path) -> Result<String, std::io::Error> {
        let report = self.generate_report();
        if let Err(e) = report.export_json(path) {
            self.set_status(format!("Export failed: {}", e));
            return Err(e);
        }
        let msg = format!("Exported to {}", path.display());
        log::info!("{}", msg);
        self.set_status(msg.clone());
        Ok(msg)
    }
}
