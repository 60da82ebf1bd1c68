//! Shared test utilities
//!
//! Provides fixtures for building detectors, records and observers.

use crate::detector::{
    ClassifiedRecord, Detector, DetectorConfig, DetectorEvent, DetectorObserver, PairingKind,
};
use crate::detector::{CancelReason, KeyEventRecord};
use crate::history::HistoryStore;
use crate::keyboard::{Axis, LogicalKey};
use std::sync::{Arc, Mutex};

/// Observer that keeps every notification for later inspection
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<DetectorEvent>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<DetectorEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<ClassifiedRecord> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DetectorEvent::RecordClassified { record, .. } => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn cancellations(&self) -> Vec<(Axis, CancelReason)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DetectorEvent::PairingCancelled { axis, reason } => Some((axis, reason)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: DetectorEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl DetectorObserver for RecordingObserver {
    fn key_state_changed(&mut self, key: LogicalKey, is_down: bool) {
        self.push(DetectorEvent::KeyStateChanged { key, is_down });
    }

    fn record_classified(&mut self, axis: Axis, record: &ClassifiedRecord) {
        self.push(DetectorEvent::RecordClassified {
            axis,
            record: record.clone(),
        });
    }

    fn pairing_armed(&mut self, axis: Axis, expected: LogicalKey) {
        self.push(DetectorEvent::PairingArmed { axis, expected });
    }

    fn pairing_cancelled(&mut self, axis: Axis, reason: CancelReason) {
        self.push(DetectorEvent::PairingCancelled { axis, reason });
    }
}

/// Detector with default settings and a recording observer attached
pub fn detector() -> (Detector, RecordingObserver) {
    detector_with(DetectorConfig::default())
}

pub fn detector_with(config: DetectorConfig) -> (Detector, RecordingObserver) {
    let observer = RecordingObserver::default();
    let mut detector = Detector::new(config, HistoryStore::default());
    detector.add_observer(Box::new(observer.clone()));
    (detector, observer)
}

/// A release-then-press record at `timestamp` with the given offset
pub fn record_at(axis: Axis, timestamp: f64, diff_secs: f64) -> ClassifiedRecord {
    ClassifiedRecord::new(
        axis,
        PairingKind::ReleaseThenPress,
        timestamp,
        diff_secs,
        120.0,
        Vec::<KeyEventRecord>::new(),
    )
}

/// Records with the given offsets in ms, one second apart
pub fn records_with_offsets(axis: Axis, offsets_ms: &[f64]) -> Vec<ClassifiedRecord> {
    offsets_ms
        .iter()
        .enumerate()
        .map(|(i, ms)| record_at(axis, i as f64, ms / 1000.0))
        .collect()
}
