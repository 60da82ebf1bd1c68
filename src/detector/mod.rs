//! Counter-strafe detection
//!
//! The [`Detector`] pairs a release on one axis with the actuation of the
//! opposite key and classifies the offset between the two. It recognizes
//! two sequences:
//!
//! - **release then press**: a key goes up while its opposite is idle; the
//!   axis arms a pending pairing and waits for the opposite key to go down.
//! - **hold then release**: the opposite key is already down when the key
//!   goes up; the offset is measured immediately and is usually negative.
//!
//! Pairings that complete too soon after the previous record (debounce), or
//! whose offset exceeds the filter threshold, are dropped silently. A
//! pending pairing also ends when its arm timer fires, when a key on the
//! other axis is pressed, or when a newer release on the same axis replaces
//! it.
//!
//! The detector does no I/O and never blocks. Arm timers are represented
//! by [`ArmDeadline`]s; whoever drives the detector waits for the earliest
//! deadline and calls [`Detector::on_arm_timeout`] with the pairing id it
//! was armed for. A timeout for a pairing that has already been resolved or
//! replaced is ignored.

mod observer;
mod record;

pub use observer::{CancelReason, ChannelObserver, DetectorEvent, DetectorObserver};
pub use record::{
    intensity, round_ms, Classification, ClassifiedRecord, KeyEventRecord, PairingKind,
    PERFECT_WINDOW_MS,
};

use crate::error::CoreError;
use crate::history::HistoryStore;
use crate::keyboard::{axis_of, opposite_of, Axis, KeyEventType, KeyMapping, LogicalKey, Timestamp};
use serde::{Deserialize, Serialize};

/// Timing knobs for the detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum spacing between two records, in seconds
    pub debounce_window_secs: f64,
    /// Largest absolute offset accepted as a counter-strafe, in ms
    pub filter_threshold_ms: f64,
    /// Extra time a pending pairing waits beyond the threshold, in ms
    pub arm_buffer_ms: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            debounce_window_secs: 0.05,
            filter_threshold_ms: 120.0,
            arm_buffer_ms: 20.0,
        }
    }
}

impl DetectorConfig {
    /// How long a pending pairing stays armed, never below 1 ms
    pub fn arm_timeout_ms(&self) -> f64 {
        (self.filter_threshold_ms + self.arm_buffer_ms).max(1.0)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.filter_threshold_ms.is_finite() && self.filter_threshold_ms > 0.0) {
            return Err(CoreError::InvalidThreshold(self.filter_threshold_ms));
        }
        if !(self.debounce_window_secs.is_finite() && self.debounce_window_secs >= 0.0) {
            return Err(CoreError::InvalidDebounce(self.debounce_window_secs));
        }
        Ok(())
    }
}

/// Identity of one armed pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairingId(u64);

/// Up/down state of one logical key
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeyState {
    /// When the key went down; `None` while it is up
    pub down_at: Option<Timestamp>,
}

impl KeyState {
    pub fn is_down(&self) -> bool {
        self.down_at.is_some()
    }
}

/// An axis waiting for the opposite key after a release
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPairing {
    pub id: PairingId,
    pub expected_key: LogicalKey,
    pub released_key: LogicalKey,
    pub released_at: Timestamp,
    pub event_log: Vec<KeyEventRecord>,
    /// Settings in force when the pairing was armed; the pairing is judged
    /// against these even if the detector is reconfigured meanwhile
    pub config: DetectorConfig,
    pub deadline: Timestamp,
}

/// When an arm timer should fire and which pairing it belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmDeadline {
    pub axis: Axis,
    pub id: PairingId,
    pub at: Timestamp,
}

/// The counter-strafe state machine
pub struct Detector {
    config: DetectorConfig,
    labels: KeyMapping,
    keys: [KeyState; 4],
    pending: [Option<PendingPairing>; 2],
    last_recorded_at: Option<Timestamp>,
    next_pairing_id: u64,
    records_emitted: u64,
    history: HistoryStore,
    observers: Vec<Box<dyn DetectorObserver>>,
}

impl Detector {
    pub fn new(config: DetectorConfig, history: HistoryStore) -> Self {
        Self {
            config,
            labels: KeyMapping::default(),
            keys: [KeyState::default(); 4],
            pending: [None, None],
            last_recorded_at: None,
            next_pairing_id: 0,
            records_emitted: 0,
            history,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn DetectorObserver>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Replace the timing settings for subsequent events.
    ///
    /// Pairings already armed keep the settings they were armed with.
    pub fn set_config(&mut self, config: DetectorConfig) -> Result<(), CoreError> {
        config.validate()?;
        self.config = config;
        log::info!(
            "detector reconfigured: threshold {} ms, debounce {} s, arm timeout {} ms",
            config.filter_threshold_ms,
            config.debounce_window_secs,
            config.arm_timeout_ms()
        );
        Ok(())
    }

    pub fn set_filter_threshold_ms(&mut self, threshold_ms: f64) -> Result<(), CoreError> {
        self.set_config(DetectorConfig {
            filter_threshold_ms: threshold_ms,
            ..self.config
        })
    }

    pub fn set_debounce_window_secs(&mut self, window_secs: f64) -> Result<(), CoreError> {
        self.set_config(DetectorConfig {
            debounce_window_secs: window_secs,
            ..self.config
        })
    }

    /// Install the physical labels used in event logs.
    ///
    /// Key identities change meaning under a new mapping, so all key and
    /// pending state is cleared. History is kept.
    pub fn remap(&mut self, mapping: KeyMapping) {
        self.clear_state();
        self.labels = mapping;
    }

    /// Clear all key state, pending pairings and history
    pub fn reset(&mut self) {
        self.clear_state();
        self.history.clear_all();
        log::info!("detector reset");
    }

    fn clear_state(&mut self) {
        for axis in Axis::ALL {
            self.cancel_pending(axis, CancelReason::Reset);
        }
        for key in LogicalKey::ALL {
            if self.keys[key.index()].is_down() {
                self.keys[key.index()] = KeyState::default();
                self.notify(|o| o.key_state_changed(key, false));
            }
        }
        self.last_recorded_at = None;
    }

    pub fn key_state(&self, key: LogicalKey) -> KeyState {
        self.keys[key.index()]
    }

    pub fn pending(&self, axis: Axis) -> Option<&PendingPairing> {
        self.pending[axis.index()].as_ref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Number of records produced since startup
    pub fn records_emitted(&self) -> u64 {
        self.records_emitted
    }

    /// The earliest arm timer still outstanding
    pub fn next_deadline(&self) -> Option<ArmDeadline> {
        self.pending
            .iter()
            .flatten()
            .map(|p| ArmDeadline {
                axis: axis_of(p.released_key),
                id: p.id,
                at: p.deadline,
            })
            .min_by(|a, b| a.at.total_cmp(&b.at))
    }

    /// Handle a logical key going down
    pub fn on_key_down(&mut self, key: LogicalKey, timestamp: Timestamp) {
        if self.keys[key.index()].is_down() {
            log::trace!("{} already down, ignoring repeat", key);
            return;
        }
        self.keys[key.index()] = KeyState {
            down_at: Some(timestamp),
        };
        self.notify(|o| o.key_state_changed(key, true));

        let axis = axis_of(key);
        let expected = self.pending[axis.index()]
            .as_ref()
            .is_some_and(|p| p.expected_key == key);
        if expected {
            if let Some(pending) = self.pending[axis.index()].take() {
                self.complete_pending(axis, pending, key, timestamp);
            }
        }

        // A counter-strafe never spans both axes
        let other = axis.other();
        if self.pending[other.index()].is_some() {
            log::debug!("{} pressed, dropping pending {} pairing", key, other);
            self.cancel_pending(other, CancelReason::CrossAxis);
        }
    }

    /// Handle a logical key going up
    pub fn on_key_up(&mut self, key: LogicalKey, timestamp: Timestamp) {
        if !self.keys[key.index()].is_down() {
            log::trace!("stray release of {}, ignoring", key);
            return;
        }
        self.keys[key.index()] = KeyState::default();
        self.notify(|o| o.key_state_changed(key, false));

        let axis = axis_of(key);
        let opposite = opposite_of(key);

        if let Some(opposite_down_at) = self.keys[opposite.index()].down_at {
            self.cancel_pending(axis, CancelReason::Superseded);

            let config = self.config;
            let diff = opposite_down_at - timestamp;
            match self.check_guards(timestamp, diff, &config) {
                Ok(()) => {
                    let event_log = vec![
                        self.event_record(opposite, KeyEventType::Press, opposite_down_at),
                        self.event_record(key, KeyEventType::Release, timestamp),
                    ];
                    let record = ClassifiedRecord::new(
                        axis,
                        PairingKind::HoldThenRelease,
                        timestamp,
                        diff,
                        config.filter_threshold_ms,
                        event_log,
                    );
                    self.emit(record, timestamp);
                }
                Err(reason) => {
                    log::debug!(
                        "dropping {} hold-then-release ({} -> {}, {:.1} ms): {}",
                        axis,
                        opposite,
                        key,
                        round_ms(diff),
                        reason
                    );
                    self.notify(|o| o.pairing_cancelled(axis, reason));
                }
            }
            return;
        }

        self.arm(axis, key, opposite, timestamp);
    }

    /// Arm timer callback.
    ///
    /// Returns `true` if the pairing was still pending and got cleared.
    pub fn on_arm_timeout(&mut self, axis: Axis, id: PairingId) -> bool {
        let current = self.pending[axis.index()].as_ref().map(|p| p.id);
        if current != Some(id) {
            log::trace!("stale {} arm timer ignored", axis);
            return false;
        }
        log::debug!("{} pairing timed out waiting for the opposite key", axis);
        self.cancel_pending(axis, CancelReason::TimedOut);
        true
    }

    fn arm(&mut self, axis: Axis, released: LogicalKey, expected: LogicalKey, timestamp: Timestamp) {
        let id = PairingId(self.next_pairing_id);
        self.next_pairing_id += 1;

        let config = self.config;
        let pending = PendingPairing {
            id,
            expected_key: expected,
            released_key: released,
            released_at: timestamp,
            event_log: vec![self.event_record(released, KeyEventType::Release, timestamp)],
            config,
            deadline: timestamp + config.arm_timeout_ms() / 1000.0,
        };

        self.cancel_pending(axis, CancelReason::Superseded);
        self.pending[axis.index()] = Some(pending);
        log::debug!(
            "{} released, waiting {} ms for {} ({})",
            released,
            config.arm_timeout_ms(),
            expected,
            self.labels.key_for(expected)
        );
        self.notify(|o| o.pairing_armed(axis, expected));
    }

    fn complete_pending(
        &mut self,
        axis: Axis,
        pending: PendingPairing,
        key: LogicalKey,
        timestamp: Timestamp,
    ) {
        let config = pending.config;
        let diff = timestamp - pending.released_at;

        if let Err(reason) = self.check_guards(timestamp, diff, &config) {
            log::debug!(
                "dropping {} pairing ({} -> {}, {:.1} ms): {}",
                axis,
                pending.released_key,
                key,
                round_ms(diff),
                reason
            );
            self.notify(|o| o.pairing_cancelled(axis, reason));
            return;
        }

        let mut event_log = pending.event_log;
        event_log.push(self.event_record(key, KeyEventType::Press, timestamp));
        let record = ClassifiedRecord::new(
            axis,
            PairingKind::ReleaseThenPress,
            timestamp,
            diff,
            config.filter_threshold_ms,
            event_log,
        );
        self.emit(record, timestamp);
    }

    fn check_guards(
        &self,
        timestamp: Timestamp,
        diff_secs: f64,
        config: &DetectorConfig,
    ) -> Result<(), CancelReason> {
        if let Some(last) = self.last_recorded_at {
            if timestamp - last < config.debounce_window_secs {
                return Err(CancelReason::Debounced);
            }
        }
        if diff_secs.abs() * 1000.0 > config.filter_threshold_ms {
            return Err(CancelReason::OutOfThreshold);
        }
        Ok(())
    }

    fn emit(&mut self, record: ClassifiedRecord, timestamp: Timestamp) {
        let axis = record.axis;
        log::info!("{}", record.feedback());

        self.last_recorded_at = Some(timestamp);
        self.records_emitted += 1;
        self.notify(|o| o.record_classified(axis, &record));
        self.history.append(axis, record);
    }

    fn cancel_pending(&mut self, axis: Axis, reason: CancelReason) -> Option<PendingPairing> {
        let cancelled = self.pending[axis.index()].take();
        if cancelled.is_some() {
            self.notify(|o| o.pairing_cancelled(axis, reason));
        }
        cancelled
    }

    fn event_record(&self, role: LogicalKey, event_type: KeyEventType, timestamp: Timestamp) -> KeyEventRecord {
        KeyEventRecord::new(role, self.labels.key_for(role).clone(), event_type, timestamp)
    }

    fn notify(&mut self, mut f: impl FnMut(&mut dyn DetectorObserver)) {
        for observer in self.observers.iter_mut() {
            f(observer.as_mut());
        }
    }
}
