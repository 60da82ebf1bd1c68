//! Detector output hooks

use super::ClassifiedRecord;
use crate::keyboard::{Axis, LogicalKey};
use std::fmt;
use std::sync::mpsc;

/// Why a pending pairing went away without producing a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Completed too soon after the previous record
    Debounced,
    /// Offset larger than the filter threshold
    OutOfThreshold,
    /// A key on the other axis was pressed
    CrossAxis,
    /// A newer release on the same axis replaced it
    Superseded,
    /// The arm timer expired
    TimedOut,
    /// Reset or key remapping
    Reset,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Debounced => "too frequent",
            Self::OutOfThreshold => "outside threshold",
            Self::CrossAxis => "other axis pressed",
            Self::Superseded => "superseded",
            Self::TimedOut => "timed out",
            Self::Reset => "reset",
        };
        f.write_str(text)
    }
}

/// Receives detector notifications.
///
/// All methods default to no-ops so observers only implement what they use.
pub trait DetectorObserver: Send {
    fn key_state_changed(&mut self, _key: LogicalKey, _is_down: bool) {}

    fn record_classified(&mut self, _axis: Axis, _record: &ClassifiedRecord) {}

    fn pairing_armed(&mut self, _axis: Axis, _expected: LogicalKey) {}

    fn pairing_cancelled(&mut self, _axis: Axis, _reason: CancelReason) {}
}

/// Owned form of a detector notification
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorEvent {
    KeyStateChanged { key: LogicalKey, is_down: bool },
    RecordClassified { axis: Axis, record: ClassifiedRecord },
    PairingArmed { axis: Axis, expected: LogicalKey },
    PairingCancelled { axis: Axis, reason: CancelReason },
}

/// Forwards notifications over a channel, e.g. to the UI thread
pub struct ChannelObserver {
    tx: mpsc::Sender<DetectorEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::Sender<DetectorEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: DetectorEvent) {
        // A dropped receiver only means nobody is watching any more
        let _ = self.tx.send(event);
    }
}

impl DetectorObserver for ChannelObserver {
    fn key_state_changed(&mut self, key: LogicalKey, is_down: bool) {
        self.send(DetectorEvent::KeyStateChanged { key, is_down });
    }

    fn record_classified(&mut self, axis: Axis, record: &ClassifiedRecord) {
        self.send(DetectorEvent::RecordClassified {
            axis,
            record: record.clone(),
        });
    }

    fn pairing_armed(&mut self, axis: Axis, expected: LogicalKey) {
        self.send(DetectorEvent::PairingArmed { axis, expected });
    }

    fn pairing_cancelled(&mut self, axis: Axis, reason: CancelReason) {
        self.send(DetectorEvent::PairingCancelled { axis, reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_observer_forwards_events() {
        let (tx, rx) = mpsc::channel();
        let mut observer = ChannelObserver::new(tx);

        observer.key_state_changed(LogicalKey::Left, true);
        observer.pairing_armed(Axis::Horizontal, LogicalKey::Right);
        observer.pairing_cancelled(Axis::Horizontal, CancelReason::TimedOut);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                DetectorEvent::KeyStateChanged { key: LogicalKey::Left, is_down: true },
                DetectorEvent::PairingArmed { axis: Axis::Horizontal, expected: LogicalKey::Right },
                DetectorEvent::PairingCancelled { axis: Axis::Horizontal, reason: CancelReason::TimedOut },
            ]
        );
    }

    #[test]
    fn channel_observer_survives_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut observer = ChannelObserver::new(tx);
        observer.key_state_changed(LogicalKey::Back, false);
    }
}
