//! Classified counter-strafe records

use crate::keyboard::{Axis, KeyEventType, LogicalKey, PhysicalKey, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Offsets within this many ms either side of zero count as perfect
pub const PERFECT_WINDOW_MS: f64 = 2.0;

/// Timing verdict for one counter-strafe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Perfect,
    /// The second action came before the ideal instant
    Early,
    /// The second action came after the ideal instant
    Late,
}

impl Classification {
    /// Classify a rounded offset in milliseconds
    pub fn from_diff_ms(diff_ms: f64) -> Self {
        if diff_ms.abs() <= PERFECT_WINDOW_MS {
            Self::Perfect
        } else if diff_ms < 0.0 {
            Self::Early
        } else {
            Self::Late
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Early => "Early",
            Self::Late => "Late",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which key sequence produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingKind {
    /// Key released, then the opposite key pressed
    ReleaseThenPress,
    /// Opposite key pressed while still holding, then the first key released
    HoldThenRelease,
}

/// Seconds to milliseconds, rounded to one decimal place
pub fn round_ms(diff_secs: f64) -> f64 {
    (diff_secs * 10_000.0).round() / 10.0
}

/// Display intensity in [0, 1]: how far the offset is toward the threshold
pub fn intensity(diff_ms: f64, threshold_ms: f64) -> f64 {
    if threshold_ms <= 0.0 {
        return 1.0;
    }
    (diff_ms.abs().min(threshold_ms) / threshold_ms).clamp(0.0, 1.0)
}

/// One key transition captured in a record's event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEventRecord {
    pub role: LogicalKey,
    /// Physical key bound to the role when the event happened
    pub label: PhysicalKey,
    pub event_type: KeyEventType,
    pub timestamp: Timestamp,
}

impl KeyEventRecord {
    pub fn new(
        role: LogicalKey,
        label: PhysicalKey,
        event_type: KeyEventType,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            role,
            label,
            event_type,
            timestamp,
        }
    }

    fn verb(&self) -> &'static str {
        match self.event_type {
            KeyEventType::Press => "pressed",
            KeyEventType::Release => "released",
        }
    }
}

impl fmt::Display for KeyEventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s - {} ({}) {}", self.timestamp, self.label, self.role, self.verb())
    }
}

/// A timed, classified counter-strafe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub axis: Axis,
    pub kind: PairingKind,
    /// Time of the event that completed the pairing
    pub event_timestamp: Timestamp,
    /// Raw offset in seconds; negative means the opposite key went down
    /// before the release
    pub time_diff_secs: f64,
    /// Offset in ms rounded to 0.1
    pub time_diff_ms: f64,
    pub classification: Classification,
    pub color_intensity: f64,
    /// Events making up the pairing, in chronological order
    pub event_log: Vec<KeyEventRecord>,
}

impl ClassifiedRecord {
    /// Build a record from a raw offset
    pub fn new(
        axis: Axis,
        kind: PairingKind,
        event_timestamp: Timestamp,
        time_diff_secs: f64,
        threshold_ms: f64,
        event_log: Vec<KeyEventRecord>,
    ) -> Self {
        let time_diff_ms = round_ms(time_diff_secs);
        Self {
            axis,
            kind,
            event_timestamp,
            time_diff_secs,
            time_diff_ms,
            classification: Classification::from_diff_ms(time_diff_ms),
            color_intensity: intensity(time_diff_ms, threshold_ms),
            event_log,
        }
    }

    /// One-line description of the record for the feedback line
    pub fn feedback(&self) -> String {
        let (first, second) = match (self.event_log.first(), self.event_log.last()) {
            (Some(first), Some(second)) if self.event_log.len() >= 2 => (first, second),
            _ => {
                return format!(
                    "[{}] {}: {:.1} ms",
                    self.axis, self.classification, self.time_diff_ms
                )
            }
        };

        let magnitude = self.time_diff_ms.abs();
        match self.kind {
            PairingKind::ReleaseThenPress => {
                let direction = if self.time_diff_ms < 0.0 { "earlier" } else { "later" };
                format!(
                    "[{}] {}: released {}, pressed {} {:.1} ms {}",
                    self.axis, self.classification, first.label, second.label, magnitude, direction
                )
            }
            PairingKind::HoldThenRelease => {
                let direction = if self.time_diff_ms <= 0.0 { "before" } else { "after" };
                format!(
                    "[{}] {}: pressed {} {:.1} ms {} releasing {}",
                    self.axis, self.classification, first.label, magnitude, direction, second.label
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(first: (&str, LogicalKey, KeyEventType), second: (&str, LogicalKey, KeyEventType)) -> Vec<KeyEventRecord> {
        vec![
            KeyEventRecord::new(first.1, first.0.into(), first.2, 0.0),
            KeyEventRecord::new(second.1, second.0.into(), second.2, 0.015),
        ]
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(Classification::from_diff_ms(0.0), Classification::Perfect);
        assert_eq!(Classification::from_diff_ms(2.0), Classification::Perfect);
        assert_eq!(Classification::from_diff_ms(-2.0), Classification::Perfect);
        assert_eq!(Classification::from_diff_ms(2.1), Classification::Late);
        assert_eq!(Classification::from_diff_ms(-2.1), Classification::Early);
    }

    #[test]
    fn round_ms_keeps_one_decimal() {
        assert_eq!(round_ms(0.015), 15.0);
        assert_eq!(round_ms(-0.001), -1.0);
        assert_eq!(round_ms(0.01234), 12.3);
        assert_eq!(round_ms(0.01236), 12.4);
    }

    #[test]
    fn intensity_is_clamped() {
        assert_eq!(intensity(0.0, 120.0), 0.0);
        assert_eq!(intensity(60.0, 120.0), 0.5);
        assert_eq!(intensity(-60.0, 120.0), 0.5);
        assert_eq!(intensity(500.0, 120.0), 1.0);
        assert_eq!(intensity(5.0, 0.0), 1.0);
    }

    #[test]
    fn record_derives_fields() {
        let record = ClassifiedRecord::new(
            Axis::Horizontal,
            PairingKind::ReleaseThenPress,
            0.015,
            0.015,
            120.0,
            Vec::new(),
        );
        assert_eq!(record.time_diff_ms, 15.0);
        assert_eq!(record.classification, Classification::Late);
        assert!((record.color_intensity - 0.125).abs() < 1e-9);
    }

    #[test]
    fn feedback_release_then_press() {
        let record = ClassifiedRecord::new(
            Axis::Horizontal,
            PairingKind::ReleaseThenPress,
            0.015,
            0.015,
            120.0,
            log(
                ("A", LogicalKey::Left, KeyEventType::Release),
                ("D", LogicalKey::Right, KeyEventType::Press),
            ),
        );
        assert_eq!(record.feedback(), "[AD] Late: released A, pressed D 15.0 ms later");
    }

    #[test]
    fn feedback_hold_then_release() {
        let record = ClassifiedRecord::new(
            Axis::Vertical,
            PairingKind::HoldThenRelease,
            0.015,
            -0.003,
            120.0,
            log(
                ("S", LogicalKey::Back, KeyEventType::Press),
                ("W", LogicalKey::Forward, KeyEventType::Release),
            ),
        );
        assert_eq!(record.feedback(), "[WS] Early: pressed S 3.0 ms before releasing W");
    }

    #[test]
    fn event_record_display() {
        let event = KeyEventRecord::new(LogicalKey::Left, "A".into(), KeyEventType::Release, 1.25);
        assert_eq!(event.to_string(), "1.250s - A (Left) released");
    }
}
