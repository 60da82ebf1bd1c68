//! Logical movement keys and the two axes they belong to

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four tracked movement roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalKey {
    Left,
    Right,
    Forward,
    Back,
}

impl LogicalKey {
    /// All roles, in index order
    pub const ALL: [LogicalKey; 4] = [Self::Left, Self::Right, Self::Forward, Self::Back];

    /// Stable index used for per-key state tables
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Forward => 2,
            Self::Back => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Forward => "Forward",
            Self::Back => "Back",
        }
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogicalKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "forward" => Ok(Self::Forward),
            "back" => Ok(Self::Back),
            _ => Err(CoreError::UnknownAxis(s.to_string())),
        }
    }
}

/// A pair of opposing keys tracked independently of the other pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Left / Right (the "AD" axis)
    Horizontal,
    /// Forward / Back (the "WS" axis)
    Vertical,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Self::Horizontal, Self::Vertical];

    pub fn index(self) -> usize {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }

    /// The axis that is not this one
    pub fn other(self) -> Axis {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// The two keys of this axis
    pub fn keys(self) -> [LogicalKey; 2] {
        match self {
            Self::Horizontal => [LogicalKey::Left, LogicalKey::Right],
            Self::Vertical => [LogicalKey::Forward, LogicalKey::Back],
        }
    }

    /// Short label shown in feedback lines
    pub fn label(self) -> &'static str {
        match self {
            Self::Horizontal => "AD",
            Self::Vertical => "WS",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Axis {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "ad" => Ok(Self::Horizontal),
            "vertical" | "ws" => Ok(Self::Vertical),
            _ => Err(CoreError::UnknownAxis(s.to_string())),
        }
    }
}

/// Axis a key belongs to
pub fn axis_of(key: LogicalKey) -> Axis {
    match key {
        LogicalKey::Left | LogicalKey::Right => Axis::Horizontal,
        LogicalKey::Forward | LogicalKey::Back => Axis::Vertical,
    }
}

/// The opposing key on the same axis
pub fn opposite_of(key: LogicalKey) -> LogicalKey {
    match key {
        LogicalKey::Left => LogicalKey::Right,
        LogicalKey::Right => LogicalKey::Left,
        LogicalKey::Forward => LogicalKey::Back,
        LogicalKey::Back => LogicalKey::Forward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involutive() {
        for key in LogicalKey::ALL {
            assert_eq!(opposite_of(opposite_of(key)), key);
            assert_ne!(opposite_of(key), key);
        }
    }

    #[test]
    fn opposite_stays_on_axis() {
        for key in LogicalKey::ALL {
            assert_eq!(axis_of(opposite_of(key)), axis_of(key));
        }
    }

    #[test]
    fn axes_partition_keys() {
        let horizontal: Vec<_> = LogicalKey::ALL
            .iter()
            .filter(|k| axis_of(**k) == Axis::Horizontal)
            .collect();
        let vertical: Vec<_> = LogicalKey::ALL
            .iter()
            .filter(|k| axis_of(**k) == Axis::Vertical)
            .collect();

        assert_eq!(horizontal.len(), 2);
        assert_eq!(vertical.len(), 2);
        assert!(horizontal.iter().all(|k| !vertical.contains(k)));

        for axis in Axis::ALL {
            for key in axis.keys() {
                assert_eq!(axis_of(key), axis);
            }
        }
    }

    #[test]
    fn indices_are_unique() {
        let mut seen = [false; 4];
        for key in LogicalKey::ALL {
            assert!(!seen[key.index()]);
            seen[key.index()] = true;
        }
        assert_ne!(Axis::Horizontal.index(), Axis::Vertical.index());
        assert_eq!(Axis::Horizontal.other(), Axis::Vertical);
    }

    #[test]
    fn parse_roles_and_axes() {
        assert_eq!("forward".parse::<LogicalKey>().unwrap(), LogicalKey::Forward);
        assert_eq!(" Left ".parse::<LogicalKey>().unwrap(), LogicalKey::Left);
        assert_eq!("ws".parse::<Axis>().unwrap(), Axis::Vertical);

        let err = "jump".parse::<LogicalKey>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownAxis(ref s) if s == "jump"));
        assert!("diagonal".parse::<Axis>().is_err());
    }
}
