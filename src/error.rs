//! Error types shared by the detector core

use crate::keyboard::{LogicalKey, PhysicalKey};
use thiserror::Error;

/// Configuration errors raised by the remapper, detector and history store.
///
/// Rejected settings never replace the active configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Two roles were mapped to the same physical key
    #[error("key {key} is mapped to both {first} and {second}")]
    DuplicateMapping {
        key: PhysicalKey,
        first: LogicalKey,
        second: LogicalKey,
    },
    /// A role was left without a physical key
    #[error("no key mapped to {0}")]
    UnmappedRole(LogicalKey),
    /// Role or axis name outside the closed set
    #[error("unknown axis or key role: {0:?}")]
    UnknownAxis(String),
    #[error("filter threshold must be a positive number of ms, got {0}")]
    InvalidThreshold(f64),
    #[error("debounce window must be a non-negative number of seconds, got {0}")]
    InvalidDebounce(f64),
    #[error("history capacity must be positive")]
    InvalidCapacity,
}
