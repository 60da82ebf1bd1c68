//! Counter-Strafe TestKit - counter-strafe timing trainer
//!
//! Watches the four movement keys, pairs each release with the press of
//! the opposite key on the same axis, and classifies the offset between
//! the two as Perfect, Early or Late.
//!
//! The pieces, bottom up:
//!
//! - [`keyboard`]: physical and logical keys, the remapper, event capture
//! - [`detector`]: the pairing state machine and its records
//! - [`history`]: bounded per-axis record history shared with readers
//! - [`engine`]: the thread that owns the detector and its arm timers
//! - [`analysis`] and [`report`]: statistics, recommendations, JSON export
//! - [`ui`]: the terminal front end

pub mod analysis;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod history;
pub mod keyboard;
pub mod report;
pub mod ui;
pub mod utils;

#[cfg(test)]
mod test_helpers;

pub use config::Config;
pub use detector::{Detector, DetectorConfig};
pub use engine::{EngineError, EngineHandle};
pub use error::CoreError;
pub use history::HistoryStore;
