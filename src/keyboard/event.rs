//! Keyboard event types, the monotonic clock and the capture listener

use super::PhysicalKey;
use crate::engine::{EngineError, EngineHandle};
use device_query::{DeviceQuery, DeviceState};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Monotonic time in seconds since the session clock started
pub type Timestamp = f64;

/// Type of keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEventType {
    /// Key was pressed down
    Press,
    /// Key was released
    Release,
}

/// A raw keyboard event with timing information
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    /// The physical key
    pub key: PhysicalKey,
    /// Type of event (press/release)
    pub event_type: KeyEventType,
    /// When the event occurred
    pub timestamp: Timestamp,
}

impl KeyEvent {
    pub fn new(key: impl Into<PhysicalKey>, event_type: KeyEventType, timestamp: Timestamp) -> Self {
        Self {
            key: key.into(),
            event_type,
            timestamp,
        }
    }

    pub fn press(key: impl Into<PhysicalKey>, timestamp: Timestamp) -> Self {
        Self::new(key, KeyEventType::Press, timestamp)
    }

    pub fn release(key: impl Into<PhysicalKey>, timestamp: Timestamp) -> Self {
        Self::new(key, KeyEventType::Release, timestamp)
    }
}

/// Session clock shared by the capture thread and the engine timers.
///
/// Copies share the same origin, so timestamps taken on different threads
/// are directly comparable.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Seconds elapsed since the clock started
    pub fn now(&self) -> Timestamp {
        self.origin.elapsed().as_secs_f64()
    }

    /// Time left until `deadline`, zero if it already passed and
    /// `Duration::MAX` if it is too far out to represent
    pub fn until(&self, deadline: Timestamp) -> Duration {
        let remaining = deadline - self.now();
        if remaining > 0.0 {
            Duration::try_from_secs_f64(remaining).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Keyboard listener that polls for key state changes and forwards them to
/// the engine
pub struct KeyboardListener {
    device_state: DeviceState,
    last_keys: Vec<device_query::Keycode>,
    clock: Clock,
    engine: EngineHandle,
}

impl KeyboardListener {
    /// Create a new keyboard listener
    pub fn new(engine: EngineHandle, clock: Clock) -> Self {
        Self {
            device_state: DeviceState::new(),
            last_keys: Vec::new(),
            clock,
            engine,
        }
    }

    /// Poll for keyboard state changes.
    /// Returns the number of events forwarded.
    pub fn poll(&mut self) -> Result<usize, EngineError> {
        let now = self.clock.now();
        let current_keys = self.device_state.get_keys();
        let mut event_count = 0;

        // Releases first so a same-poll reversal reads release-then-press
        for key in &self.last_keys {
            if !current_keys.contains(key) {
                self.engine.key_up(PhysicalKey::from(*key), now)?;
                event_count += 1;
            }
        }

        for key in &current_keys {
            if !self.last_keys.contains(key) {
                self.engine.key_down(PhysicalKey::from(*key), now)?;
                event_count += 1;
            }
        }

        self.last_keys = current_keys;
        Ok(event_count)
    }
}

/// Run a listener on a dedicated capture thread until `running` clears or
/// the engine goes away.
///
/// The `DeviceState` is created on the capture thread itself.
pub fn spawn_capture(
    engine: EngineHandle,
    clock: Clock,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("key-capture".to_string())
        .spawn(move || {
            let mut listener = KeyboardListener::new(engine, clock);
            log::info!("key capture started ({:?} poll interval)", poll_interval);
            while running.load(Ordering::Relaxed) {
                if let Err(e) = listener.poll() {
                    log::warn!("key capture stopping: {}", e);
                    break;
                }
                thread::sleep(poll_interval);
            }
            log::info!("key capture stopped");
        })
}
