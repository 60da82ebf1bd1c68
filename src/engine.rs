//! Detector engine thread
//!
//! The engine owns the [`Detector`] and the [`KeyRemapper`] and is the only
//! place either is mutated. Everything else talks to it through a cloneable
//! [`EngineHandle`], which feeds a bounded command queue. Configuration
//! commands carry a reply channel so callers learn synchronously whether
//! the new setting was accepted.
//!
//! Arm timers live in the engine loop: while a pairing is pending the loop
//! waits on the queue only until the earliest deadline, then fires the
//! timeout for that pairing id.

use crate::detector::Detector;
use crate::error::CoreError;
use crate::keyboard::{
    Axis, Clock, KeyEvent, KeyEventType, KeyMapping, KeyRemapper, PhysicalKey, Timestamp,
};
use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Commands queued between the capture thread and the engine
pub const COMMAND_QUEUE_DEPTH: usize = 1024;

type Reply = mpsc::Sender<Result<(), CoreError>>;

/// Work items for the engine thread
#[derive(Debug)]
pub enum EngineCommand {
    Key(KeyEvent),
    SetKeyMapping(KeyMapping, Reply),
    SetFilterThreshold(f64, Reply),
    SetDebounceWindow(f64, Reply),
    SetHistoryCapacity(Axis, usize, Reply),
    Reset,
    Shutdown,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("detector engine has stopped")]
    Stopped,
    #[error("setting rejected: {0}")]
    Rejected(#[from] CoreError),
}

/// Sending side of the engine queue
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: SyncSender<EngineCommand>,
}

impl EngineHandle {
    fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.tx.send(command).map_err(|_| EngineError::Stopped)
    }

    fn request(&self, build: impl FnOnce(Reply) -> EngineCommand) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(build(reply_tx))?;
        reply_rx.recv().map_err(|_| EngineError::Stopped)??;
        Ok(())
    }

    pub fn key_event(&self, event: KeyEvent) -> Result<(), EngineError> {
        self.send(EngineCommand::Key(event))
    }

    pub fn key_down(&self, key: PhysicalKey, timestamp: Timestamp) -> Result<(), EngineError> {
        self.key_event(KeyEvent::press(key, timestamp))
    }

    pub fn key_up(&self, key: PhysicalKey, timestamp: Timestamp) -> Result<(), EngineError> {
        self.key_event(KeyEvent::release(key, timestamp))
    }

    /// Install a new physical key mapping.
    ///
    /// On success all key state and pending pairings are cleared.
    pub fn set_key_mapping(&self, mapping: KeyMapping) -> Result<(), EngineError> {
        self.request(|reply| EngineCommand::SetKeyMapping(mapping, reply))
    }

    pub fn set_filter_threshold_ms(&self, threshold_ms: f64) -> Result<(), EngineError> {
        self.request(|reply| EngineCommand::SetFilterThreshold(threshold_ms, reply))
    }

    pub fn set_debounce_window_secs(&self, window_secs: f64) -> Result<(), EngineError> {
        self.request(|reply| EngineCommand::SetDebounceWindow(window_secs, reply))
    }

    pub fn set_history_capacity(&self, axis: Axis, capacity: usize) -> Result<(), EngineError> {
        self.request(|reply| EngineCommand::SetHistoryCapacity(axis, capacity, reply))
    }

    /// Clear key state, pending pairings and history
    pub fn reset(&self) -> Result<(), EngineError> {
        self.send(EngineCommand::Reset)
    }

    pub fn shutdown(&self) -> Result<(), EngineError> {
        self.send(EngineCommand::Shutdown)
    }
}

/// Owner of the detector state, driven by [`Engine::run`]
pub struct Engine {
    detector: Detector,
    remapper: KeyRemapper,
    clock: Clock,
    rx: Receiver<EngineCommand>,
}

impl Engine {
    /// Build an engine and the handle that feeds it.
    ///
    /// The detector takes its event-log labels from the remapper's mapping.
    pub fn new(mut detector: Detector, remapper: KeyRemapper, clock: Clock) -> (Self, EngineHandle) {
        let (tx, rx) = mpsc::sync_channel(COMMAND_QUEUE_DEPTH);
        detector.remap(remapper.mapping().clone());
        let engine = Self {
            detector,
            remapper,
            clock,
            rx,
        };
        (engine, EngineHandle { tx })
    }

    /// Process commands until shutdown or until every handle is dropped
    pub fn run(mut self) {
        log::info!("detector engine started");
        loop {
            let command = match self.detector.next_deadline() {
                Some(deadline) => match self.rx.recv_timeout(self.clock.until(deadline.at)) {
                    Ok(command) => command,
                    Err(RecvTimeoutError::Timeout) => {
                        self.detector.on_arm_timeout(deadline.axis, deadline.id);
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match self.rx.recv() {
                    Ok(command) => command,
                    Err(_) => break,
                },
            };

            if !self.handle(command) {
                break;
            }
        }
        log::info!(
            "detector engine stopped after {} records",
            self.detector.records_emitted()
        );
    }

    /// Returns `false` once the engine should stop
    fn handle(&mut self, command: EngineCommand) -> bool {
        match command {
            EngineCommand::Key(event) => self.handle_key(event),
            EngineCommand::SetKeyMapping(mapping, reply) => {
                let result = self.remapper.update_mapping(mapping);
                if result.is_ok() {
                    self.detector.remap(self.remapper.mapping().clone());
                    log::info!("key mapping updated");
                }
                Self::reply(reply, result);
            }
            EngineCommand::SetFilterThreshold(threshold_ms, reply) => {
                let result = self.detector.set_filter_threshold_ms(threshold_ms);
                Self::reply(reply, result);
            }
            EngineCommand::SetDebounceWindow(window_secs, reply) => {
                let result = self.detector.set_debounce_window_secs(window_secs);
                Self::reply(reply, result);
            }
            EngineCommand::SetHistoryCapacity(axis, capacity, reply) => {
                let result = self.detector.history().set_capacity(axis, capacity);
                if result.is_ok() {
                    log::info!("{} history capacity set to {}", axis, capacity);
                }
                Self::reply(reply, result);
            }
            EngineCommand::Reset => self.detector.reset(),
            EngineCommand::Shutdown => return false,
        }
        true
    }

    fn handle_key(&mut self, event: KeyEvent) {
        let Some(role) = self.remapper.resolve(&event.key) else {
            log::trace!("ignoring unmapped key {}", event.key);
            return;
        };

        // Timers due at or before this event fire first, even if the event
        // was queued before the wall clock reached them
        self.expire_until(event.timestamp);

        match event.event_type {
            KeyEventType::Press => self.detector.on_key_down(role, event.timestamp),
            KeyEventType::Release => self.detector.on_key_up(role, event.timestamp),
        }
    }

    fn expire_until(&mut self, timestamp: Timestamp) {
        while let Some(deadline) = self.detector.next_deadline() {
            if deadline.at > timestamp {
                break;
            }
            self.detector.on_arm_timeout(deadline.axis, deadline.id);
        }
    }

    fn reply(reply: Reply, result: Result<(), CoreError>) {
        if let Err(e) = &result {
            log::warn!("rejected configuration change: {}", e);
        }
        let _ = reply.send(result);
    }
}

/// Start the engine on its own thread
pub fn spawn(
    detector: Detector,
    remapper: KeyRemapper,
    clock: Clock,
) -> io::Result<(EngineHandle, JoinHandle<()>)> {
    let (engine, handle) = Engine::new(detector, remapper, clock);
    let join = thread::Builder::new()
        .name("detector-engine".to_string())
        .spawn(move || engine.run())?;
    Ok((handle, join))
}
