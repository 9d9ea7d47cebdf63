//! Handle to a live playback session
//!
//! The handle is the thread-safe front of a session: it owns the command
//! sender and the worker's join handle. All methods are request/reply
//! round-trips into the worker mailbox, so callers on any thread observe
//! control operations in a single serialized order.

use crate::error::{EngineError, Result};
use crate::playback::events::{EventHandler, EventSubscriber, SessionEvent};
use crate::playback::scheduler::{
    ControlOutcome, PlaybackStatus, PlaybackWorker, SessionCommand,
};
use crate::simulator::ParameterState;
use crate::types::{Layer, MessageDefinition, MessageFilter};
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::warn;

/// A running playback session and its worker thread
pub struct SessionHandle {
    commands: Sender<SessionCommand>,
    worker: Option<JoinHandle<()>>,
    created_at: DateTime<Utc>,
    // Refreshed by control operations and subscriptions, not by status
    // polls, so garbage collection sees real caller activity
    last_activity: Mutex<Instant>,
}

impl SessionHandle {
    /// Spawn a worker thread for `sequence` and return its handle
    pub(crate) fn spawn(
        session_name: String,
        sequence: Arc<Vec<MessageDefinition>>,
        initial_speed: f64,
        max_speed: f64,
        param_cadence_ms: u64,
        history_depth: usize,
        seed: u64,
    ) -> Result<Self> {
        let (command_tx, command_rx) = unbounded();
        let worker = PlaybackWorker::new(
            command_rx,
            sequence,
            initial_speed,
            max_speed,
            param_cadence_ms,
            history_depth,
            seed,
        );
        let handle = std::thread::Builder::new()
            .name(session_name)
            .spawn(move || worker.run())
            .map_err(|e| EngineError::Channel(format!("failed to spawn session worker: {e}")))?;
        Ok(Self {
            commands: command_tx,
            worker: Some(handle),
            created_at: Utc::now(),
            last_activity: Mutex::new(Instant::now()),
        })
    }

    /// When this session was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time since the last control operation or subscription
    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().unwrap().elapsed()
    }

    fn touch(&self) {
        *self.last_activity.lock().unwrap() = Instant::now();
    }

    /// Begin playback from virtual time zero
    pub fn start(&self) -> Result<ControlOutcome> {
        self.control(|reply| SessionCommand::Start { reply })
    }

    /// Freeze the virtual clock
    pub fn pause(&self) -> Result<ControlOutcome> {
        self.control(|reply| SessionCommand::Pause { reply })
    }

    /// Continue from where the clock was frozen
    pub fn resume(&self) -> Result<ControlOutcome> {
        self.control(|reply| SessionCommand::Resume { reply })
    }

    /// Terminate playback, keeping statistics readable
    pub fn stop(&self) -> Result<ControlOutcome> {
        self.control(|reply| SessionCommand::Stop { reply })
    }

    /// Return to idle with clock, cursor, statistics and simulator cleared
    pub fn reset(&self) -> Result<ControlOutcome> {
        self.control(|reply| SessionCommand::Reset { reply })
    }

    /// Change the speed multiplier, preserving elapsed virtual time
    pub fn set_speed(&self, multiplier: f64) -> Result<ControlOutcome> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(EngineError::validation(format!(
                "speed multiplier must be positive, got {multiplier}"
            )));
        }
        self.control(|reply| SessionCommand::SetSpeed { multiplier, reply })
    }

    /// Seek to a virtual time in milliseconds
    pub fn jump_to_time(&self, target_ms: u64) -> Result<ControlOutcome> {
        self.control(|reply| SessionCommand::JumpToTime { target_ms, reply })
    }

    /// Replace the active message filter
    pub fn set_filter(&self, filter: MessageFilter) -> Result<ControlOutcome> {
        self.control(|reply| SessionCommand::SetFilter { filter, reply })
    }

    /// Snapshot the session's current state and statistics
    pub fn status(&self) -> Result<PlaybackStatus> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(SessionCommand::Status { reply: reply_tx })?;
        reply_rx
            .recv()
            .map_err(|_| EngineError::Channel("session worker dropped status reply".into()))
    }

    /// Current state of every simulated parameter on a layer
    pub fn parameter_snapshot(&self, layer: Layer) -> Result<HashMap<String, ParameterState>> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(SessionCommand::ParameterSnapshot {
            layer,
            reply: reply_tx,
        })?;
        reply_rx
            .recv()
            .map_err(|_| EngineError::Channel("session worker dropped snapshot reply".into()))
    }

    /// Subscribe to session events over a channel
    pub fn subscribe(&self) -> Result<Receiver<SessionEvent>> {
        let (event_tx, event_rx) = unbounded();
        self.touch();
        self.send(SessionCommand::Subscribe(EventSubscriber::Channel(event_tx)))?;
        Ok(event_rx)
    }

    /// Register a callback invoked on the worker thread for every event
    pub fn subscribe_with(&self, handler: EventHandler) -> Result<()> {
        self.touch();
        self.send(SessionCommand::Subscribe(EventSubscriber::Handler(handler)))
    }

    fn control(
        &self,
        make: impl FnOnce(Sender<ControlOutcome>) -> SessionCommand,
    ) -> Result<ControlOutcome> {
        self.touch();
        let (reply_tx, reply_rx) = bounded(1);
        self.send(make(reply_tx))?;
        reply_rx
            .recv()
            .map_err(|_| EngineError::Channel("session worker dropped control reply".into()))
    }

    fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| EngineError::Channel("session worker is gone".into()))
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("session worker panicked during shutdown");
            }
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
