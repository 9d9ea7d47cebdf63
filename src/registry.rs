//! Session registry and engine facade
//!
//! [`PlaybackEngine`] is the single entry point: it loads and validates
//! test-case sequences through a [`SequenceSource`], allocates session
//! ids, spawns one worker per session, and routes control calls to the
//! right session. The registry map is the only shared mutable state in
//! the crate; everything per-session lives on its worker thread.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::loader::{validate_sequence, SequenceSource};
use crate::playback::events::{EventHandler, SessionEvent};
use crate::playback::scheduler::{ControlOutcome, PlaybackStatus};
use crate::playback::session::SessionHandle;
use crate::simulator::ParameterState;
use crate::types::{Layer, MessageFilter, SessionState};
use crossbeam_channel::Receiver;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// Opaque identifier of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Owns all playback sessions and the sequence source
pub struct PlaybackEngine {
    source: Box<dyn SequenceSource>,
    config: EngineConfig,
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
    next_id: AtomicU64,
}

impl PlaybackEngine {
    /// Create an engine backed by `source`
    pub fn new(source: Box<dyn SequenceSource>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Load a test case, validate its sequence, and spawn an idle session
    pub fn initialize(&self, test_case_id: &str) -> Result<SessionId> {
        let sequence = self.source.load_sequence(test_case_id)?;
        validate_sequence(&sequence)?;

        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        // Derive a per-session seed so concurrent sessions walk
        // independently even under a fixed configured seed
        let seed = self.config.seed.unwrap_or_else(rand::random) ^ id.0;

        let handle = SessionHandle::spawn(
            id.to_string(),
            Arc::new(sequence),
            self.config.default_speed,
            self.config.max_speed,
            self.config.parameter_cadence_ms,
            self.config.history_depth,
            seed,
        )?;
        info!(%id, test_case_id, "session initialized");
        self.sessions.lock().unwrap().insert(id, handle);
        Ok(id)
    }

    /// Begin playback from virtual time zero
    pub fn start(&self, id: SessionId) -> Result<ControlOutcome> {
        self.with_session(id, |s| s.start())
    }

    /// Freeze the session's virtual clock
    pub fn pause(&self, id: SessionId) -> Result<ControlOutcome> {
        self.with_session(id, |s| s.pause())
    }

    /// Continue a paused session
    pub fn resume(&self, id: SessionId) -> Result<ControlOutcome> {
        self.with_session(id, |s| s.resume())
    }

    /// Terminate playback, keeping the session queryable
    pub fn stop(&self, id: SessionId) -> Result<ControlOutcome> {
        self.with_session(id, |s| s.stop())
    }

    /// Return a session to idle with all state cleared
    pub fn reset(&self, id: SessionId) -> Result<ControlOutcome> {
        self.with_session(id, |s| s.reset())
    }

    /// Change a session's speed multiplier
    ///
    /// Rejects non-positive multipliers; values above the configured
    /// maximum are clamped by the session.
    pub fn set_speed(&self, id: SessionId, multiplier: f64) -> Result<ControlOutcome> {
        self.with_session(id, |s| s.set_speed(multiplier))
    }

    /// Seek a session to a virtual time in milliseconds
    pub fn jump_to_time(&self, id: SessionId, target_ms: u64) -> Result<ControlOutcome> {
        self.with_session(id, |s| s.jump_to_time(target_ms))
    }

    /// Replace a session's message filter
    pub fn set_filter(&self, id: SessionId, filter: MessageFilter) -> Result<ControlOutcome> {
        self.with_session(id, |s| s.set_filter(filter))
    }

    /// Snapshot a session's state, progress and statistics
    pub fn status(&self, id: SessionId) -> Result<PlaybackStatus> {
        self.with_session(id, |s| s.status())
    }

    /// Current parameter-simulator state for one layer of a session
    pub fn parameter_snapshot(
        &self,
        id: SessionId,
        layer: Layer,
    ) -> Result<HashMap<String, ParameterState>> {
        self.with_session(id, |s| s.parameter_snapshot(layer))
    }

    /// Subscribe to a session's events over a channel
    pub fn subscribe(&self, id: SessionId) -> Result<Receiver<SessionEvent>> {
        self.with_session(id, |s| s.subscribe())
    }

    /// Register an event callback on a session
    pub fn subscribe_with(&self, id: SessionId, handler: EventHandler) -> Result<()> {
        self.with_session(id, |s| s.subscribe_with(handler))
    }

    /// Tear down a session, joining its worker thread
    pub fn destroy(&self, id: SessionId) -> Result<()> {
        let handle = self
            .sessions
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or(EngineError::SessionNotFound(id.to_string()))?;
        drop(handle);
        info!(%id, "session destroyed");
        Ok(())
    }

    /// Remove abandoned sessions
    ///
    /// A session is collected when it has no live subscribers, sits in a
    /// terminal or idle state, and has seen no control activity for at
    /// least `max_idle`. Returns the ids that were collected.
    pub fn collect_idle(&self, max_idle: Duration) -> Vec<SessionId> {
        let mut sessions = self.sessions.lock().unwrap();
        let candidates: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, handle)| {
                if handle.idle_for() < max_idle {
                    return false;
                }
                handle
                    .status()
                    .map(|status| {
                        (status.state.is_terminal() || status.state == SessionState::Idle)
                            && status.subscribers == 0
                    })
                    .unwrap_or(true)
            })
            .map(|(id, _)| *id)
            .collect();
        for id in &candidates {
            sessions.remove(id);
            debug!(%id, "collected idle session");
        }
        candidates
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Ids of all live sessions
    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.lock().unwrap().keys().copied().collect();
        ids.sort();
        ids
    }

    fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&SessionHandle) -> Result<T>,
    ) -> Result<T> {
        let sessions = self.sessions.lock().unwrap();
        let handle = sessions
            .get(&id)
            .ok_or(EngineError::SessionNotFound(id.to_string()))?;
        f(handle)
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("sessions", &self.session_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
