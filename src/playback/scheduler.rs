//! Per-session playback worker
//!
//! Each session runs one dedicated worker thread that owns all mutable
//! session state: the virtual clock, the pending-message cursor, the
//! active filter, the statistics aggregator, and the layer parameter
//! simulator. Control operations arrive over a command mailbox and are
//! therefore serialized by construction; no locks are needed and no
//! callback can fire after the session is stopped or reset.
//!
//! # Scheduling
//!
//! The worker blocks in `recv_deadline` until either a command arrives or
//! the earlier of two timers falls due: the wall-clock instant at which
//! the next pending message's virtual timestamp is reached, or the next
//! parameter-simulator tick. When a timer fires, the due condition is
//! re-verified against the live virtual clock before emitting, which
//! guards against a `set_speed` racing the armed timer: if the clock was
//! slowed mid-wait the message is simply rearmed, never lost or emitted
//! twice.

use crate::playback::clock::VirtualClock;
use crate::playback::events::{EventBroadcaster, EventSubscriber, SessionEvent};
use crate::simulator::{LayerParameterSimulator, ParameterState};
use crate::stats::{RunStatistics, StatisticsAggregator};
use crate::types::{Layer, MessageDefinition, MessageFilter, ProgressUpdate, SessionState};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Result of a control operation on a session
///
/// Control calls that are invalid for the current lifecycle state do not
/// fail; they report a structured no-op so the control API stays
/// idempotency-friendly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The operation was applied
    Applied,
    /// The operation was a no-op for the current state
    Ignored {
        /// Why the operation was skipped
        reason: String,
    },
}

impl ControlOutcome {
    /// Whether the operation took effect
    pub fn is_applied(&self) -> bool {
        matches!(self, ControlOutcome::Applied)
    }

    fn ignored(reason: impl Into<String>) -> Self {
        ControlOutcome::Ignored {
            reason: reason.into(),
        }
    }
}

/// Point-in-time snapshot of a session, returned by `status`
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackStatus {
    /// Current lifecycle state
    pub state: SessionState,
    /// Active speed multiplier
    pub speed_multiplier: f64,
    /// Current virtual time in milliseconds
    pub virtual_time_ms: u64,
    /// Index of the next message to schedule
    pub next_pending_index: usize,
    /// Length of the loaded sequence
    pub sequence_length: usize,
    /// Progress derived from virtual time
    pub progress: ProgressUpdate,
    /// Run statistics snapshot
    pub stats: RunStatistics,
    /// Number of live event subscribers
    pub subscribers: usize,
}

/// Control messages accepted by a session worker
pub(crate) enum SessionCommand {
    Start { reply: Sender<ControlOutcome> },
    Pause { reply: Sender<ControlOutcome> },
    Resume { reply: Sender<ControlOutcome> },
    Stop { reply: Sender<ControlOutcome> },
    Reset { reply: Sender<ControlOutcome> },
    SetSpeed { multiplier: f64, reply: Sender<ControlOutcome> },
    JumpToTime { target_ms: u64, reply: Sender<ControlOutcome> },
    SetFilter { filter: MessageFilter, reply: Sender<ControlOutcome> },
    Status { reply: Sender<PlaybackStatus> },
    ParameterSnapshot { layer: Layer, reply: Sender<HashMap<String, ParameterState>> },
    Subscribe(EventSubscriber),
    Shutdown,
}

/// Owns and drives all state of one playback session
pub(crate) struct PlaybackWorker {
    commands: Receiver<SessionCommand>,
    sequence: Arc<Vec<MessageDefinition>>,
    total_ms: u64,
    clock: VirtualClock,
    state: SessionState,
    next_pending: usize,
    filter: MessageFilter,
    stats: StatisticsAggregator,
    simulator: LayerParameterSimulator,
    broadcaster: EventBroadcaster,
    param_cadence_ms: u64,
    max_speed: f64,
    next_param_due: Option<Instant>,
}

impl PlaybackWorker {
    pub(crate) fn new(
        commands: Receiver<SessionCommand>,
        sequence: Arc<Vec<MessageDefinition>>,
        initial_speed: f64,
        max_speed: f64,
        param_cadence_ms: u64,
        history_depth: usize,
        seed: u64,
    ) -> Self {
        let total_ms = sequence.last().map(|m| m.timestamp_ms).unwrap_or(0);
        Self {
            commands,
            sequence,
            total_ms,
            clock: VirtualClock::new(initial_speed),
            state: SessionState::Idle,
            next_pending: 0,
            filter: MessageFilter::match_all(),
            stats: StatisticsAggregator::new(),
            simulator: LayerParameterSimulator::for_all_layers(history_depth, seed),
            broadcaster: EventBroadcaster::new(),
            param_cadence_ms,
            max_speed,
            next_param_due: None,
        }
    }

    /// Worker main loop; returns when the session is shut down
    pub(crate) fn run(mut self) {
        loop {
            let command = match self.next_deadline(Instant::now()) {
                Some(deadline) => match self.commands.recv_deadline(deadline) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => return,
                },
                None => match self.commands.recv() {
                    Ok(command) => Some(command),
                    Err(_) => return,
                },
            };
            match command {
                Some(SessionCommand::Shutdown) => {
                    debug!("session worker shutting down");
                    return;
                }
                Some(command) => self.handle_command(command),
                None => self.on_timer(Instant::now()),
            }
        }
    }

    /// The wall-clock instant of the next due timer, if any
    fn next_deadline(&self, now: Instant) -> Option<Instant> {
        if !self.state.is_running() {
            return None;
        }
        let message_due = self.sequence.get(self.next_pending).map(|message| {
            now + self
                .clock
                .wall_delay_until(message.timestamp_ms as f64, now)
        });
        match (message_due, self.next_param_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, due) => due,
        }
    }

    /// A timer fired: emit everything that is due by the live clock
    fn on_timer(&mut self, now: Instant) {
        if !self.state.is_running() {
            return;
        }

        let virtual_now = self.clock.virtual_now(now);
        while self
            .sequence
            .get(self.next_pending)
            .is_some_and(|m| m.timestamp_ms as f64 <= virtual_now)
        {
            self.emit_next();
        }
        if self.next_pending >= self.sequence.len() {
            self.complete(now);
            return;
        }

        if self.next_param_due.is_some_and(|due| now >= due) {
            let updates = self.simulator.tick(virtual_now as u64);
            trace!(count = updates.len(), "parameter simulator tick");
            for update in updates {
                self.publish(SessionEvent::ParameterUpdate(update));
            }
            self.next_param_due = Some(now + self.param_interval());
        }
    }

    /// Emit (or skip, per the active filter) the next pending message
    fn emit_next(&mut self) {
        let message = self.sequence[self.next_pending].clone();
        self.next_pending += 1;

        if self.filter.matches(&message) {
            trace!(
                step = message.step_order,
                timestamp_ms = message.timestamp_ms,
                layer = %message.layer,
                "emitting message"
            );
            self.stats.on_message_emitted(&message);
            let timestamp_ms = message.timestamp_ms;
            self.publish(SessionEvent::Message(message));
            self.publish(SessionEvent::Progress(ProgressUpdate::new(
                timestamp_ms,
                self.total_ms,
            )));
        } else {
            trace!(step = message.step_order, "message skipped by filter");
            // Skipped messages still drive progress towards 100%
            self.publish(SessionEvent::Progress(ProgressUpdate::new(
                message.timestamp_ms,
                self.total_ms,
            )));
        }
    }

    /// Sequence exhausted: freeze the clock and go terminal
    fn complete(&mut self, now: Instant) {
        self.clock.pause(now);
        self.next_param_due = None;
        self.set_state(SessionState::Completed);
        let stats = self.stats.snapshot();
        info!(total = stats.total_messages, "playback completed");
        self.publish(SessionEvent::Complete(stats));
    }

    fn handle_command(&mut self, command: SessionCommand) {
        let now = Instant::now();
        match command {
            SessionCommand::Start { reply } => {
                let outcome = self.start(now);
                let _ = reply.send(outcome);
            }
            SessionCommand::Pause { reply } => {
                let _ = reply.send(self.pause(now));
            }
            SessionCommand::Resume { reply } => {
                let _ = reply.send(self.resume(now));
            }
            SessionCommand::Stop { reply } => {
                let _ = reply.send(self.stop(now));
            }
            SessionCommand::Reset { reply } => {
                let _ = reply.send(self.reset());
            }
            SessionCommand::SetSpeed { multiplier, reply } => {
                let _ = reply.send(self.set_speed(multiplier, now));
            }
            SessionCommand::JumpToTime { target_ms, reply } => {
                let _ = reply.send(self.jump_to_time(target_ms, now));
            }
            SessionCommand::SetFilter { filter, reply } => {
                self.filter = filter;
                debug!("filter updated");
                let _ = reply.send(ControlOutcome::Applied);
            }
            SessionCommand::Status { reply } => {
                let _ = reply.send(self.status(now));
            }
            SessionCommand::ParameterSnapshot { layer, reply } => {
                let _ = reply.send(self.simulator.snapshot(layer));
            }
            SessionCommand::Subscribe(subscriber) => {
                self.broadcaster.add(subscriber);
            }
            SessionCommand::Shutdown => unreachable!("handled by the run loop"),
        }
    }

    fn start(&mut self, now: Instant) -> ControlOutcome {
        match self.state {
            SessionState::Idle | SessionState::Paused => {
                self.clock.resume(now);
                self.next_param_due = Some(now + self.param_interval());
                self.set_state(SessionState::Running);
                info!(speed = self.clock.speed(), "playback started");
                // A seek may have consumed the whole sequence already;
                // go terminal now instead of waiting for a timer
                if self.next_pending >= self.sequence.len() {
                    self.complete(now);
                }
                ControlOutcome::Applied
            }
            SessionState::Running => ControlOutcome::ignored("already running"),
            SessionState::Stopped | SessionState::Completed => {
                ControlOutcome::ignored("session is terminal; reset first")
            }
        }
    }

    fn pause(&mut self, now: Instant) -> ControlOutcome {
        if !self.state.is_running() {
            return ControlOutcome::ignored(format!("cannot pause while {}", self.state));
        }
        self.clock.pause(now);
        self.next_param_due = None;
        self.set_state(SessionState::Paused);
        debug!(virtual_ms = self.clock.virtual_now(now), "playback paused");
        ControlOutcome::Applied
    }

    fn resume(&mut self, now: Instant) -> ControlOutcome {
        if !self.state.is_paused() {
            return ControlOutcome::ignored(format!("cannot resume while {}", self.state));
        }
        self.clock.resume(now);
        self.next_param_due = Some(now + self.param_interval());
        self.set_state(SessionState::Running);
        debug!("playback resumed");
        if self.next_pending >= self.sequence.len() {
            self.complete(now);
        }
        ControlOutcome::Applied
    }

    fn stop(&mut self, now: Instant) -> ControlOutcome {
        if self.state.is_terminal() {
            return ControlOutcome::ignored(format!("already {}", self.state));
        }
        self.clock.pause(now);
        self.next_param_due = None;
        self.set_state(SessionState::Stopped);
        info!("playback stopped");
        ControlOutcome::Applied
    }

    fn reset(&mut self) -> ControlOutcome {
        if self.state == SessionState::Idle && self.next_pending == 0 {
            return ControlOutcome::ignored("already idle");
        }
        self.clock.reset();
        self.next_pending = 0;
        self.next_param_due = None;
        self.filter = MessageFilter::match_all();
        self.stats.on_reset();
        self.simulator.reset();
        self.set_state(SessionState::Idle);
        info!("session reset");
        ControlOutcome::Applied
    }

    fn set_speed(&mut self, multiplier: f64, now: Instant) -> ControlOutcome {
        if self.state.is_terminal() {
            return ControlOutcome::ignored(format!("cannot change speed while {}", self.state));
        }
        let clamped = multiplier.min(self.max_speed);
        if clamped != multiplier {
            warn!(
                requested = multiplier,
                clamped, "speed clamped to configured maximum"
            );
        }
        self.clock.set_speed(clamped, now);
        if self.state.is_running() {
            // Rescale the simulator cadence to the new speed
            self.next_param_due = Some(now + self.param_interval());
        }
        debug!(speed = clamped, "speed updated");
        ControlOutcome::Applied
    }

    fn jump_to_time(&mut self, target_ms: u64, now: Instant) -> ControlOutcome {
        if self.state.is_terminal() {
            return ControlOutcome::ignored(format!("cannot seek while {}", self.state));
        }
        let target_ms = target_ms.min(self.total_ms);
        self.clock.jump_to(target_ms as f64, now);

        // Forward jumps skip (never emit) everything at or before the
        // target. Backward jumps keep the cursor: already-emitted
        // messages are never re-emitted, scheduling resumes forward.
        while self
            .sequence
            .get(self.next_pending)
            .is_some_and(|m| m.timestamp_ms <= target_ms)
        {
            self.next_pending += 1;
        }

        debug!(target_ms, index = self.next_pending, "seek");
        self.publish(SessionEvent::Progress(ProgressUpdate::new(
            target_ms,
            self.total_ms,
        )));
        if self.state.is_running() && self.next_pending >= self.sequence.len() {
            self.complete(now);
        }
        ControlOutcome::Applied
    }

    fn status(&self, now: Instant) -> PlaybackStatus {
        let virtual_time_ms = self.clock.virtual_now(now).max(0.0) as u64;
        PlaybackStatus {
            state: self.state,
            speed_multiplier: self.clock.speed(),
            virtual_time_ms,
            next_pending_index: self.next_pending,
            sequence_length: self.sequence.len(),
            progress: ProgressUpdate::new(virtual_time_ms, self.total_ms),
            stats: self.stats.snapshot(),
            subscribers: self.broadcaster.subscriber_count(),
        }
    }

    fn set_state(&mut self, to: SessionState) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        self.publish(SessionEvent::StateChange { from, to });
    }

    /// Deliver an event; panicking handlers become `Error` events
    fn publish(&mut self, event: SessionEvent) {
        let panicked = self.broadcaster.broadcast(&event);
        for _ in 0..panicked {
            self.stats.on_error();
            // Deliver the error report directly: a handler panicking on
            // its own error report must not recurse
            self.broadcaster.broadcast(&SessionEvent::Error {
                reason: "event handler panicked during delivery".to_string(),
            });
        }
    }

    fn param_interval(&self) -> Duration {
        Duration::from_secs_f64(self.param_cadence_ms as f64 / self.clock.speed() / 1000.0)
    }
}
