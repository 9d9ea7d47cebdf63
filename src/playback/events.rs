//! Session event taxonomy and fan-out
//!
//! All observers of a playback session receive the same closed set of
//! event types, replacing the ad-hoc parallel broadcast paths of earlier
//! designs with a single typed publish/subscribe surface.
//!
//! Two subscriber flavors are supported:
//!
//! - **Channel subscribers** receive cloned events over an unbounded
//!   crossbeam channel. Disconnected receivers are pruned silently.
//! - **Callback handlers** are invoked inline on the session worker
//!   thread. A panicking handler is caught, reported as an [`SessionEvent::Error`],
//!   and playback continues; one bad consumer never stalls a run.

use crate::simulator::ParameterUpdate;
use crate::stats::RunStatistics;
use crate::types::{MessageDefinition, ProgressUpdate, SessionState};
use crossbeam_channel::{unbounded, Receiver, Sender, TrySendError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

/// Callback handler invoked for every session event
pub type EventHandler = Box<dyn Fn(&SessionEvent) + Send + 'static>;

/// Event emitted by a playback session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A message definition being emitted in sequence order
    Message(MessageDefinition),
    /// A layer parameter changed
    ParameterUpdate(ParameterUpdate),
    /// Playback progress advanced
    Progress(ProgressUpdate),
    /// The session transitioned between lifecycle states
    StateChange {
        /// Previous state
        from: SessionState,
        /// New state
        to: SessionState,
    },
    /// The sequence is exhausted; carries the final run statistics
    Complete(RunStatistics),
    /// A non-fatal error occurred during playback
    Error {
        /// Human-readable failure description
        reason: String,
    },
}

/// Subscriber registration sent to a session worker
pub enum EventSubscriber {
    /// Deliver events over a channel
    Channel(Sender<SessionEvent>),
    /// Invoke a callback per event
    Handler(EventHandler),
}

/// Fans session events out to all registered subscribers
pub struct EventBroadcaster {
    channels: Vec<Sender<SessionEvent>>,
    handlers: Vec<EventHandler>,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroadcaster {
    /// Create a broadcaster with no subscribers
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Register a subscriber
    pub fn add(&mut self, subscriber: EventSubscriber) {
        match subscriber {
            EventSubscriber::Channel(sender) => self.channels.push(sender),
            EventSubscriber::Handler(handler) => self.handlers.push(handler),
        }
    }

    /// Create, register, and return a channel subscription
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (sender, receiver) = unbounded();
        self.channels.push(sender);
        receiver
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.channels.len() + self.handlers.len()
    }

    /// Deliver an event to every subscriber
    ///
    /// Returns the number of callback handlers that panicked; the caller
    /// decides whether to surface those as `Error` events (it must not do
    /// so recursively).
    pub fn broadcast(&mut self, event: &SessionEvent) -> usize {
        self.channels.retain(|sender| {
            match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Disconnected(_)) => false,
                // Unbounded channels never report Full; keep the subscriber
                Err(TrySendError::Full(_)) => true,
            }
        });

        let mut panicked = 0;
        for handler in &self.handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                warn!("event handler panicked; isolating and continuing playback");
                panicked += 1;
            }
        }
        panicked
    }
}

impl std::fmt::Debug for EventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBroadcaster")
            .field("channels", &self.channels.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn progress_event() -> SessionEvent {
        SessionEvent::Progress(ProgressUpdate::new(500, 1000))
    }

    #[test]
    fn test_channel_subscriber_receives_events() {
        let mut broadcaster = EventBroadcaster::new();
        let receiver = broadcaster.subscribe();
        broadcaster.broadcast(&progress_event());
        assert!(matches!(
            receiver.try_recv().unwrap(),
            SessionEvent::Progress(p) if p.percent == 50.0
        ));
    }

    #[test]
    fn test_disconnected_channel_is_pruned() {
        let mut broadcaster = EventBroadcaster::new();
        let receiver = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);
        drop(receiver);
        broadcaster.broadcast(&progress_event());
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn test_handler_invoked_per_event() {
        let mut broadcaster = EventBroadcaster::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        broadcaster.add(EventSubscriber::Handler(Box::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        })));
        broadcaster.broadcast(&progress_event());
        broadcaster.broadcast(&progress_event());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let mut broadcaster = EventBroadcaster::new();
        let receiver = broadcaster.subscribe();
        broadcaster.add(EventSubscriber::Handler(Box::new(|_| {
            panic!("bad consumer");
        })));

        let panicked = broadcaster.broadcast(&progress_event());
        assert_eq!(panicked, 1);
        // The channel subscriber still received the event
        assert!(receiver.try_recv().is_ok());
    }
}
