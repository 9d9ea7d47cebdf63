//! Virtual-clock playback of recorded message sequences
//!
//! A session replays a validated message sequence against a per-session
//! virtual clock that supports pause/resume, speed changes, and seeking
//! without drift. Emission is timer-driven: the worker arms exactly one
//! deadline for the next pending message and sleeps until it fires or a
//! control command arrives.

pub mod clock;
pub mod events;
pub mod scheduler;
pub mod session;

pub use clock::VirtualClock;
pub use events::{EventBroadcaster, EventHandler, EventSubscriber, SessionEvent};
pub use scheduler::{ControlOutcome, PlaybackStatus};
pub use session::SessionHandle;
