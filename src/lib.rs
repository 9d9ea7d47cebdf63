//! # ProtoPlay-RS: Protocol Test-Case Playback Engine
//!
//! A real-time playback and simulation engine for recorded protocol
//! message sequences (RRC, NAS, MAC and friends). Each test case is a
//! timestamped message sequence; a session replays it against a virtual
//! clock with pause/resume, variable speed, seeking and filtering, while
//! a seeded random-walk simulator produces evolving per-layer metrics
//! alongside the replay.
//!
//! ## Architecture
//!
//! - **Loader**: Reads and validates message sequences through the
//!   [`loader::SequenceSource`] trait (JSON directories, in-memory fixtures)
//! - **Playback**: One worker thread per session drives a virtual clock
//!   and emits messages on armed timers, never by polling
//! - **Simulator**: Seeded random-walk generator for layer parameters
//!   with trend and criticality classification
//! - **Registry**: [`registry::PlaybackEngine`] owns the sessions and is
//!   the thread-safe control surface
//! - **Communication**: Crossbeam channels for commands and event fan-out
//!
//! ## Example
//!
//! ```ignore
//! use protoplay_rs::{
//!     config::EngineConfig,
//!     loader::JsonDirectorySource,
//!     playback::SessionEvent,
//!     registry::PlaybackEngine,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let source = JsonDirectorySource::new("test_cases");
//!     let engine = PlaybackEngine::new(Box::new(source), EngineConfig::default())?;
//!
//!     let session = engine.initialize("attach-procedure")?;
//!     let events = engine.subscribe(session)?;
//!     engine.start(session)?;
//!
//!     for event in events {
//!         match event {
//!             SessionEvent::Message(msg) => println!("{}: {}", msg.layer, msg.message_name),
//!             SessionEvent::Complete(stats) => {
//!                 println!("done, {} messages", stats.total_messages);
//!                 break;
//!             }
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod playback;
pub mod registry;
pub mod simulator;
pub mod stats;
pub mod types;

pub use error::{EngineError, Result};
pub use playback::{ControlOutcome, PlaybackStatus, SessionEvent};
pub use registry::{PlaybackEngine, SessionId};
pub use types::{
    Direction, Layer, MessageDefinition, MessageFilter, ProgressUpdate, SessionState,
    ValidationStatus,
};
