//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use crossbeam_channel::Receiver;
use protoplay_rs::config::EngineConfig;
use protoplay_rs::loader::InMemorySource;
use protoplay_rs::registry::{PlaybackEngine, SessionId};
use protoplay_rs::stats::RunStatistics;
use protoplay_rs::types::MessageDefinition;
use protoplay_rs::SessionEvent;
use std::time::{Duration, Instant};

/// Timeout generous enough for CI schedulers but short enough to fail fast
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Engine with a single in-memory test case named "tc" and one idle session
pub fn engine_with(messages: Vec<MessageDefinition>) -> (PlaybackEngine, SessionId) {
    engine_with_config(messages, EngineConfig::default())
}

/// Same as [`engine_with`] but with an explicit engine configuration
pub fn engine_with_config(
    messages: Vec<MessageDefinition>,
    config: EngineConfig,
) -> (PlaybackEngine, SessionId) {
    let source = InMemorySource::new().with_sequence("tc", messages);
    let engine = PlaybackEngine::new(Box::new(source), config).expect("engine config is valid");
    let session = engine.initialize("tc").expect("test case loads");
    (engine, session)
}

/// Drain events until `Complete` arrives, returning emitted messages and
/// the final statistics
///
/// Panics if the run does not complete within [`test_timeout`].
pub fn run_to_completion(
    events: &Receiver<SessionEvent>,
) -> (Vec<MessageDefinition>, RunStatistics) {
    let deadline = Instant::now() + test_timeout();
    let mut messages = Vec::new();
    loop {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .expect("playback did not complete before the test timeout");
        match events.recv_timeout(remaining) {
            Ok(SessionEvent::Message(msg)) => messages.push(msg),
            Ok(SessionEvent::Complete(stats)) => return (messages, stats),
            Ok(_) => {}
            Err(e) => panic!("event stream ended before completion: {e}"),
        }
    }
}

/// Receive events until the next `Message`, skipping everything else
pub fn next_message(events: &Receiver<SessionEvent>) -> MessageDefinition {
    let deadline = Instant::now() + test_timeout();
    loop {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .expect("no message arrived before the test timeout");
        match events.recv_timeout(remaining) {
            Ok(SessionEvent::Message(msg)) => return msg,
            Ok(_) => {}
            Err(e) => panic!("event stream ended while waiting for a message: {e}"),
        }
    }
}
