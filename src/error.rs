//! Error handling for the ProtoPlay-RS engine
//!
//! This module defines custom error types and a Result alias for use
//! throughout the engine.
//!
//! Only initialization-time and control-input validation is fatal to the
//! caller. Steady-state anomalies during playback (a panicking subscriber
//! callback, a disconnected receiver) degrade gracefully: they are logged,
//! surfaced as an `error` event, and playback continues.

use thiserror::Error;

/// Main error type for ProtoPlay-RS operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Bad input: empty/unsorted sequence, non-positive speed multiplier
    #[error("Validation error: {0}")]
    Validation(String),

    /// A control operation referenced a session that does not exist
    #[error("Unknown session: {0}")]
    SessionNotFound(String),

    /// The sequence source has no sequence for the requested test case
    #[error("Test case not found: {0}")]
    TestCaseNotFound(String),

    /// Errors related to channel communication with a session worker
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

/// Result type alias for ProtoPlay-RS operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::validation("sequence is empty");
        assert_eq!(err.to_string(), "Validation error: sequence is empty");
    }

    #[test]
    fn test_error_with_context() {
        let err = EngineError::validation("step order not increasing");
        let with_ctx = err.with_context("Failed to initialize session");
        assert!(with_ctx.to_string().contains("Failed to initialize session"));
    }

    #[test]
    fn test_session_not_found_display() {
        let err = EngineError::SessionNotFound("session-42".to_string());
        assert!(err.to_string().contains("session-42"));
    }
}
