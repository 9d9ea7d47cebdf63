//! Sequence loading for the playback engine
//!
//! The engine consumes pre-recorded message sequences through the
//! [`SequenceSource`] trait. Two implementations are provided:
//!
//! - [`JsonDirectorySource`] - loads `<dir>/<test_case_id>.json` files
//! - [`InMemorySource`] - serves sequences registered in memory, used by
//!   tests and the demo binary
//!
//! Sequences must arrive pre-sorted: [`validate_sequence`] rejects empty
//! sequences, non-increasing `step_order`, and decreasing timestamps. The
//! engine runs this check at session initialization and fails with a
//! validation error before any session state is created.

use crate::error::{EngineError, Result};
use crate::types::MessageDefinition;
use std::collections::HashMap;
use std::path::PathBuf;

/// Source of pre-recorded message sequences, keyed by test-case id
#[cfg_attr(test, mockall::automock)]
pub trait SequenceSource: Send + Sync {
    /// Load the ordered message sequence for a test case.
    ///
    /// Returns [`EngineError::TestCaseNotFound`] when the id is unknown.
    /// The returned sequence is expected to be sorted; callers validate
    /// with [`validate_sequence`] before use.
    fn load_sequence(&self, test_case_id: &str) -> Result<Vec<MessageDefinition>>;
}

/// Validate a loaded sequence before a session is created
///
/// Checks that the sequence is non-empty, that `step_order` is strictly
/// increasing, and that timestamps never decrease.
pub fn validate_sequence(sequence: &[MessageDefinition]) -> Result<()> {
    if sequence.is_empty() {
        return Err(EngineError::validation("sequence is empty"));
    }
    for pair in sequence.windows(2) {
        if pair[1].step_order <= pair[0].step_order {
            return Err(EngineError::validation(format!(
                "step_order not strictly increasing at step {}",
                pair[1].step_order
            )));
        }
        if pair[1].timestamp_ms < pair[0].timestamp_ms {
            return Err(EngineError::validation(format!(
                "timestamp decreases at step {} ({}ms -> {}ms)",
                pair[1].step_order, pair[0].timestamp_ms, pair[1].timestamp_ms
            )));
        }
    }
    Ok(())
}

/// Sequence source backed by a directory of JSON files
///
/// Each test case lives in its own file named `<test_case_id>.json`,
/// containing a JSON array of message definitions.
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    root: PathBuf,
}

impl JsonDirectorySource {
    /// Create a source rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the JSON file backing a test case
    pub fn path_for(&self, test_case_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", test_case_id))
    }
}

impl SequenceSource for JsonDirectorySource {
    fn load_sequence(&self, test_case_id: &str) -> Result<Vec<MessageDefinition>> {
        let path = self.path_for(test_case_id);
        if !path.exists() {
            return Err(EngineError::TestCaseNotFound(test_case_id.to_string()));
        }
        let json = std::fs::read_to_string(&path)?;
        let sequence: Vec<MessageDefinition> = serde_json::from_str(&json)?;
        Ok(sequence)
    }
}

/// Sequence source serving sequences registered in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    sequences: HashMap<String, Vec<MessageDefinition>>,
}

impl InMemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sequence under a test-case id
    pub fn insert(&mut self, test_case_id: impl Into<String>, sequence: Vec<MessageDefinition>) {
        self.sequences.insert(test_case_id.into(), sequence);
    }

    /// Builder-style registration
    pub fn with_sequence(
        mut self,
        test_case_id: impl Into<String>,
        sequence: Vec<MessageDefinition>,
    ) -> Self {
        self.insert(test_case_id, sequence);
        self
    }
}

impl SequenceSource for InMemorySource {
    fn load_sequence(&self, test_case_id: &str) -> Result<Vec<MessageDefinition>> {
        self.sequences
            .get(test_case_id)
            .cloned()
            .ok_or_else(|| EngineError::TestCaseNotFound(test_case_id.to_string()))
    }
}
