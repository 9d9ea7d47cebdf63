//! Run statistics aggregation
//!
//! The aggregator consumes emitted messages and maintains incremental
//! counters only: every update is O(1), and snapshots are derived from the
//! counters rather than by rescanning history. A snapshot handed to a
//! caller is always a copy, never a live reference into session state.

use crate::types::{Direction, Layer, MessageDefinition, ValidationStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Penalty subtracted from the compliance score per recorded error
const COMPLIANCE_PENALTY_PER_ERROR: f64 = 2.0;

/// Immutable statistics snapshot for one playback run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunStatistics {
    /// Total messages emitted so far
    pub total_messages: u64,
    /// Emitted message count per layer
    pub per_layer_counts: HashMap<Layer, u64>,
    /// Emitted message count per direction
    pub per_direction_counts: HashMap<Direction, u64>,
    /// Errors observed (invalid messages plus emission failures)
    pub error_count: u64,
    /// `(total - errors) / total * 100`, or 0 when nothing was emitted
    pub success_rate_percent: f64,
    /// `100 - penalty * errors`, floored at 0
    pub compliance_score: f64,
    /// Emitted messages per elapsed virtual second
    pub messages_per_second: f64,
}

/// Incremental statistics aggregator for one session
#[derive(Debug, Clone, Default)]
pub struct StatisticsAggregator {
    total_messages: u64,
    per_layer_counts: HashMap<Layer, u64>,
    per_direction_counts: HashMap<Direction, u64>,
    error_count: u64,
    first_emission_ms: Option<u64>,
    last_emission_ms: u64,
}

impl StatisticsAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one emitted message (O(1))
    pub fn on_message_emitted(&mut self, message: &MessageDefinition) {
        self.total_messages += 1;
        *self.per_layer_counts.entry(message.layer).or_insert(0) += 1;
        *self
            .per_direction_counts
            .entry(message.direction)
            .or_insert(0) += 1;
        if message.validation_status == ValidationStatus::Invalid {
            self.error_count += 1;
        }
        if self.first_emission_ms.is_none() {
            self.first_emission_ms = Some(message.timestamp_ms);
        }
        self.last_emission_ms = message.timestamp_ms;
    }

    /// Record a non-fatal runtime error (e.g. a failing subscriber)
    pub fn on_error(&mut self) {
        self.error_count += 1;
    }

    /// Clear all counters
    pub fn on_reset(&mut self) {
        *self = Self::default();
    }

    /// Total messages emitted so far
    pub fn total_messages(&self) -> u64 {
        self.total_messages
    }

    /// Derive an immutable snapshot from the counters
    pub fn snapshot(&self) -> RunStatistics {
        let success_rate_percent = if self.total_messages == 0 {
            0.0
        } else {
            let successes = self.total_messages.saturating_sub(self.error_count);
            (successes as f64 / self.total_messages as f64) * 100.0
        };
        let compliance_score =
            (100.0 - COMPLIANCE_PENALTY_PER_ERROR * self.error_count as f64).max(0.0);

        let elapsed_ms = match self.first_emission_ms {
            Some(first) => self.last_emission_ms.saturating_sub(first),
            None => 0,
        };
        let messages_per_second = if elapsed_ms == 0 {
            0.0
        } else {
            self.total_messages as f64 / (elapsed_ms as f64 / 1000.0)
        };

        RunStatistics {
            total_messages: self.total_messages,
            per_layer_counts: self.per_layer_counts.clone(),
            per_direction_counts: self.per_direction_counts.clone(),
            error_count: self.error_count,
            success_rate_percent,
            compliance_score,
            messages_per_second,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(layer: Layer, direction: Direction, timestamp_ms: u64) -> MessageDefinition {
        MessageDefinition {
            step_order: 1,
            timestamp_ms,
            layer,
            direction,
            protocol: "5G-NR".to_string(),
            message_type: "RRCSetupRequest".to_string(),
            message_name: "RRC Setup Request".to_string(),
            payload: serde_json::Value::Null,
            information_elements: None,
            layer_parameters: None,
            validation_status: ValidationStatus::Valid,
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = StatisticsAggregator::new();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_messages, 0);
        assert_eq!(snapshot.success_rate_percent, 0.0);
        assert_eq!(snapshot.compliance_score, 100.0);
    }

    #[test]
    fn test_counters_accumulate() {
        let mut stats = StatisticsAggregator::new();
        stats.on_message_emitted(&message(Layer::Rrc, Direction::Uplink, 0));
        stats.on_message_emitted(&message(Layer::Rrc, Direction::Downlink, 100));
        stats.on_message_emitted(&message(Layer::Mac, Direction::Uplink, 200));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_messages, 3);
        assert_eq!(snapshot.per_layer_counts[&Layer::Rrc], 2);
        assert_eq!(snapshot.per_layer_counts[&Layer::Mac], 1);
        assert_eq!(snapshot.per_direction_counts[&Direction::Uplink], 2);
        assert_eq!(snapshot.success_rate_percent, 100.0);
    }

    #[test]
    fn test_invalid_messages_count_as_errors() {
        let mut stats = StatisticsAggregator::new();
        let mut bad = message(Layer::Nas, Direction::Uplink, 0);
        bad.validation_status = ValidationStatus::Invalid;
        stats.on_message_emitted(&bad);
        stats.on_message_emitted(&message(Layer::Nas, Direction::Uplink, 100));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.error_count, 1);
        assert_eq!(snapshot.success_rate_percent, 50.0);
        assert_eq!(snapshot.compliance_score, 98.0);
    }

    #[test]
    fn test_messages_per_second_uses_virtual_time() {
        let mut stats = StatisticsAggregator::new();
        stats.on_message_emitted(&message(Layer::Phy, Direction::Downlink, 0));
        stats.on_message_emitted(&message(Layer::Phy, Direction::Downlink, 1000));
        stats.on_message_emitted(&message(Layer::Phy, Direction::Downlink, 2000));
        let snapshot = stats.snapshot();
        assert!((snapshot.messages_per_second - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut stats = StatisticsAggregator::new();
        stats.on_message_emitted(&message(Layer::Rrc, Direction::Uplink, 0));
        stats.on_error();
        stats.on_reset();
        assert_eq!(stats.snapshot(), RunStatistics::default());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut stats = StatisticsAggregator::new();
        stats.on_message_emitted(&message(Layer::Rrc, Direction::Uplink, 0));
        let before = stats.snapshot();
        stats.on_message_emitted(&message(Layer::Rrc, Direction::Uplink, 100));
        assert_eq!(before.total_messages, 1);
        assert_eq!(stats.snapshot().total_messages, 2);
    }
}
