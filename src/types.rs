//! Core data types for ProtoPlay-RS
//!
//! This module contains the fundamental data structures used throughout
//! the engine for representing protocol messages, playback state, and
//! message filters.
//!
//! # Main Types
//!
//! - [`Layer`] - Protocol stack layer (PHY, MAC, RLC, PDCP, RRC, NAS, IMS)
//! - [`Direction`] - Message direction (uplink, downlink, bidirectional)
//! - [`MessageDefinition`] - One pre-recorded protocol message with timing
//! - [`SessionState`] - Lifecycle state of a playback session
//! - [`MessageFilter`] - Structured predicate applied during scheduling
//! - [`ProgressUpdate`] - Elapsed/total/percent progress payload
//!
//! # Timing
//!
//! All message timestamps are milliseconds relative to the start of the
//! sequence. Wall-clock time never appears in the data model; the mapping
//! between the two is owned by the playback scheduler's virtual clock.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A protocol stack layer tracked by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Layer {
    /// Physical layer
    Phy,
    /// Medium access control
    Mac,
    /// Radio link control
    Rlc,
    /// Packet data convergence protocol
    Pdcp,
    /// Radio resource control
    Rrc,
    /// Non-access stratum
    Nas,
    /// IP multimedia subsystem signalling
    Ims,
}

impl Layer {
    /// All layers, in stack order
    pub const ALL: [Layer; 7] = [
        Layer::Phy,
        Layer::Mac,
        Layer::Rlc,
        Layer::Pdcp,
        Layer::Rrc,
        Layer::Nas,
        Layer::Ims,
    ];

    /// Uppercase display name (matches the wire/serde form)
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Phy => "PHY",
            Layer::Mac => "MAC",
            Layer::Rlc => "RLC",
            Layer::Pdcp => "PDCP",
            Layer::Rrc => "RRC",
            Layer::Nas => "NAS",
            Layer::Ims => "IMS",
        }
    }

    /// Parse from an uppercase layer name
    pub fn parse(s: &str) -> Option<Layer> {
        match s {
            "PHY" => Some(Layer::Phy),
            "MAC" => Some(Layer::Mac),
            "RLC" => Some(Layer::Rlc),
            "PDCP" => Some(Layer::Pdcp),
            "RRC" => Some(Layer::Rrc),
            "NAS" => Some(Layer::Nas),
            "IMS" => Some(Layer::Ims),
            _ => None,
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Layer::parse(&s.to_ascii_uppercase()).ok_or_else(|| format!("unknown layer '{s}'"))
    }
}

/// Direction of a protocol message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Uplink (device to network)
    #[serde(rename = "UL")]
    Uplink,
    /// Downlink (network to device)
    #[serde(rename = "DL")]
    Downlink,
    /// Both directions
    #[serde(rename = "BIDIRECTIONAL")]
    Bidirectional,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Uplink => write!(f, "UL"),
            Direction::Downlink => write!(f, "DL"),
            Direction::Bidirectional => write!(f, "BIDIRECTIONAL"),
        }
    }
}

/// Validation verdict attached to a recorded message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// Message passed validation
    #[default]
    Valid,
    /// Message failed validation; counts towards the error statistics
    Invalid,
    /// Message passed with warnings
    Warning,
}

/// One pre-recorded protocol message in a test-case sequence
///
/// Immutable once loaded. `step_order` is unique and strictly ascending
/// within a sequence; `timestamp_ms` is relative to sequence start. The
/// payload and information elements are opaque to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDefinition {
    /// Position in the sequence (strictly increasing)
    pub step_order: u32,
    /// Milliseconds since sequence start
    pub timestamp_ms: u64,
    /// Protocol stack layer
    pub layer: Layer,
    /// Message direction
    pub direction: Direction,
    /// Protocol name (e.g. "5G-NR", "LTE")
    pub protocol: String,
    /// Message type identifier (e.g. "RRCSetupRequest")
    pub message_type: String,
    /// Human-readable message name
    pub message_name: String,
    /// Opaque decoded payload
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Optional information elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_elements: Option<serde_json::Value>,
    /// Optional per-message layer parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_parameters: Option<serde_json::Value>,
    /// Validation verdict recorded with the message
    #[serde(default)]
    pub validation_status: ValidationStatus,
}

/// Lifecycle state of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionState {
    /// Session created, playback not started
    #[default]
    Idle,
    /// Actively emitting messages
    Running,
    /// Playback suspended, virtual clock frozen
    Paused,
    /// Stopped by the caller (terminal)
    Stopped,
    /// Sequence exhausted (terminal)
    Completed,
}

impl SessionState {
    /// Check if the session is actively playing
    pub fn is_running(&self) -> bool {
        matches!(self, SessionState::Running)
    }

    /// Check if the session is paused
    pub fn is_paused(&self) -> bool {
        matches!(self, SessionState::Paused)
    }

    /// Check if the state is terminal (only `reset` leaves it)
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Stopped | SessionState::Completed)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Running => "Running",
            SessionState::Paused => "Paused",
            SessionState::Stopped => "Stopped",
            SessionState::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Structured filter applied to messages during scheduling
///
/// Messages failing the filter are skipped: they still advance the
/// pending index and virtual time, but no `message` event is emitted for
/// them. An empty filter matches everything.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageFilter {
    /// Only emit messages on these layers (None = all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<HashSet<Layer>>,
    /// Only emit messages with these directions (None = all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directions: Option<HashSet<Direction>>,
    /// Only emit messages with these message types (None = all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_types: Option<HashSet<String>>,
    /// Only emit messages inside this inclusive time range (None = all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range_ms: Option<(u64, u64)>,
}

impl MessageFilter {
    /// Filter that matches every message
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Restrict to a single layer
    pub fn for_layer(layer: Layer) -> Self {
        Self::for_layers(&[layer])
    }

    /// Restrict to a set of layers
    pub fn for_layers(layers: &[Layer]) -> Self {
        Self {
            layers: Some(layers.iter().copied().collect()),
            ..Self::default()
        }
    }

    /// Check whether a message passes the filter
    pub fn matches(&self, message: &MessageDefinition) -> bool {
        if let Some(ref layers) = self.layers {
            if !layers.contains(&message.layer) {
                return false;
            }
        }
        if let Some(ref directions) = self.directions {
            if !directions.contains(&message.direction) {
                return false;
            }
        }
        if let Some(ref types) = self.message_types {
            if !types.contains(&message.message_type) {
                return false;
            }
        }
        if let Some((start, end)) = self.time_range_ms {
            if message.timestamp_ms < start || message.timestamp_ms > end {
                return false;
            }
        }
        true
    }
}

/// Playback progress payload
///
/// Progress is derived from message timestamps, not from emitted-message
/// counts, so filtered runs still reach 100% at sequence end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Virtual milliseconds elapsed since sequence start
    pub elapsed_ms: u64,
    /// Total sequence duration in milliseconds
    pub total_ms: u64,
    /// Percent complete in `[0, 100]`
    pub percent: f64,
}

impl ProgressUpdate {
    /// Compute progress from elapsed virtual time and total duration
    pub fn new(elapsed_ms: u64, total_ms: u64) -> Self {
        let elapsed_ms = elapsed_ms.min(total_ms);
        let percent = if total_ms == 0 {
            100.0
        } else {
            (elapsed_ms as f64 / total_ms as f64) * 100.0
        };
        Self {
            elapsed_ms,
            total_ms,
            percent,
        }
    }
}
