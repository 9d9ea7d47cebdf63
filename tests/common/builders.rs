//! Test data builders for message sequences

use protoplay_rs::types::{
    Direction, Layer, MessageDefinition, ValidationStatus,
};

/// Builder for one test message
pub struct MessageBuilder {
    step_order: u32,
    timestamp_ms: u64,
    layer: Layer,
    direction: Direction,
    message_type: String,
    validation_status: ValidationStatus,
}

impl MessageBuilder {
    pub fn new(step_order: u32, timestamp_ms: u64) -> Self {
        Self {
            step_order,
            timestamp_ms,
            layer: Layer::Rrc,
            direction: Direction::Uplink,
            message_type: "RRCSetupRequest".to_string(),
            validation_status: ValidationStatus::Valid,
        }
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn message_type(mut self, message_type: &str) -> Self {
        self.message_type = message_type.to_string();
        self
    }

    pub fn invalid(mut self) -> Self {
        self.validation_status = ValidationStatus::Invalid;
        self
    }

    pub fn build(self) -> MessageDefinition {
        MessageDefinition {
            step_order: self.step_order,
            timestamp_ms: self.timestamp_ms,
            layer: self.layer,
            direction: self.direction,
            protocol: "5G-NR".to_string(),
            message_type: self.message_type.clone(),
            message_name: format!("{} (step {})", self.message_type, self.step_order),
            payload: serde_json::json!({ "step": self.step_order }),
            information_elements: None,
            layer_parameters: None,
            validation_status: self.validation_status,
        }
    }
}

/// A sequence of `count` RRC messages spaced `gap_ms` apart, starting at 0
pub fn evenly_spaced(count: u32, gap_ms: u64) -> Vec<MessageDefinition> {
    (0..count)
        .map(|i| MessageBuilder::new(i + 1, u64::from(i) * gap_ms).build())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builder() {
        let msg = MessageBuilder::new(3, 250)
            .layer(Layer::Nas)
            .direction(Direction::Downlink)
            .message_type("AttachAccept")
            .build();

        assert_eq!(msg.step_order, 3);
        assert_eq!(msg.timestamp_ms, 250);
        assert_eq!(msg.layer, Layer::Nas);
        assert_eq!(msg.message_type, "AttachAccept");
    }

    #[test]
    fn test_evenly_spaced_timestamps() {
        let seq = evenly_spaced(4, 100);
        let timestamps: Vec<u64> = seq.iter().map(|m| m.timestamp_ms).collect();
        assert_eq!(timestamps, vec![0, 100, 200, 300]);
    }
}
