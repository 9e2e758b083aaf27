//! JSON-lines event format read by `run`.
//!
//! Each line is `{"channel": "<name>", "payload": <json>}` where `<name>` is
//! the configured enqueue or status channel.

use contracts::ChannelNames;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Event addressed to one of the inbound channels
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Pose or raw target for the enqueue channel
    Enqueue(Value),
    /// Status token for the status channel
    Status(String),
}

/// Reasons an input line is skipped
#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown channel '{0}'")]
    UnknownChannel(String),

    #[error("channel '{0}' is outbound and cannot receive events")]
    Outbound(String),

    #[error("status payload must be a string, got {0}")]
    StatusNotString(Value),
}

#[derive(Deserialize)]
struct RawEvent {
    channel: String,
    #[serde(default)]
    payload: Value,
}

impl InboundEvent {
    /// Parse one line and route it by channel name
    pub fn parse(line: &str, channels: &ChannelNames) -> Result<Self, InputError> {
        let RawEvent { channel, payload } = serde_json::from_str(line)?;

        if channel == channels.enqueue {
            Ok(Self::Enqueue(payload))
        } else if channel == channels.status {
            match payload {
                Value::String(token) => Ok(Self::Status(token)),
                other => Err(InputError::StatusNotString(other)),
            }
        } else if channel == channels.dequeue || channel == channels.log {
            Err(InputError::Outbound(channel))
        } else {
            Err(InputError::UnknownChannel(channel))
        }
    }
}
