//! QueueBlueprint - Config Loader output
//!
//! Describes how the dispatcher is wired: channel names and audit sinks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ChannelNames;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pose queue configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Channel identifiers
    #[serde(default)]
    pub channels: ChannelNames,

    /// Consumers of the audit channel
    #[serde(default)]
    pub audit_sinks: Vec<SinkConfig>,
}

impl QueueBlueprint {
    /// Audit sinks to build, falling back to a single log sink
    pub fn effective_sinks(&self) -> Vec<SinkConfig> {
        if self.audit_sinks.is_empty() {
            vec![SinkConfig::log("audit_log")]
        } else {
            self.audit_sinks.clone()
        }
    }
}

/// Audit sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl SinkConfig {
    /// Log sink with default capacity
    pub fn log(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink_type: SinkType::Log,
            queue_capacity: default_queue_capacity(),
            params: HashMap::new(),
        }
    }

    /// JSON-lines file sink writing to `path`
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink_type: SinkType::File,
            queue_capacity: default_queue_capacity(),
            params: HashMap::from([("path".to_string(), path.into())]),
        }
    }
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Structured tracing output
    Log,
    /// JSON-lines file
    File,
}
