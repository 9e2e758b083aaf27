//! Channel identifiers supplied by the wiring layer

use serde::{Deserialize, Serialize};

/// Names of the four channels around the dispatcher
///
/// The enqueue and dequeue names double as the `source_label` of audit
/// records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelNames {
    /// Inbound poses
    #[serde(default = "default_enqueue")]
    pub enqueue: String,

    /// Inbound actuator status tokens
    #[serde(default = "default_status")]
    pub status: String,

    /// Outbound released poses
    #[serde(default = "default_dequeue")]
    pub dequeue: String,

    /// Outbound audit records
    #[serde(default = "default_log")]
    pub log: String,
}

fn default_enqueue() -> String {
    "enqueue".to_string()
}

fn default_status() -> String {
    "status".to_string()
}

fn default_dequeue() -> String {
    "dequeue".to_string()
}

fn default_log() -> String {
    "log".to_string()
}

impl ChannelNames {
    /// All names paired with their role, in a fixed order
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("enqueue", self.enqueue.as_str()),
            ("status", self.status.as_str()),
            ("dequeue", self.dequeue.as_str()),
            ("log", self.log.as_str()),
        ]
    }
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            enqueue: default_enqueue(),
            status: default_status(),
            dequeue: default_dequeue(),
            log: default_log(),
        }
    }
}
