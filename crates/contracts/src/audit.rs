//! AuditRecord - one entry of the admission/release trail

use std::fmt;

use serde::{Deserialize, Serialize};

/// Immutable audit entry published on the log channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Name of the channel the event happened on (enqueue or dequeue)
    pub source_label: String,

    /// Human-readable rendering of the admitted or released item
    pub description: String,

    /// UNIX time in seconds
    pub timestamp: i64,
}

impl AuditRecord {
    /// Create a new record
    pub fn new(
        source_label: impl Into<String>,
        description: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            source_label: source_label.into(),
            description: description.into(),
            timestamp,
        }
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp, self.source_label, self.description
        )
    }
}
