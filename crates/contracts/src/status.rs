//! Actuator availability as reported on the status channel

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status token meaning the actuator can take the next pose
pub const FREE_TOKEN: &str = "FREE";

/// Two-valued actuator availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorState {
    /// Ready for the next pose
    #[default]
    Idle,
    /// Working on a pose
    Busy,
}

impl ActuatorState {
    /// Classify a status token.
    ///
    /// Only the exact token `"FREE"` means idle. Anything else, including
    /// unknown or differently cased tokens, is treated as busy.
    pub fn classify(token: &str) -> Self {
        if token == FREE_TOKEN {
            Self::Idle
        } else {
            Self::Busy
        }
    }

    /// Label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Busy => "busy",
        }
    }
}

impl fmt::Display for ActuatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
