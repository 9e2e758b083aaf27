//! Errors shared across the pose queue crates
//!
//! Grouped by where they originate: configuration, inbound items, audit sinks.

use thiserror::Error;

/// Contract-level error
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration =====
    /// Blueprint text could not be parsed or serialized
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Blueprint parsed but breaks a constraint
    #[error("invalid config field '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Inbound items =====
    /// Raw target is missing a coordinate or carries a non-numeric one
    #[error("malformed target field '{field}': {message}")]
    MalformedInput { field: String, message: String },

    // ===== Audit sinks =====
    #[error("audit sink '{sink_name}' failed to write: {message}")]
    SinkWrite { sink_name: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Error for a bad coordinate named by `field`
    pub fn malformed_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
