//! Configuration validation
//!
//! Rules:
//! - channel names non-empty
//! - channel names pairwise distinct
//! - audit sink names non-empty and unique
//! - queue_capacity > 0

use std::collections::HashSet;

use contracts::{ContractError, QueueBlueprint};

/// Validate a QueueBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &QueueBlueprint) -> Result<(), ContractError> {
    validate_channels(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_channels(blueprint: &QueueBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (role, name) in blueprint.channels.entries() {
        if name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("channels.{role}"),
                "channel name cannot be empty",
            ));
        }
        if !seen.insert(name) {
            return Err(ContractError::config_validation(
                format!("channels.{role}"),
                format!("duplicate channel name '{name}'"),
            ));
        }
    }
    Ok(())
}

fn validate_sinks(blueprint: &QueueBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.audit_sinks.iter().enumerate() {
        if sink.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("audit_sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("audit_sinks[{idx}].name"),
                format!("duplicate sink name '{}'", sink.name),
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("audit_sinks[{idx}].queue_capacity"),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}
