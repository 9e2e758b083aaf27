//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{QueueBlueprint, SinkType};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path: args.config.display().to_string(),
            error: None,
            warnings: collect_warnings(&blueprint),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path: args.config.display().to_string(),
            error: Some(e.to_string()),
            warnings: Vec::new(),
        },
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn collect_warnings(blueprint: &QueueBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.audit_sinks.is_empty() {
        warnings.push("No audit sinks configured, a default log sink will be used".to_string());
    }

    for sink in &blueprint.audit_sinks {
        if sink.sink_type == SinkType::File && !sink.params.contains_key("path") {
            warnings.push(format!(
                "File sink '{}' has no 'path' parameter, writing to ./audit.jsonl",
                sink.name
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("Configuration is valid: {}", result.config_path);
    } else {
        println!("Configuration is INVALID: {}", result.config_path);
    }
    if let Some(error) = &result.error {
        println!("  error: {}", error);
    }
    for warning in &result.warnings {
        println!("  warning: {}", warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SinkConfig;
    use std::collections::HashMap;

    #[test]
    fn test_warnings() {
        assert_eq!(collect_warnings(&QueueBlueprint::default()).len(), 1);

        let mut sink = SinkConfig::file("trail", "a.jsonl");
        sink.params = HashMap::new();
        let blueprint = QueueBlueprint {
            audit_sinks: vec![sink],
            ..Default::default()
        };
        let warnings = collect_warnings(&blueprint);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("trail"));
    }
}
