//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::QueueBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    channels: ChannelInfo,
    audit_sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct ChannelInfo {
    enqueue: String,
    status: String,
    dequeue: String,
    log: String,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&build_info(&blueprint))
            .context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        let toml = config_loader::ConfigLoader::to_toml(&blueprint)
            .context("Failed to render configuration")?;
        println!("# {}", args.config.display());
        println!("{}", toml);
    }

    Ok(())
}

fn build_info(blueprint: &QueueBlueprint) -> ConfigInfo {
    let channels = &blueprint.channels;
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        channels: ChannelInfo {
            enqueue: channels.enqueue.clone(),
            status: channels.status.clone(),
            dequeue: channels.dequeue.clone(),
            log: channels.log.clone(),
        },
        audit_sinks: blueprint
            .effective_sinks()
            .into_iter()
            .map(|sink| SinkInfo {
                path: sink.params.get("path").cloned(),
                sink_type: format!("{:?}", sink.sink_type).to_lowercase(),
                queue_capacity: sink.queue_capacity,
                name: sink.name,
            })
            .collect(),
    }
}
