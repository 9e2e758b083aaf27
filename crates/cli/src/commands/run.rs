//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::QueueBlueprint;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let blueprint = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration given, using default channel names");
            QueueBlueprint::default()
        }
    };

    info!(
        enqueue = %blueprint.channels.enqueue,
        status = %blueprint.channels.status,
        dequeue = %blueprint.channels.dequeue,
        log = %blueprint.channels.log,
        audit_sinks = blueprint.effective_sinks().len(),
        "Configuration loaded"
    );

    let shutdown = CancellationToken::new();
    let signal_task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            warn!("Received shutdown signal, draining audit sinks; pending poses are discarded");
            shutdown.cancel();
        })
    };

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        input: args.input.clone().into(),
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    })
    .with_shutdown(shutdown);

    // Runs to completion on shutdown too, so queued audit records reach the sinks
    let result = pipeline.run().await;
    signal_task.abort();

    let stats = result.context("Pipeline execution failed")?;
    info!(
        admitted = stats.dispatch.admitted,
        released = stats.dispatch.released,
        pending = stats.dispatch.pending(),
        interrupted = stats.interrupted,
        duration_secs = stats.duration.as_secs_f64(),
        "Input closed"
    );
    stats.print_summary();

    info!("Pose queue finished");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
