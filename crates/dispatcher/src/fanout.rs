//! AuditFanout - drains the log channel into every configured audit sink

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{AuditRecord, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::{SinkMetrics, SinkSnapshot};
use crate::sinks::{FileSink, LogSink};

/// Final per-sink counters returned when the fan-out stops
#[derive(Debug, Clone, Default)]
pub struct FanoutReport {
    /// Records read from the log channel
    pub records: u64,
    /// Sink name and its counters after shutdown
    pub sinks: Vec<(String, SinkSnapshot)>,
}

/// Build a SinkHandle from configuration
#[instrument(
    name = "audit_fanout_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => Ok(SinkHandle::spawn(
            LogSink::new(&config.name),
            config.queue_capacity,
        )),
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Fans audit records out to isolated sink workers
pub struct AuditFanout {
    handles: Vec<SinkHandle>,
    log_rx: mpsc::UnboundedReceiver<AuditRecord>,
}

impl AuditFanout {
    /// Create a fan-out over ready-made handles (for testing)
    pub fn with_handles(
        handles: Vec<SinkHandle>,
        log_rx: mpsc::UnboundedReceiver<AuditRecord>,
    ) -> Self {
        Self { handles, log_rx }
    }

    /// Current counters for all sinks
    pub fn metrics(&self) -> Vec<(String, SinkSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Forward records until the log channel closes, then shut the sinks down
    #[instrument(name = "audit_fanout_run", skip(self))]
    pub async fn run(mut self) -> FanoutReport {
        info!(sinks = self.handles.len(), "Audit fan-out started");

        let mut records: u64 = 0;
        while let Some(record) = self.log_rx.recv().await {
            records += 1;
            // A full sink queue holds the fan-out back; the log channel is
            // unbounded, so records wait there instead of being lost
            for handle in &self.handles {
                handle.send(record.clone()).await;
            }

            if records % 100 == 0 {
                debug!(records, "Audit fan-out progress");
            }
        }

        info!(records, "Log channel closed, shutting down audit sinks");

        let metrics: Vec<(String, Arc<SinkMetrics>)> = self
            .handles
            .iter()
            .map(|h| (h.name().to_string(), Arc::clone(h.metrics())))
            .collect();
        for handle in self.handles {
            handle.shutdown().await;
        }

        FanoutReport {
            records,
            sinks: metrics
                .into_iter()
                .map(|(name, m)| (name, m.snapshot()))
                .collect(),
        }
    }

    /// Spawn the fan-out as a background task
    pub fn spawn(self) -> JoinHandle<FanoutReport> {
        tokio::spawn(self.run())
    }
}

/// Convenience function to create a fan-out from sink configs
#[instrument(name = "audit_fanout_create", skip(sink_configs, log_rx))]
pub fn create_audit_fanout(
    sink_configs: &[SinkConfig],
    log_rx: mpsc::UnboundedReceiver<AuditRecord>,
) -> Result<AuditFanout, DispatcherError> {
    let handles = sink_configs
        .iter()
        .map(create_sink_handle)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AuditFanout::with_handles(handles, log_rx))
}
