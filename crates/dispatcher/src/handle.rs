//! SinkHandle - one audit sink behind its own queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use contracts::{AuditRecord, AuditSink};

use crate::metrics::SinkMetrics;

/// Handle to a running audit sink worker
pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<AuditRecord>,
    metrics: Arc<SinkMetrics>,
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: AuditSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(SinkMetrics::new());

        let worker_handle = tokio::spawn(sink_worker(sink, rx, Arc::clone(&metrics), name.clone()));

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Queue a record for the sink, waiting while its queue is full.
    ///
    /// Returns false only if the worker is gone; the record is then counted
    /// as dropped.
    pub async fn send(&self, record: AuditRecord) -> bool {
        match self.tx.send(record).await {
            Ok(()) => {
                self.metrics
                    .set_queue_len(self.tx.max_capacity() - self.tx.capacity());
                true
            }
            Err(mpsc::error::SendError(r)) => {
                self.metrics.inc_dropped_count();
                error!(
                    sink = %self.name,
                    source = %r.source_label,
                    timestamp = r.timestamp,
                    "Sink worker closed, audit record dropped"
                );
                false
            }
        }
    }

    /// Close the queue and wait for the worker to flush and close the sink
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

#[instrument(name = "sink_worker_loop", skip(sink, rx, metrics), fields(sink = %name))]
async fn sink_worker<S: AuditSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<AuditRecord>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!("Sink worker started");

    while let Some(record) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.write(&record).await {
            Ok(()) => {
                metrics.inc_write_count();
                observability::record_audit_dispatched(&name, true);
            }
            Err(e) => {
                // A failed write costs this record only; keep consuming
                metrics.inc_failure_count();
                observability::record_audit_dispatched(&name, false);
                error!(timestamp = record.timestamp, error = %e, "Write failed");
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(error = %e, "Close failed on shutdown");
    }

    debug!("Sink worker stopped");
}
