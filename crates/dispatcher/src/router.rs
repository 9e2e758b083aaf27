//! Router - feeds the inbound channels into a shared Dispatcher
//!
//! One task per inbound channel, so admissions and status reports run
//! concurrently; the dispatcher's lock keeps them consistent.

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::dispatcher::{Admission, Dispatcher, StatusOutcome};
use crate::error::DispatcherError;

/// Per-channel totals gathered by the router tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    /// Items appended to the queue
    pub admitted: u64,
    /// Items dropped on admission
    pub discarded: u64,
    /// Status tokens processed
    pub reports: u64,
    /// Poses released to the actuator
    pub released: u64,
}

impl RouterStats {
    fn merge(self, other: Self) -> Self {
        Self {
            admitted: self.admitted + other.admitted,
            discarded: self.discarded + other.discarded,
            reports: self.reports + other.reports,
            released: self.released + other.released,
        }
    }
}

/// Wires inbound receivers to a dispatcher
pub struct Router {
    dispatcher: Dispatcher,
}

impl Router {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Spawn one task for the enqueue channel and one for the status channel
    pub fn spawn(
        self,
        enqueue_rx: mpsc::Receiver<Value>,
        status_rx: mpsc::Receiver<String>,
    ) -> RouterHandle {
        info!(
            enqueue = %self.dispatcher.channels().enqueue,
            status = %self.dispatcher.channels().status,
            "Router started"
        );

        let admission = tokio::spawn(admission_loop(self.dispatcher.clone(), enqueue_rx));
        let status = tokio::spawn(status_loop(self.dispatcher, status_rx));

        RouterHandle { admission, status }
    }
}

/// Handle to the running router tasks
pub struct RouterHandle {
    admission: JoinHandle<Result<RouterStats, DispatcherError>>,
    status: JoinHandle<Result<RouterStats, DispatcherError>>,
}

impl RouterHandle {
    /// Wait until both inbound channels are closed.
    ///
    /// # Errors
    /// The first fatal dispatcher error, or a panicked router task.
    pub async fn join(self) -> Result<RouterStats, DispatcherError> {
        let admission = flatten(self.admission.await);
        let status = flatten(self.status.await);

        let stats = admission?.merge(status?);
        info!(
            admitted = stats.admitted,
            discarded = stats.discarded,
            reports = stats.reports,
            released = stats.released,
            "Router stopped"
        );
        Ok(stats)
    }
}

fn flatten(
    joined: Result<Result<RouterStats, DispatcherError>, tokio::task::JoinError>,
) -> Result<RouterStats, DispatcherError> {
    joined.map_err(|e| DispatcherError::invariant(format!("router task failed: {e}")))?
}

#[instrument(name = "router_admission_loop", skip_all)]
async fn admission_loop(
    dispatcher: Dispatcher,
    mut rx: mpsc::Receiver<Value>,
) -> Result<RouterStats, DispatcherError> {
    let mut stats = RouterStats::default();

    while let Some(value) = rx.recv().await {
        match dispatcher.admit_value(value) {
            Ok(Admission::Queued { .. }) => stats.admitted += 1,
            Ok(Admission::Discarded) => stats.discarded += 1,
            Err(e) if e.is_fatal() => {
                error!(error = %e, "Admission failed, stopping enqueue loop");
                return Err(e);
            }
            Err(e) => {
                stats.discarded += 1;
                warn!(error = %e, "Admission failed, item dropped");
            }
        }
    }

    debug!(admitted = stats.admitted, "Enqueue channel closed");
    Ok(stats)
}

#[instrument(name = "router_status_loop", skip_all)]
async fn status_loop(
    dispatcher: Dispatcher,
    mut rx: mpsc::Receiver<String>,
) -> Result<RouterStats, DispatcherError> {
    let mut stats = RouterStats::default();

    while let Some(token) = rx.recv().await {
        stats.reports += 1;
        match dispatcher.report_status(&token) {
            Ok(StatusOutcome::Released(_)) => stats.released += 1,
            Ok(StatusOutcome::Busy | StatusOutcome::QueueEmpty) => {}
            Err(e) if e.is_fatal() => {
                error!(error = %e, "Status handling failed, stopping status loop");
                return Err(e);
            }
            Err(e) => warn!(error = %e, "Status report failed"),
        }
    }

    debug!(reports = stats.reports, "Status channel closed");
    Ok(stats)
}
