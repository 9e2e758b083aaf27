//! Dispatcher - pending pose queue gated by actuator status
//!
//! The queue, the actuator flag and the last audit timestamp live behind one
//! mutex. Outbound channels are unbounded, so emitting a record or a pose
//! never blocks and is done inside the critical section: the log channel
//! sees records in exactly the order the queue was mutated.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use contracts::{ActuatorState, AdmittedItem, AuditRecord, ChannelNames, Pose};

use crate::clock::{Clock, SystemClock};
use crate::error::DispatcherError;
use crate::metrics::{DispatchSnapshot, DispatcherMetrics};

/// Senders for the dequeue and log channels
#[derive(Debug, Clone)]
pub struct Outbound {
    pub dequeue: mpsc::UnboundedSender<Pose>,
    pub log: mpsc::UnboundedSender<AuditRecord>,
}

/// Receiving ends of [`Outbound`]
#[derive(Debug)]
pub struct OutboundReceivers {
    pub dequeue: mpsc::UnboundedReceiver<Pose>,
    pub log: mpsc::UnboundedReceiver<AuditRecord>,
}

/// Create a connected pair of outbound senders and receivers
pub fn outbound_channels() -> (Outbound, OutboundReceivers) {
    let (dequeue_tx, dequeue_rx) = mpsc::unbounded_channel();
    let (log_tx, log_rx) = mpsc::unbounded_channel();
    (
        Outbound {
            dequeue: dequeue_tx,
            log: log_tx,
        },
        OutboundReceivers {
            dequeue: dequeue_rx,
            log: log_rx,
        },
    )
}

/// Result of an admission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Pose appended; `depth` is the queue length afterwards
    Queued { depth: usize },
    /// Item dropped without audit
    Discarded,
}

/// Result of a status report
#[derive(Debug, Clone, PartialEq)]
pub enum StatusOutcome {
    /// Actuator busy, nothing released
    Busy,
    /// Actuator idle but nothing pending
    QueueEmpty,
    /// Head of the queue handed to the actuator
    Released(Pose),
}

#[derive(Debug, Default)]
struct DispatchState {
    pending: VecDeque<Pose>,
    actuator: ActuatorState,
    last_timestamp: i64,
}

impl DispatchState {
    /// Timestamp for the next audit record, never earlier than the previous one
    fn stamp(&mut self, now: i64) -> i64 {
        self.last_timestamp = self.last_timestamp.max(now);
        self.last_timestamp
    }
}

struct Shared {
    channels: ChannelNames,
    state: Mutex<DispatchState>,
    outbound: Outbound,
    clock: Arc<dyn Clock>,
    metrics: DispatcherMetrics,
}

/// Owner of the pending queue and the actuator flag
///
/// Cheap to clone; clones share the same queue.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

impl Dispatcher {
    /// Create a dispatcher using the system clock
    pub fn new(channels: ChannelNames, outbound: Outbound) -> Self {
        Self::with_clock(channels, outbound, Arc::new(SystemClock))
    }

    /// Create a dispatcher with a custom clock
    pub fn with_clock(channels: ChannelNames, outbound: Outbound, clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Shared {
                channels,
                state: Mutex::new(DispatchState::default()),
                outbound,
                clock,
                metrics: DispatcherMetrics::new(),
            }),
        }
    }

    /// Channel names this dispatcher was built with
    pub fn channels(&self) -> &ChannelNames {
        &self.shared.channels
    }

    /// Counter snapshot
    pub fn metrics(&self) -> DispatchSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Number of pending poses
    pub fn queue_len(&self) -> Result<usize, DispatcherError> {
        Ok(self.lock_state()?.pending.len())
    }

    /// Last reported actuator state
    pub fn actuator_state(&self) -> Result<ActuatorState, DispatcherError> {
        Ok(self.lock_state()?.actuator)
    }

    /// Admit a raw transport value from the enqueue channel.
    ///
    /// Values that are neither a pose nor a mapping are dropped.
    #[instrument(name = "dispatcher_admit_value", skip(self, value))]
    pub fn admit_value(&self, value: Value) -> Result<Admission, DispatcherError> {
        match AdmittedItem::classify(value) {
            Some(item) => self.admit(item),
            None => {
                debug!(
                    channel = %self.shared.channels.enqueue,
                    "Unrecognized item shape, dropped"
                );
                self.record_discard("unrecognized");
                Ok(Admission::Discarded)
            }
        }
    }

    /// Admit a pose or raw target.
    ///
    /// Malformed raw targets are logged and dropped; they never surface as
    /// an error. The only error is a poisoned state lock.
    #[instrument(name = "dispatcher_admit", skip(self, item))]
    pub fn admit(&self, item: impl Into<AdmittedItem>) -> Result<Admission, DispatcherError> {
        let item = item.into();
        let channel = &self.shared.channels.enqueue;

        let pose = match &item {
            AdmittedItem::Pose(pose) => *pose,
            AdmittedItem::Raw(raw) => match raw.to_pose() {
                Ok(pose) => pose,
                Err(e) => {
                    warn!(channel = %channel, input = %raw, error = %e, "Invalid pose, dropped");
                    self.record_discard("malformed");
                    return Ok(Admission::Discarded);
                }
            },
        };

        let description = item.to_string();
        let now = self.shared.clock.now_secs();

        let depth = {
            let mut state = self.lock_state()?;
            let timestamp = state.stamp(now);
            self.emit_audit(AuditRecord::new(channel.as_str(), description, timestamp));
            state.pending.push_back(pose);
            // Gauge updates stay under the lock so they land in mutation order
            observability::record_queue_depth(state.pending.len());
            state.pending.len()
        };

        self.shared.metrics.inc_admitted();
        observability::record_pose_admitted(item.kind());
        info!(channel = %channel, kind = item.kind(), depth, "Enqueuing {}", item);

        Ok(Admission::Queued { depth })
    }

    /// Apply a status token and release at most one pose.
    ///
    /// `"FREE"` marks the actuator idle; any other token marks it busy.
    /// Each idle report with poses pending releases exactly one.
    #[instrument(name = "dispatcher_report_status", skip(self))]
    pub fn report_status(&self, token: &str) -> Result<StatusOutcome, DispatcherError> {
        let actuator = ActuatorState::classify(token);
        let now = self.shared.clock.now_secs();

        let (outcome, depth) = {
            let mut state = self.lock_state()?;
            state.actuator = actuator;

            let outcome = match actuator {
                ActuatorState::Busy => StatusOutcome::Busy,
                ActuatorState::Idle => match state.pending.pop_front() {
                    None => StatusOutcome::QueueEmpty,
                    Some(pose) => {
                        let timestamp = state.stamp(now);
                        self.emit_audit(AuditRecord::new(
                            self.shared.channels.dequeue.as_str(),
                            pose.to_string(),
                            timestamp,
                        ));
                        self.emit_release(pose);
                        observability::record_queue_depth(state.pending.len());
                        StatusOutcome::Released(pose)
                    }
                },
            };
            (outcome, state.pending.len())
        };

        observability::record_status_report(actuator);
        match &outcome {
            StatusOutcome::Busy => {
                self.shared.metrics.inc_busy_reports();
                info!(pending = depth, "Actuator is busy, waiting for it to be free");
            }
            StatusOutcome::QueueEmpty => {
                self.shared.metrics.inc_empty_reports();
                info!("Queue is empty, waiting for new poses");
            }
            StatusOutcome::Released(pose) => {
                self.shared.metrics.inc_released();
                observability::record_pose_released();
                info!(
                    channel = %self.shared.channels.dequeue,
                    pending = depth,
                    "Publishing {}", pose
                );
            }
        }

        Ok(outcome)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, DispatchState>, DispatcherError> {
        self.shared
            .state
            .lock()
            .map_err(|_| DispatcherError::invariant("dispatch state lock poisoned"))
    }

    fn emit_audit(&self, record: AuditRecord) {
        if self.shared.outbound.log.send(record).is_err() {
            self.shared.metrics.inc_undelivered();
            warn!(channel = %self.shared.channels.log, "Audit receiver closed, record dropped");
        }
    }

    fn emit_release(&self, pose: Pose) {
        if self.shared.outbound.dequeue.send(pose).is_err() {
            self.shared.metrics.inc_undelivered();
            warn!(channel = %self.shared.channels.dequeue, "Dequeue receiver closed, pose dropped");
        }
    }

    fn record_discard(&self, reason: &'static str) {
        self.shared.metrics.inc_discarded();
        observability::record_pose_discarded(reason);
    }
}

/// Convenience function to create a dispatcher together with its outbound receivers
pub fn create_dispatcher(channels: ChannelNames) -> (Dispatcher, OutboundReceivers) {
    let (outbound, receivers) = outbound_channels();
    (Dispatcher::new(channels, outbound), receivers)
}
