//! # Dispatcher
//!
//! Pose queue gated by actuator status.
//!
//! Responsibilities:
//! - Admit poses and raw targets from the enqueue channel
//! - Release one pose per idle status report, in arrival order
//! - Emit an audit record for every admission and release
//! - Fan audit records out to isolated sinks

pub mod clock;
pub mod dispatcher;
pub mod error;
pub mod fanout;
pub mod handle;
pub mod metrics;
pub mod router;
pub mod sinks;

pub use clock::{Clock, ManualClock, SystemClock};
pub use contracts::{AuditRecord, AuditSink, Pose};
pub use dispatcher::{
    create_dispatcher, outbound_channels, Admission, Dispatcher, Outbound, OutboundReceivers,
    StatusOutcome,
};
pub use error::DispatcherError;
pub use fanout::{create_audit_fanout, AuditFanout, FanoutReport};
pub use handle::SinkHandle;
pub use metrics::{DispatchSnapshot, DispatcherMetrics, SinkMetrics, SinkSnapshot};
pub use router::{Router, RouterHandle, RouterStats};
pub use sinks::{FileSink, FileSinkConfig, LogSink};
