//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the pose queue.
//! Business crates may only depend on this crate, never on each other in reverse.
//!
//! ## Time Model
//! - Audit timestamps are wall-clock UNIX seconds (`i64`)
//! - Queue order is arrival order; no timestamp is attached to a queued pose

mod audit;
mod blueprint;
mod channels;
mod error;
mod pose;
mod sink;
mod status;
mod target;

pub use audit::AuditRecord;
pub use blueprint::*;
pub use channels::ChannelNames;
pub use error::*;
pub use pose::{Point, Pose, Quaternion};
pub use sink::{AuditSink, LocalAuditSink};
pub use status::{ActuatorState, FREE_TOKEN};
pub use target::{AdmittedItem, RawTarget};
