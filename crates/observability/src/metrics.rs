//! Pose queue metrics
//!
//! Thin wrappers over the `metrics` facade. Without an installed recorder
//! every call is a no-op.

use contracts::ActuatorState;
use metrics::{counter, gauge};

/// Record an accepted pose
pub fn record_pose_admitted(kind: &'static str) {
    counter!("pose_queue_admitted_total", "kind" => kind).increment(1);
}

/// Record an item dropped on admission
pub fn record_pose_discarded(reason: &'static str) {
    counter!("pose_queue_discarded_total", "reason" => reason).increment(1);
}

/// Record a pose handed to the actuator
pub fn record_pose_released() {
    counter!("pose_queue_released_total").increment(1);
}

/// Record a status report after classification
pub fn record_status_report(state: ActuatorState) {
    counter!("pose_queue_status_reports_total", "state" => state.as_str()).increment(1);
}

/// Record the number of pending poses
pub fn record_queue_depth(depth: usize) {
    gauge!("pose_queue_depth").set(depth as f64);
}

/// Record an audit record fanned out to a sink
pub fn record_audit_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "pose_queue_audit_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_pose_admitted("pose");
        record_pose_discarded("malformed");
        record_pose_released();
        record_status_report(ActuatorState::Busy);
        record_queue_depth(3);
        record_audit_dispatched("audit_log", true);
    }
}
