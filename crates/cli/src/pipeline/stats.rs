//! Run statistics.

use std::time::Duration;

use dispatcher::{DispatchSnapshot, FanoutReport};

/// Statistics from a `run` invocation
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Input lines read, including skipped ones
    pub lines_read: u64,

    /// Lines that could not be routed
    pub lines_skipped: u64,

    /// Dispatcher counters at end of input
    pub dispatch: DispatchSnapshot,

    /// Released poses written to stdout
    pub poses_written: u64,

    /// Audit fan-out totals
    pub audit: FanoutReport,

    /// Total duration of the run
    pub duration: Duration,

    /// Input was cut short by a shutdown signal
    pub interrupted: bool,
}

impl PipelineStats {
    /// Print a summary to stderr, keeping stdout for released poses
    pub fn print_summary(&self) {
        eprintln!("\n=== Pose Queue Summary ===");
        eprintln!("Duration: {:.2}s", self.duration.as_secs_f64());
        if self.interrupted {
            eprintln!("Stopped by shutdown signal");
        }
        eprintln!(
            "Input lines: {} ({} skipped)",
            self.lines_read, self.lines_skipped
        );
        eprintln!("Admitted: {}", self.dispatch.admitted);
        eprintln!("Discarded: {}", self.dispatch.discarded);
        eprintln!("Released: {}", self.dispatch.released);
        eprintln!("Still pending: {}", self.dispatch.pending());
        eprintln!("Poses written to stdout: {}", self.poses_written);
        eprintln!(
            "Status reports: {} busy, {} on empty queue",
            self.dispatch.busy_reports, self.dispatch.empty_reports
        );
        if self.dispatch.undelivered > 0 {
            eprintln!("Undelivered outbound items: {}", self.dispatch.undelivered);
        }

        eprintln!("Audit records: {}", self.audit.records);
        for (name, sink) in &self.audit.sinks {
            eprintln!(
                "  {}: written={}, failed={}, dropped={}",
                name, sink.write_count, sink.failure_count, sink.dropped_count
            );
        }
    }
}
