//! Event loop around the dispatcher.

mod input;
mod orchestrator;
mod stats;

pub use input::InboundEvent;
pub use orchestrator::{Pipeline, PipelineConfig};
pub use stats::PipelineStats;
