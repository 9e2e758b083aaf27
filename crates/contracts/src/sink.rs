//! AuditSink trait - consumers of the outbound log channel

use crate::{AuditRecord, ContractError};

/// Audit output trait
///
/// All audit sink implementations must implement this trait.
#[trait_variant::make(AuditSink: Send)]
pub trait LocalAuditSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one audit record
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, record: &AuditRecord) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
