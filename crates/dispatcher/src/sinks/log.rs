//! LogSink - writes audit records as structured tracing events

use contracts::{AuditRecord, AuditSink, ContractError};
use tracing::{info, instrument};

/// Sink that logs every audit record
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl AuditSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, record: &AuditRecord) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            source = %record.source_label,
            timestamp = record.timestamp,
            description = %record.description,
            "Audit record"
        );
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
