//! FileSink - appends audit records to a JSON-lines file

use contracts::{AuditRecord, AuditSink, ContractError};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Target file, created (with parents) if missing and appended to otherwise
    pub path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./audit.jsonl"));

        Self { path }
    }
}

/// Sink that writes one JSON object per audit record
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    writer: BufWriter<File>,
}

impl FileSink {
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        let name = name.into();
        debug!(sink = %name, path = %config.path.display(), "FileSink opened");

        Ok(Self {
            name,
            config,
            writer: BufWriter::new(file),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    fn append(&mut self, record: &AuditRecord) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.writer.write_all(b"\n")
    }
}

impl AuditSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, record: &AuditRecord) -> Result<(), ContractError> {
        self.append(record)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_flush", skip(self), fields(sink = %self.name))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_close", skip(self), fields(sink = %self.name))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await?;
        debug!(path = %self.config.path.display(), "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_sink_writes_json_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/audit.jsonl");
        let params = HashMap::from([("path".to_string(), path.display().to_string())]);

        let mut sink = FileSink::from_params("trail", &params).unwrap();
        sink.write(&AuditRecord::new("enqueue", "a", 10)).await.unwrap();
        sink.write(&AuditRecord::new("dequeue", "a", 11)).await.unwrap();
        sink.close().await.unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let records: Vec<AuditRecord> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_label, "enqueue");
        assert_eq!(records[1].timestamp, 11);
    }

    #[tokio::test]
    async fn test_file_sink_appends() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            path: dir.path().join("audit.jsonl"),
        };

        for i in 0..2 {
            let mut sink = FileSink::new("trail", config.clone()).unwrap();
            sink.write(&AuditRecord::new("enqueue", "x", i)).await.unwrap();
            sink.close().await.unwrap();
        }

        let content = fs::read_to_string(&config.path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_default_path() {
        let config = FileSinkConfig::from_params(&HashMap::new());
        assert_eq!(config.path, PathBuf::from("./audit.jsonl"));
    }
}
