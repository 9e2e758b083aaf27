//! Pipeline orchestrator - reads events, drives the dispatcher, drains outputs.
//!
//! Events are applied in input order on a single task, so a scripted input
//! file replays deterministically. Cancelling the shutdown token stops the
//! read loop; outputs are then drained exactly as at end of input.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{Pose, QueueBlueprint};
use dispatcher::{create_audit_fanout, create_dispatcher};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{InboundEvent, PipelineStats};

/// Where events are read from
#[derive(Debug, Clone)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl From<PathBuf> for InputSource {
    fn from(path: PathBuf) -> Self {
        if path.as_os_str() == "-" {
            Self::Stdin
        } else {
            Self::File(path)
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub blueprint: QueueBlueprint,
    pub input: InputSource,
    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Released pose as written to stdout
#[derive(Serialize)]
struct OutboundEvent<'a> {
    channel: &'a str,
    payload: &'a Pose,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
    shutdown: CancellationToken,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Stop reading input once `token` is cancelled
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Run until input EOF or shutdown, writing released poses to stdout
    pub async fn run(self) -> Result<PipelineStats> {
        let (stats, _) = self.run_with_output(tokio::io::stdout()).await?;
        Ok(stats)
    }

    /// Run until input EOF or shutdown, writing released poses to `output`
    pub async fn run_with_output<W>(self, output: W) -> Result<(PipelineStats, W)>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let reader = open_input(&self.config.input).await?;
        self.run_with_io(reader, output).await
    }

    /// Run over an already opened input
    pub async fn run_with_io<R, W>(self, reader: R, output: W) -> Result<(PipelineStats, W)>
    where
        R: AsyncBufRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let start_time = Instant::now();
        let blueprint = self.config.blueprint;
        let channels = blueprint.channels.clone();

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
        }

        let (dispatcher, outbound) = create_dispatcher(channels.clone());
        let fanout = create_audit_fanout(&blueprint.effective_sinks(), outbound.log)
            .context("Failed to create audit sinks")?
            .spawn();
        let writer = tokio::spawn(write_releases(
            outbound.dequeue,
            channels.dequeue.clone(),
            output,
        ));

        let mut lines = reader.lines();
        let mut stats = PipelineStats::default();

        info!(
            enqueue = %channels.enqueue,
            status = %channels.status,
            "Reading events"
        );

        loop {
            // Input that is already available is consumed before shutdown
            let next = tokio::select! {
                biased;
                next = lines.next_line() => next.context("Failed to read input")?,
                _ = self.shutdown.cancelled() => {
                    info!(lines_read = stats.lines_read, "Shutdown requested, stopping input");
                    stats.interrupted = true;
                    break;
                }
            };
            let Some(line) = next else { break };
            stats.lines_read += 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match InboundEvent::parse(line, &channels) {
                Ok(InboundEvent::Enqueue(value)) => {
                    dispatcher.admit_value(value)?;
                }
                Ok(InboundEvent::Status(token)) => {
                    dispatcher.report_status(&token)?;
                }
                Err(e) => {
                    stats.lines_skipped += 1;
                    warn!(line = stats.lines_read, error = %e, "Skipping input line");
                }
            }
        }

        debug!("Input closed, draining outbound channels");
        stats.dispatch = dispatcher.metrics();
        drop(dispatcher);

        let (poses_written, output) = writer.await.context("Release writer panicked")??;
        stats.poses_written = poses_written;
        stats.audit = fanout.await.context("Audit fan-out panicked")?;
        stats.duration = start_time.elapsed();

        Ok((stats, output))
    }
}

async fn open_input(source: &InputSource) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    match source {
        InputSource::Stdin => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
        InputSource::File(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Drain the dequeue channel, one JSON line per released pose
async fn write_releases<W>(
    mut rx: mpsc::UnboundedReceiver<Pose>,
    channel: String,
    mut output: W,
) -> Result<(u64, W)>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(pose) = rx.recv().await {
        let mut line = serde_json::to_vec(&OutboundEvent {
            channel: &channel,
            payload: &pose,
        })?;
        line.push(b'\n');
        output.write_all(&line).await?;
        output.flush().await?;
        written += 1;
    }
    Ok((written, output))
}
