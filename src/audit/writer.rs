//! Durable persistence for the session audit log.
//!
//! A single writer task owns the session file. Callers hand it full-sequence
//! snapshots over an unbounded channel, so recording never blocks on disk
//! I/O and concurrent appends cannot interleave partial writes. Each write
//! replaces the whole file, which makes retries idempotent: the latest
//! snapshot always supersedes anything a failed write left behind.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::warn;

use super::LogEntry;

pub(super) struct SessionWriter {
    tx: mpsc::UnboundedSender<Vec<LogEntry>>,
}

impl SessionWriter {
    pub(super) fn spawn(session_file: PathBuf) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<LogEntry>>();

        tokio::spawn(async move {
            while let Some(snapshot) = rx.recv().await {
                // Under a burst of events only the newest snapshot matters;
                // skip straight to it instead of rewriting the file per event.
                let mut latest = snapshot;
                while let Ok(newer) = rx.try_recv() {
                    latest = newer;
                }

                if let Err(err) = write_snapshot(&session_file, &latest).await {
                    warn!(
                        "Failed to persist audit log to {:?}: {:#}",
                        session_file, err
                    );
                }
            }
        });

        Self { tx }
    }

    /// Hand a snapshot to the writer task. Best-effort: if the task is gone
    /// the entry is still retained in memory by the recorder.
    pub(super) fn submit(&self, snapshot: Vec<LogEntry>) {
        if self.tx.send(snapshot).is_err() {
            warn!("Audit writer task stopped; events retained in memory only");
        }
    }
}

async fn write_snapshot(session_file: &Path, entries: &[LogEntry]) -> Result<()> {
    if let Some(parent) = session_file.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .context("Failed to create audit log directory")?;
    }

    let json =
        serde_json::to_string_pretty(entries).context("Failed to serialize audit log")?;

    tokio::fs::write(session_file, json)
        .await
        .context("Failed to write session file")?;

    Ok(())
}
