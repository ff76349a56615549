//! Offline inspection of persisted session audit logs.

use crate::audit::LogEntry;
use crate::cli::LogsCliArgs;
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub fn handle_logs_command(args: LogsCliArgs) -> Result<()> {
    let log_dir = Config::load()?.audit.resolve_log_dir()?;

    let session_file = match &args.session {
        Some(id) => log_dir.join(format!("session_{}.json", id)),
        None => newest_session_file(&log_dir)?,
    };

    let content = std::fs::read_to_string(&session_file)
        .with_context(|| format!("Failed to read session file {:?}", session_file))?;

    let entries: Vec<LogEntry> =
        serde_json::from_str(&content).context("Failed to parse session file")?;

    let start = entries.len().saturating_sub(args.limit);
    for entry in &entries[start..] {
        println!(
            "{}  {:<18} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.event.kind(),
            serde_json::to_string(&entry.event).unwrap_or_default()
        );
    }

    println!(
        "\n{} of {} entries from {:?}",
        entries.len().min(args.limit),
        entries.len(),
        session_file
    );

    Ok(())
}

fn newest_session_file(log_dir: &Path) -> Result<PathBuf> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    let entries = std::fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read audit log directory {:?}", log_dir))?;

    for entry in entries.flatten() {
        let path = entry.path();
        let is_session = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with("session_") && name.ends_with(".json"))
            .unwrap_or(false);

        if !is_session {
            continue;
        }

        let modified = entry.metadata().and_then(|meta| meta.modified())?;
        if newest.as_ref().map(|(time, _)| modified > *time).unwrap_or(true) {
            newest = Some((modified, path));
        }
    }

    newest
        .map(|(_, path)| path)
        .ok_or_else(|| anyhow!("No session logs found in {:?}", log_dir))
}
