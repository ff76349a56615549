//! Session-scoped audit log of every externally delegated operation.
//!
//! Each running process owns one session: an ordered, append-only sequence
//! of [`LogEntry`] values, mirrored to a single JSON file that is rewritten
//! in full on every recorded event. The in-memory sequence is authoritative;
//! durable writes are best-effort and never fail the operation being
//! audited.

mod writer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

use writer::SessionWriter;

/// Event-specific payload, tagged by `event_type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    DocumentUpload {
        file_name: String,
        file_size: u64,
        file_type: String,
    },
    TextExtraction {
        char_count: usize,
        word_count: usize,
    },
    AiOperation {
        operation: String,
        model: String,
        input_length: usize,
        output_preview: String,
    },
    Translation {
        source_language: String,
        target_language: String,
        text_length: usize,
    },
    AudioUpload {
        file_name: String,
        file_size: u64,
    },
    Error {
        error_type: String,
        error_message: String,
    },
}

impl EventPayload {
    /// Snake-case tag, matching the serialized `event_type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::DocumentUpload { .. } => "document_upload",
            EventPayload::TextExtraction { .. } => "text_extraction",
            EventPayload::AiOperation { .. } => "ai_operation",
            EventPayload::Translation { .. } => "translation",
            EventPayload::AudioUpload { .. } => "audio_upload",
            EventPayload::Error { .. } => "error",
        }
    }
}

/// One recorded event. The serialized form is the wire contract of the
/// logs endpoint and of the persisted session file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    #[serde(flatten)]
    pub event: EventPayload,
}

/// Cheaply clonable handle to the session audit log.
#[derive(Clone)]
pub struct AuditRecorder {
    inner: Arc<RecorderInner>,
}

struct RecorderInner {
    session_id: String,
    session_file: PathBuf,
    entries: Mutex<Vec<LogEntry>>,
    writer: SessionWriter,
}

impl AuditRecorder {
    /// Start a new session logging into `log_dir`.
    ///
    /// Must be called from within a tokio runtime (the durable writer runs
    /// as a background task).
    pub fn new(log_dir: &Path) -> Self {
        let session_id = Uuid::new_v4().to_string();
        let session_file = log_dir.join(format!("session_{}.json", session_id));

        info!(
            "Audit session {} logging to {:?}",
            session_id, session_file
        );

        Self {
            inner: Arc::new(RecorderInner {
                session_id,
                writer: SessionWriter::spawn(session_file.clone()),
                session_file,
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn session_file(&self) -> &Path {
        &self.inner.session_file
    }

    /// Append one event. Never fails: persistence problems are reported via
    /// `tracing` and the entry is retained in memory regardless.
    pub fn record(&self, event: EventPayload) {
        // Timestamping, appending and snapshotting all happen under the
        // lock: entry timestamps stay non-decreasing in append order, and
        // the writer task receives snapshots in append order.
        let mut entries = match self.inner.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };

        entries.push(LogEntry {
            timestamp: Utc::now(),
            session_id: self.inner.session_id.clone(),
            event,
        });
        self.inner.writer.submit(entries.clone());
    }

    pub fn record_document_upload(&self, file_name: &str, file_size: u64, file_type: &str) {
        self.record(EventPayload::DocumentUpload {
            file_name: file_name.to_string(),
            file_size,
            file_type: file_type.to_string(),
        });
    }

    pub fn record_text_extraction(&self, char_count: usize, word_count: usize) {
        self.record(EventPayload::TextExtraction {
            char_count,
            word_count,
        });
    }

    pub fn record_ai_operation(
        &self,
        operation: &str,
        model: &str,
        input_length: usize,
        output_preview: String,
    ) {
        self.record(EventPayload::AiOperation {
            operation: operation.to_string(),
            model: model.to_string(),
            input_length,
            output_preview,
        });
    }

    pub fn record_translation(
        &self,
        source_language: &str,
        target_language: &str,
        text_length: usize,
    ) {
        self.record(EventPayload::Translation {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            text_length,
        });
    }

    pub fn record_audio_upload(&self, file_name: &str, file_size: u64) {
        self.record(EventPayload::AudioUpload {
            file_name: file_name.to_string(),
            file_size,
        });
    }

    pub fn record_error(&self, error_type: &str, error_message: &str) {
        self.record(EventPayload::Error {
            error_type: error_type.to_string(),
            error_message: error_message.to_string(),
        });
    }

    /// Full ordered sequence recorded so far.
    pub fn all_events(&self) -> Vec<LogEntry> {
        match self.inner.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Serialize the full sequence as one JSON document.
    pub fn export(&self) -> String {
        serde_json::to_string_pretty(&self.all_events())
            .unwrap_or_else(|_| "[]".to_string())
    }
}

/// Compact single-line preview of an operation result for audit entries.
/// Truncated so large model outputs do not bloat the log.
pub fn output_preview(value: &impl Serialize) -> String {
    const MAX_PREVIEW_CHARS: usize = 200;

    let rendered = serde_json::to_string(value).unwrap_or_else(|_| "<unserializable>".to_string());
    if rendered.chars().count() <= MAX_PREVIEW_CHARS {
        return rendered;
    }

    let truncated: String = rendered.chars().take(MAX_PREVIEW_CHARS).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_payload_tagged_serialization() {
        let payload = EventPayload::DocumentUpload {
            file_name: "a.pdf".to_string(),
            file_size: 100,
            file_type: "pdf".to_string(),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["event_type"], "document_upload");
        assert_eq!(value["data"]["file_name"], "a.pdf");
        assert_eq!(value["data"]["file_size"], 100);
    }

    #[test]
    fn test_log_entry_flattens_payload() {
        let entry = LogEntry {
            timestamp: Utc::now(),
            session_id: "abc".to_string(),
            event: EventPayload::TextExtraction {
                char_count: 50,
                word_count: 9,
            },
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["session_id"], "abc");
        assert_eq!(value["event_type"], "text_extraction");
        assert_eq!(value["data"]["char_count"], 50);
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn test_log_entry_deserializes_back() {
        let entry = LogEntry {
            timestamp: Utc::now(),
            session_id: "abc".to_string(),
            event: EventPayload::Error {
                error_type: "translation".to_string(),
                error_message: "upstream unavailable".to_string(),
            },
        };

        let round_tripped: LogEntry =
            serde_json::from_str(&serde_json::to_string(&entry).unwrap()).unwrap();
        assert_eq!(round_tripped, entry);
    }

    #[test]
    fn test_output_preview_truncates_long_values() {
        let long = "x".repeat(500);
        let preview = output_preview(&json!({ "summary": long }));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 203);
    }

    #[test]
    fn test_output_preview_keeps_short_values() {
        let preview = output_preview(&json!({ "ok": true }));
        assert_eq!(preview, "{\"ok\":true}");
    }
}
