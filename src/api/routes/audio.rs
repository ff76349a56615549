//! Courtroom audio upload endpoint.

use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::documents::read_file_field;
use crate::api::AppState;
use crate::audit::output_preview;
use axum::extract::{Multipart, State};
use axum::{response::Json, routing::post, Router};
use serde_json::{json, Value};
use tracing::{error, info};

pub fn router() -> Router<AppState> {
    Router::new().route("/audio", post(upload_audio))
}

/// POST /api/audio - Transcribe uploaded courtroom audio and summarize it.
///
/// The upload is spooled to a temp file for the transcription provider;
/// the temp file is removed when the handler returns, on every path.
async fn upload_audio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let (file_name, bytes) = read_file_field(multipart).await?;

    info!("Received audio upload: {} ({} bytes)", file_name, bytes.len());
    state.audit.record_audio_upload(&file_name, bytes.len() as u64);

    let suffix = file_name
        .rsplit('.')
        .next()
        .filter(|ext| !ext.eq_ignore_ascii_case(&file_name))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| ".audio".to_string());

    let temp_file = tempfile::Builder::new()
        .prefix("lexplain_audio_")
        .suffix(&suffix)
        .tempfile()
        .map_err(|err| ApiError::internal(format!("Failed to spool upload: {}", err)))?;

    tokio::fs::write(temp_file.path(), &bytes)
        .await
        .map_err(|err| ApiError::internal(format!("Failed to spool upload: {}", err)))?;

    let transcript = match state.transcriber.transcribe(temp_file.path()).await {
        Ok(transcript) => transcript,
        Err(err) => {
            error!("Transcription failed: {:#}", err);
            state.audit.record_error("transcription", &err.to_string());
            return Err(ApiError::internal(format!("Transcription failed: {}", err)));
        }
    };

    let model = state.analyzer.model_id().to_string();
    let summary = match state.analyzer.summarize_transcript(&transcript).await {
        Ok(summary) => summary,
        Err(err) => {
            error!("Transcript summarization failed: {:#}", err);
            state.audit.record_error("summarization", &err.to_string());
            return Err(ApiError::internal(format!(
                "Transcript summarization failed: {}",
                err
            )));
        }
    };

    state.audit.record_ai_operation(
        "summarization",
        &model,
        transcript.chars().count(),
        output_preview(&summary),
    );

    Ok(Json(json!({
        "success": true,
        "data": {
            "transcript": transcript,
            "summary": summary,
        }
    })))
}
