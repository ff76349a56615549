//! Document upload endpoint.

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::document;
use axum::extract::{Multipart, State};
use axum::{response::Json, routing::post, Router};
use serde_json::{json, Value};
use tracing::info;

pub fn router() -> Router<AppState> {
    Router::new().route("/upload", post(upload_document))
}

/// POST /api/upload - Extract text from an uploaded document.
///
/// Expects a multipart form with a `file` field. Returns the extracted
/// text plus character/word counts, or a 400 naming the unsupported
/// extension or decoding problem.
async fn upload_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let (file_name, bytes) = read_file_field(multipart).await?;

    info!("Received document upload: {} ({} bytes)", file_name, bytes.len());

    let extracted = match document::process(&bytes, &file_name) {
        Ok(extracted) => extracted,
        Err(err) => {
            state.audit.record_error("document_upload", &err.to_string());
            return Err(err.into());
        }
    };

    state
        .audit
        .record_document_upload(&extracted.file_name, bytes.len() as u64, &extracted.file_type);
    state
        .audit
        .record_text_extraction(extracted.char_count, extracted.word_count);

    Ok(Json(json!({
        "success": true,
        "data": extracted
    })))
}

/// Pull the `file` field (name + bytes) out of a multipart request.
pub(super) async fn read_file_field(mut multipart: Multipart) -> ApiResult<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("Invalid multipart request: {}", err)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("Uploaded file has no file name"))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::bad_request(format!("Failed to read upload: {}", err)))?;

        if bytes.is_empty() {
            return Err(ApiError::bad_request("Uploaded file is empty"));
        }

        return Ok((file_name, bytes.to_vec()));
    }

    Err(ApiError::bad_request("Missing 'file' upload field"))
}
