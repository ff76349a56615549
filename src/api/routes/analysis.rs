//! AI-backed analysis endpoints: analyze, translate, simplify.

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::audit::output_preview;
use axum::extract::State;
use axum::{response::Json, routing::post, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    /// Whether to also run rights detection (default: true).
    #[serde(default = "default_detect_rights")]
    pub detect_rights: bool,
}

fn default_detect_rights() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target_language: String,
}

#[derive(Debug, Deserialize)]
pub struct SimplifyRequest {
    pub text: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze_document))
        .route("/translate", post(translate_text))
        .route("/simplify", post(simplify_text))
}

/// POST /api/analyze - Segment a document, simplify each section, and
/// optionally detect rights.
async fn analyze_document(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<Value>> {
    let text = non_empty(&request.text)?;
    let model = state.analyzer.model_id().to_string();

    info!("Analyzing document: {} chars", text.chars().count());

    let segmented = state.analyzer.segment(text).await;
    state.audit.record_ai_operation(
        "segmentation",
        &model,
        text.chars().count(),
        output_preview(&segmented),
    );

    let mut simplified_sections = Map::new();
    for section in &segmented.sections {
        let simplified = state.analyzer.simplify(&section.body).await;
        state.audit.record_ai_operation(
            "simplification",
            &model,
            section.body.chars().count(),
            output_preview(&simplified),
        );

        simplified_sections.insert(
            section.heading.clone(),
            serde_json::to_value(&simplified)
                .map_err(|err| ApiError::internal(err.to_string()))?,
        );
    }

    let detected_rights = if request.detect_rights {
        let rights = state.analyzer.detect_rights(text).await;
        state.audit.record_ai_operation(
            "rights_detection",
            &model,
            text.chars().count(),
            output_preview(&rights),
        );
        rights
    } else {
        Vec::new()
    };

    Ok(Json(json!({
        "success": true,
        "data": {
            "segmented_doc": segmented,
            "simplified_sections": simplified_sections,
            "detected_rights": detected_rights,
        }
    })))
}

/// POST /api/translate - Translate text to a target language.
///
/// Translation has no fallback: upstream failure is surfaced as a server
/// error with the cause message.
async fn translate_text(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> ApiResult<Json<Value>> {
    let text = non_empty(&request.text)?;
    if request.target_language.trim().is_empty() {
        return Err(ApiError::bad_request("No target language provided"));
    }

    match state
        .analyzer
        .translate(text, &request.target_language)
        .await
    {
        Ok(translation) => {
            state.audit.record_translation(
                "English",
                &request.target_language,
                text.chars().count(),
            );

            Ok(Json(json!({
                "success": true,
                "data": {
                    "translation": translation,
                    "target_language": request.target_language,
                }
            })))
        }
        Err(err) => {
            error!("Translation failed: {:#}", err);
            state.audit.record_error("translation", &err.to_string());
            Err(ApiError::internal(format!("Translation failed: {}", err)))
        }
    }
}

/// POST /api/simplify - Plain-language summary of a piece of text.
async fn simplify_text(
    State(state): State<AppState>,
    Json(request): Json<SimplifyRequest>,
) -> ApiResult<Json<Value>> {
    let text = non_empty(&request.text)?;
    let model = state.analyzer.model_id().to_string();

    let simplified = state.analyzer.simplify(text).await;
    state.audit.record_ai_operation(
        "simplification",
        &model,
        text.chars().count(),
        output_preview(&simplified),
    );

    Ok(Json(json!({
        "success": true,
        "data": simplified
    })))
}

fn non_empty(text: &str) -> ApiResult<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request("No text provided"));
    }
    Ok(text)
}
