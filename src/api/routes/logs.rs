//! Audit log endpoint.

use crate::api::error::ApiResult;
use crate::api::AppState;
use axum::extract::State;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};

pub fn router() -> Router<AppState> {
    Router::new().route("/logs", get(get_logs))
}

/// GET /api/logs - Full ordered audit log for the current session.
async fn get_logs(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let logs = state.audit.all_events();

    Ok(Json(json!({
        "success": true,
        "data": {
            "session_id": state.audit.session_id(),
            "count": logs.len(),
            "logs": logs,
        }
    })))
}
