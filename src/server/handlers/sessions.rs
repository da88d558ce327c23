use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = state.rag.create_session();
    Ok(Json(json!({ "session_id": session_id })))
}

pub async fn clear_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.rag.clear_session(&session_id) {
        return Err(ApiError::NotFound(format!(
            "session not found: {}",
            session_id
        )));
    }
    Ok(Json(json!({ "success": true })))
}
