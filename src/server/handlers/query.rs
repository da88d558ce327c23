use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::rag::QueryFilters;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub session_id: Option<String>,
    /// Optional course name; partial names are resolved against the catalog.
    pub course: Option<String>,
    pub lesson: Option<u32>,
}

pub async fn query_documents(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.question.trim().is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".into()));
    }

    let session_id = payload
        .session_id
        .unwrap_or_else(|| state.rag.create_session());

    let filters = QueryFilters {
        course: payload.course,
        lesson: payload.lesson,
    };

    let outcome = state
        .rag
        .query(&payload.question, &session_id, &filters)
        .await?;

    Ok(Json(json!({
        "answer": outcome.answer,
        "sources": outcome.sources,
        "session_id": session_id,
    })))
}
