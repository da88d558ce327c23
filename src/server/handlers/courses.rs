use std::path::Path;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn get_course_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let analytics = state.rag.analytics().await?;
    Ok(Json(json!({
        "total_courses": analytics.total_courses,
        "course_titles": analytics.course_titles,
    })))
}

/// Accepts a multipart upload (field `file`), stores the document in the
/// docs directory, and ingests it.
pub async fn add_course(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .and_then(|name| Path::new(name).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ApiError::BadRequest("upload is missing a file name".into()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {}", e)))?;
        if data.is_empty() {
            return Err(ApiError::BadRequest("uploaded file is empty".into()));
        }

        tokio::fs::create_dir_all(&state.docs_dir)
            .await
            .map_err(ApiError::internal)?;
        let path = state.docs_dir.join(&file_name);
        tokio::fs::write(&path, &data)
            .await
            .map_err(ApiError::internal)?;

        let (course, chunk_count) = state.rag.add_course_document(&path).await?;
        return Ok(Json(json!({
            "course_title": course.title,
            "chunks_indexed": chunk_count,
        })));
    }

    Err(ApiError::BadRequest("missing multipart field 'file'".into()))
}
