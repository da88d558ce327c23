//! VectorStore trait — abstract interface for the retrieval backend.
//!
//! The pipeline talks to the store through this trait only; the primary
//! implementation is `SqliteVectorStore` in the `sqlite` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::models::{Course, CourseChunk};

/// Optional constraints applied to a content search.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Exact catalog title (resolve partial names first).
    pub course_title: Option<String>,
    pub lesson_number: Option<u32>,
}

/// A chunk with its similarity score (higher = better).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: CourseChunk,
    pub score: f32,
}

/// Storage backend for course metadata and chunk vectors.
///
/// `add_*` operations are idempotent: re-adding a course or chunk with the
/// same identity replaces the stored row instead of duplicating it.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upsert a course into the catalog, keyed by title.
    async fn add_course(&self, course: &Course) -> Result<(), ApiError>;

    /// Embed and upsert content chunks, keyed by chunk id.
    async fn add_chunks(&self, chunks: &[CourseChunk]) -> Result<(), ApiError>;

    /// Search chunks similar to `query`, best first. Equal scores keep the
    /// original chunk order.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<ScoredChunk>, ApiError>;

    /// Best catalog match for a partial course name.
    async fn resolve_course_title(&self, name: &str) -> Result<Option<String>, ApiError>;

    async fn course_count(&self) -> Result<usize, ApiError>;

    async fn course_titles(&self) -> Result<Vec<String>, ApiError>;

    async fn course_link(&self, title: &str) -> Result<Option<String>, ApiError>;

    async fn lesson_link(&self, title: &str, lesson_number: u32)
        -> Result<Option<String>, ApiError>;

    /// Drop all catalog and chunk data.
    async fn clear_all(&self) -> Result<(), ApiError>;
}
