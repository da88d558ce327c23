//! SQLite-backed vector store.
//!
//! Chunk text and course metadata live in SQLite; embeddings are stored as
//! little-endian f32 BLOBs and searched with brute-force cosine similarity.
//! No external vector database server is required.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use crate::core::errors::ApiError;
use crate::models::{Course, CourseChunk};

use super::embedder::Embedder;
use super::store::{ScoredChunk, SearchFilters, VectorStore};

pub struct SqliteVectorStore {
    pool: SqlitePool,
    embedder: Arc<dyn Embedder>,
}

impl SqliteVectorStore {
    pub async fn new(db_path: PathBuf, embedder: Arc<dyn Embedder>) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let store = Self { pool, embedder };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS course_catalog (
                title TEXT PRIMARY KEY,
                course_link TEXT,
                instructor TEXT,
                lessons_json TEXT NOT NULL DEFAULT '[]',
                lesson_count INTEGER NOT NULL DEFAULT 0,
                embedding BLOB NOT NULL,
                ingested_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS course_chunks (
                chunk_id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                course_title TEXT NOT NULL,
                lesson_number INTEGER,
                chunk_index INTEGER NOT NULL,
                embedding BLOB NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_course ON course_chunks(course_title)")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        Ok(())
    }

    /// Serialize an embedding to bytes (little-endian f32).
    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let mut vectors = self.embedder.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ApiError::Upstream("embedding endpoint returned no vector".into()))
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn add_course(&self, course: &Course) -> Result<(), ApiError> {
        let embedding = self.embed_one(&course.title).await?;
        let blob = Self::serialize_embedding(&embedding);

        let lessons: Vec<_> = course
            .lessons
            .iter()
            .map(|lesson| {
                json!({
                    "number": lesson.number,
                    "title": lesson.title,
                    "link": lesson.link,
                })
            })
            .collect();
        let lessons_json = serde_json::to_string(&lessons).map_err(ApiError::internal)?;

        sqlx::query(
            "INSERT OR REPLACE INTO course_catalog
             (title, course_link, instructor, lessons_json, lesson_count, embedding, ingested_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&course.title)
        .bind(&course.course_link)
        .bind(&course.instructor)
        .bind(&lessons_json)
        .bind(course.lessons.len() as i64)
        .bind(&blob)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(())
    }

    async fn add_chunks(&self, chunks: &[CourseChunk]) -> Result<(), ApiError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed(&contents).await?;

        let mut tx = self.pool.begin().await.map_err(ApiError::internal)?;

        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            let blob = Self::serialize_embedding(embedding);
            sqlx::query(
                "INSERT OR REPLACE INTO course_chunks
                 (chunk_id, content, course_title, lesson_number, chunk_index, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(chunk.chunk_id())
            .bind(&chunk.content)
            .bind(&chunk.course_title)
            .bind(chunk.lesson_number.map(|n| n as i64))
            .bind(chunk.chunk_index as i64)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;
        }

        tx.commit().await.map_err(ApiError::internal)?;
        tracing::debug!("Indexed {} chunks", chunks.len());
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<ScoredChunk>, ApiError> {
        let query_embedding = self.embed_one(query).await?;

        let mut sql = String::from(
            "SELECT content, course_title, lesson_number, chunk_index, embedding
             FROM course_chunks WHERE 1=1",
        );
        if filters.course_title.is_some() {
            sql.push_str(" AND course_title = ?1");
        }
        if filters.lesson_number.is_some() {
            sql.push_str(if filters.course_title.is_some() {
                " AND lesson_number = ?2"
            } else {
                " AND lesson_number = ?1"
            });
        }

        let mut q = sqlx::query(&sql);
        if let Some(title) = &filters.course_title {
            q = q.bind(title);
        }
        if let Some(lesson) = filters.lesson_number {
            q = q.bind(lesson as i64);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(ApiError::internal)?;

        let mut scored: Vec<ScoredChunk> = rows
            .iter()
            .map(|row| {
                let embedding_bytes: Vec<u8> = row.get("embedding");
                let stored = Self::deserialize_embedding(&embedding_bytes);
                let score = Self::cosine_similarity(&query_embedding, &stored);
                let lesson_number: Option<i64> = row.get("lesson_number");

                ScoredChunk {
                    chunk: CourseChunk {
                        content: row.get("content"),
                        course_title: row.get("course_title"),
                        lesson_number: lesson_number.map(|n| n as u32),
                        chunk_index: row.get::<i64, _>("chunk_index") as usize,
                    },
                    score,
                }
            })
            .collect();

        // Best first; equal scores keep the original chunk order.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.chunk_index.cmp(&b.chunk.chunk_index))
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn resolve_course_title(&self, name: &str) -> Result<Option<String>, ApiError> {
        let name_embedding = self.embed_one(name).await?;

        let rows = sqlx::query("SELECT title, embedding FROM course_catalog")
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        let mut best: Option<(String, f32)> = None;
        for row in &rows {
            let embedding_bytes: Vec<u8> = row.get("embedding");
            let stored = Self::deserialize_embedding(&embedding_bytes);
            let score = Self::cosine_similarity(&name_embedding, &stored);
            if best.as_ref().map(|(_, s)| score > *s).unwrap_or(true) {
                best = Some((row.get("title"), score));
            }
        }

        Ok(best.map(|(title, _)| title))
    }

    async fn course_count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_catalog")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(count as usize)
    }

    async fn course_titles(&self) -> Result<Vec<String>, ApiError> {
        let rows = sqlx::query("SELECT title FROM course_catalog ORDER BY title")
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(rows.iter().map(|row| row.get("title")).collect())
    }

    async fn course_link(&self, title: &str) -> Result<Option<String>, ApiError> {
        let row = sqlx::query("SELECT course_link FROM course_catalog WHERE title = ?1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(row.and_then(|r| r.get("course_link")))
    }

    async fn lesson_link(
        &self,
        title: &str,
        lesson_number: u32,
    ) -> Result<Option<String>, ApiError> {
        let row = sqlx::query("SELECT lessons_json FROM course_catalog WHERE title = ?1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lessons_json: String = row.get("lessons_json");
        let lessons: serde_json::Value =
            serde_json::from_str(&lessons_json).map_err(ApiError::internal)?;

        let link = lessons.as_array().and_then(|list| {
            list.iter()
                .find(|lesson| lesson["number"].as_u64() == Some(lesson_number as u64))
                .and_then(|lesson| lesson["link"].as_str().map(|s| s.to_string()))
        });

        Ok(link)
    }

    async fn clear_all(&self) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM course_chunks")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        sqlx::query("DELETE FROM course_catalog")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        tracing::info!("Cleared all courses and chunks from the vector store");
        Ok(())
    }
}
