//! Vector storage and embedding boundaries.

pub mod embedder;
mod sqlite;
mod store;

pub use embedder::{Embedder, HttpEmbedder};
pub use sqlite::SqliteVectorStore;
pub use store::{ScoredChunk, SearchFilters, VectorStore};
