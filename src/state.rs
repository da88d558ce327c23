use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::core::config::{AppConfig, AppPaths};
use crate::llm::AnthropicClient;
use crate::rag::RagSystem;
use crate::vector::{HttpEmbedder, SqliteVectorStore};

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] anyhow::Error),

    #[error("Failed to initialize vector store: {0}")]
    Store(#[source] anyhow::Error),
}

/// Global application state shared across all routes.
pub struct AppState {
    pub config: AppConfig,
    pub paths: Arc<AppPaths>,
    /// Directory scanned on startup and used for uploaded documents.
    pub docs_dir: PathBuf,
    pub rag: RagSystem,
}

impl AppState {
    /// Set up paths, load and validate configuration, open the vector
    /// store, and wire the RAG pipeline.
    pub async fn initialize() -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(AppPaths::new());

        let config =
            AppConfig::load(&paths).map_err(|e| InitializationError::Config(e.into()))?;

        let embedder = Arc::new(HttpEmbedder::new(
            config.embedding.base_url.clone(),
            config.embedding.model.clone(),
        ));
        let store = Arc::new(
            SqliteVectorStore::new(paths.db_path.clone(), embedder)
                .await
                .map_err(|e| InitializationError::Store(e.into()))?,
        );

        let api_key = config.anthropic.api_key.clone().unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("ANTHROPIC_API_KEY is not set; queries will fail until it is");
        }
        let provider = Arc::new(AnthropicClient::new(
            config.anthropic.base_url.clone(),
            api_key,
        ));

        let docs_dir = config
            .docs_dir
            .clone()
            .unwrap_or_else(|| paths.docs_dir.clone());

        let rag = RagSystem::new(&config, store, provider);

        Ok(Arc::new(AppState {
            config,
            paths,
            docs_dir,
            rag,
        }))
    }
}
