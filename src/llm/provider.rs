use async_trait::async_trait;

use crate::core::errors::ApiError;

use super::types::ChatRequest;

/// Hosted chat-completion boundary.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Chat completion. One synchronous call, no retries.
    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError>;
}
