use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::ApiError;

use super::provider::LlmProvider;
use super::types::ChatRequest;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl AnthropicClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError> {
        if self.api_key.is_empty() {
            return Err(ApiError::Upstream(
                "ANTHROPIC_API_KEY is not configured".to_string(),
            ));
        }

        let url = format!("{}/v1/messages", self.base_url);

        let mut body = json!({
            "model": model_id,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": request.messages,
        });
        if let Some(obj) = body.as_object_mut() {
            if let Some(system) = request.system {
                obj.insert("system".to_string(), json!(system));
            }
        }

        let res = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("Anthropic API error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::upstream)?;

        payload["content"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ApiError::Upstream("Anthropic API returned no text content".to_string())
            })
    }
}
