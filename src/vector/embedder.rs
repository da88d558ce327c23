use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::ApiError;

/// Embedding model boundary.
///
/// The store never computes vectors itself; it hands text to an `Embedder`
/// and treats the result as opaque.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;
}

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint.
#[derive(Clone)]
pub struct HttpEmbedder {
    base_url: String,
    model: String,
    client: Client,
}

impl HttpEmbedder {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "input": inputs,
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("embedding error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::upstream)?;

        let mut embeddings = Vec::new();
        if let Some(data) = payload["data"].as_array() {
            for item in data {
                if let Some(vals) = item["embedding"].as_array() {
                    let vec: Vec<f32> = vals
                        .iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect();
                    embeddings.push(vec);
                }
            }
        }

        if embeddings.len() != inputs.len() {
            return Err(ApiError::Upstream(format!(
                "embedding endpoint returned {} vectors for {} inputs",
                embeddings.len(),
                inputs.len()
            )));
        }

        Ok(embeddings)
    }
}

/// Deterministic token-bag embedder for tests. Vectors count hashed token
/// occurrences, so cosine similarity tracks term overlap.
#[cfg(test)]
pub(crate) struct BagEmbedder;

#[cfg(test)]
impl BagEmbedder {
    pub(crate) fn embed_one(text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; 64];
        for token in text.to_lowercase().split_whitespace() {
            let mut hash: u64 = 0xcbf29ce484222325;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x100000001b3);
            }
            vec[(hash % 64) as usize] += 1.0;
        }
        vec
    }
}

#[cfg(test)]
#[async_trait]
impl Embedder for BagEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(inputs.iter().map(|s| Self::embed_one(s)).collect())
    }
}
