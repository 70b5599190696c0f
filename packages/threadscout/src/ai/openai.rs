//! OpenAI implementation of the [`Embedder`] trait.
//!
//! A thin REST client for the embeddings endpoint; no chat surface.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ai::Embedder;
use crate::error::{Result, ScoutError};

/// Embedder backed by the OpenAI embeddings endpoint.
///
/// Uses `text-embedding-3-small` unless overridden.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiEmbedder {
    /// Create a new embedder with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable, honoring
    /// `OPENAI_EMBED_MODEL` when set.
    ///
    /// Returns `None` when the key is absent so callers can degrade to
    /// lexical-only matching instead of failing the job.
    pub fn from_env() -> Option<Self> {
        let embedder = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .map(Self::new)?;
        match std::env::var("OPENAI_EMBED_MODEL") {
            Ok(model) if !model.is_empty() => Some(embedder.with_model(model)),
            _ => Some(embedder),
        }
    }

    /// Create from the environment with the configured embedding model.
    pub fn from_config(config: &crate::config::ScoutConfig) -> Option<Self> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .map(|key| Self::new(key).with_model(config.embedding_model.clone()))
    }

    /// Set the embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: text.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ScoutError::Embedding(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::Embedding(format!(
                "embedding endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::Embedding(e.to_string()))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ScoutError::Embedding("empty embedding response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides() {
        let embedder = OpenAiEmbedder::new("sk-test")
            .with_model("text-embedding-3-large")
            .with_base_url("http://localhost:9999/v1");
        assert_eq!(embedder.model, "text-embedding-3-large");
        assert_eq!(embedder.base_url, "http://localhost:9999/v1");
    }
}
