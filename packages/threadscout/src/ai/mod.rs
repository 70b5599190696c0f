//! Embedding provider abstraction.
//!
//! The matcher only needs one capability from an AI backend: turning
//! text into a vector. Implementations wrap specific providers.

pub mod openai;

pub use openai::OpenAiEmbedder;

use async_trait::async_trait;

use crate::error::Result;

/// Generate embeddings for text.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns a vector (typically 1536 dimensions) for semantic
    /// similarity scoring.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
