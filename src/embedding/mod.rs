//! Embedding client abstraction and backends.
//!
//! The embedding model is expensive one-time state shared by every request, so the process
//! holds a single lazily-built client behind [`shared_client`]. Construction is cheap and
//! infallible; backend failures (an unreachable Ollama runtime, a missing model) surface per
//! call as [`EmbeddingClientError::Unavailable`] and are not cached, so later calls retry.

use crate::config::{EmbeddingProvider, get_config};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors raised by embedding backends.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// The backend could not be reached or the model failed to load.
    #[error("Embedding backend unavailable: {0}")]
    Unavailable(String),
    /// The backend responded but was unable to produce embeddings for the input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
}

/// Interface implemented by embedding backends.
///
/// Implementations are stateless per call: once constructed, concurrent `embed` calls may
/// proceed in parallel without coordination.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for a single piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError>;

    /// Produce one embedding per input text, preserving input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Embedding client backed by a local Ollama runtime.
pub struct OllamaEmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbeddingClient {
    /// Construct a client from the process configuration.
    pub fn from_config() -> Self {
        let config = get_config();
        let base_url = config
            .ollama_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.embedding_model.clone(),
        }
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": text,
            }))
            .send()
            .await
            .map_err(|error| EmbeddingClientError::Unavailable(error.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let payload: OllamaEmbeddingResponse = response
            .json()
            .await
            .map_err(|error| EmbeddingClientError::GenerationFailed(error.to_string()))?;

        if payload.embedding.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "Ollama returned an empty embedding".to_string(),
            ));
        }

        Ok(payload.embedding)
    }
}

/// Deterministic byte-folding embedding client.
///
/// Produces stable, normalized vectors without any external model, which keeps the pipeline
/// usable offline and makes downstream tests reproducible.
pub struct HashEmbeddingClient {
    dimension: usize,
}

impl HashEmbeddingClient {
    /// Construct a deterministic client producing vectors of the given width.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimension];

        if text.is_empty() {
            return embedding;
        }

        for (idx, byte) in text.bytes().enumerate() {
            let position = idx % self.dimension;
            embedding[position] += f32::from(byte) / 255.0;
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();

        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingClient for HashEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }
        Ok(self.encode(text))
    }
}

static SHARED_CLIENT: OnceLock<Box<dyn EmbeddingClient>> = OnceLock::new();

/// Build an embedding client matching the configured provider.
pub fn build_embedding_client() -> Box<dyn EmbeddingClient> {
    let config = get_config();
    tracing::debug!(
        provider = ?config.embedding_provider,
        model = %config.embedding_model,
        dimension = config.embedding_dimension,
        "Building embedding client"
    );
    match config.embedding_provider {
        EmbeddingProvider::Ollama => Box::new(OllamaEmbeddingClient::from_config()),
        EmbeddingProvider::Hash => Box::new(HashEmbeddingClient::new(config.embedding_dimension)),
    }
}

/// Retrieve the process-wide embedding client, building it on first use.
///
/// Initialization is guarded by a `OnceLock`, so concurrent first callers observe exactly one
/// client instance for the process lifetime.
pub fn shared_client() -> &'static dyn EmbeddingClient {
    SHARED_CLIENT.get_or_init(build_embedding_client).as_ref()
}
