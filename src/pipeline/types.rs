//! Core data types and error definitions for the ingestion pipeline.

use crate::{decode::DecodeError, embedding::EmbeddingClientError, qdrant::QdrantError};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced while turning raw text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Ingestion configured an impossible window size.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Errors emitted by the ingestion and retrieval pipeline.
///
/// The variants distinguish client-fault conditions (`InvalidInput`, `Decode`) from
/// server-fault conditions (everything else); the HTTP layer maps them to status codes
/// at the boundary and nowhere else.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The caller supplied unusable input (blank text, invalid `top_k`, wrong content type).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Uploaded bytes could not be decoded into text.
    #[error("Failed to decode document: {0}")]
    Decode(#[from] DecodeError),
    /// Chunking step failed to segment the document.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Embedding backend failed to produce vectors.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Vector store interaction failed during insert, search, or listing.
    #[error("Vector store request failed: {0}")]
    Persistence(#[from] QdrantError),
    /// Produced embedding width does not match the configured store width.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected embedding dimension configured on the server.
        expected: usize,
        /// Actual embedding dimension produced by the backend.
        actual: usize,
    },
}

impl PipelineError {
    /// Whether this failure is attributable to the caller rather than the server.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Decode(_))
    }
}

/// Raw material submitted for indexing.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// Plain text, ready for chunking.
    Text(String),
    /// PDF bytes requiring decoding before chunking.
    Pdf(Vec<u8>),
}

/// A persisted document chunk as projected back to clients (embedding omitted).
#[derive(Debug, Clone, Serialize)]
pub struct DocumentChunk {
    /// Store-assigned unique identifier.
    pub id: String,
    /// Text content of this chunk.
    pub content: String,
    /// Lineage and provenance metadata persisted with the chunk.
    pub metadata: Map<String, Value>,
}

/// A document chunk paired with the similarity score computed by the store.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Store-assigned unique identifier.
    pub id: String,
    /// Text content of the matched chunk.
    pub content: String,
    /// Metadata persisted with the chunk.
    pub metadata: Map<String, Value>,
    /// Similarity score, higher is more relevant.
    pub similarity: f32,
}
