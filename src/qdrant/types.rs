//! Shared types used by the Qdrant client and helpers.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors returned while interacting with Qdrant.
#[derive(Debug, Error)]
pub enum QdrantError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Qdrant URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Qdrant responded with an unexpected status code.
    #[error("Unexpected Qdrant response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Qdrant.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// A write request succeeded at the HTTP layer but Qdrant did not acknowledge the rows.
    #[error("Qdrant did not acknowledge the write (operation status: {0})")]
    Unacknowledged(String),
}

/// Prepared point ready for indexing: id, content, metadata, and vector.
#[derive(Debug, Clone)]
pub struct PointInsert {
    /// Identifier assigned to the chunk before insertion.
    pub id: String,
    /// Raw chunk text.
    pub content: String,
    /// Metadata object persisted alongside the chunk.
    pub metadata: Map<String, Value>,
    /// Embedding vector produced for the chunk.
    pub vector: Vec<f32>,
}

/// Scored payload returned by Qdrant similarity queries.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    /// Identifier assigned to the vector.
    pub id: String,
    /// Similarity score computed by Qdrant.
    pub score: f32,
    /// Optional payload associated with the vector.
    pub payload: Option<Map<String, Value>>,
}

/// Stored point returned while scrolling a collection (no vector, no score).
#[derive(Debug, Clone)]
pub struct StoredPoint {
    /// Identifier assigned to the vector.
    pub id: String,
    /// Optional payload associated with the vector.
    pub payload: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
pub(crate) struct UpsertResponse {
    pub(crate) result: UpsertResult,
}

#[derive(Deserialize)]
pub(crate) struct UpsertResult {
    #[serde(default)]
    pub(crate) status: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct QueryResponse {
    pub(crate) result: QueryResponseResult,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum QueryResponseResult {
    Points(Vec<QueryPoint>),
    Object {
        #[serde(default)]
        points: Vec<QueryPoint>,
    },
}

#[derive(Deserialize)]
pub(crate) struct QueryPoint {
    pub(crate) id: Value,
    pub(crate) score: f32,
    #[serde(default)]
    pub(crate) payload: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
pub(crate) struct ScrollResponse {
    pub(crate) result: ScrollResult,
}

#[derive(Deserialize)]
pub(crate) struct ScrollResult {
    #[serde(default)]
    pub(crate) points: Vec<ScrollPoint>,
    #[serde(default)]
    pub(crate) next_page_offset: Option<Value>,
}

#[derive(Deserialize)]
pub(crate) struct ScrollPoint {
    #[serde(default)]
    pub(crate) id: Option<Value>,
    #[serde(default)]
    pub(crate) payload: Option<Map<String, Value>>,
}
