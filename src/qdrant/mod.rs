//! Qdrant vector store integration.

pub mod client;
pub mod payload;
pub mod types;

pub use client::QdrantService;
pub(crate) use payload::{compute_fingerprint, current_timestamp_rfc3339, generate_chunk_id};
pub use types::{PointInsert, QdrantError, ScoredPoint, StoredPoint};
