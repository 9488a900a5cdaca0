//! Document ingestion and retrieval pipeline: decoding, chunking, embedding, persistence.

pub mod chunking;
mod mappers;
mod service;
pub mod types;

pub use service::{IngestApi, IngestService};
pub use types::{ChunkingError, DocumentChunk, DocumentSource, PipelineError, SearchHit};
