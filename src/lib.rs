#![deny(missing_docs)]

//! Core library for the Axiom document ingestion and retrieval service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// PDF byte-stream text extraction.
pub mod decode;
/// Embedding client abstraction and backends.
pub mod embedding;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// Document ingestion and retrieval pipeline.
pub mod pipeline;
/// Qdrant vector store integration.
pub mod qdrant;
