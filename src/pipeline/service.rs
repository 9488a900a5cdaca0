//! Ingestion service coordinating decoding, chunking, embedding, and Qdrant operations.

use crate::{
    config::get_config,
    decode::extract_pdf_text,
    embedding::{EmbeddingClient, shared_client},
    metrics::{IngestMetrics, MetricsSnapshot},
    pipeline::{
        chunking::chunk_text,
        mappers::{chunk_metadata, map_scored_point, map_stored_point},
        types::{DocumentChunk, DocumentSource, PipelineError, SearchHit},
    },
    qdrant::{PointInsert, QdrantService, compute_fingerprint, current_timestamp_rfc3339,
        generate_chunk_id},
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Coordinates the full pipeline: decode, chunk, embed, and persist on ingestion;
/// embed and rank on retrieval.
///
/// The service owns long-lived handles to the embedding client, the Qdrant transport, and
/// the metrics registry. Construct it once near process start and share it through an `Arc`.
pub struct IngestService {
    embedder: &'static dyn EmbeddingClient,
    store: QdrantService,
    metrics: Arc<IngestMetrics>,
}

/// Abstraction over the pipeline used by the HTTP surface and its tests.
#[async_trait]
pub trait IngestApi: Send + Sync {
    /// Persist a single programmatically submitted text as one chunk.
    async fn index_text(
        &self,
        content: String,
        metadata: Map<String, Value>,
    ) -> Result<DocumentChunk, PipelineError>;

    /// Decode (if needed), chunk, embed, and persist a whole document.
    async fn index_document(
        &self,
        source: DocumentSource,
        base_metadata: Map<String, Value>,
    ) -> Result<Vec<DocumentChunk>, PipelineError>;

    /// Embed the query and return the most similar stored chunks, ranked by the store.
    async fn search(
        &self,
        query_text: String,
        top_k: usize,
        score_floor: Option<f32>,
    ) -> Result<Vec<SearchHit>, PipelineError>;

    /// Enumerate stored chunks without their embeddings.
    async fn list_documents(&self) -> Result<Vec<DocumentChunk>, PipelineError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl IngestService {
    /// Build a new ingestion service, ensuring the backing collection exists.
    pub async fn new() -> Self {
        let config = get_config();
        tracing::info!("Initializing embedding client");
        let embedder = shared_client();
        let store = QdrantService::new().expect("Failed to connect to Qdrant");
        let vector_size = config.embedding_dimension as u64;
        tracing::debug!(
            collection = %config.qdrant_collection_name,
            vector_size,
            "Ensuring document collection"
        );
        store
            .create_collection_if_not_exists(&config.qdrant_collection_name, vector_size)
            .await
            .expect("Failed to ensure Qdrant collection exists");
        tracing::debug!(collection = %config.qdrant_collection_name, "Document collection ready");

        Self {
            embedder,
            store,
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    fn ensure_dimension(vector: &[f32]) -> Result<(), PipelineError> {
        let expected = get_config().embedding_dimension;
        if vector.len() != expected {
            return Err(PipelineError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl IngestApi for IngestService {
    async fn index_text(
        &self,
        content: String,
        metadata: Map<String, Value>,
    ) -> Result<DocumentChunk, PipelineError> {
        if content.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "document content is blank".to_string(),
            ));
        }

        let config = get_config();
        let vector = self.embedder.embed(&content).await?;
        Self::ensure_dimension(&vector)?;

        let mut base = metadata;
        base.insert(
            "ingested_at".into(),
            Value::String(current_timestamp_rfc3339()),
        );
        let point = PointInsert {
            id: generate_chunk_id(),
            content,
            metadata: chunk_metadata(&base, 0, 1),
            vector,
        };

        self.store
            .insert_points(&config.qdrant_collection_name, std::slice::from_ref(&point))
            .await?;

        self.metrics.record_document(1);
        tracing::info!(chunk_id = %point.id, "Document inserted");

        Ok(DocumentChunk {
            id: point.id,
            content: point.content,
            metadata: point.metadata,
        })
    }

    async fn index_document(
        &self,
        source: DocumentSource,
        base_metadata: Map<String, Value>,
    ) -> Result<Vec<DocumentChunk>, PipelineError> {
        let config = get_config();

        // Decode before anything else; a failure here must leave the store untouched.
        let (text, fingerprint, source_bytes) = match source {
            DocumentSource::Text(text) => {
                let fingerprint = compute_fingerprint(text.as_bytes());
                (text, fingerprint, None)
            }
            DocumentSource::Pdf(bytes) => {
                let text = extract_pdf_text(&bytes)?;
                let fingerprint = compute_fingerprint(&bytes);
                (text, fingerprint, Some(bytes.len()))
            }
        };

        if text.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "document text is blank".to_string(),
            ));
        }

        let chunks = chunk_text(&text, config.chunk_size, config.chunk_overlap)?;
        tracing::debug!(
            chunk_count = chunks.len(),
            chunk_size = config.chunk_size,
            overlap = config.chunk_overlap,
            "Document chunked"
        );

        let embeddings = self.embedder.embed_batch(&chunks).await?;
        debug_assert_eq!(chunks.len(), embeddings.len());
        for vector in &embeddings {
            Self::ensure_dimension(vector)?;
        }

        let mut base = base_metadata;
        base.insert("fingerprint".into(), Value::String(fingerprint));
        if let Some(size) = source_bytes {
            base.insert("source_bytes".into(), Value::from(size));
        }
        base.insert(
            "ingested_at".into(),
            Value::String(current_timestamp_rfc3339()),
        );

        let total_chunks = chunks.len();
        let points: Vec<PointInsert> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (content, vector))| PointInsert {
                id: generate_chunk_id(),
                content,
                metadata: chunk_metadata(&base, index, total_chunks),
                vector,
            })
            .collect();

        // One batch upsert; the store adapter rejects unacknowledged writes outright.
        self.store
            .insert_points(&config.qdrant_collection_name, &points)
            .await?;

        self.metrics.record_document(total_chunks as u64);
        tracing::info!(
            collection = %config.qdrant_collection_name,
            chunks = total_chunks,
            "Document indexed"
        );

        Ok(points
            .into_iter()
            .map(|point| DocumentChunk {
                id: point.id,
                content: point.content,
                metadata: point.metadata,
            })
            .collect())
    }

    async fn search(
        &self,
        query_text: String,
        top_k: usize,
        score_floor: Option<f32>,
    ) -> Result<Vec<SearchHit>, PipelineError> {
        if top_k < 1 {
            return Err(PipelineError::InvalidInput(
                "top_k must be at least 1".to_string(),
            ));
        }

        let config = get_config();
        let limit = top_k.min(config.search_max_top_k);
        let floor = score_floor.unwrap_or(config.search_score_floor);

        let vector = self.embedder.embed(&query_text).await?;
        Self::ensure_dimension(&vector)?;

        let hits = self
            .store
            .search_points(&config.qdrant_collection_name, vector, Some(floor), limit)
            .await?;
        tracing::debug!(hits = hits.len(), limit, floor, "Search completed");

        // The store is the ranking authority; results pass through in its order.
        Ok(hits.into_iter().map(map_scored_point).collect())
    }

    async fn list_documents(&self) -> Result<Vec<DocumentChunk>, PipelineError> {
        let config = get_config();
        let points = self
            .store
            .list_points(&config.qdrant_collection_name)
            .await?;
        Ok(points.into_iter().map(map_stored_point).collect())
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
