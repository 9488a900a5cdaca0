//! HTTP surface for the Axiom service.
//!
//! This module exposes a compact Axum router mirroring the public REST API:
//!
//! - `GET /` – Health check.
//! - `GET /api/documents` – List stored chunks (content and metadata, never embeddings).
//! - `POST /api/documents` – Ingest a single text as one chunk.
//! - `POST /api/documents/upload` – Multipart PDF upload; decoded, chunked, and indexed.
//! - `POST /api/search` – Semantic search returning ranked chunks with similarity scores.
//! - `GET /api/metrics` – Ingestion counters for observability.
//!
//! Pipeline errors are mapped to transport status here and nowhere else: client-fault
//! errors (invalid input, undecodable documents) become 400 with the error message as the
//! detail string; server-fault errors (embedding backend, vector store) become 500 with an
//! opaque detail while the full error is logged.

use crate::config::get_config;
use crate::metrics::MetricsSnapshot;
use crate::pipeline::{DocumentChunk, DocumentSource, IngestApi, PipelineError, SearchHit};
use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Build the HTTP router exposing the ingestion and retrieval API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: IngestApi + 'static,
{
    Router::new()
        .route("/", get(health))
        .route(
            "/api/documents",
            get(list_documents::<S>).post(create_document::<S>),
        )
        .route("/api/documents/upload", post(upload_document::<S>))
        .route("/api/search", post(search::<S>))
        .route("/api/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Health check verifying the server is running and accessible.
async fn health() -> Json<Value> {
    Json(json!({ "status": "online", "service": "axiom-rag" }))
}

/// Request body for `POST /api/documents`.
#[derive(Deserialize)]
struct DocumentCreate {
    /// Text content to embed and persist as a single chunk.
    content: String,
    /// Optional open metadata stored alongside the chunk.
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

/// Ingest a single text document as one chunk.
async fn create_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<DocumentCreate>,
) -> Result<Json<DocumentChunk>, AppError>
where
    S: IngestApi,
{
    let metadata = request.metadata.unwrap_or_default();
    let chunk = service.index_text(request.content, metadata).await?;
    tracing::info!(chunk_id = %chunk.id, "Document created");
    Ok(Json(chunk))
}

/// List stored chunks, excluding the heavy embedding vectors from the payload.
async fn list_documents<S>(State(service): State<Arc<S>>) -> Result<Json<Vec<DocumentChunk>>, AppError>
where
    S: IngestApi,
{
    let documents = service.list_documents().await?;
    Ok(Json(documents))
}

/// Success response for `POST /api/documents/upload`.
#[derive(serde::Serialize)]
struct UploadResponse {
    /// Original filename of the uploaded document.
    source_name: String,
    /// Number of chunks persisted for this upload.
    chunks_indexed: usize,
}

/// Accept a multipart PDF upload and index its extracted text.
///
/// The content type is validated before any decode, embed, or store call happens, so a
/// rejected upload is guaranteed to have no side effects.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError>
where
    S: IngestApi,
{
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| invalid_input(format!("malformed multipart body: {error}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if content_type != "application/pdf" {
            return Err(invalid_input(format!(
                "unsupported content type '{content_type}', only application/pdf is accepted"
            )));
        }

        let source_name = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("upload.pdf")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|error| invalid_input(format!("failed to read upload: {error}")))?;

        let mut base_metadata = Map::new();
        base_metadata.insert("source_name".into(), Value::String(source_name.clone()));

        let chunks = service
            .index_document(DocumentSource::Pdf(bytes.to_vec()), base_metadata)
            .await?;
        tracing::info!(
            source_name = %source_name,
            chunks = chunks.len(),
            "Upload indexed"
        );
        return Ok(Json(UploadResponse {
            source_name,
            chunks_indexed: chunks.len(),
        }));
    }

    Err(invalid_input(
        "multipart upload must contain a 'file' field".to_string(),
    ))
}

/// Request body for `POST /api/search`.
#[derive(Deserialize)]
struct SearchQuery {
    /// Natural language query text.
    query: String,
    /// Requested result count; defaults to the configured value when omitted.
    #[serde(default)]
    top_k: Option<usize>,
}

/// Execute a semantic search and return ranked results.
async fn search<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, AppError>
where
    S: IngestApi,
{
    let top_k = request
        .top_k
        .unwrap_or_else(|| get_config().search_default_top_k);
    let hits = service.search(request.query, top_k, None).await?;
    tracing::info!(hits = hits.len(), top_k, "Search request completed");
    Ok(Json(hits))
}

/// Return a concise ingestion counters snapshot.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: IngestApi,
{
    Json(service.metrics_snapshot())
}

struct AppError(PipelineError);

fn invalid_input(message: String) -> AppError {
    AppError(PipelineError::InvalidInput(message))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.0.is_client_fault() {
            let body = Json(json!({ "detail": self.0.to_string() }));
            (StatusCode::BAD_REQUEST, body).into_response()
        } else {
            tracing::error!(error = %self.0, "Request failed");
            let body = Json(json!({ "detail": "internal error while processing the request" }));
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self(inner)
    }
}
