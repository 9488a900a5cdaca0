//! End-to-end tests for the HTTP surface, with httpmock standing in for Qdrant and the
//! deterministic hash embedder as the embedding backend.

use std::sync::Arc;

use axiomrag::{
    api::create_router,
    config,
    pipeline::{DocumentSource, IngestApi, IngestService},
};
use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use httpmock::{
    Method::{GET, POST, PUT},
    MockServer,
};
use serde_json::{Map, Value, json};
use tokio::sync::OnceCell;
use tower::ServiceExt;

static INIT: OnceCell<()> = OnceCell::const_new();
static MOCK_SERVER: OnceCell<&'static MockServer> = OnceCell::const_new();

fn set_env(key: &str, value: &str) {
    // SAFETY: Tests run in a single process and establish deterministic configuration upfront.
    unsafe { std::env::set_var(key, value) }
}

async fn init_harness() {
    INIT.get_or_init(|| async {
        let mock_server = Box::leak(Box::new(MockServer::start_async().await));
        let base_url = mock_server.base_url();

        set_env("QDRANT_URL", &base_url);
        set_env("QDRANT_COLLECTION_NAME", "documents");
        set_env("EMBEDDING_PROVIDER", "hash");
        set_env("EMBEDDING_MODEL", "hash-test");
        set_env("EMBEDDING_DIMENSION", "64");
        set_env("CHUNK_SIZE", "40");
        set_env("CHUNK_OVERLAP", "10");

        // Collection existence probe used during service construction.
        mock_server
            .mock_async(|when, then| {
                when.method(GET).path("/collections/documents");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "time": 0.0,
                    "result": {}
                }));
            })
            .await;

        // Batch upsert acknowledgement.
        mock_server
            .mock_async(|when, then| {
                when.method(PUT).path("/collections/documents/points");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "time": 0.0,
                    "result": { "operation_id": 1, "status": "completed" }
                }));
            })
            .await;

        // Similarity query with limit 3 returns two ranked points.
        mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/documents/points/query")
                    .json_body_partial(r#"{ "limit": 3 }"#);
                then.status(200).json_body(json!({
                    "status": "ok",
                    "time": 0.0,
                    "result": {
                        "points": [
                            {
                                "id": "11111111-1111-1111-1111-111111111111",
                                "score": 0.91,
                                "payload": {
                                    "content": "closest chunk",
                                    "metadata": { "chunk_index": 0, "total_chunks": 1 }
                                }
                            },
                            {
                                "id": "22222222-2222-2222-2222-222222222222",
                                "score": 0.42,
                                "payload": {
                                    "content": "second chunk",
                                    "metadata": { "chunk_index": 0, "total_chunks": 1 }
                                }
                            }
                        ]
                    }
                }));
            })
            .await;

        // Default-limit query simulates an empty store.
        mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/documents/points/query")
                    .json_body_partial(r#"{ "limit": 5 }"#);
                then.status(200).json_body(json!({
                    "status": "ok",
                    "time": 0.0,
                    "result": { "points": [] }
                }));
            })
            .await;

        // Scroll listing for GET /api/documents.
        mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/documents/points/scroll");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "time": 0.0,
                    "result": {
                        "points": [
                            {
                                "id": "33333333-3333-3333-3333-333333333333",
                                "payload": {
                                    "content": "stored text",
                                    "metadata": { "chunk_index": 0, "total_chunks": 1 }
                                }
                            }
                        ],
                        "next_page_offset": null
                    }
                }));
            })
            .await;

        MOCK_SERVER.set(mock_server).ok();
        config::init_config();
    })
    .await;
}

async fn service() -> Arc<IngestService> {
    init_harness().await;
    Arc::new(IngestService::new().await)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test(flavor = "multi_thread")]
async fn single_text_ingest_produces_one_chunk_with_lineage() {
    let app = create_router(service().await);

    let payload = json!({ "content": "Hello world", "metadata": { "topic": "demo" } });
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/documents")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(!json["id"].as_str().unwrap().is_empty());
    assert_eq!(json["content"], "Hello world");
    assert_eq!(json["metadata"]["chunk_index"], 0);
    assert_eq!(json["metadata"]["total_chunks"], 1);
    assert_eq!(json["metadata"]["topic"], "demo");
}

#[tokio::test(flavor = "multi_thread")]
async fn blank_text_ingest_is_rejected() {
    let app = create_router(service().await);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/documents")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "content": "   " }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn multi_chunk_document_carries_contiguous_lineage() {
    let ingest = service().await;

    // 100 characters with chunk size 40 and overlap 10 yields windows at 0, 30, 60, 90.
    let text: String = ('a'..='z').cycle().take(100).collect();
    let mut base = Map::new();
    base.insert("source_name".into(), Value::String("cycle.txt".into()));

    let chunks = ingest
        .index_document(DocumentSource::Text(text), base)
        .await
        .expect("indexing succeeds");

    assert_eq!(chunks.len(), 4);
    for (index, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.metadata["chunk_index"], json!(index));
        assert_eq!(chunk.metadata["total_chunks"], json!(4));
        assert_eq!(chunk.metadata["source_name"], json!("cycle.txt"));
        assert!(!chunk.id.is_empty());
    }
    // Ids are unique across the batch.
    let mut ids: Vec<&str> = chunks.iter().map(|chunk| chunk.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn corrupted_pdf_fails_without_store_writes() {
    let ingest = service().await;

    let result = ingest
        .index_document(
            DocumentSource::Pdf(b"not a pdf at all".to_vec()),
            Map::new(),
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn search_preserves_store_ranking_and_respects_top_k() {
    let app = create_router(service().await);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/search")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "query": "closest", "top_k": 3 }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let hits = body_json(response).await;
    let hits = hits.as_array().unwrap();
    assert!(hits.len() <= 3);
    assert_eq!(hits[0]["content"], "closest chunk");
    let scores: Vec<f64> = hits
        .iter()
        .map(|hit| hit["similarity"].as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[tokio::test(flavor = "multi_thread")]
async fn search_on_empty_store_returns_empty_list() {
    let app = create_router(service().await);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/search")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "query": "unrelated gibberish query" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let hits = body_json(response).await;
    assert_eq!(hits, json!([]));
}

#[tokio::test(flavor = "multi_thread")]
async fn listing_returns_content_and_metadata_without_vectors() {
    let app = create_router(service().await);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/documents")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let documents = body_json(response).await;
    let documents = documents.as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["content"], "stored text");
    assert!(documents[0].get("embedding").is_none());
}
