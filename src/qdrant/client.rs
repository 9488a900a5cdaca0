//! HTTP client wrapper for interacting with Qdrant.

use crate::config::get_config;
use crate::qdrant::{
    payload::build_payload,
    types::{
        PointInsert, QdrantError, QueryResponse, QueryResponseResult, ScoredPoint, ScrollResponse,
        StoredPoint, UpsertResponse,
    },
};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};

/// Lightweight HTTP client for Qdrant operations.
pub struct QdrantService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl QdrantService {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, QdrantError> {
        let config = get_config();
        let client = Client::builder().user_agent("axiom-rag/0.1").build()?;

        let base_url = normalize_base_url(&config.qdrant_url).map_err(QdrantError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = %config
                .qdrant_api_key
                .as_deref()
                .map(|value| !value.is_empty())
                .unwrap_or(false),
            "Initialized Qdrant HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.qdrant_api_key.clone(),
        })
    }

    /// Create a collection only when it is missing from Qdrant.
    pub async fn create_collection_if_not_exists(
        &self,
        collection_name: &str,
        vector_size: u64,
    ) -> Result<(), QdrantError> {
        if self.collection_exists(collection_name).await? {
            return Ok(());
        }

        tracing::debug!(
            collection = collection_name,
            vector_size,
            "Creating collection"
        );
        self.create_collection(collection_name, vector_size).await
    }

    /// Create or update a collection with the specified vector size.
    pub async fn create_collection(
        &self,
        collection_name: &str,
        vector_size: u64,
    ) -> Result<(), QdrantError> {
        let body = json!({
            "vectors": {
                "size": vector_size,
                "distance": "Cosine"
            }
        });

        let response = self
            .request(Method::PUT, &format!("collections/{collection_name}"))?
            .json(&body)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(collection = collection_name, "Collection ensured/created");
        })
        .await
    }

    /// Upload chunk vectors to the given collection as a single batch.
    ///
    /// The upsert is issued with `wait=true` and the operation status reported by Qdrant is
    /// checked explicitly: anything other than an acknowledged/completed write is surfaced as
    /// an error rather than an implicit success, so callers never see a partial batch as done.
    pub async fn insert_points(
        &self,
        collection_name: &str,
        points: &[PointInsert],
    ) -> Result<usize, QdrantError> {
        if points.is_empty() {
            return Ok(0);
        }

        let serialized: Vec<_> = points
            .iter()
            .map(|point| {
                json!({
                    "id": point.id,
                    "vector": point.vector,
                    "payload": build_payload(&point.content, &point.metadata),
                })
            })
            .collect();

        let point_count = serialized.len();
        let response = self
            .request(
                Method::PUT,
                &format!("collections/{collection_name}/points"),
            )?
            .query(&[("wait", true)])
            .json(&json!({ "points": serialized }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = QdrantError::UnexpectedStatus { status, body };
            tracing::error!(collection = collection_name, error = %error, "Qdrant upsert failed");
            return Err(error);
        }

        let payload: UpsertResponse = response.json().await?;
        match payload.result.status.as_deref() {
            Some("completed") | Some("acknowledged") => {
                tracing::debug!(
                    collection = collection_name,
                    points = point_count,
                    "Points indexed"
                );
                Ok(point_count)
            }
            other => Err(QdrantError::Unacknowledged(
                other.unwrap_or("missing").to_string(),
            )),
        }
    }

    /// Perform a similarity search against a collection, returning scored payloads.
    ///
    /// This is a read-only operation; results preserve the ranking order computed by Qdrant.
    pub async fn search_points(
        &self,
        collection_name: &str,
        vector: Vec<f32>,
        score_floor: Option<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, QdrantError> {
        let mut body = json!({
            "query": vector,
            "limit": limit,
            "with_payload": true,
        });

        if let Some(threshold) = score_floor
            && threshold > 0.0
        {
            body.as_object_mut()
                .expect("query body should remain an object")
                .insert("score_threshold".into(), Value::from(threshold));
        }

        let response = self
            .request(
                Method::POST,
                &format!("collections/{collection_name}/points/query"),
            )?
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = QdrantError::UnexpectedStatus { status, body };
            tracing::error!(collection = collection_name, error = %error, "Qdrant search failed");
            return Err(error);
        }

        let payload: QueryResponse = response.json().await?;
        let points = match payload.result {
            QueryResponseResult::Points(points) => points,
            QueryResponseResult::Object { points, .. } => points,
        };
        let results = points
            .into_iter()
            .map(|point| ScoredPoint {
                id: stringify_point_id(point.id),
                score: point.score,
                payload: point.payload,
            })
            .collect();

        Ok(results)
    }

    /// Enumerate stored points via scroll pagination, payload only (no vectors).
    pub async fn list_points(&self, collection_name: &str) -> Result<Vec<StoredPoint>, QdrantError> {
        let mut offset: Option<Value> = None;
        let mut stored = Vec::new();

        loop {
            let mut body = json!({
                "with_payload": true,
                "with_vector": false,
                "limit": 256,
                "offset": offset.clone().unwrap_or(Value::Null),
            });

            if offset.is_none() {
                body.as_object_mut()
                    .expect("scroll body should remain an object")
                    .remove("offset");
            }

            let response = self
                .request(
                    Method::POST,
                    &format!("collections/{collection_name}/points/scroll"),
                )?
                .json(&body)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let error = QdrantError::UnexpectedStatus { status, body };
                tracing::error!(collection = collection_name, error = %error, "Failed to scroll points");
                return Err(error);
            }

            let ScrollResponse { result } = response.json().await?;
            for point in result.points {
                stored.push(StoredPoint {
                    id: point.id.map(stringify_point_id).unwrap_or_default(),
                    payload: point.payload,
                });
            }

            match result.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(stored)
    }

    async fn collection_exists(&self, collection_name: &str) -> Result<bool, QdrantError> {
        let response = self
            .request(Method::GET, &format!("collections/{collection_name}"))?
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = QdrantError::UnexpectedStatus { status, body };
                tracing::error!(collection = collection_name, error = %error, "Collection existence check failed");
                Err(error)
            }
        }
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, QdrantError> {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("api-key", api_key);
        }
        Ok(req)
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), QdrantError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = QdrantError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Qdrant request failed");
            Err(error)
        }
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

fn stringify_point_id(id: Value) -> String {
    match id {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
