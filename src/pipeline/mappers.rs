//! Mapping helpers between store payloads and pipeline types.

use crate::pipeline::types::{DocumentChunk, SearchHit};
use crate::qdrant::{ScoredPoint, StoredPoint};
use serde_json::{Map, Value};

/// Merge the caller's base metadata with per-chunk lineage fields.
///
/// `chunk_index` and `total_chunks` always win over caller-supplied keys of the same name,
/// keeping the lineage invariant intact.
pub(crate) fn chunk_metadata(
    base: &Map<String, Value>,
    chunk_index: usize,
    total_chunks: usize,
) -> Map<String, Value> {
    let mut metadata = base.clone();
    metadata.insert("chunk_index".into(), Value::from(chunk_index));
    metadata.insert("total_chunks".into(), Value::from(total_chunks));
    metadata
}

/// Map a Qdrant scored point into a search hit, splitting payload into content and metadata.
pub(crate) fn map_scored_point(point: ScoredPoint) -> SearchHit {
    let ScoredPoint { id, score, payload } = point;
    let (content, metadata) = split_payload(payload);
    SearchHit {
        id,
        content,
        metadata,
        similarity: score,
    }
}

/// Map a scrolled point into a chunk projection for the listing endpoint.
pub(crate) fn map_stored_point(point: StoredPoint) -> DocumentChunk {
    let StoredPoint { id, payload } = point;
    let (content, metadata) = split_payload(payload);
    DocumentChunk {
        id,
        content,
        metadata,
    }
}

fn split_payload(payload: Option<Map<String, Value>>) -> (String, Map<String, Value>) {
    let mut content = String::new();
    let mut metadata = Map::new();

    if let Some(mut map) = payload {
        if let Some(Value::String(value)) = map.remove("content") {
            content = value;
        }
        if let Some(Value::Object(value)) = map.remove("metadata") {
            metadata = value;
        }
    }

    (content, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lineage_fields_override_caller_keys() {
        let mut base = Map::new();
        base.insert("source_name".into(), json!("doc.pdf"));
        base.insert("chunk_index".into(), json!(99));

        let metadata = chunk_metadata(&base, 2, 7);
        assert_eq!(metadata["chunk_index"], json!(2));
        assert_eq!(metadata["total_chunks"], json!(7));
        assert_eq!(metadata["source_name"], json!("doc.pdf"));
    }

    #[test]
    fn scored_point_splits_content_and_metadata() {
        let mut payload = Map::new();
        payload.insert("content".into(), json!("chunk body"));
        payload.insert("metadata".into(), json!({"total_chunks": 3}));

        let hit = map_scored_point(ScoredPoint {
            id: "abc".into(),
            score: 0.87,
            payload: Some(payload),
        });

        assert_eq!(hit.id, "abc");
        assert_eq!(hit.content, "chunk body");
        assert_eq!(hit.metadata["total_chunks"], json!(3));
        assert!((hit.similarity - 0.87).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_payload_maps_to_empty_projection() {
        let chunk = map_stored_point(StoredPoint {
            id: "id-1".into(),
            payload: None,
        });
        assert_eq!(chunk.content, "");
        assert!(chunk.metadata.is_empty());
    }
}
