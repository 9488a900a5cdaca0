//! Helpers for constructing Qdrant payloads and chunk identity.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

/// Build the payload object stored alongside each indexed chunk.
///
/// The payload keeps the source text under `content` and the lineage map under `metadata`,
/// mirroring what the read endpoints project back to clients.
pub(crate) fn build_payload(content: &str, metadata: &Map<String, Value>) -> Value {
    let mut payload = Map::new();
    payload.insert("content".into(), Value::String(content.to_string()));
    payload.insert("metadata".into(), Value::Object(metadata.clone()));
    Value::Object(payload)
}

/// Generate a fresh chunk identifier.
pub(crate) fn generate_chunk_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current UTC timestamp formatted as RFC3339.
pub(crate) fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Hex-encoded SHA-256 digest of the source bytes, used as provenance metadata.
pub(crate) fn compute_fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_nests_content_and_metadata() {
        let mut metadata = Map::new();
        metadata.insert("source_name".into(), json!("report.pdf"));
        let payload = build_payload("chunk text", &metadata);

        assert_eq!(payload["content"], json!("chunk text"));
        assert_eq!(payload["metadata"]["source_name"], json!("report.pdf"));
    }

    #[test]
    fn fingerprint_is_stable_and_hex() {
        let first = compute_fingerprint(b"hello");
        let second = compute_fingerprint(b"hello");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn chunk_ids_are_unique() {
        assert_ne!(generate_chunk_id(), generate_chunk_id());
    }
}
