use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing ingestion activity.
#[derive(Default)]
pub struct IngestMetrics {
    documents_indexed: AtomicU64,
    chunks_indexed: AtomicU64,
}

impl IngestMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a processed document and the number of chunks produced for it.
    pub fn record_document(&self, chunk_count: u64) {
        self.documents_indexed.fetch_add(1, Ordering::Relaxed);
        self.chunks_indexed
            .fetch_add(chunk_count, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_indexed: self.documents_indexed.load(Ordering::Relaxed),
            chunks_indexed: self.chunks_indexed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of ingestion counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents that have been indexed since startup.
    pub documents_indexed: u64,
    /// Total chunk count produced across all indexed documents.
    pub chunks_indexed: u64,
}
