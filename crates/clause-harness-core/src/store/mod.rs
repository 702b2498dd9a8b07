//! Storage abstraction for processed documents and chunks.
//!
//! Chunks are keyed by `(document id, section id, content hash)`. Writing
//! the same chunk twice is a no-op on row counts; only its metadata and
//! embedding are refreshed.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::{LegalDocument, ProcessedChunk};

/// Row totals held by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub documents: usize,
    pub chunks: usize,
    pub embeddings: usize,
}

/// Outcome of one [`ChunkStore::upsert_chunks`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Composite identity of a stored chunk.
pub fn chunk_key(chunk: &ProcessedChunk) -> (String, String, String) {
    (
        chunk.metadata.document_id.clone(),
        chunk.metadata.section_id.clone(),
        chunk.hash.clone(),
    )
}

#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Insert or replace a document's metadata, keyed by document id.
    async fn upsert_document(&self, doc: &LegalDocument) -> Result<()>;

    /// Insert new chunks and refresh existing ones.
    async fn upsert_chunks(&self, chunks: &[ProcessedChunk]) -> Result<UpsertSummary>;

    async fn counts(&self) -> Result<StoreCounts>;
}
