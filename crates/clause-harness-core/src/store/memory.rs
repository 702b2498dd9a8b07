//! In-memory [`ChunkStore`] for tests and dry runs.
//!
//! Uses `HashMap` behind `std::sync::RwLock`.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{DocumentMetadata, LegalDocument, ProcessedChunk};

use super::{chunk_key, ChunkStore, StoreCounts, UpsertSummary};

type ChunkKey = (String, String, String);

pub struct InMemoryStore {
    docs: RwLock<HashMap<String, DocumentMetadata>>,
    chunks: RwLock<HashMap<ChunkKey, ProcessedChunk>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            chunks: RwLock::new(HashMap::new()),
        }
    }

    /// Stored chunks of one document, ordered by chunk id.
    pub fn chunks_for(&self, document_id: &str) -> Result<Vec<ProcessedChunk>> {
        let chunks = self.chunks.read().map_err(|_| anyhow!("chunk store lock poisoned"))?;
        let mut out: Vec<ProcessedChunk> = chunks
            .values()
            .filter(|c| c.metadata.document_id == document_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.metadata.chunk_id.cmp(&b.metadata.chunk_id));
        Ok(out)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChunkStore for InMemoryStore {
    async fn upsert_document(&self, doc: &LegalDocument) -> Result<()> {
        let mut docs = self.docs.write().map_err(|_| anyhow!("document store lock poisoned"))?;
        docs.insert(doc.metadata.document_id.clone(), doc.metadata.clone());
        Ok(())
    }

    async fn upsert_chunks(&self, chunks: &[ProcessedChunk]) -> Result<UpsertSummary> {
        let mut stored = self.chunks.write().map_err(|_| anyhow!("chunk store lock poisoned"))?;
        let mut summary = UpsertSummary::default();
        for chunk in chunks {
            match stored.insert(chunk_key(chunk), chunk.clone()) {
                Some(_) => summary.updated += 1,
                None => summary.inserted += 1,
            }
        }
        Ok(summary)
    }

    async fn counts(&self) -> Result<StoreCounts> {
        let docs = self.docs.read().map_err(|_| anyhow!("document store lock poisoned"))?;
        let chunks = self.chunks.read().map_err(|_| anyhow!("chunk store lock poisoned"))?;
        Ok(StoreCounts {
            documents: docs.len(),
            chunks: chunks.len(),
            embeddings: chunks.values().filter(|c| c.embedding.is_some()).count(),
        })
    }
}
