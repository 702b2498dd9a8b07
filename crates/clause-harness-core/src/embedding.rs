//! Embedding provider trait and vector utilities.
//!
//! The core never computes vectors itself. A provider is handed the chunk
//! contents in order and must return one vector per chunk, in the same
//! order, all of the advertised dimensionality.

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::ProcessedChunk;

/// Trait for embedding backends.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier, recorded next to stored vectors.
    fn model_name(&self) -> &str;
    /// Vector dimensionality.
    fn dims(&self) -> usize;
    /// Embed `texts`, returning one vector per input in the same order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Fill the embedding slot of every chunk.
///
/// Fails without touching any chunk if the provider returns the wrong
/// number of vectors or a vector of the wrong length.
pub async fn embed_chunks(
    provider: &dyn EmbeddingProvider,
    chunks: &mut [ProcessedChunk],
) -> Result<()> {
    if chunks.is_empty() {
        return Ok(());
    }
    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let vectors = provider.embed(&texts).await?;
    if vectors.len() != chunks.len() {
        bail!(
            "embedding provider '{}' returned {} vectors for {} chunks",
            provider.model_name(),
            vectors.len(),
            chunks.len()
        );
    }
    if let Some((i, v)) = vectors
        .iter()
        .enumerate()
        .find(|(_, v)| v.len() != provider.dims())
    {
        bail!(
            "embedding {} has {} dims, provider '{}' declares {}",
            i,
            v.len(),
            provider.model_name(),
            provider.dims()
        );
    }
    for (chunk, vector) in chunks.iter_mut().zip(vectors) {
        chunk.embedding = Some(vector);
    }
    Ok(())
}

/// Encode a vector as little-endian `f32` bytes.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Inverse of [`vec_to_blob`]. Trailing bytes that do not form a whole
/// `f32` are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
