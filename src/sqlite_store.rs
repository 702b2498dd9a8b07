//! SQLite-backed [`ChunkStore`].
//!
//! Documents upsert on their id. Clause rows upsert on
//! `(document_id, section_id, content_hash)`, so re-indexing unchanged
//! input refreshes rows in place instead of adding new ones.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

use clause_harness_core::embedding::vec_to_blob;
use clause_harness_core::models::{LegalDocument, ProcessedChunk};
use clause_harness_core::store::{ChunkStore, StoreCounts, UpsertSummary};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ChunkStore for SqliteStore {
    async fn upsert_document(&self, doc: &LegalDocument) -> Result<()> {
        let meta = &doc.metadata;
        let metadata_json = serde_json::to_string(meta)?;
        sqlx::query(
            r#"
            INSERT INTO documents (id, title, document_type, jurisdiction, governing_law,
                                   industry, source_file, source_format, processed_at,
                                   metadata_json)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                document_type = excluded.document_type,
                jurisdiction = excluded.jurisdiction,
                governing_law = excluded.governing_law,
                industry = excluded.industry,
                source_file = excluded.source_file,
                source_format = excluded.source_format,
                processed_at = excluded.processed_at,
                metadata_json = excluded.metadata_json
            "#,
        )
        .bind(&meta.document_id)
        .bind(&meta.title)
        .bind(&meta.document_type)
        .bind(&meta.jurisdiction)
        .bind(&meta.governing_law)
        .bind(&meta.industry)
        .bind(&meta.source_file)
        .bind(meta.source_format.to_string())
        .bind(meta.processed_at.map(|t| t.to_rfc3339()))
        .bind(&metadata_json)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert document {}", meta.document_id))?;
        Ok(())
    }

    async fn upsert_chunks(&self, chunks: &[ProcessedChunk]) -> Result<UpsertSummary> {
        let mut tx = self.pool.begin().await?;
        let mut summary = UpsertSummary::default();

        for chunk in chunks {
            let m = &chunk.metadata;
            let existing: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM clauses WHERE document_id = ? AND section_id = ? AND content_hash = ?",
            )
            .bind(&m.document_id)
            .bind(&m.section_id)
            .bind(&chunk.hash)
            .fetch_one(&mut *tx)
            .await?;

            let tags_json = serde_json::to_string(&m.tags)?;
            let embedding = chunk.embedding.as_deref().map(vec_to_blob);
            sqlx::query(
                r#"
                INSERT INTO clauses (chunk_id, document_id, section_id, chunk_index, chunk_type,
                                     content, content_hash, tags_json, source_citation,
                                     heading_number, heading_level, parent_heading_number,
                                     embedding)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(document_id, section_id, content_hash) DO UPDATE SET
                    chunk_id = excluded.chunk_id,
                    chunk_index = excluded.chunk_index,
                    chunk_type = excluded.chunk_type,
                    tags_json = excluded.tags_json,
                    source_citation = excluded.source_citation,
                    heading_number = excluded.heading_number,
                    heading_level = excluded.heading_level,
                    parent_heading_number = excluded.parent_heading_number,
                    embedding = COALESCE(excluded.embedding, clauses.embedding)
                "#,
            )
            .bind(&m.chunk_id)
            .bind(&m.document_id)
            .bind(&m.section_id)
            .bind(m.chunk_index as i64)
            .bind(m.chunk_type.as_str())
            .bind(&chunk.content)
            .bind(&chunk.hash)
            .bind(&tags_json)
            .bind(&m.source_citation)
            .bind(&m.heading_number)
            .bind(m.heading_level.map(|l| l as i64))
            .bind(&m.parent_heading_number)
            .bind(embedding)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to upsert chunk {}", m.chunk_id))?;

            if existing > 0 {
                summary.updated += 1;
            } else {
                summary.inserted += 1;
            }
        }

        tx.commit().await?;
        Ok(summary)
    }

    async fn counts(&self) -> Result<StoreCounts> {
        let documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        let chunks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clauses")
            .fetch_one(&self.pool)
            .await?;
        let embeddings: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM clauses WHERE embedding IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(StoreCounts {
            documents: documents as usize,
            chunks: chunks as usize,
            embeddings: embeddings as usize,
        })
    }
}
