use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create all tables. Safe to run repeatedly.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            document_type TEXT NOT NULL,
            jurisdiction TEXT NOT NULL,
            governing_law TEXT,
            industry TEXT NOT NULL,
            source_file TEXT NOT NULL,
            source_format TEXT NOT NULL,
            processed_at TEXT,
            metadata_json TEXT NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clauses (
            chunk_id TEXT NOT NULL,
            document_id TEXT NOT NULL,
            section_id TEXT NOT NULL,
            chunk_index INTEGER NOT NULL,
            chunk_type TEXT NOT NULL,
            content TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            tags_json TEXT NOT NULL DEFAULT '[]',
            source_citation TEXT NOT NULL,
            heading_number TEXT,
            heading_level INTEGER,
            parent_heading_number TEXT,
            embedding BLOB,
            UNIQUE(document_id, section_id, content_hash),
            FOREIGN KEY (document_id) REFERENCES documents(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_clauses_document ON clauses(document_id)")
        .execute(pool)
        .await?;

    Ok(())
}
