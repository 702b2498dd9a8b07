//! Pipeline orchestration: parse → normalize → chunk → persist/report.
//!
//! [`Pipeline`] processes one document at a time with no state shared
//! between documents. Batch entry points catch per-document failures,
//! log them with the failing stage, and carry on with the rest of the
//! batch.
//!
//! The `run_*` functions back the `clh ingest`, `clh chunk` and
//! `clh index` commands.

use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};

use clause_harness_core::chunk::Chunker;
use clause_harness_core::models::{LegalDocument, ProcessedChunk};
use clause_harness_core::normalize::Normalizer;
use clause_harness_core::store::{ChunkStore, UpsertSummary};
use clause_harness_core::terminology::TerminologyTable;

use crate::adapters::{AdapterSet, Assembler};
use crate::config::{Config, OutputConfig};
use crate::error::{IngestError, IngestResult};
use crate::export;
use crate::sqlite_store::SqliteStore;
use crate::stats::CorpusStats;

/// Outcome of a batch. Successful documents keep input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub documents: Vec<LegalDocument>,
    pub failures: Vec<(PathBuf, IngestError)>,
}

pub struct Pipeline {
    adapters: AdapterSet,
    normalizer: Normalizer,
    chunker: Chunker,
    output: OutputConfig,
}

impl Pipeline {
    pub fn new(
        adapters: AdapterSet,
        normalizer: Normalizer,
        chunker: Chunker,
        output: OutputConfig,
    ) -> Self {
        Self {
            adapters,
            normalizer,
            chunker,
            output,
        }
    }

    /// Build the default adapter set and rule tables, tuned by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            AdapterSet::new(Assembler::default()),
            Normalizer::new(&TerminologyTable::default(), config.normalize.whole_words),
            Chunker::new(config.chunking.chunker_config()),
            config.output.clone(),
        )
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Parse and normalize one file, stamp `processed_at`, and save the
    /// structured output when enabled.
    pub fn ingest_document(&self, path: &Path) -> IngestResult<LegalDocument> {
        let mut doc = self.adapters.parse(path)?;
        self.normalizer.normalize_document(&mut doc);
        doc.metadata.processed_at = Some(Utc::now());

        if self.output.save_documents {
            export::save_document(&self.output.dir, &doc)?;
        }

        tracing::info!(
            path = %path.display(),
            document = %doc.metadata.document_id,
            sections = doc.sections.len(),
            definitions = doc.definitions.len(),
            "document ingested"
        );
        Ok(doc)
    }

    pub fn chunk_document(&self, doc: &LegalDocument) -> Vec<ProcessedChunk> {
        self.chunker.chunk(doc)
    }

    /// Ingest every path. A failing document is logged and recorded;
    /// it never stops the batch.
    pub fn batch_ingest(&self, paths: &[PathBuf]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for path in paths {
            match self.ingest_document(path) {
                Ok(doc) => outcome.documents.push(doc),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        stage = e.stage(),
                        error = %e,
                        "skipping document"
                    );
                    outcome.failures.push((path.clone(), e));
                }
            }
        }
        outcome
    }

    /// Chunks of every document in order.
    pub fn chunk_all(&self, docs: &[LegalDocument]) -> Vec<ProcessedChunk> {
        docs.iter().flat_map(|d| self.chunk_document(d)).collect()
    }
}

/// Persist documents and their chunks. Returns the accumulated upsert
/// summary.
pub async fn index_documents(
    pipeline: &Pipeline,
    store: &dyn ChunkStore,
    docs: &[LegalDocument],
) -> Result<UpsertSummary> {
    let mut total = UpsertSummary::default();
    for doc in docs {
        store.upsert_document(doc).await?;
        let chunks = pipeline.chunk_document(doc);
        let summary = store.upsert_chunks(&chunks).await?;
        total.inserted += summary.inserted;
        total.updated += summary.updated;
    }
    Ok(total)
}

fn report_failures(outcome: &BatchOutcome) {
    for (path, e) in &outcome.failures {
        eprintln!("  failed: {} ({}): {}", path.display(), e.stage(), e);
    }
}

/// `clh ingest`: parse, normalize and save each file.
pub async fn run_ingest(config: &Config, files: &[PathBuf], stats: bool) -> Result<()> {
    let pipeline = Pipeline::from_config(config);
    let outcome = pipeline.batch_ingest(files);

    println!("ingest");
    println!("  documents: {}", outcome.documents.len());
    println!("  failed: {}", outcome.failures.len());
    if config.output.save_documents {
        println!("  output: {}", config.output.dir.display());
    }
    report_failures(&outcome);

    if stats {
        let stats = CorpusStats::from_documents(&outcome.documents);
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    Ok(())
}

/// `clh chunk`: ingest and emit chunks as JSON Lines.
pub async fn run_chunk(config: &Config, files: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let pipeline = Pipeline::from_config(config);
    let outcome = pipeline.batch_ingest(files);
    report_failures(&outcome);
    let chunks = pipeline.chunk_all(&outcome.documents);
    export::write_chunks_jsonl(&chunks, output)
}

/// `clh index`: ingest, chunk and upsert into SQLite.
pub async fn run_index(config: &Config, files: &[PathBuf]) -> Result<()> {
    let pipeline = Pipeline::from_config(config);
    let outcome = pipeline.batch_ingest(files);

    let pool = crate::db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let summary = index_documents(&pipeline, &store, &outcome.documents).await?;
    let counts = store.counts().await?;
    store.pool().close().await;

    println!("index");
    println!("  documents: {}", outcome.documents.len());
    println!("  failed: {}", outcome.failures.len());
    println!("  chunks inserted: {}", summary.inserted);
    println!("  chunks updated: {}", summary.updated);
    println!(
        "  totals: {} documents, {} chunks",
        counts.documents, counts.chunks
    );
    report_failures(&outcome);
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline_without_output() -> Pipeline {
        let mut config = Config::default();
        config.output.save_documents = false;
        Pipeline::from_config(&config)
    }

    #[test]
    fn stamps_processed_at() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("short.txt");
        std::fs::write(&path, "1. SCOPE. This Agreement covers the sale.\n").unwrap();

        let doc = pipeline_without_output().ingest_document(&path).unwrap();
        assert!(doc.metadata.processed_at.is_some());
        assert_eq!(doc.metadata.document_id, "short");
    }

    #[test]
    fn batch_keeps_going_after_failures() {
        let tmp = tempfile::TempDir::new().unwrap();
        let good = tmp.path().join("good.txt");
        std::fs::write(&good, "1. SCOPE. Text.\n").unwrap();
        let unsupported = tmp.path().join("notes.docx");
        std::fs::write(&unsupported, "x").unwrap();
        let missing = tmp.path().join("missing.txt");

        let outcome = pipeline_without_output().batch_ingest(&[
            missing.clone(),
            unsupported.clone(),
            good.clone(),
        ]);
        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(outcome.failures.len(), 2);
        assert!(matches!(outcome.failures[0].1, IngestError::NotFound { .. }));
        assert!(matches!(
            outcome.failures[1].1,
            IngestError::UnsupportedFormat { .. }
        ));
    }

    #[test]
    fn saves_structured_output_when_enabled() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("deal.txt");
        std::fs::write(&path, "1. SCOPE. Text.\n").unwrap();

        let mut config = Config::default();
        config.output.dir = tmp.path().join("out");
        Pipeline::from_config(&config)
            .ingest_document(&path)
            .unwrap();
        assert!(tmp.path().join("out/deal.json").exists());
    }
}
