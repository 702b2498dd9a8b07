//! Corpus statistics and the `clh analyze` report.
//!
//! Counts are kept in `BTreeMap`s so the JSON output is stable across
//! runs. Tag counts are ordered by descending count, then by tag.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use clause_harness_core::models::{LegalDocument, ProcessedChunk};

use crate::config::Config;
use crate::discover::discover;
use crate::export;
use crate::pipeline::Pipeline;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub total_documents: usize,
    pub total_sections: usize,
    pub total_definitions: usize,
    pub by_industry: BTreeMap<String, usize>,
    pub by_jurisdiction: BTreeMap<String, usize>,
    pub by_clause_type: BTreeMap<String, usize>,
    pub by_document_type: BTreeMap<String, usize>,
}

impl CorpusStats {
    pub fn from_documents(docs: &[LegalDocument]) -> Self {
        let mut stats = CorpusStats::default();
        for doc in docs {
            stats.add(doc);
        }
        stats
    }

    pub fn add(&mut self, doc: &LegalDocument) {
        let meta = &doc.metadata;
        self.total_documents += 1;
        self.total_sections += doc.sections.len();
        self.total_definitions += doc.definitions.len();
        *self.by_industry.entry(meta.industry.clone()).or_default() += 1;
        *self
            .by_jurisdiction
            .entry(meta.jurisdiction.clone())
            .or_default() += 1;
        *self
            .by_document_type
            .entry(meta.document_type.clone())
            .or_default() += 1;
        for section in &doc.sections {
            *self
                .by_clause_type
                .entry(section.clause_type.label().to_string())
                .or_default() += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Tag frequencies over chunks, most frequent first.
pub fn tag_counts(chunks: &[ProcessedChunk]) -> Vec<TagCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for chunk in chunks {
        for tag in &chunk.metadata.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }
    let mut out: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct CorpusAnalysis {
    pub generated_at: DateTime<Utc>,
    pub corpus_stats: CorpusStats,
    pub num_chunks: usize,
    pub tag_counts: Vec<TagCount>,
}

impl CorpusAnalysis {
    pub fn build(docs: &[LegalDocument], chunks: &[ProcessedChunk]) -> Self {
        Self {
            generated_at: Utc::now(),
            corpus_stats: CorpusStats::from_documents(docs),
            num_chunks: chunks.len(),
            tag_counts: tag_counts(chunks),
        }
    }
}

/// `clh analyze`: ingest and chunk every supported file under the corpus
/// root and write the analysis report.
pub async fn run_analyze(config: &Config, root: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let root = root.unwrap_or(config.corpus.root.as_path());
    let files = discover(root, &config.corpus)?;

    let pipeline = Pipeline::from_config(config);
    let outcome = pipeline.batch_ingest(&files);
    for (path, e) in &outcome.failures {
        eprintln!("  failed: {} ({}): {}", path.display(), e.stage(), e);
    }
    let chunks = pipeline.chunk_all(&outcome.documents);

    let analysis = CorpusAnalysis::build(&outcome.documents, &chunks);
    export::write_json(&analysis, output)
}
