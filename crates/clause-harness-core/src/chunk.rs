//! Sentence-aware sliding-window chunker.
//!
//! Each section becomes one or more [`ProcessedChunk`]s. A section at or
//! under `max_chars` characters is one chunk, even when its text is empty.
//! Longer sections are cut into
//! windows of `max_chars`, pulled back to the last period found within
//! `boundary_window` characters of the hard edge, and each following
//! window starts `overlap_chars` before the previous one ended.
//!
//! Each definition becomes exactly one chunk whose id is derived from a
//! hash of the term, so re-indexing identical input produces identical ids.
//!
//! Offsets are counted in characters, never bytes.

use sha2::{Digest, Sha256};

use crate::models::{
    ChunkMetadata, ChunkType, Definition, LegalDocument, ProcessedChunk, Section,
};
use crate::terminology::tag_form;

/// Section id used for definitions that have no owning section.
pub const DEFINITIONS_BUCKET: &str = "definitions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
    pub boundary_window: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            overlap_chars: 100,
            boundary_window: 100,
        }
    }
}

impl ChunkerConfig {
    /// Every window must advance past the previous start.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_chars == 0 {
            anyhow::bail!("chunking.max_chars must be > 0");
        }
        if self.overlap_chars + self.boundary_window >= self.max_chars {
            anyhow::bail!(
                "chunking.overlap_chars ({}) + chunking.boundary_window ({}) must be < chunking.max_chars ({})",
                self.overlap_chars,
                self.boundary_window,
                self.max_chars
            );
        }
        Ok(())
    }
}

/// A window of text; `start`/`end` are character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWindow {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Split `text` into overlapping windows. Windows that are blank after
/// trimming are dropped; the returned text is trimmed.
pub fn split_with_overlap(text: &str, config: &ChunkerConfig) -> Vec<TextWindow> {
    let chars: Vec<char> = text.chars().collect();
    let byte_at: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let n = chars.len();
    let mut windows = Vec::new();
    if n == 0 || config.max_chars == 0 {
        return windows;
    }

    let mut start = 0usize;
    loop {
        let mut end = (start + config.max_chars).min(n);
        if end < n {
            let floor = end.saturating_sub(config.boundary_window).max(start);
            if let Some(p) = (floor..end).rev().find(|&i| chars[i] == '.') {
                if p > start {
                    end = p + 1;
                }
            }
        }

        let piece = text[byte_at[start]..byte_at[end]].trim();
        if !piece.is_empty() {
            windows.push(TextWindow {
                start,
                end,
                text: piece.to_string(),
            });
        }

        if end >= n {
            break;
        }
        let next = end.saturating_sub(config.overlap_chars);
        if next <= start {
            tracing::debug!(start, end, "chunk window made no progress; stopping");
            break;
        }
        start = next;
    }
    windows
}

/// SHA-256 of `text`, lower-case hex.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Clause chunks for every section in order, then one chunk per
    /// definition.
    pub fn chunk(&self, doc: &LegalDocument) -> Vec<ProcessedChunk> {
        let mut chunks = Vec::new();
        for section in &doc.sections {
            chunks.extend(self.chunk_section(doc, section));
        }
        for def in &doc.definitions {
            chunks.push(definition_chunk(doc, def));
        }
        tracing::debug!(
            document = %doc.metadata.document_id,
            chunks = chunks.len(),
            "document chunked"
        );
        chunks
    }

    pub fn chunk_section(&self, doc: &LegalDocument, section: &Section) -> Vec<ProcessedChunk> {
        let pieces: Vec<String> = if section.text.chars().count() <= self.config.max_chars {
            vec![section.text.clone()]
        } else {
            split_with_overlap(&section.text, &self.config)
                .into_iter()
                .map(|w| w.text)
                .collect()
        };

        let citation = format!("{}, Section {}", doc.metadata.title, section.id);
        let heading = section.heading.as_ref();
        pieces
            .into_iter()
            .enumerate()
            .map(|(index, content)| ProcessedChunk {
                metadata: ChunkMetadata {
                    chunk_id: format!("{}_{}_{}", doc.metadata.document_id, section.id, index),
                    document_id: doc.metadata.document_id.clone(),
                    section_id: section.id.clone(),
                    chunk_index: index,
                    chunk_type: ChunkType::Clause,
                    tags: section.tags.clone(),
                    source_citation: citation.clone(),
                    heading_number: heading.map(|h| h.number.clone()),
                    heading_level: heading.map(|h| h.level),
                    parent_heading_number: heading.and_then(|h| h.parent.clone()),
                },
                hash: content_hash(&content),
                content,
                embedding: None,
            })
            .collect()
    }
}

fn definition_chunk(doc: &LegalDocument, def: &Definition) -> ProcessedChunk {
    let term_hash = content_hash(&def.term);
    let content = format!("\"{}\" means {}", def.term, def.definition);
    let tags = ["definition".to_string(), tag_form(&def.term)]
        .into_iter()
        .collect();
    ProcessedChunk {
        metadata: ChunkMetadata {
            chunk_id: format!("{}_def_{}", doc.metadata.document_id, &term_hash[..8]),
            document_id: doc.metadata.document_id.clone(),
            section_id: def
                .section_id
                .clone()
                .unwrap_or_else(|| DEFINITIONS_BUCKET.to_string()),
            chunk_index: 0,
            chunk_type: ChunkType::Definition,
            tags,
            source_citation: format!("{}, Definition: {}", doc.metadata.title, def.term),
            heading_number: None,
            heading_level: None,
            parent_heading_number: None,
        },
        hash: content_hash(&content),
        content,
        embedding: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClauseType, DocumentMetadata, HeadingAnchor, SourceFormat};
    use crate::segment::{LinePatterns, Segmenter};

    fn doc_with(sections: Vec<Section>, definitions: Vec<Definition>) -> LegalDocument {
        LegalDocument {
            metadata: DocumentMetadata {
                document_id: "wpc".into(),
                title: "Wholesale Power Contract".into(),
                document_type: "Wholesale Power Contract".into(),
                jurisdiction: "US".into(),
                governing_law: None,
                industry: "Power".into(),
                effective_date: None,
                execution_date: None,
                termination_date: None,
                parties: Vec::new(),
                source_file: "wpc.xml".into(),
                source_format: SourceFormat::Xml,
                processed_at: None,
            },
            sections,
            definitions,
        }
    }

    fn section(id: &str, text: &str) -> Section {
        Section {
            id: id.into(),
            title: "Rates".into(),
            text: text.into(),
            clause_type: ClauseType::Price,
            tags: ["pricing".to_string()].into_iter().collect(),
            defined_terms: Vec::new(),
            parent_section: Some("4".into()),
            page_number: None,
            heading: HeadingAnchor::from_number(id),
        }
    }

    #[test]
    fn short_section_is_one_chunk() {
        let doc = doc_with(vec![section("4.1", "The rate is fixed.")], Vec::new());
        let chunks = Chunker::default().chunk(&doc);
        assert_eq!(chunks.len(), 1);
        let c = &chunks[0];
        assert_eq!(c.metadata.chunk_id, "wpc_4.1_0");
        assert_eq!(c.metadata.chunk_index, 0);
        assert_eq!(c.metadata.chunk_type, ChunkType::Clause);
        assert_eq!(c.metadata.source_citation, "Wholesale Power Contract, Section 4.1");
        assert_eq!(c.metadata.heading_number.as_deref(), Some("4.1"));
        assert_eq!(c.metadata.heading_level, Some(2));
        assert_eq!(c.metadata.parent_heading_number.as_deref(), Some("4"));
        assert!(c.metadata.tags.contains("pricing"));
        assert_eq!(c.hash, content_hash("The rate is fixed."));
    }

    #[test]
    fn empty_section_is_still_one_chunk() {
        let doc = doc_with(vec![section("1", ""), section("2", "  \n ")], Vec::new());
        let chunks = Chunker::default().chunk(&doc);
        let ids: Vec<&str> = chunks.iter().map(|c| c.metadata.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["wpc_1_0", "wpc_2_0"]);
        assert_eq!(chunks[0].content, "");
        assert_eq!(chunks[0].metadata.chunk_index, 0);
    }

    #[test]
    fn adjacent_headings_each_get_a_chunk() {
        let blocks = LinePatterns::default()
            .blocks_from_pages(&["1.1 First Heading\n1.2 Second Heading\nbody".to_string()], false);
        let sections = Segmenter::new().segment(blocks);
        let doc = doc_with(sections, Vec::new());
        let chunks = Chunker::default().chunk(&doc);
        let ids: Vec<&str> = chunks.iter().map(|c| c.metadata.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["wpc_1.1_0", "wpc_1.2_0"]);
        assert_eq!(chunks[0].content, "1.1 First Heading");
    }

    #[test]
    fn threshold_boundary() {
        let cfg = ChunkerConfig::default();
        let exact = "a".repeat(1000);
        let doc = doc_with(vec![section("1", &exact)], Vec::new());
        assert_eq!(Chunker::new(cfg).chunk(&doc).len(), 1);

        let over = "a".repeat(1001);
        let doc = doc_with(vec![section("1", &over)], Vec::new());
        assert!(Chunker::new(cfg).chunk(&doc).len() >= 2);
    }

    #[test]
    fn long_section_without_periods_makes_three_windows() {
        let text = "abcd ".repeat(460);
        assert_eq!(text.chars().count(), 2300);
        let windows = split_with_overlap(&text, &ChunkerConfig::default());
        assert_eq!(windows.len(), 3);
        let starts: Vec<usize> = windows.iter().map(|w| w.start).collect();
        assert_eq!(starts, vec![0, 900, 1800]);
        for pair in windows.windows(2) {
            let overlap = pair[0].end.saturating_sub(pair[1].start);
            assert!(overlap <= 100);
            assert!(pair[1].start >= pair[0].start);
        }
    }

    #[test]
    fn sentence_trimmed_windows_overlap_and_cover() {
        let text = "The Seller shall deliver energy to the Buyer. ".repeat(50);
        let n = text.chars().count();
        assert_eq!(n, 2300);
        let windows = split_with_overlap(&text, &ChunkerConfig::default());
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start, 0);
        assert_eq!(windows[2].end, n);
        for w in &windows[..2] {
            assert!(w.text.ends_with("Buyer."));
            assert!(w.end - w.start <= 1000);
        }
        for pair in windows.windows(2) {
            assert!(pair[1].start <= pair[0].end);
            let overlap = pair[0].end - pair[1].start;
            assert!((0..=100).contains(&overlap));
        }

        let doc = doc_with(vec![section("5", &text)], Vec::new());
        let chunks = Chunker::default().chunk(&doc);
        assert_eq!(chunks.len(), 3);
        assert!(text.starts_with(&chunks[0].content));
        assert!(text.trim_end().ends_with(&chunks[2].content));
    }

    #[test]
    fn windows_prefer_sentence_boundaries() {
        let sentence = "x".repeat(949) + ".";
        let text = sentence.repeat(3);
        let windows = split_with_overlap(&text, &ChunkerConfig::default());
        assert_eq!(windows[0].end, 950);
        assert!(windows[0].text.ends_with('.'));
        assert_eq!(windows[1].start, 850);
    }

    #[test]
    fn windows_cover_text() {
        let text: String = (0..300).map(|i| format!("Clause {} applies. ", i)).collect();
        let n = text.chars().count();
        let windows = split_with_overlap(&text, &ChunkerConfig::default());
        assert_eq!(windows.first().map(|w| w.start), Some(0));
        assert_eq!(windows.last().map(|w| w.end), Some(n));
        for pair in windows.windows(2) {
            assert!(pair[1].start < pair[0].end);
            assert!(pair[1].start > pair[0].start);
        }
    }

    #[test]
    fn multibyte_text_is_split_on_char_offsets() {
        let text = "é".repeat(1500);
        let windows = split_with_overlap(&text, &ChunkerConfig::default());
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].text.chars().count(), 1000);
        assert_eq!(windows[1].end, 1500);
    }

    #[test]
    fn chunk_indices_are_contiguous() {
        let text = "abcd ".repeat(460);
        let doc = doc_with(vec![section("7", &text)], Vec::new());
        let chunks = Chunker::default().chunk(&doc);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.metadata.chunk_index, i);
            assert_eq!(c.metadata.chunk_id, format!("wpc_7_{}", i));
        }
    }

    #[test]
    fn definition_chunks() {
        let defs = vec![
            Definition {
                term: "Material Adverse Effect".into(),
                definition: "any event.".into(),
                section_id: Some("1".into()),
            },
            Definition {
                term: "CROD".into(),
                definition: "contract rate.".into(),
                section_id: None,
            },
        ];
        let doc = doc_with(Vec::new(), defs);
        let chunks = Chunker::default().chunk(&doc);
        assert_eq!(chunks.len(), 2);
        let mae = &chunks[0];
        assert_eq!(mae.content, "\"Material Adverse Effect\" means any event.");
        assert_eq!(mae.metadata.chunk_type, ChunkType::Definition);
        assert_eq!(mae.metadata.section_id, "1");
        assert!(mae.metadata.tags.contains("definition"));
        assert!(mae.metadata.tags.contains("material_adverse_effect"));
        assert_eq!(
            mae.metadata.source_citation,
            "Wholesale Power Contract, Definition: Material Adverse Effect"
        );
        let expected = format!("wpc_def_{}", &content_hash("Material Adverse Effect")[..8]);
        assert_eq!(mae.metadata.chunk_id, expected);
        assert_eq!(chunks[1].metadata.section_id, DEFINITIONS_BUCKET);
    }

    #[test]
    fn chunking_is_idempotent() {
        let text = "Sentence one. ".repeat(200);
        let doc = doc_with(
            vec![section("1", &text), section("2", "short")],
            vec![Definition {
                term: "Term".into(),
                definition: "x.".into(),
                section_id: None,
            }],
        );
        let chunker = Chunker::default();
        assert_eq!(chunker.chunk(&doc), chunker.chunk(&doc));
    }

    #[test]
    fn config_validation() {
        assert!(ChunkerConfig::default().validate().is_ok());
        let bad = ChunkerConfig {
            max_chars: 150,
            overlap_chars: 100,
            boundary_window: 100,
        };
        assert!(bad.validate().is_err());
        let zero = ChunkerConfig {
            max_chars: 0,
            ..ChunkerConfig::default()
        };
        assert!(zero.validate().is_err());
    }
}
