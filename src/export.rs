//! Structured output: the per-document JSON side channel and chunk
//! streams.
//!
//! Documents are written one file per id so a re-run overwrites the
//! previous output for that document. Chunks are written as JSON Lines,
//! either to a file or to stdout for piping.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clause_harness_core::models::{LegalDocument, ProcessedChunk};

use crate::error::{stage, IngestError, IngestResult};

/// Write `<dir>/<document_id>.json` as pretty JSON and return its path.
pub fn save_document(dir: &Path, doc: &LegalDocument) -> IngestResult<PathBuf> {
    std::fs::create_dir_all(dir)
        .map_err(|e| IngestError::parse(dir, stage::SAVE, e))?;
    let path = dir.join(format!("{}.json", doc.metadata.document_id));
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(&path, json).map_err(|e| IngestError::parse(&path, stage::SAVE, e))?;
    tracing::debug!(path = %path.display(), "document saved");
    Ok(path)
}

/// Read back a document written by [`save_document`].
pub fn load_document(path: &Path) -> IngestResult<LegalDocument> {
    let content =
        std::fs::read_to_string(path).map_err(|e| IngestError::parse(path, stage::READ, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Write one JSON object per line.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout.
pub fn write_chunks_jsonl(chunks: &[ProcessedChunk], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_jsonl(BufWriter::new(file), chunks)?;
            eprintln!("Wrote {} chunks to {}", chunks.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            write_jsonl(stdout.lock(), chunks)?;
        }
    }
    Ok(())
}

fn write_jsonl<W: Write>(mut out: W, chunks: &[ProcessedChunk]) -> Result<()> {
    for chunk in chunks {
        serde_json::to_writer(&mut out, chunk)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Pretty JSON to a file, or to stdout when `output` is `None`.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clause_harness_core::models::{DocumentMetadata, SourceFormat};

    fn doc(id: &str) -> LegalDocument {
        LegalDocument {
            metadata: DocumentMetadata {
                document_id: id.into(),
                title: "Test Agreement".into(),
                document_type: "Purchase Agreement".into(),
                jurisdiction: "US".into(),
                governing_law: None,
                industry: "General".into(),
                effective_date: None,
                execution_date: None,
                termination_date: None,
                parties: Vec::new(),
                source_file: format!("{}.txt", id),
                source_format: SourceFormat::Txt,
                processed_at: None,
            },
            sections: Vec::new(),
            definitions: Vec::new(),
        }
    }

    #[test]
    fn save_document_keyed_by_id() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("nested/out");
        let path = save_document(&out, &doc("apa-2019")).unwrap();
        assert_eq!(path, out.join("apa-2019.json"));

        let back = load_document(&path).unwrap();
        assert_eq!(back, doc("apa-2019"));
    }

    #[test]
    fn jsonl_one_object_per_line() {
        let chunks = vec![
            ProcessedChunk {
                metadata: clause_harness_core::models::ChunkMetadata {
                    chunk_id: "d_1_0".into(),
                    document_id: "d".into(),
                    section_id: "1".into(),
                    chunk_index: 0,
                    chunk_type: clause_harness_core::models::ChunkType::Clause,
                    tags: Default::default(),
                    source_citation: "T, Section 1".into(),
                    heading_number: Some("1".into()),
                    heading_level: Some(1),
                    parent_heading_number: None,
                },
                content: "first line\nsecond line".into(),
                hash: "h".into(),
                embedding: None,
            };
            2
        ];
        let mut buf = Vec::new();
        write_jsonl(&mut buf, &chunks).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let v: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(v["metadata"]["chunk_type"], "clause");
        assert_eq!(v["content"], "first line\nsecond line");
        assert!(v.get("embedding").is_none());
    }
}
