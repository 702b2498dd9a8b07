//! Source adapters: one per input format, each producing a
//! [`LegalDocument`].
//!
//! Adapters only differ in how they turn a file into blocks and metadata.
//! Classification and definition extraction are shared through
//! [`Assembler`].

pub mod pdf;
pub mod text;
pub mod xml;

use std::path::Path;

use clause_harness_core::classify::ClauseClassifier;
use clause_harness_core::definitions::DefinitionExtractor;
use clause_harness_core::models::{DocumentMetadata, LegalDocument, SourceFormat};
use clause_harness_core::segment::{Block, LinePatterns, Segmenter};

use crate::error::{IngestError, IngestResult};

/// A format adapter.
pub trait DocumentParser: Send + Sync {
    fn format(&self) -> SourceFormat;
    fn parse(&self, path: &Path) -> IngestResult<LegalDocument>;
}

/// Format-independent half of parsing: segment, classify, extract
/// definitions.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    pub segmenter: Segmenter,
    pub classifier: ClauseClassifier,
    pub definitions: DefinitionExtractor,
    pub line_patterns: LinePatterns,
}

impl Assembler {
    pub fn assemble(
        &self,
        metadata: DocumentMetadata,
        blocks: Vec<Block>,
        raw_text: &str,
    ) -> LegalDocument {
        let mut sections = self.segmenter.segment(blocks);
        self.classifier.annotate(&mut sections);
        let definitions = self.definitions.extract(&sections, raw_text);
        tracing::debug!(
            document = %metadata.document_id,
            sections = sections.len(),
            definitions = definitions.len(),
            "document assembled"
        );
        LegalDocument {
            metadata,
            sections,
            definitions,
        }
    }
}

/// Document id: the file name without its extension.
pub fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Lower-cased file extension, empty when there is none.
pub fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Picks an adapter by file extension.
#[derive(Default)]
pub struct AdapterSet {
    pub xml: xml::XmlParser,
    pub pdf: pdf::PdfParser,
    pub text: text::TextParser,
}

impl AdapterSet {
    pub fn new(assembler: Assembler) -> Self {
        Self {
            xml: xml::XmlParser::new(assembler.clone()),
            pdf: pdf::PdfParser::new(assembler.clone()),
            text: text::TextParser::new(assembler),
        }
    }

    pub fn select(&self, path: &Path) -> IngestResult<&dyn DocumentParser> {
        if !path.exists() {
            return Err(IngestError::NotFound {
                path: path.to_path_buf(),
            });
        }
        match extension(path).as_str() {
            "xml" => Ok(&self.xml),
            "pdf" => Ok(&self.pdf),
            "txt" => Ok(&self.text),
            other => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: other.to_string(),
            }),
        }
    }

    pub fn parse(&self, path: &Path) -> IngestResult<LegalDocument> {
        self.select(path)?.parse(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_is_file_stem() {
        assert_eq!(document_id(Path::new("/data/wpc-2017.xml")), "wpc-2017");
        assert_eq!(extension(Path::new("/data/A.PDF")), "pdf");
        assert_eq!(extension(Path::new("/data/README")), "");
    }

    #[test]
    fn selection_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let adapters = AdapterSet::default();

        let missing = dir.path().join("nope.xml");
        assert!(matches!(
            adapters.select(&missing),
            Err(IngestError::NotFound { .. })
        ));

        let docx = dir.path().join("a.docx");
        std::fs::write(&docx, b"x").unwrap();
        match adapters.select(&docx) {
            Err(IngestError::UnsupportedFormat { extension, .. }) => assert_eq!(extension, "docx"),
            _ => panic!("expected UnsupportedFormat"),
        }

        let upper = dir.path().join("b.TXT");
        std::fs::write(&upper, b"x").unwrap();
        assert_eq!(adapters.select(&upper).unwrap().format(), SourceFormat::Txt);
    }
}
