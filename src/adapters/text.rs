//! Plain-text adapter. Also the shared line-oriented path used by the
//! PDF adapter once pages have been extracted.

use std::path::Path;

use clause_harness_core::metadata;
use clause_harness_core::models::{LegalDocument, SourceFormat};

use super::{document_id, Assembler, DocumentParser};
use crate::error::{stage, IngestError, IngestResult};

/// Segment page texts with the line heading patterns and run the text
/// metadata heuristics over the joined pages.
pub(crate) fn parse_pages(
    assembler: &Assembler,
    path: &Path,
    pages: &[String],
    format: SourceFormat,
) -> LegalDocument {
    let raw_text = pages.join("\n");
    let meta = metadata::extract_metadata(
        &document_id(path),
        &path.display().to_string(),
        format,
        &raw_text,
    );
    let blocks = assembler
        .line_patterns
        .blocks_from_pages(pages, format == SourceFormat::Pdf);
    assembler.assemble(meta, blocks, &raw_text)
}

#[derive(Debug, Clone, Default)]
pub struct TextParser {
    assembler: Assembler,
}

impl TextParser {
    pub fn new(assembler: Assembler) -> Self {
        Self { assembler }
    }

    pub fn parse_str(&self, path: &Path, text: &str) -> LegalDocument {
        parse_pages(&self.assembler, path, &[text.to_string()], SourceFormat::Txt)
    }
}

impl DocumentParser for TextParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::Txt
    }

    fn parse(&self, path: &Path) -> IngestResult<LegalDocument> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| IngestError::parse(path, stage::READ, e))?;
        Ok(self.parse_str(path, &text))
    }
}
