//! PDF adapter built on `pdf-extract`.
//!
//! Pages are separated by form feeds in the extracted text; each line keeps
//! the 1-based number of the page it came from.

use std::path::Path;

use clause_harness_core::models::{LegalDocument, SourceFormat};

use super::text::parse_pages;
use super::{Assembler, DocumentParser};
use crate::error::{stage, IngestError, IngestResult};

#[derive(Debug, Clone, Default)]
pub struct PdfParser {
    assembler: Assembler,
}

/// Split extracted text into pages. A trailing empty page left by a final
/// form feed is dropped.
pub fn split_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text.split('\x0C').map(str::to_string).collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

impl PdfParser {
    pub fn new(assembler: Assembler) -> Self {
        Self { assembler }
    }

    pub fn parse_bytes(&self, path: &Path, bytes: &[u8]) -> IngestResult<LegalDocument> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| IngestError::parse(path, stage::PDF_EXTRACT, e))?;
        let pages = split_pages(&text);
        if text.trim().is_empty() {
            tracing::debug!(path = %path.display(), "pdf has no extractable text");
        }
        Ok(parse_pages(&self.assembler, path, &pages, SourceFormat::Pdf))
    }
}

impl DocumentParser for PdfParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::Pdf
    }

    fn parse(&self, path: &Path) -> IngestResult<LegalDocument> {
        let bytes = std::fs::read(path).map_err(|e| IngestError::parse(path, stage::READ, e))?;
        self.parse_bytes(path, &bytes)
    }
}
