//! Per-document ingestion errors.
//!
//! These abort one document only. Batch callers log them and move on.

use std::path::PathBuf;

use thiserror::Error;

/// Which step of document processing failed.
pub mod stage {
    pub const READ: &str = "read";
    pub const PDF_EXTRACT: &str = "pdf-extract";
    pub const XML: &str = "xml";
    pub const SAVE: &str = "save";
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("source not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unsupported format '{extension}': {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("{stage} failed for {}: {message}", path.display())]
    ParseFailure {
        path: PathBuf,
        stage: &'static str,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl IngestError {
    pub fn parse(path: impl Into<PathBuf>, stage: &'static str, message: impl ToString) -> Self {
        IngestError::ParseFailure {
            path: path.into(),
            stage,
            message: message.to_string(),
        }
    }

    /// Step name for logging.
    pub fn stage(&self) -> &'static str {
        match self {
            IngestError::NotFound { .. } => stage::READ,
            IngestError::UnsupportedFormat { .. } => "select-adapter",
            IngestError::ParseFailure { stage, .. } => stage,
            IngestError::Io(_) => stage::READ,
            IngestError::Serialize(_) => stage::SAVE,
        }
    }
}

pub type IngestResult<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_path_and_stage() {
        let e = IngestError::parse("/tmp/a.xml", stage::XML, "unexpected end");
        assert_eq!(e.stage(), "xml");
        let msg = e.to_string();
        assert!(msg.contains("/tmp/a.xml"));
        assert!(msg.contains("unexpected end"));

        let e = IngestError::UnsupportedFormat {
            path: "/tmp/a.docx".into(),
            extension: "docx".into(),
        };
        assert!(e.to_string().contains("docx"));
    }
}
