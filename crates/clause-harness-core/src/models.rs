//! Canonical document model shared by every adapter and by the chunker.
//!
//! A [`LegalDocument`] is the sole output of parsing and the sole input to
//! chunking. Sections and definitions are owned by their document; chunks
//! refer back to them by identifier only.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Role a party plays in an agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartyRole {
    Seller,
    Buyer,
    Purchaser,
    Vendor,
    Contractor,
    Lender,
    Guarantor,
    Trustee,
    Agent,
    Other,
}

/// Role keywords in match order. `purchaser` precedes `buyer` so that a
/// context naming both resolves to the more specific role.
const ROLE_KEYWORDS: &[(&str, PartyRole)] = &[
    ("seller", PartyRole::Seller),
    ("vendor", PartyRole::Vendor),
    ("purchaser", PartyRole::Purchaser),
    ("buyer", PartyRole::Buyer),
    ("contractor", PartyRole::Contractor),
    ("lender", PartyRole::Lender),
    ("guarantor", PartyRole::Guarantor),
    ("trustee", PartyRole::Trustee),
    ("agent", PartyRole::Agent),
];

impl PartyRole {
    /// Resolve a role from surrounding text. Falls back to [`PartyRole::Other`].
    pub fn from_context(text: &str) -> Self {
        let lower = text.to_lowercase();
        ROLE_KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, role)| *role)
            .unwrap_or(PartyRole::Other)
    }
}

/// Fixed clause taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClauseType {
    #[serde(rename = "Parties")]
    Parties,
    #[serde(rename = "Definitions")]
    Definitions,
    #[serde(rename = "Purchase and Sale")]
    PurchaseAndSale,
    #[serde(rename = "Price")]
    Price,
    #[serde(rename = "Adjustments")]
    Adjustments,
    #[serde(rename = "Closing")]
    Closing,
    #[serde(rename = "Conditions Precedent")]
    ConditionsPrecedent,
    #[serde(rename = "Representations and Warranties")]
    RepresentationsWarranties,
    #[serde(rename = "Covenants")]
    Covenants,
    #[serde(rename = "Indemnities")]
    Indemnities,
    #[serde(rename = "Limitations")]
    Limitations,
    #[serde(rename = "Governing Law")]
    GoverningLaw,
    #[serde(rename = "Dispute Resolution")]
    DisputeResolution,
    #[serde(rename = "Notices")]
    Notices,
    #[serde(rename = "Termination")]
    Termination,
    #[serde(rename = "Force Majeure")]
    ForceMajeure,
    #[serde(rename = "Miscellaneous")]
    Miscellaneous,
    #[serde(rename = "Other")]
    Other,
}

impl ClauseType {
    pub fn label(&self) -> &'static str {
        match self {
            ClauseType::Parties => "Parties",
            ClauseType::Definitions => "Definitions",
            ClauseType::PurchaseAndSale => "Purchase and Sale",
            ClauseType::Price => "Price",
            ClauseType::Adjustments => "Adjustments",
            ClauseType::Closing => "Closing",
            ClauseType::ConditionsPrecedent => "Conditions Precedent",
            ClauseType::RepresentationsWarranties => "Representations and Warranties",
            ClauseType::Covenants => "Covenants",
            ClauseType::Indemnities => "Indemnities",
            ClauseType::Limitations => "Limitations",
            ClauseType::GoverningLaw => "Governing Law",
            ClauseType::DisputeResolution => "Dispute Resolution",
            ClauseType::Notices => "Notices",
            ClauseType::Termination => "Termination",
            ClauseType::ForceMajeure => "Force Majeure",
            ClauseType::Miscellaneous => "Miscellaneous",
            ClauseType::Other => "Other",
        }
    }
}

impl fmt::Display for ClauseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Source format tag recorded on every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceFormat {
    Xml,
    Pdf,
    Txt,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceFormat::Xml => "XML",
            SourceFormat::Pdf => "PDF",
            SourceFormat::Txt => "TXT",
        };
        f.write_str(s)
    }
}

/// A party to the agreement. Extraction is best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub role: PartyRole,
    pub jurisdiction: Option<String>,
    pub entity_type: Option<String>,
}

/// Document-level metadata.
///
/// `jurisdiction` always holds a value; extractors fall back to a generic
/// country code when nothing more specific resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub document_id: String,
    pub title: String,
    pub document_type: String,
    pub jurisdiction: String,
    pub governing_law: Option<String>,
    pub industry: String,
    pub effective_date: Option<NaiveDate>,
    pub execution_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub parties: Vec<Party>,
    pub source_file: String,
    pub source_format: SourceFormat,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
}

/// Position of a section in the document's numbering hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeadingAnchor {
    pub number: String,
    pub level: usize,
    pub parent: Option<String>,
}

impl HeadingAnchor {
    /// Build an anchor from a dotted number such as `11.4.2`.
    ///
    /// Returns `None` unless every dot-separated component is a non-empty
    /// run of ASCII digits. A single trailing dot (`5.`) is tolerated.
    pub fn from_number(number: &str) -> Option<Self> {
        let number = number.trim();
        let number = number.strip_suffix('.').unwrap_or(number);
        if number.is_empty() {
            return None;
        }
        let parts: Vec<&str> = number.split('.').collect();
        if parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
        {
            return None;
        }
        let parent = if parts.len() > 1 {
            Some(parts[..parts.len() - 1].join("."))
        } else {
            None
        };
        Some(Self {
            number: number.to_string(),
            level: parts.len(),
            parent,
        })
    }
}

/// One structural section of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique within the document.
    pub id: String,
    pub title: String,
    pub text: String,
    pub clause_type: ClauseType,
    pub tags: BTreeSet<String>,
    /// Defined terms referenced in the text.
    pub defined_terms: Vec<String>,
    pub parent_section: Option<String>,
    pub page_number: Option<u32>,
    pub heading: Option<HeadingAnchor>,
}

/// A `"Term" means ...` pair. Terms are not unique within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub term: String,
    pub definition: String,
    pub section_id: Option<String>,
}

/// Canonical parse output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalDocument {
    pub metadata: DocumentMetadata,
    pub sections: Vec<Section>,
    pub definitions: Vec<Definition>,
}

impl LegalDocument {
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    Clause,
    Definition,
}

impl ChunkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Clause => "clause",
            ChunkType::Definition => "definition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub chunk_id: String,
    pub document_id: String,
    pub section_id: String,
    pub chunk_index: usize,
    pub chunk_type: ChunkType,
    pub tags: BTreeSet<String>,
    pub source_citation: String,
    pub heading_number: Option<String>,
    pub heading_level: Option<usize>,
    pub parent_heading_number: Option<String>,
}

/// A retrieval unit. Immutable once produced by the chunker, apart from
/// the embedding slot filled by an external provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedChunk {
    pub metadata: ChunkMetadata,
    pub content: String,
    /// SHA-256 (hex) of `content`.
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}
