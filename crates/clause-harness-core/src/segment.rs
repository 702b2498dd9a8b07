//! Structural segmentation: ordered text blocks → ordered [`Section`]s.
//!
//! Adapters turn their source into a stream of [`Block`]s and decide which
//! blocks are headings (markup attributes, or [`LinePatterns`] for plain
//! text). The [`Segmenter`] is format-agnostic: it keeps one open section,
//! closes it on every heading, and appends every other non-blank block to
//! the open section's body. The heading line itself is the first body line.
//!
//! # Guarantees
//!
//! - Sections come out in source order and every body block after the first
//!   heading lands in exactly one section.
//! - Blocks before the first heading are discarded; no synthetic preamble
//!   section is created.
//! - Zero headings yield zero sections.
//! - Two adjacent headings yield a section holding only its heading line.
//! - Section identifiers are unique within the output.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ClauseType, HeadingAnchor, Section};

/// Heading information recognised on a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMatch {
    /// Section number or letter, when the heading carries one.
    pub number: Option<String>,
    pub title: String,
    /// The heading block's text as written in the source. Becomes the
    /// first line of the section body when non-empty.
    pub line: String,
}

/// One unit of source text in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub text: String,
    pub heading: Option<HeadingMatch>,
    pub page: Option<u32>,
}

impl Block {
    pub fn body(text: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            text: text.into(),
            heading: None,
            page,
        }
    }

    pub fn heading(heading: HeadingMatch, page: Option<u32>) -> Self {
        Self {
            text: String::new(),
            heading: Some(heading),
            page,
        }
    }
}

static NUMERIC_DOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)+)\.?\s+([A-Z][^.]*)").expect("valid numeric-dot heading regex")
});

static NUMBERED_CAPS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.\s+([A-Z][^.]+)\.").expect("valid numbered heading regex")
});

static LETTERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]+)\.\s+([A-Z][^.]+)").expect("valid lettered heading regex")
});

static BODY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)+)\b").expect("valid body heading regex"));

/// Ordered heading patterns for unstructured text. The first pattern that
/// matches a line wins; capture 1 is the number, capture 2 the title.
#[derive(Debug, Clone)]
pub struct LinePatterns {
    patterns: Vec<Regex>,
}

impl Default for LinePatterns {
    fn default() -> Self {
        Self {
            patterns: vec![
                NUMERIC_DOT.clone(),
                NUMBERED_CAPS.clone(),
                LETTERED.clone(),
            ],
        }
    }
}

impl LinePatterns {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    /// Match one (already trimmed) line against the patterns in order.
    pub fn match_line(&self, line: &str) -> Option<HeadingMatch> {
        self.patterns.iter().find_map(|re| {
            let caps = re.captures(line)?;
            Some(HeadingMatch {
                number: caps.get(1).map(|m| m.as_str().to_string()),
                title: caps.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
                line: line.to_string(),
            })
        })
    }

    /// Turn page texts into line blocks. Blank lines are dropped; page
    /// numbers are 1-based and only recorded when `paged` is set.
    pub fn blocks_from_pages(&self, pages: &[String], paged: bool) -> Vec<Block> {
        let mut blocks = Vec::new();
        for (idx, page_text) in pages.iter().enumerate() {
            let page = if paged { Some(idx as u32 + 1) } else { None };
            for raw in page_text.lines() {
                let line = raw.trim();
                if line.is_empty() {
                    continue;
                }
                match self.match_line(line) {
                    Some(heading) => blocks.push(Block::heading(heading, page)),
                    None => blocks.push(Block::body(line, page)),
                }
            }
        }
        blocks
    }
}

/// Derive a heading anchor for a section.
///
/// A numeric identifier is used directly. Otherwise the first one or two
/// non-blank lines of the body are checked for a leading dotted number
/// (at least one dot). No match is a normal outcome.
pub fn derive_heading(identifier: Option<&str>, text: &str) -> Option<HeadingAnchor> {
    if let Some(anchor) = identifier.and_then(HeadingAnchor::from_number) {
        return Some(anchor);
    }
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(2)
        .find_map(|line| {
            BODY_NUMBER
                .captures(line)
                .and_then(|c| c.get(1))
                .and_then(|m| HeadingAnchor::from_number(m.as_str()))
        })
}

struct OpenSection {
    id: String,
    raw_number: Option<String>,
    title: String,
    page: Option<u32>,
    body: Vec<String>,
}

/// Format-agnostic section accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Segmenter;

impl Segmenter {
    pub fn new() -> Self {
        Self
    }

    pub fn segment(&self, blocks: impl IntoIterator<Item = Block>) -> Vec<Section> {
        let mut sections = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut current: Option<OpenSection> = None;
        let mut counter = 0usize;
        let mut discarded = 0usize;

        for block in blocks {
            match block.heading {
                Some(heading) => {
                    if let Some(open) = current.take() {
                        sections.push(close(open));
                    }
                    counter += 1;
                    let base_id = heading
                        .number
                        .clone()
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| format!("s{}", counter));
                    let id = unique_id(&mut seen, base_id);
                    let mut body = Vec::new();
                    if !heading.line.trim().is_empty() {
                        body.push(heading.line.trim().to_string());
                    }
                    current = Some(OpenSection {
                        id,
                        raw_number: heading.number,
                        title: heading.title,
                        page: block.page,
                        body,
                    });
                }
                None => {
                    let text = block.text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    match current.as_mut() {
                        Some(open) => open.body.push(text.to_string()),
                        None => discarded += 1,
                    }
                }
            }
        }

        if let Some(open) = current.take() {
            sections.push(close(open));
        }

        if discarded > 0 {
            tracing::debug!(discarded, "blocks before first heading dropped");
        }
        sections
    }
}

fn unique_id(seen: &mut HashMap<String, usize>, base: String) -> String {
    let count = seen.entry(base.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        base
    } else {
        let mut n = *count;
        loop {
            let candidate = format!("{}_{}", base, n);
            if !seen.contains_key(&candidate) {
                seen.insert(candidate.clone(), 1);
                return candidate;
            }
            n += 1;
        }
    }
}

fn close(open: OpenSection) -> Section {
    let text = open.body.join("\n");
    let heading = derive_heading(open.raw_number.as_deref(), &text);
    Section {
        parent_section: heading.as_ref().and_then(|h| h.parent.clone()),
        id: open.id,
        title: open.title,
        text,
        clause_type: ClauseType::Other,
        tags: Default::default(),
        defined_terms: Vec::new(),
        page_number: open.page,
        heading,
    }
}
