//! Defined-term extraction.
//!
//! Two passes. The narrow pass reads sections titled like "Definitions"
//! and attaches the owning section id. The broad pass reads the whole raw
//! text for inline parenthetical definitions and leaves the section unset.
//! Results are not deduplicated.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Definition, Section};

static QUOTED_MEANS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["“]([^"”\n]{1,120})["”]\s+means\s+([^.]+\.?)"#)
        .expect("valid quoted definition regex")
});

static QUOTED_SHALL_MEAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["“]([^"”\n]{1,120})["”]\s+shall\s+mean\s+([^.]+\.?)"#)
        .expect("valid shall-mean definition regex")
});

static INLINE_PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["“]([^"”\n]{1,120})["”]\s*\([^)]*\)\s*(?:shall\s+mean|means)\s+([^.]+\.?)"#)
        .expect("valid inline definition regex")
});

#[derive(Debug, Clone)]
pub struct DefinitionExtractor {
    section_patterns: Vec<Regex>,
    inline_patterns: Vec<Regex>,
}

impl Default for DefinitionExtractor {
    fn default() -> Self {
        Self {
            section_patterns: vec![QUOTED_MEANS.clone(), QUOTED_SHALL_MEAN.clone()],
            inline_patterns: vec![INLINE_PARENTHETICAL.clone()],
        }
    }
}

impl DefinitionExtractor {
    pub fn new(section_patterns: Vec<Regex>, inline_patterns: Vec<Regex>) -> Self {
        Self {
            section_patterns,
            inline_patterns,
        }
    }

    /// Narrow pass: every definitions-titled section, pattern by pattern.
    pub fn from_sections(&self, sections: &[Section]) -> Vec<Definition> {
        let mut out = Vec::new();
        for section in sections
            .iter()
            .filter(|s| s.title.to_lowercase().contains("definition"))
        {
            for pattern in &self.section_patterns {
                out.extend(
                    scan(pattern, &section.text)
                        .map(|(term, definition)| Definition {
                            term,
                            definition,
                            section_id: Some(section.id.clone()),
                        }),
                );
            }
        }
        out
    }

    /// Broad pass over the raw document text.
    pub fn inline(&self, raw_text: &str) -> Vec<Definition> {
        self.inline_patterns
            .iter()
            .flat_map(|pattern| scan(pattern, raw_text).collect::<Vec<_>>())
            .map(|(term, definition)| Definition {
                term,
                definition,
                section_id: None,
            })
            .collect()
    }

    /// Narrow pass results first, then broad pass results.
    pub fn extract(&self, sections: &[Section], raw_text: &str) -> Vec<Definition> {
        let mut defs = self.from_sections(sections);
        defs.extend(self.inline(raw_text));
        tracing::debug!(count = defs.len(), "definitions extracted");
        defs
    }
}

fn scan<'a>(pattern: &'a Regex, text: &'a str) -> impl Iterator<Item = (String, String)> + 'a {
    pattern.captures_iter(text).filter_map(|caps| {
        let term = caps.get(1)?.as_str().trim();
        let definition = collapse_ws(caps.get(2)?.as_str());
        if term.is_empty() || definition.is_empty() {
            return None;
        }
        Some((term.to_string(), definition))
    })
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
