//! Terminology normalization: canonical tags and canonical phrasing.
//!
//! Rewrites are sequential. Each synonym pattern is applied to the output
//! of the previous one, in table order, so a later rule may rewrite text
//! produced by an earlier rule.

use std::collections::BTreeSet;

use regex::{NoExpand, Regex, RegexBuilder};

use crate::models::LegalDocument;
use crate::terminology::{display_form, tag_form, TerminologyTable};

struct Rewrite {
    pattern: Regex,
    replacement: String,
}

struct TagMatcher {
    patterns: Vec<Regex>,
    tag: String,
}

/// Compiled form of a [`TerminologyTable`].
pub struct Normalizer {
    rewrites: Vec<Rewrite>,
    matchers: Vec<TagMatcher>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&TerminologyTable::default(), false)
    }
}

impl Normalizer {
    /// Compile the table. With `whole_words`, phrases only match on word
    /// boundaries; otherwise any case-insensitive substring matches.
    pub fn new(table: &TerminologyTable, whole_words: bool) -> Self {
        let mut rewrites = Vec::new();
        let mut matchers = Vec::new();

        for term in &table.terms {
            let replacement = display_form(&term.canonical);
            let patterns: Vec<Regex> = term
                .synonyms
                .iter()
                .filter_map(|s| phrase_regex(s, whole_words))
                .collect();
            for pattern in &patterns {
                rewrites.push(Rewrite {
                    pattern: pattern.clone(),
                    replacement: replacement.clone(),
                });
            }
            matchers.push(TagMatcher {
                patterns,
                tag: term.canonical.clone(),
            });
        }

        for entry in &table.glossary {
            let patterns = [&entry.abbreviation, &entry.expansion]
                .into_iter()
                .filter_map(|s| phrase_regex(s, whole_words))
                .collect();
            matchers.push(TagMatcher {
                patterns,
                tag: tag_form(&entry.abbreviation),
            });
        }

        Self { rewrites, matchers }
    }

    /// Tags found in `text`, in addition to the ones already present.
    pub fn augment_tags(&self, tags: &BTreeSet<String>, text: &str) -> BTreeSet<String> {
        let mut out = tags.clone();
        for matcher in &self.matchers {
            if matcher.patterns.iter().any(|p| p.is_match(text)) {
                out.insert(matcher.tag.clone());
            }
        }
        out
    }

    pub fn rewrite(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rewrites {
            if rule.pattern.is_match(&out) {
                out = rule
                    .pattern
                    .replace_all(&out, NoExpand(&rule.replacement))
                    .into_owned();
            }
        }
        out
    }

    /// Tags are computed on the text as given, before rewriting.
    pub fn normalize(&self, tags: &BTreeSet<String>, text: &str) -> (BTreeSet<String>, String) {
        (self.augment_tags(tags, text), self.rewrite(text))
    }

    /// Normalize every section of a document in place.
    pub fn normalize_document(&self, doc: &mut LegalDocument) {
        for section in doc.sections.iter_mut() {
            let (tags, text) = self.normalize(&section.tags, &section.text);
            section.tags = tags;
            section.text = text;
        }
    }
}

fn phrase_regex(phrase: &str, whole_words: bool) -> Option<Regex> {
    if phrase.trim().is_empty() {
        return None;
    }
    let escaped = regex::escape(phrase);
    let pattern = if whole_words {
        format!(r"\b{}\b", escaped)
    } else {
        escaped
    };
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(phrase, error = %e, "skipping terminology phrase");
            None
        }
    }
}
