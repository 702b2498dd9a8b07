//! Clause classification and tag extraction over ordered keyword rules.
//!
//! Classification is single-valued and first-match-wins: every rule is
//! tried against the lower-cased title, then the rules allowed to look at
//! content are tried against the lower-cased content, and the first hit
//! decides. Tagging is non-exclusive: every matching rule contributes.
//!
//! Rule order is the contract. `purchase`/`sale` precede `price`, so a
//! "Purchase Price" heading is Purchase and Sale.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ClauseType, Section};

/// Where a rule's keyword is looked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScope {
    Title,
    Content,
    Anywhere,
}

impl MatchScope {
    fn title(&self) -> bool {
        matches!(self, MatchScope::Title | MatchScope::Anywhere)
    }

    fn content(&self) -> bool {
        matches!(self, MatchScope::Content | MatchScope::Anywhere)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseRule {
    pub keyword: String,
    pub clause_type: ClauseType,
    pub scope: MatchScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    pub keyword: String,
    pub tag: String,
    pub scope: MatchScope,
}

use ClauseType as C;
use MatchScope as S;

/// Default clause rules, in priority order.
pub const DEFAULT_CLAUSE_RULES: &[(&str, ClauseType, MatchScope)] = &[
    ("definition", C::Definitions, S::Title),
    ("parties", C::Parties, S::Title),
    ("purchase", C::PurchaseAndSale, S::Title),
    ("sale", C::PurchaseAndSale, S::Title),
    ("price", C::Price, S::Title),
    ("payment", C::Price, S::Title),
    ("rate", C::Price, S::Title),
    ("delivery", C::PurchaseAndSale, S::Title),
    ("adjustment", C::Adjustments, S::Title),
    ("true-up", C::Adjustments, S::Anywhere),
    ("closing", C::Closing, S::Title),
    ("conditions precedent", C::ConditionsPrecedent, S::Anywhere),
    ("condition", C::ConditionsPrecedent, S::Title),
    ("representation", C::RepresentationsWarranties, S::Title),
    ("warrant", C::RepresentationsWarranties, S::Title),
    ("covenant", C::Covenants, S::Title),
    ("indemnit", C::Indemnities, S::Title),
    ("indemnif", C::Indemnities, S::Anywhere),
    ("limitation", C::Limitations, S::Title),
    ("liabilit", C::Limitations, S::Title),
    ("governing law", C::GoverningLaw, S::Title),
    ("governed by the laws", C::GoverningLaw, S::Content),
    ("dispute", C::DisputeResolution, S::Title),
    ("arbitration", C::DisputeResolution, S::Anywhere),
    ("notice", C::Notices, S::Title),
    ("force majeure", C::ForceMajeure, S::Anywhere),
    ("termination", C::Termination, S::Title),
    ("term", C::Termination, S::Title),
    ("assignment", C::Miscellaneous, S::Title),
    ("miscellaneous", C::Miscellaneous, S::Title),
    ("general provisions", C::Miscellaneous, S::Title),
    ("audit", C::Covenants, S::Title),
    ("continuity", C::Covenants, S::Title),
    ("service", C::Covenants, S::Title),
];

/// Default tag rules. Tags form a set, so order does not matter here.
pub const DEFAULT_TAG_RULES: &[(&str, &str, MatchScope)] = &[
    ("rate", "pricing", S::Title),
    ("price", "pricing", S::Title),
    ("delivery", "delivery", S::Title),
    ("law", "governing_law", S::Title),
    ("closing", "closing", S::Title),
    ("condition", "conditions", S::Title),
    ("indemnit", "indemnification", S::Title),
    ("indemnif", "indemnification", S::Anywhere),
    ("termination", "termination", S::Title),
    ("liquidated damages", "liquidated_damages", S::Content),
    ("curtailment", "curtailment", S::Content),
    ("transmission", "transmission", S::Content),
    ("arbitration", "arbitration", S::Content),
];

static QUOTED_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["“]([A-Z][^"”]{0,59})["”]"#).expect("valid quoted term regex")
});

static CAPS_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2,})\b").expect("valid caps token regex"));

const MAX_DEFINED_TERMS: usize = 50;

/// Ordered-rule classifier.
#[derive(Debug, Clone)]
pub struct ClauseClassifier {
    clause_rules: Vec<ClauseRule>,
    tag_rules: Vec<TagRule>,
}

impl Default for ClauseClassifier {
    fn default() -> Self {
        let clause_rules = DEFAULT_CLAUSE_RULES
            .iter()
            .map(|(keyword, clause_type, scope)| ClauseRule {
                keyword: keyword.to_string(),
                clause_type: *clause_type,
                scope: *scope,
            })
            .collect();
        let tag_rules = DEFAULT_TAG_RULES
            .iter()
            .map(|(keyword, tag, scope)| TagRule {
                keyword: keyword.to_string(),
                tag: tag.to_string(),
                scope: *scope,
            })
            .collect();
        Self::new(clause_rules, tag_rules)
    }
}

impl ClauseClassifier {
    /// Keywords are lower-cased here so matching is always case-insensitive.
    pub fn new(clause_rules: Vec<ClauseRule>, tag_rules: Vec<TagRule>) -> Self {
        let clause_rules = clause_rules
            .into_iter()
            .map(|r| ClauseRule {
                keyword: r.keyword.to_lowercase(),
                ..r
            })
            .collect();
        let tag_rules = tag_rules
            .into_iter()
            .map(|r| TagRule {
                keyword: r.keyword.to_lowercase(),
                ..r
            })
            .collect();
        Self {
            clause_rules,
            tag_rules,
        }
    }

    pub fn clause_rules(&self) -> &[ClauseRule] {
        &self.clause_rules
    }

    pub fn classify(&self, title: &str, content: &str) -> ClauseType {
        let title = title.to_lowercase();
        if let Some(rule) = self
            .clause_rules
            .iter()
            .find(|r| r.scope.title() && title.contains(&r.keyword))
        {
            return rule.clause_type;
        }
        let content = content.to_lowercase();
        self.clause_rules
            .iter()
            .find(|r| r.scope.content() && content.contains(&r.keyword))
            .map(|r| r.clause_type)
            .unwrap_or(ClauseType::Other)
    }

    pub fn extract_tags(&self, title: &str, content: &str) -> BTreeSet<String> {
        let title = title.to_lowercase();
        let content = content.to_lowercase();
        self.tag_rules
            .iter()
            .filter(|r| {
                (r.scope.title() && title.contains(&r.keyword))
                    || (r.scope.content() && content.contains(&r.keyword))
            })
            .map(|r| r.tag.clone())
            .collect()
    }

    /// Fill clause type, tags and referenced terms on every section.
    pub fn annotate(&self, sections: &mut [Section]) {
        for section in sections.iter_mut() {
            section.clause_type = self.classify(&section.title, &section.text);
            section.tags.extend(self.extract_tags(&section.title, &section.text));
            section.defined_terms = referenced_terms(&section.text);
        }
    }
}

/// Defined terms referenced in `text`: quoted capitalised phrases, then
/// all-caps tokens. First-seen order, no duplicates, at most 50.
pub fn referenced_terms(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut terms = Vec::new();
    let quoted = QUOTED_TERM.captures_iter(text).filter_map(|c| c.get(1));
    let caps = CAPS_TOKEN.captures_iter(text).filter_map(|c| c.get(1));
    for m in quoted.chain(caps) {
        let term = m.as_str().trim();
        if term.is_empty() || !seen.insert(term.to_string()) {
            continue;
        }
        terms.push(term.to_string());
        if terms.len() == MAX_DEFINED_TERMS {
            break;
        }
    }
    terms
}
