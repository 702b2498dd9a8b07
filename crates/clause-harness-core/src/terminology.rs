//! Static terminology data: canonical terms with their synonyms, and a
//! glossary of domain abbreviations.
//!
//! Both lists are ordered. The [`Normalizer`](crate::normalize::Normalizer)
//! walks them in order, so the order is part of the output contract.

/// Canonical term → synonyms, in rewrite order.
pub const LEGAL_TERM_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "purchase_price_adjustment",
        &["true-up", "price adjustment", "purchase price true-up"],
    ),
    ("material_adverse_effect", &["material adverse change", "MAC", "MAE"]),
    ("conditions_precedent", &["closing conditions", "conditions to closing"]),
    (
        "representations_warranties",
        &["reps and warranties", "representations", "warranties"],
    ),
    ("indemnification", &["indemnity", "indemnities", "hold harmless"]),
    ("force_majeure", &["act of god", "unforeseeable circumstances"]),
    ("governing_law", &["applicable law", "choice of law"]),
    ("dispute_resolution", &["arbitration", "litigation", "mediation"]),
    ("termination", &["expiry", "expiration", "end"]),
    ("assignment", &["transfer", "novation"]),
];

/// Abbreviation (or short key) → expansion phrase.
pub const INFRA_FINANCE_TERMS: &[(&str, &str)] = &[
    ("CROD", "Contract Rate of Delivery"),
    ("transmission_service", "electrical transmission services"),
    ("point_of_delivery", "delivery point"),
    ("billing_demand", "maximum demand charge"),
    ("energy_charge", "electricity usage charge"),
    ("curtailment", "reduction in delivery"),
    ("liquidated_damages", "predetermined damages"),
    ("patronage", "cooperative member benefits"),
    ("operating_procedures", "operational guidelines"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTerm {
    pub canonical: String,
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryEntry {
    pub abbreviation: String,
    pub expansion: String,
}

/// Ordered terminology table consumed by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminologyTable {
    pub terms: Vec<CanonicalTerm>,
    pub glossary: Vec<GlossaryEntry>,
}

impl TerminologyTable {
    pub fn new(terms: Vec<CanonicalTerm>, glossary: Vec<GlossaryEntry>) -> Self {
        Self { terms, glossary }
    }
}

impl Default for TerminologyTable {
    fn default() -> Self {
        let terms = LEGAL_TERM_SYNONYMS
            .iter()
            .map(|(canonical, synonyms)| CanonicalTerm {
                canonical: canonical.to_string(),
                synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        let glossary = INFRA_FINANCE_TERMS
            .iter()
            .map(|(abbreviation, expansion)| GlossaryEntry {
                abbreviation: abbreviation.to_string(),
                expansion: expansion.to_string(),
            })
            .collect();
        Self { terms, glossary }
    }
}

/// Title-case every alphabetic run: first letter upper, rest lower.
///
/// `"governing law"` → `"Governing Law"`, `"true-up"` → `"True-Up"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Render a canonical key for display: `material_adverse_effect` →
/// `Material Adverse Effect`.
pub fn display_form(canonical: &str) -> String {
    title_case(&canonical.replace('_', " "))
}

/// Tag form of a phrase: lower case, spaces replaced by underscores.
pub fn tag_form(phrase: &str) -> String {
    phrase.to_lowercase().replace(' ', "_")
}
