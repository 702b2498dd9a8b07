//! Best-effort document metadata heuristics.
//!
//! Every function here is total: an unresolved field comes back as `None`
//! or as its documented default, never as an error.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{DocumentMetadata, Party, PartyRole, SourceFormat};
use crate::terminology::title_case;

pub const UNKNOWN_TITLE: &str = "Unknown Document";
pub const DEFAULT_JURISDICTION: &str = "US";
pub const DEFAULT_INDUSTRY: &str = "General";

const DATE_LITERAL: &str = r"[A-Za-z]+\.?\s+\d{1,2},\s*\d{4}|\d{1,2}\s+[A-Za-z]+\s+\d{4}|\d{4}-\d{2}-\d{2}";

static EFFECTIVE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)effective\s+(?:date\s+)?(?:(?:as\s+)?of\s+)?({DATE_LITERAL})"
    ))
    .expect("valid effective date regex")
});

static DATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)dated\s+(?:as\s+of\s+)?({DATE_LITERAL})"))
        .expect("valid dated regex")
});

static DAY_OF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})(?:st|nd|rd|th)?\s+day\s+of\s+([A-Za-z]+),?\s+(\d{4})")
        .expect("valid day-of regex")
});

static TERMINATION_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:terminat|expir)[a-z]*\s+on\s+({DATE_LITERAL})"
    ))
    .expect("valid termination date regex")
});

static GOVERNED_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)governed\s+by\s+(?:and\s+construed\s+in\s+accordance\s+with\s+)?(?:the\s+)?laws?\s+of\s+(?:the\s+)?(?:state\s+of\s+|province\s+of\s+)?([A-Za-z ]+)",
    )
    .expect("valid governed-by regex")
});

static CONSTRUED_UNDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)construed\s+(?:in\s+)?accordance\s+with\s+(?:the\s+)?laws?\s+of\s+(?:the\s+)?(?:state\s+of\s+|province\s+of\s+)?([A-Za-z ]+)",
    )
    .expect("valid construed regex")
});

static BETWEEN_PARTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\bbetween\s+([^,(\n]{2,100}),?[^(\n]{0,80}\(\s*(?:the\s+)?["“']?([A-Za-z ]{2,40})["”']?\s*\)"#,
    )
    .expect("valid between-party regex")
});

static AND_PARTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\band\s+([^,(\n]{2,100}),?[^(\n]{0,80}\(\s*(?:the\s+)?["“']([A-Za-z ]{2,40})["”']\s*\)"#,
    )
    .expect("valid and-party regex")
});

static CORPORATE_PARTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b([A-Z][A-Z&,. ]*?(?:INC|LLC|CORP|CORPORATION|COMPANY|COOPERATIVE|L\.P|LP)\.?)[,\s]*\(\s*(?:[Tt]he\s+)?["“']?([A-Za-z ]{2,40})["”']?\s*\)"#,
    )
    .expect("valid corporate-party regex")
});

/// Governing-law phrase fragment → jurisdiction code. Longer names that
/// contain shorter ones come first.
const JURISDICTIONS: &[(&str, &str)] = &[
    ("new york", "US-NY"),
    ("delaware", "US-DE"),
    ("california", "US-CA"),
    ("texas", "US-TX"),
    ("north dakota", "US-ND"),
    ("south dakota", "US-SD"),
    ("colorado", "US-CO"),
    ("nebraska", "US-NE"),
    ("montana", "US-MT"),
    ("wyoming", "US-WY"),
    ("minnesota", "US-MN"),
    ("iowa", "US-IA"),
    ("illinois", "US-IL"),
    ("arkansas", "US-AR"),
    ("kansas", "US-KS"),
    ("new mexico", "US-NM"),
    ("missouri", "US-MO"),
    ("oklahoma", "US-OK"),
    ("louisiana", "US-LA"),
    ("florida", "US-FL"),
    ("georgia", "US-GA"),
    ("west virginia", "US-WV"),
    ("virginia", "US-VA"),
    ("pennsylvania", "US-PA"),
    ("new jersey", "US-NJ"),
    ("massachusetts", "US-MA"),
    ("washington", "US-WA"),
    ("oregon", "US-OR"),
    ("england", "GB-ENG"),
    ("ontario", "CA-ON"),
    ("alberta", "CA-AB"),
    ("british columbia", "CA-BC"),
];

/// (label, words that must all appear). Checked in order.
const INDUSTRY_RULES: &[(&str, &[&str])] = &[
    ("Power", &["power", "electric"]),
    ("LNG", &["lng"]),
    ("LNG", &["natural gas"]),
    ("Oil & Gas", &["oil"]),
    ("Oil & Gas", &["petroleum"]),
    ("Infrastructure", &["infrastructure"]),
];

const DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("wholesale power contract", "Wholesale Power Contract"),
    ("power purchase agreement", "Power Purchase Agreement"),
    ("asset purchase agreement", "Asset Purchase Agreement"),
    ("stock purchase agreement", "Stock Purchase Agreement"),
    ("share purchase agreement", "Share Purchase Agreement"),
    ("plan of merger", "Merger Agreement"),
    ("merger agreement", "Merger Agreement"),
    ("credit agreement", "Credit Agreement"),
    ("loan agreement", "Loan Agreement"),
    ("supply agreement", "Supply Agreement"),
    ("service agreement", "Service Agreement"),
    ("purchase agreement", "Purchase Agreement"),
];

/// Per-format fallback when no document type phrase is found.
pub fn default_document_type(format: SourceFormat) -> &'static str {
    match format {
        SourceFormat::Xml => "Wholesale Power Contract",
        SourceFormat::Pdf | SourceFormat::Txt => "Purchase Agreement",
    }
}

/// Parse `Month D, YYYY`, `D Month YYYY` or `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let cleaned = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = cleaned.replace(". ", " ").replace(",", ", ").replace(",  ", ", ");
    ["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cleaned.trim(), fmt).ok())
}

fn date_from_parts(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    parse_date(&format!("{} {}, {}", month, day, year))
}

/// Dates found in running text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateFacts {
    pub effective: Option<NaiveDate>,
    pub execution: Option<NaiveDate>,
    pub termination: Option<NaiveDate>,
}

/// The first recognised date becomes the effective date, the second the
/// execution date. Patterns are scanned one after another.
pub fn extract_dates(text: &str) -> DateFacts {
    let mut found: Vec<NaiveDate> = Vec::new();
    for re in [&*EFFECTIVE_DATE, &*DATED] {
        found.extend(
            re.captures_iter(text)
                .filter_map(|c| c.get(1))
                .filter_map(|m| parse_date(m.as_str())),
        );
    }
    found.extend(DAY_OF.captures_iter(text).filter_map(|c| {
        date_from_parts(c.get(1)?.as_str(), c.get(2)?.as_str(), c.get(3)?.as_str())
    }));

    let termination = TERMINATION_DATE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .find_map(|m| parse_date(m.as_str()));

    let facts = DateFacts {
        effective: found.first().copied(),
        execution: found.get(1).copied(),
        termination,
    };
    if facts.effective.is_none() {
        tracing::debug!("no effective date found");
    }
    facts
}

/// Resolve a place name to a jurisdiction code.
pub fn resolve_jurisdiction(place: &str) -> Option<&'static str> {
    let lower = place.to_lowercase();
    JURISDICTIONS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, code)| *code)
}

/// First governing-law clause that names a known jurisdiction.
pub fn governing_law(text: &str) -> Option<String> {
    let law = [&*GOVERNED_BY, &*CONSTRUED_UNDER]
        .into_iter()
        .flat_map(|re| re.captures_iter(text).filter_map(|c| c.get(1)).collect::<Vec<_>>())
        .find_map(|m| resolve_jurisdiction(m.as_str()))
        .map(str::to_string);
    if law.is_none() {
        tracing::debug!("governing law unresolved");
    }
    law
}

/// `needle` occurs at the start of a word (prefix match, so "electric"
/// also finds "electricity").
fn has_word_prefix(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(idx, _)| {
        haystack[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}

pub fn industry(text: &str) -> String {
    let lower = text.to_lowercase();
    INDUSTRY_RULES
        .iter()
        .find(|(_, words)| words.iter().all(|w| has_word_prefix(&lower, w)))
        .map(|(label, _)| label.to_string())
        .unwrap_or_else(|| DEFAULT_INDUSTRY.to_string())
}

/// Legal entity form from name tokens.
pub fn entity_type(name: &str) -> Option<String> {
    let tokens: Vec<String> = name
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|t| t.replace('.', "").to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    let has = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));
    let kind = if has(&["cooperative"]) {
        "Cooperative Corporation"
    } else if has(&["inc", "incorporated", "corp", "corporation"]) {
        "Corporation"
    } else if has(&["llc"]) {
        "Limited Liability Company"
    } else if has(&["lp"]) {
        "Limited Partnership"
    } else if has(&["company", "co"]) {
        "Company"
    } else {
        return None;
    };
    Some(kind.to_string())
}

pub fn party(name: &str, role_context: &str) -> Party {
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    Party {
        entity_type: entity_type(&name),
        role: PartyRole::from_context(role_context),
        jurisdiction: None,
        name,
    }
}

/// Parties named in running text, deduplicated by case-insensitive name.
pub fn extract_parties(text: &str) -> Vec<Party> {
    let mut parties: Vec<Party> = Vec::new();
    for re in [&*BETWEEN_PARTY, &*AND_PARTY, &*CORPORATE_PARTY] {
        for caps in re.captures_iter(text) {
            let (Some(name), Some(role)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let name = name.as_str().trim().trim_end_matches(',').trim();
            if name.len() < 2 {
                continue;
            }
            push_party(&mut parties, party(name, role.as_str()));
        }
    }
    parties
}

/// Append unless a party with the same name (ignoring case) exists.
pub fn push_party(parties: &mut Vec<Party>, party: Party) {
    let key = party.name.to_lowercase();
    if !parties.iter().any(|p| p.name.to_lowercase() == key) {
        parties.push(party);
    }
}

fn is_upper(line: &str) -> bool {
    line.chars().any(char::is_alphabetic)
        && line
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase)
}

/// First all-caps line among the first 20 that mentions an agreement.
pub fn title_from_text(text: &str) -> Option<String> {
    text.lines()
        .take(20)
        .map(str::trim)
        .find(|l| l.chars().count() > 10 && is_upper(l) && l.to_lowercase().contains("agreement"))
        .map(title_case)
}

pub fn document_type(title: &str, text: &str, format: SourceFormat) -> String {
    let title = title.to_lowercase();
    let head: String = text.chars().take(4000).collect::<String>().to_lowercase();
    DOCUMENT_TYPES
        .iter()
        .find(|(needle, _)| title.contains(needle))
        .or_else(|| DOCUMENT_TYPES.iter().find(|(needle, _)| head.contains(needle)))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| default_document_type(format).to_string())
}

/// Run every text heuristic. Adapters with richer sources overwrite the
/// fields they know better.
pub fn extract_metadata(
    document_id: &str,
    source_file: &str,
    source_format: SourceFormat,
    text: &str,
) -> DocumentMetadata {
    let title = title_from_text(text).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let dates = extract_dates(text);
    let governing_law = governing_law(text);
    DocumentMetadata {
        document_id: document_id.to_string(),
        document_type: document_type(&title, text, source_format),
        title,
        jurisdiction: governing_law
            .clone()
            .unwrap_or_else(|| DEFAULT_JURISDICTION.to_string()),
        governing_law,
        industry: industry(text),
        effective_date: dates.effective,
        execution_date: dates.execution,
        termination_date: dates.termination,
        parties: extract_parties(text),
        source_file: source_file.to_string(),
        source_format,
        processed_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn parse_supported_formats() {
        assert_eq!(parse_date("March 5, 2019"), ymd(2019, 3, 5));
        assert_eq!(parse_date("march 15,2019"), ymd(2019, 3, 15));
        assert_eq!(parse_date("5 March 2019"), ymd(2019, 3, 5));
        assert_eq!(parse_date("2019-03-05"), ymd(2019, 3, 5));
        assert_eq!(parse_date("Smarch 5, 2019"), None);
        assert_eq!(parse_date("February 30, 2019"), None);
    }

    #[test]
    fn effective_then_execution() {
        let text = "This Agreement is effective as of January 1, 2020 and dated as of December 15, 2019.";
        let d = extract_dates(text);
        assert_eq!(d.effective, ymd(2020, 1, 1));
        assert_eq!(d.execution, ymd(2019, 12, 15));
        assert_eq!(d.termination, None);
    }

    #[test]
    fn day_of_and_termination() {
        let text = "Made this 3rd day of June, 2018. This Agreement shall terminate on 30 June 2028.";
        let d = extract_dates(text);
        assert_eq!(d.effective, ymd(2018, 6, 3));
        assert_eq!(d.termination, ymd(2028, 6, 30));
    }

    #[test]
    fn governing_law_codes() {
        assert_eq!(
            governing_law("This Agreement shall be governed by the laws of the State of New York.").as_deref(),
            Some("US-NY")
        );
        assert_eq!(
            governing_law("construed in accordance with the laws of North Dakota").as_deref(),
            Some("US-ND")
        );
        assert_eq!(
            governing_law("governed by the laws of the State of West Virginia").as_deref(),
            Some("US-WV")
        );
        assert_eq!(resolve_jurisdiction("Commonwealth of Virginia"), Some("US-VA"));
        assert_eq!(governing_law("governed by the laws of Atlantis"), None);
        assert_eq!(governing_law("no clause here"), None);
    }

    #[test]
    fn industry_rules_in_order() {
        assert_eq!(industry("electric power supply"), "Power");
        assert_eq!(industry("Electricity and POWER"), "Power");
        assert_eq!(industry("LNG cargoes"), "LNG");
        assert_eq!(industry("crude oil"), "Oil & Gas");
        assert_eq!(industry("the soil survey"), "General");
        assert_eq!(industry("toll road infrastructure"), "Infrastructure");
        assert_eq!(industry("software licence"), "General");
    }

    #[test]
    fn entity_types() {
        assert_eq!(entity_type("Acme Inc.").as_deref(), Some("Corporation"));
        assert_eq!(entity_type("Acme Holdings, LLC").as_deref(), Some("Limited Liability Company"));
        assert_eq!(entity_type("Acme Partners, L.P.").as_deref(), Some("Limited Partnership"));
        assert_eq!(
            entity_type("Basin Electric Power Cooperative").as_deref(),
            Some("Cooperative Corporation")
        );
        assert_eq!(entity_type("Prince Trading").as_deref(), None);
    }

    #[test]
    fn parties_between_and() {
        let text = "This Agreement is made between Acme Power Inc., a Delaware corporation (the \"Seller\") and Big Buyer LLC (the \"Buyer\").";
        let parties = extract_parties(text);
        assert_eq!(parties.len(), 2);
        assert_eq!(parties[0].name, "Acme Power Inc.");
        assert_eq!(parties[0].role, PartyRole::Seller);
        assert_eq!(parties[0].entity_type.as_deref(), Some("Corporation"));
        assert_eq!(parties[1].name, "Big Buyer LLC");
        assert_eq!(parties[1].role, PartyRole::Buyer);
    }

    #[test]
    fn corporate_party_deduplicated() {
        let text = "ACME CORP (\"Purchaser\") agrees. ACME CORP (\"Purchaser\") pays.";
        let parties = extract_parties(text);
        assert_eq!(parties.len(), 1);
        assert_eq!(parties[0].role, PartyRole::Purchaser);
    }

    #[test]
    fn title_detection() {
        let text = "\n\nASSET PURCHASE AGREEMENT\nbetween parties\n";
        assert_eq!(title_from_text(text).as_deref(), Some("Asset Purchase Agreement"));
        assert_eq!(title_from_text("short\nNot Upper Agreement"), None);
    }

    #[test]
    fn document_type_falls_back_per_format() {
        assert_eq!(
            document_type("Asset Purchase Agreement", "", SourceFormat::Pdf),
            "Asset Purchase Agreement"
        );
        assert_eq!(document_type("Unknown Document", "", SourceFormat::Xml), "Wholesale Power Contract");
        assert_eq!(document_type("Unknown Document", "", SourceFormat::Txt), "Purchase Agreement");
    }

    #[test]
    fn metadata_defaults_when_nothing_matches() {
        let meta = extract_metadata("doc", "doc.txt", SourceFormat::Txt, "lorem ipsum");
        assert_eq!(meta.title, UNKNOWN_TITLE);
        assert_eq!(meta.jurisdiction, DEFAULT_JURISDICTION);
        assert_eq!(meta.industry, DEFAULT_INDUSTRY);
        assert!(meta.parties.is_empty());
        assert!(meta.effective_date.is_none());
        assert!(meta.governing_law.is_none());
    }
}
