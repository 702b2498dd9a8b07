//! TEI-style markup adapter.
//!
//! Paragraph elements (`p`, any namespace prefix) are the blocks. A
//! paragraph is a heading when it has an `xml:id` and either a
//! `toc_number` or a `base` attribute. `orgName` and `date` elements nested
//! in a paragraph feed party and date metadata, using the paragraph text
//! as context.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use clause_harness_core::metadata;
use clause_harness_core::models::{LegalDocument, SourceFormat};
use clause_harness_core::segment::{Block, HeadingMatch};
use clause_harness_core::terminology::title_case;

use super::{document_id, Assembler, DocumentParser};
use crate::error::{stage, IngestError, IngestResult};

#[derive(Debug, Clone, Default)]
struct DateMark {
    when: Option<String>,
    text: String,
}

#[derive(Debug, Clone, Default)]
struct Paragraph {
    xml_id: Option<String>,
    toc_number: Option<String>,
    base: Option<String>,
    ana: Option<String>,
    text: String,
    orgs: Vec<String>,
    dates: Vec<DateMark>,
}

impl Paragraph {
    fn from_start(e: &BytesStart) -> Self {
        Self {
            xml_id: attr(e, b"xml:id"),
            toc_number: attr(e, b"toc_number"),
            base: attr(e, b"base"),
            ana: attr(e, b"ana"),
            ..Self::default()
        }
    }

    fn is_heading(&self) -> bool {
        self.xml_id.is_some() && (self.toc_number.is_some() || self.base.is_some())
    }

    fn section_id(&self) -> Option<String> {
        self.toc_number.clone().or_else(|| {
            self.xml_id
                .as_deref()
                .map(|id| id.strip_prefix("H_").unwrap_or(id).to_string())
        })
    }

    fn title(&self) -> String {
        match (&self.base, &self.toc_number) {
            (Some(base), _) => title_case(&base.replace('_', " ")),
            (None, Some(toc)) => format!("Section {}", toc),
            (None, None) => String::new(),
        }
    }
}

enum Capture {
    Org(String),
    Date(DateMark),
}

/// Paragraphs in document order plus all text content.
struct MarkupScan {
    paragraphs: Vec<Paragraph>,
    raw_text: String,
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Append a text run, spacing it from the previous one unless it starts
/// with closing punctuation.
fn push_run(buf: &mut String, run: &str) {
    let run = run.trim();
    if run.is_empty() {
        return;
    }
    let glued = run.starts_with([',', '.', ';', ':', ')', '”', '"']);
    if !buf.is_empty() && !buf.ends_with(['\n', ' ', '(']) && !glued {
        buf.push(' ');
    }
    buf.push_str(run);
}

#[derive(Error, Debug)]
enum ScanError {
    #[error(transparent)]
    Markup(#[from] quick_xml::Error),

    #[error("input ended inside an open paragraph")]
    Truncated,
}

fn scan(xml: &str) -> Result<MarkupScan, ScanError> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut paragraphs = Vec::new();
    let mut raw_text = String::new();
    let mut current: Option<Paragraph> = None;
    let mut depth = 0usize;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    if current.is_none() {
                        current = Some(Paragraph::from_start(&e));
                    }
                    depth += 1;
                }
                b"orgName" if current.is_some() && capture.is_none() => {
                    capture = Some(Capture::Org(String::new()));
                }
                b"date" if current.is_some() && capture.is_none() => {
                    capture = Some(Capture::Date(DateMark {
                        when: attr(&e, b"when"),
                        text: String::new(),
                    }));
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" if current.is_none() => paragraphs.push(Paragraph::from_start(&e)),
                b"date" => {
                    if let Some(p) = current.as_mut() {
                        p.dates.push(DateMark {
                            when: attr(&e, b"when"),
                            text: String::new(),
                        });
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                let text = t.unescape().map_err(quick_xml::Error::from)?;
                on_text(&text, &mut current, &mut capture, &mut raw_text);
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).to_string();
                on_text(&text, &mut current, &mut capture, &mut raw_text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"p" if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(p) = current.take() {
                            paragraphs.push(p);
                        }
                        raw_text.push('\n');
                    }
                }
                b"orgName" => match (capture.take(), current.as_mut()) {
                    (Some(Capture::Org(name)), Some(p)) => {
                        if !name.trim().is_empty() {
                            p.orgs.push(name.trim().to_string());
                        }
                    }
                    (other, _) => capture = other,
                },
                b"date" => match (capture.take(), current.as_mut()) {
                    (Some(Capture::Date(mark)), Some(p)) => p.dates.push(mark),
                    (other, _) => capture = other,
                },
                _ => {}
            },
            Event::Eof if depth > 0 || current.is_some() => {
                return Err(ScanError::Truncated);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(MarkupScan {
        paragraphs,
        raw_text,
    })
}

fn on_text(
    text: &str,
    current: &mut Option<Paragraph>,
    capture: &mut Option<Capture>,
    raw_text: &mut String,
) {
    push_run(raw_text, text);
    if let Some(p) = current.as_mut() {
        push_run(&mut p.text, text);
    }
    match capture.as_mut() {
        Some(Capture::Org(name)) => push_run(name, text),
        Some(Capture::Date(mark)) => push_run(&mut mark.text, text),
        None => {}
    }
}

#[derive(Debug, Clone, Default)]
pub struct XmlParser {
    assembler: Assembler,
}

impl XmlParser {
    pub fn new(assembler: Assembler) -> Self {
        Self { assembler }
    }

    /// Parse markup already read into memory.
    pub fn parse_str(&self, path: &Path, xml: &str) -> IngestResult<LegalDocument> {
        let scan = scan(xml).map_err(|e| IngestError::parse(path, stage::XML, e))?;
        let doc_id = document_id(path);
        let source_file = path.display().to_string();

        let mut meta =
            metadata::extract_metadata(&doc_id, &source_file, SourceFormat::Xml, &scan.raw_text);

        if let Some(title) = scan
            .paragraphs
            .iter()
            .find(|p| p.ana.as_deref().is_some_and(|a| a.contains("title-page")))
            .map(|p| p.text.trim().to_string())
            .filter(|t| !t.is_empty())
        {
            meta.document_type =
                metadata::document_type(&title, &scan.raw_text, SourceFormat::Xml);
            meta.title = title;
        }

        let mut parties = Vec::new();
        let mut effective = None;
        let mut execution = None;
        for p in &scan.paragraphs {
            for org in &p.orgs {
                let mut party = metadata::party(org, &p.text);
                party.jurisdiction = metadata::resolve_jurisdiction(&p.text).map(str::to_string);
                metadata::push_party(&mut parties, party);
            }
            let context = p.text.to_lowercase();
            for mark in &p.dates {
                let Some(date) = mark
                    .when
                    .as_deref()
                    .and_then(metadata::parse_date)
                    .or_else(|| metadata::parse_date(&mark.text))
                else {
                    continue;
                };
                if context.contains("effective") {
                    effective.get_or_insert(date);
                } else if context.contains("execution") || context.contains("made as of") {
                    execution.get_or_insert(date);
                }
            }
        }
        if !parties.is_empty() {
            meta.parties = parties;
        }
        if effective.is_some() {
            meta.effective_date = effective;
        }
        if execution.is_some() {
            meta.execution_date = execution;
        }

        if meta.governing_law.is_none() {
            let law = scan
                .paragraphs
                .iter()
                .filter(|p| {
                    p.base.as_deref().is_some_and(|b| b.contains("governing"))
                        || p.text.to_lowercase().contains("governing law")
                })
                .find_map(|p| metadata::resolve_jurisdiction(&p.text));
            if let Some(code) = law {
                meta.governing_law = Some(code.to_string());
                meta.jurisdiction = code.to_string();
            }
        }

        let blocks: Vec<Block> = scan
            .paragraphs
            .iter()
            .map(|p| {
                if p.is_heading() {
                    Block::heading(
                        HeadingMatch {
                            number: p.section_id(),
                            title: p.title(),
                            line: match &p.toc_number {
                                Some(toc) => format!("{} {}", toc, p.text),
                                None => p.text.clone(),
                            },
                        },
                        None,
                    )
                } else {
                    Block::body(p.text.clone(), None)
                }
            })
            .collect();

        Ok(self.assembler.assemble(meta, blocks, &scan.raw_text))
    }
}

impl DocumentParser for XmlParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::Xml
    }

    fn parse(&self, path: &Path) -> IngestResult<LegalDocument> {
        let xml = std::fs::read_to_string(path)
            .map_err(|e| IngestError::parse(path, stage::READ, e))?;
        self.parse_str(path, &xml)
    }
}
