//! # Clause Harness
//!
//! Turns legal agreements (TEI-style XML, PDF, plain text) into a
//! canonical [`LegalDocument`](clause_harness_core::models::LegalDocument)
//! and then into bounded, provenance-carrying chunks.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌───────────────────────┐   ┌──────────┐
//! │  Adapters   │──▶│   Normalize + Chunk   │──▶│  SQLite  │
//! │ XML/PDF/TXT │   │ (clause-harness-core) │   │ clauses  │
//! └─────────────┘   └───────────┬───────────┘   └──────────┘
//!                               │
//!                               ▼
//!                  JSON documents / JSONL chunks
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! clh ingest data/*.xml --stats     # parse, normalize, save JSON
//! clh chunk data/apa.txt            # chunks as JSON Lines
//! clh analyze --output analysis.json
//! clh init && clh index data/*.pdf  # persist into SQLite
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`adapters`] | Per-format parsers |
//! | [`pipeline`] | Parse → normalize → chunk orchestration |
//! | [`export`] | JSON and JSON Lines output |
//! | [`stats`] | Corpus statistics |
//! | [`discover`] | Corpus file discovery |
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Per-document errors |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite chunk store |

pub mod adapters;
pub mod config;
pub mod db;
pub mod discover;
pub mod error;
pub mod export;
pub mod migrate;
pub mod pipeline;
pub mod sqlite_store;
pub mod stats;
