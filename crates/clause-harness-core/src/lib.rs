//! # Clause Harness Core
//!
//! I/O-free logic for turning legal agreements into retrieval chunks:
//! the document model, terminology table, structural segmenter, clause
//! classifier, terminology normalizer, definition and metadata
//! extraction, the chunker, and the embedding and storage traits.
//!
//! Source adapters, the pipeline, configuration and the CLI live in the
//! `clause-harness` crate.

pub mod chunk;
pub mod classify;
pub mod definitions;
pub mod embedding;
pub mod metadata;
pub mod models;
pub mod normalize;
pub mod segment;
pub mod store;
pub mod terminology;
