//! TOML configuration.
//!
//! Every section is optional. A missing config file at the default path
//! yields [`Config::default`]; an explicitly named file must exist.

use anyhow::{Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use clause_harness_core::chunk::ChunkerConfig;

pub const DEFAULT_CONFIG_PATH: &str = "./config/clh.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_overlap_chars")]
    pub overlap_chars: usize,
    #[serde(default = "default_boundary_window")]
    pub boundary_window: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            overlap_chars: default_overlap_chars(),
            boundary_window: default_boundary_window(),
        }
    }
}

impl ChunkingConfig {
    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig {
            max_chars: self.max_chars,
            overlap_chars: self.overlap_chars,
            boundary_window: self.boundary_window,
        }
    }
}

fn default_max_chars() -> usize {
    1000
}
fn default_overlap_chars() -> usize {
    100
}
fn default_boundary_window() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NormalizeConfig {
    /// Match synonyms on word boundaries only.
    #[serde(default)]
    pub whole_words: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_true")]
    pub save_documents: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            save_documents: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./processed_documents")
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/clh.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_root")]
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: default_corpus_root(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_corpus_root() -> PathBuf {
    PathBuf::from("./data")
}

fn default_include_globs() -> Vec<String> {
    vec![
        "**/*.xml".to_string(),
        "**/*.pdf".to_string(),
        "**/*.txt".to_string(),
    ]
}

/// Load and validate a config file.
///
/// When `path` is the default path and no file exists there, the built-in
/// defaults are used.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Config::default()
    } else {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    };
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    config.chunking.chunker_config().validate()?;

    for pattern in config
        .corpus
        .include_globs
        .iter()
        .chain(config.corpus.exclude_globs.iter())
    {
        Glob::new(pattern).with_context(|| format!("Invalid corpus glob: {}", pattern))?;
    }
    Ok(())
}
