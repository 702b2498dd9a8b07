//! Corpus discovery: walk a directory and pick the files the adapters
//! can read.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::CorpusConfig;

/// Files under `root` matching the include globs and none of the exclude
/// globs, sorted by relative path.
pub fn discover(root: &Path, corpus: &CorpusConfig) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("Corpus root does not exist: {}", root.display());
    }

    let include_set = build_globset(&corpus.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
    ];
    default_excludes.extend(corpus.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut found: Vec<(String, PathBuf)> = Vec::new();

    let walker = WalkDir::new(root).follow_links(corpus.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }
        found.push((rel_str, path.to_path_buf()));
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    tracing::info!(root = %root.display(), files = found.len(), "corpus discovered");
    Ok(found.into_iter().map(|(_, p)| p).collect())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_supported_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "x").unwrap();
        std::fs::write(dir.path().join("sub/a.xml"), "<TEI/>").unwrap();
        std::fs::write(dir.path().join("notes.md"), "x").unwrap();
        std::fs::create_dir_all(dir.path().join("skip")).unwrap();
        std::fs::write(dir.path().join("skip/c.txt"), "x").unwrap();

        let corpus = CorpusConfig {
            exclude_globs: vec!["skip/**".to_string()],
            ..CorpusConfig::default()
        };
        let files = discover(dir.path(), &corpus).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["b.txt", "sub/a.xml"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(discover(Path::new("/no/such/corpus"), &CorpusConfig::default()).is_err());
    }
}
