//! Resolves CLI path arguments into a concrete file list. Directories are
//! walked (respecting the configured ignore globs); files given directly
//! are always processed regardless of the ignore list, matching the usual
//! "explicit argument overrides ignore" convention of tools built on the
//! `ignore` crate.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSetBuilder};
use ignore::WalkBuilder;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn"];

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.iter().any(|want| ext.eq_ignore_ascii_case(want)))
}

pub fn collect_markdown_files(paths: &[PathBuf], ignore_globs: &[String]) -> Result<Vec<PathBuf>> {
    let mut builder = GlobSetBuilder::new();
    for pattern in ignore_globs {
        builder.add(Glob::new(pattern).with_context(|| format!("invalid ignore glob {pattern:?}"))?);
    }
    let ignore_set = builder.build().context("build ignore glob set")?;

    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            anyhow::bail!("{}: not a file or directory", path.display());
        }
        for entry in WalkBuilder::new(path).hidden(false).build() {
            let entry = entry.context("walk directory")?;
            let entry_path = entry.path();
            if !entry_path.is_file() || !is_markdown(entry_path) {
                continue;
            }
            if ignore_set.is_match(entry_path) {
                continue;
            }
            files.push(entry_path.to_path_buf());
        }
    }
    Ok(files)
}
