//! Source file discovery.
//!
//! Walks the requested roots, applies the include/exclude globs and the
//! size cap, and returns a sorted, deduplicated file list. Discovery order
//! feeds function input order, so sorting here is what makes whole runs
//! reproducible across machines.

use std::path::PathBuf;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::WalkDir;

use crate::core::config::FileDiscoveryConfig;
use crate::core::errors::{DraupnirError, Result};

fn build_globs(patterns: &[String], field: &'static str) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            DraupnirError::config_field(format!("invalid glob pattern `{pattern}`: {e}"), field)
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| DraupnirError::config_field(e.to_string(), field))
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Discover every analyzable file under the given roots.
pub fn discover_files(roots: &[PathBuf], config: &FileDiscoveryConfig) -> Result<Vec<PathBuf>> {
    let includes = build_globs(&config.include_patterns, "files.include_patterns")?;
    let excludes = build_globs(&config.exclude_patterns, "files.exclude_patterns")?;
    let max_bytes = config.max_file_size_bytes();

    let mut files = Vec::new();
    for root in roots {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry));
        for entry in walker {
            let entry = entry.map_err(|e| {
                DraupnirError::io(format!("failed to walk {}", root.display()), e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !includes.is_match(path) || excludes.is_match(path) {
                continue;
            }
            match entry.metadata() {
                Ok(metadata) if metadata.len() > max_bytes => {
                    debug!(
                        file = %path.display(),
                        size = metadata.len(),
                        "skipping oversized file"
                    );
                    continue;
                }
                Ok(_) => {}
                Err(_) => continue,
            }
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}
