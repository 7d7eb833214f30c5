use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use walkdir::WalkDir;

use crate::utils::expand_tilde;

/// Maximum number of sources in one batch (prevent resource exhaustion)
const MAX_SOURCES: usize = 10_000;

/// Expands the given paths into an ordered list of source files
///
/// Files named directly are always kept. Directories are walked recursively
/// in file-name order without following symlinks, keeping only files whose
/// extension matches `extension` (case-insensitive) when one is given.
/// Duplicates are dropped, first occurrence wins.
///
/// # Errors
///
/// Returns an error if:
/// - A path does not exist
/// - A directory cannot be walked
/// - More than [`MAX_SOURCES`] (10,000) files are found
pub fn collect_sources(paths: &[PathBuf], extension: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    let mut seen = HashSet::new();

    for path in paths {
        let path = expand_tilde(path);

        if path.is_dir() {
            for entry in WalkDir::new(&path).follow_links(false).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("Failed to walk directory: {}", path.display()))?;
                if entry.file_type().is_file() && has_extension(entry.path(), extension) {
                    push_unique(&mut sources, &mut seen, entry.into_path());
                }
            }
        } else if path.exists() {
            push_unique(&mut sources, &mut seen, path);
        } else {
            bail!("Source not found: {}", path.display());
        }

        if sources.len() > MAX_SOURCES {
            bail!("Too many source files (more than {})", MAX_SOURCES);
        }
    }

    Ok(sources)
}

fn has_extension(path: &Path, extension: Option<&str>) -> bool {
    let Some(wanted) = extension else {
        return true;
    };
    let wanted = wanted.trim_start_matches('.');
    path.extension().is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted))
}

fn push_unique(sources: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>, path: PathBuf) {
    if seen.insert(path.clone()) {
        sources.push(path);
    }
}
