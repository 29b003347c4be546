/*!
 * Listing and naive search over the graph's text files
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::config::GraphConfig;
use crate::error::{Result, TetherError};

/// Sort key for page listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Name,
    Mtime,
}

/// Details of one page file
#[derive(Debug, Clone, Serialize)]
pub struct PageDetails {
    pub name: String,
    pub file_path: PathBuf,
    /// Modification time as fractional seconds since the Unix epoch
    pub mtime: f64,
    pub size: u64,
}

fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("md") {
            files.push(path);
        }
    }
    Ok(files)
}

fn details_for(path: &Path) -> Result<PageDetails> {
    let metadata = fs::metadata(path)?;
    let mtime = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(PageDetails {
        name,
        file_path: path.to_path_buf(),
        mtime,
        size: metadata.len(),
    })
}

/// List pages with sorting and an optional limit
pub fn list_pages(
    config: &GraphConfig,
    sort_by: SortBy,
    reverse: bool,
    limit: Option<usize>,
) -> Result<Vec<PageDetails>> {
    let mut pages = markdown_files(&config.pages_dir())?
        .iter()
        .map(|p| details_for(p))
        .collect::<Result<Vec<_>>>()?;

    match sort_by {
        SortBy::Name => pages.sort_by(|a, b| a.name.cmp(&b.name)),
        SortBy::Mtime => {
            pages.sort_by(|a, b| a.mtime.total_cmp(&b.mtime).then_with(|| a.name.cmp(&b.name)))
        }
    }
    if reverse {
        pages.reverse();
    }
    if let Some(limit) = limit {
        pages.truncate(limit);
    }

    Ok(pages)
}

/// Sorted journal names (file stems)
pub fn list_journals(config: &GraphConfig) -> Result<Vec<String>> {
    let mut names: Vec<String> = markdown_files(&config.journals_dir())?
        .iter()
        .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
        .collect();
    names.sort();
    Ok(names)
}

/// Case-insensitive substring counts across all pages and journals.
///
/// Returns `(file name, count)` pairs for files with at least one hit,
/// ordered by descending count (name ascending on ties).
pub fn term_counts(config: &GraphConfig, term: &str) -> Result<Vec<(String, usize)>> {
    if term.is_empty() {
        return Err(TetherError::Validation(
            "search term must not be empty".to_string(),
        ));
    }
    let term_lower = term.to_lowercase();

    let mut files = markdown_files(&config.pages_dir())?;
    files.extend(markdown_files(&config.journals_dir())?);

    let mut hits = Vec::new();
    for path in files {
        let text = fs::read_to_string(&path)?;
        let count = text.to_lowercase().matches(&term_lower).count();
        if count > 0 {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            hits.push((name, count));
        }
    }

    hits.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    Ok(hits)
}
