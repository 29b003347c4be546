/*!
 * Graph store: pages and journals as text files
 *
 * Every write goes through `atomic_write`: serialize the full new content
 * to a temp file in the graph's scratch directory, then rename over the
 * target. A reader never observes a half-written file; a crash before the
 * rename leaves the previous state intact.
 */

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::config::GraphConfig;
use crate::error::{Result, TetherError};

const PAGE_EXTENSION: &str = ".md";

/// Atomically replace `target` with `data`.
///
/// The temp file lives in `scratch_dir` (same filesystem as the graph, so
/// the rename is atomic). Scratch and target parent directories are
/// created on demand. `TETHER_SLEEP_BEFORE_RENAME_MS` is a crash-window
/// test hook, matching the interruption the atomicity tests simulate.
pub(crate) fn atomic_write(target: &Path, scratch_dir: &Path, data: &str) -> Result<()> {
    fs::create_dir_all(scratch_dir)?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    let file_name = target
        .file_name()
        .ok_or_else(|| TetherError::Config(format!("not a writable path: {}", target.display())))?;
    let tmp = scratch_dir.join(format!("{}.tmp", file_name.to_string_lossy()));

    fs::write(&tmp, data)?;

    if let Ok(ms) = std::env::var("TETHER_SLEEP_BEFORE_RENAME_MS") {
        if let Ok(ms) = ms.parse::<u64>() {
            std::thread::sleep(std::time::Duration::from_millis(ms));
        }
    }

    fs::rename(&tmp, target)?;
    Ok(())
}

/// Resolve a page name to its file path (`<pages>/<Name>.md`)
pub fn page_path(config: &GraphConfig, name: &str) -> PathBuf {
    let file_name = if name.to_lowercase().ends_with(PAGE_EXTENSION) {
        name.to_string()
    } else {
        format!("{}{}", name, PAGE_EXTENSION)
    };
    config.pages_dir().join(file_name)
}

/// Create a page with `initial` content if it does not exist yet
pub fn ensure_page(config: &GraphConfig, name: &str, initial: &str) -> Result<PathBuf> {
    let path = page_path(config, name);
    if !path.exists() {
        atomic_write(&path, &config.scratch_dir(), initial)?;
        debug!(page = name, path = %path.display(), "created page");
    }
    Ok(path)
}

/// Append a paragraph to a page, creating the page if needed.
///
/// The new content is separated from the existing text by a blank line and
/// the file always ends with a single newline.
pub fn append_to_page(config: &GraphConfig, name: &str, content: &str) -> Result<PathBuf> {
    let path = ensure_page(config, name, "")?;
    let current = fs::read_to_string(&path)?;
    let updated = format!("{}\n\n{}\n", current.trim_end(), content.trim());
    atomic_write(&path, &config.scratch_dir(), &updated)?;
    Ok(path)
}

/// Append a timestamped bullet to today's journal
pub fn append_journal(config: &GraphConfig, content: &str) -> Result<PathBuf> {
    append_journal_at(config, content, Local::now())
}

/// Append a timestamped bullet to the journal for `when`
pub fn append_journal_at(
    config: &GraphConfig,
    content: &str,
    when: DateTime<Local>,
) -> Result<PathBuf> {
    let file_name = format!("{}.md", format_date(&when, &config.journal_format)?);
    let path = config.journals_dir().join(file_name);

    let entry = format!("- {} {}\n", when.format("%H:%M"), content.trim());
    let updated = if path.exists() {
        let current = fs::read_to_string(&path)?;
        format!("{}\n{}", current.trim_end(), entry)
    } else {
        entry
    };

    atomic_write(&path, &config.scratch_dir(), &updated)?;
    Ok(path)
}

/// Render `when` with a user-supplied strftime pattern.
///
/// chrono surfaces an unknown specifier as a formatting error only when the
/// output is actually written, so capture it here instead of panicking at
/// the call site.
fn format_date(when: &DateTime<Local>, pattern: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", when.format(pattern))
        .map_err(|_| TetherError::Config(format!("invalid journal date format: {}", pattern)))?;
    Ok(out)
}
