//! Filesystem utilities.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Write a file only when its contents differ, so unchanged intermediates
/// keep their timestamps. Returns whether the file was written.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<bool> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == contents {
            return Ok(false);
        }
    }
    write_string(path, contents)?;
    Ok(true)
}

/// Append one line to a file, creating it if needed.
pub fn append_line(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open file for append: {}", path.display()))?;
    writeln!(file, "{}", line)
        .with_context(|| format!("failed to append to file: {}", path.display()))
}

/// Expand source globs relative to `base`.
///
/// Matches are sorted and de-duplicated so planned actions do not depend on
/// directory iteration order. A pattern matching nothing is traced, not an
/// error.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let entries = glob(&full_pattern.to_string_lossy())
            .with_context(|| format!("invalid glob pattern: {}", pattern))?;

        let before = results.len();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => results.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("glob error: {}", e),
            }
        }
        if results.len() == before {
            tracing::debug!("`{}` matched no files under {}", pattern, base.display());
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Path of `path` relative to `base`, if it lies under `base`.
pub fn relative_to(base: &Path, path: &Path) -> Option<PathBuf> {
    if !path.starts_with(base) {
        return None;
    }
    pathdiff::diff_paths(path, base)
}
