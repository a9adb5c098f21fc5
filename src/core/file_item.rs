//! File identity for action graph bookkeeping.
//!
//! A `FileItem` is nothing more than a path with value semantics: two items
//! naming the same path are the same file as far as the graph is concerned.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A file produced or consumed by an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileItem {
    path: PathBuf,
}

impl FileItem {
    /// Create a file item for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileItem { path: path.into() }
    }

    /// Get the path of this file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing this file.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// File name including extension (`Engine.cpp`).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its final extension (`Engine`).
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Case-insensitive extension check; `ext` is given without the dot.
    pub fn has_extension(&self, ext: &str) -> bool {
        self.path
            .extension()
            .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
    }

    /// Same path with the final extension replaced.
    pub fn with_extension(&self, ext: &str) -> FileItem {
        FileItem::new(self.path.with_extension(ext))
    }

    /// Same path with `suffix` appended to the file name (`a.obj` -> `a.obj.response`).
    pub fn with_suffix(&self, suffix: &str) -> FileItem {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        FileItem::new(PathBuf::from(name))
    }
}

impl fmt::Display for FileItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl From<PathBuf> for FileItem {
    fn from(path: PathBuf) -> Self {
        FileItem::new(path)
    }
}

impl From<&Path> for FileItem {
    fn from(path: &Path) -> Self {
        FileItem::new(path)
    }
}

impl AsRef<Path> for FileItem {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
