//! Hashing utilities for action fingerprints.

use std::path::Path;

use sha2::{Digest, Sha256};

/// A hasher for building fingerprints from multiple components.
///
/// Components are separated so that `["ab", "c"]` and `["a", "bc"]` hash
/// differently.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    /// Add multiple strings to the fingerprint.
    pub fn update_strs<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for s in items {
            self.update_str(s);
        }
        self
    }

    /// Add a path component.
    pub fn update_path(&mut self, path: &Path) -> &mut Self {
        self.update_str(&path.to_string_lossy())
    }

    /// Add a named group of paths; the count keeps adjacent groups apart.
    pub fn update_paths<'a>(
        &mut self,
        label: &str,
        paths: impl IntoIterator<Item = &'a Path>,
    ) -> &mut Self {
        self.update_str(label);
        let mut count = 0usize;
        for path in paths {
            self.update_path(path);
            count += 1;
        }
        self.update_str(&count.to_string())
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}
