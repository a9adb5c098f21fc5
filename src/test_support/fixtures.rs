//! On-disk project fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::toolchain_in;
use crate::builder::graph::BuildGraph;
use crate::builder::toolchain::{CompilerKind, PlatformSettings, ToolchainEnvironment};
use crate::core::FileItem;

/// A throwaway project directory.
///
/// Sources are written for real so stub headers, response files and
/// manifests land somewhere the test can inspect.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        ProjectFixture {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a source file and return its item.
    pub fn source(&self, relative: &str, contents: &str) -> FileItem {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        FileItem::new(path)
    }

    /// Intermediate directory for a module's compile outputs.
    pub fn output_dir(&self, module: &str) -> PathBuf {
        self.path(&format!("Intermediate/Win64/{}", module))
    }

    pub fn toolchain(&self, compiler: CompilerKind) -> ToolchainEnvironment {
        toolchain_in(self.root(), compiler, PlatformSettings::default())
    }

    pub fn toolchain_with(
        &self,
        compiler: CompilerKind,
        settings: PlatformSettings,
    ) -> ToolchainEnvironment {
        toolchain_in(self.root(), compiler, settings)
    }

    pub fn graph(&self) -> BuildGraph {
        BuildGraph::new(self.root())
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
