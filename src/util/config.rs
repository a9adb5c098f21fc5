//! Configuration file support for vcgraph.
//!
//! Toolchain configuration lives in two locations:
//! - Global: `<config dir>/vcgraph/toolchain.toml` - User-wide defaults
//! - Project: `.vcgraph/toolchain.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::toolchain::{CompilerKind, PlatformSettings};

/// Toolchain configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Compiler and tool selection
    pub toolchain: ToolchainSettings,

    /// Platform-wide build switches
    pub platform: Option<PlatformSettings>,
}

/// Compiler and tool selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Compiler release (vs2019, vs2022, clang, intel)
    pub compiler: Option<CompilerKind>,

    /// Compiler version string, recorded in generated PCH stubs
    pub compiler_version: Option<String>,

    /// MSVC toolset version (e.g. 14.29.30133)
    pub toolchain_version: Option<String>,

    /// Windows SDK version, for version reporting
    pub windows_sdk_version: Option<String>,

    /// Path to the compiler (cl.exe, clang-cl.exe)
    pub cl: Option<PathBuf>,

    /// Path to the linker
    pub link: Option<PathBuf>,

    /// Path to the librarian
    pub lib: Option<PathBuf>,

    /// Path to the resource compiler
    pub rc: Option<PathBuf>,

    /// Linker wrapper
    pub link_filter: Option<PathBuf>,

    /// Compiler wrapper that produces dependency lists
    pub cl_filter: Option<PathBuf>,

    /// Build tool invoked for timing actions (defaults to this executable)
    pub build_tool: Option<PathBuf>,

    /// System include directories
    pub include_paths: Vec<PathBuf>,

    /// System library directories
    pub library_paths: Vec<PathBuf>,

    /// Root directory include paths are made relative to
    pub root_dir: Option<PathBuf>,
}

impl ToolchainConfig {
    /// Load toolchain configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read toolchain config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse toolchain config: {}", path.display()))
    }

    /// Load toolchain configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!(
                    "Failed to load toolchain config from {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Save toolchain configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self)
            .with_context(|| "failed to serialize toolchain config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write toolchain config: {}", path.display()))?;

        Ok(())
    }

    /// Platform settings, or the defaults when none are configured.
    pub fn platform_settings(&self) -> PlatformSettings {
        self.platform.clone().unwrap_or_default()
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: ToolchainConfig) {
        let tc = other.toolchain;
        if tc.compiler.is_some() {
            self.toolchain.compiler = tc.compiler;
        }
        if tc.compiler_version.is_some() {
            self.toolchain.compiler_version = tc.compiler_version;
        }
        if tc.toolchain_version.is_some() {
            self.toolchain.toolchain_version = tc.toolchain_version;
        }
        if tc.windows_sdk_version.is_some() {
            self.toolchain.windows_sdk_version = tc.windows_sdk_version;
        }
        if tc.cl.is_some() {
            self.toolchain.cl = tc.cl;
        }
        if tc.link.is_some() {
            self.toolchain.link = tc.link;
        }
        if tc.lib.is_some() {
            self.toolchain.lib = tc.lib;
        }
        if tc.rc.is_some() {
            self.toolchain.rc = tc.rc;
        }
        if tc.link_filter.is_some() {
            self.toolchain.link_filter = tc.link_filter;
        }
        if tc.cl_filter.is_some() {
            self.toolchain.cl_filter = tc.cl_filter;
        }
        if tc.build_tool.is_some() {
            self.toolchain.build_tool = tc.build_tool;
        }
        if !tc.include_paths.is_empty() {
            self.toolchain.include_paths = tc.include_paths;
        }
        if !tc.library_paths.is_empty() {
            self.toolchain.library_paths = tc.library_paths;
        }
        if tc.root_dir.is_some() {
            self.toolchain.root_dir = tc.root_dir;
        }
        if other.platform.is_some() {
            self.platform = other.platform;
        }
    }
}

/// Load merged toolchain configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.vcgraph/toolchain.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_toolchain_config(global_path: Option<&Path>, project_path: &Path) -> ToolchainConfig {
    let mut config = ToolchainConfig::default();

    if let Some(global) = global_path {
        if global.exists() {
            config.merge(ToolchainConfig::load_or_default(global));
        }
    }

    if project_path.exists() {
        config.merge(ToolchainConfig::load_or_default(project_path));
    }

    config
}

/// Get the global vcgraph config directory.
pub fn global_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "vcgraph").map(|d| d.config_dir().to_path_buf())
}

/// Get the global toolchain config path.
pub fn global_toolchain_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("toolchain.toml"))
}

/// Get the project toolchain config path (.vcgraph/toolchain.toml).
pub fn project_toolchain_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".vcgraph").join("toolchain.toml")
}
