//! Command implementations

pub mod flags;
pub mod plan;
pub mod toolchain;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use vcgraph::builder::{resolve_environment, BuildDescription, ToolchainEnvironment};
use vcgraph::util::config::{
    global_toolchain_config_path, load_toolchain_config, project_toolchain_config_path,
    ToolchainConfig,
};

/// A loaded build description with its resolved toolchain.
pub struct Session {
    pub description: BuildDescription,
    /// Directory the description's relative paths are resolved against
    pub base: PathBuf,
    pub toolchain: ToolchainEnvironment,
}

/// Absolute directory containing `path`.
fn base_dir(path: &Path) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let absolute = cwd.join(path);
    Ok(absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(cwd))
}

/// Merge global, project and description toolchain settings.
pub fn load_config(
    global: Option<PathBuf>,
    project_root: &Path,
    overrides: Option<ToolchainConfig>,
) -> ToolchainConfig {
    let global = global.or_else(global_toolchain_config_path);
    let mut config =
        load_toolchain_config(global.as_deref(), &project_toolchain_config_path(project_root));
    if let Some(overrides) = overrides {
        config.merge(overrides);
    }
    config
}

impl Session {
    pub fn load(path: &Path, global_config: Option<PathBuf>) -> Result<Self> {
        let mut description = BuildDescription::load(path)?;
        let base = base_dir(path)?;
        description.resolve_paths(&base);

        let config = load_config(global_config, &base, Some(description.toolchain_config()));
        let toolchain = resolve_environment(&config, &base)?;
        tracing::debug!("{}", toolchain.version_info());

        Ok(Session {
            description,
            base,
            toolchain,
        })
    }
}
