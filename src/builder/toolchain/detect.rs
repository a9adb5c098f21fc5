//! Toolchain resolution from configuration and PATH.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use semver::Version;

use crate::util::config::ToolchainConfig;

use super::{CompilerKind, ToolPaths, ToolchainEnvironment};

/// Resolve the toolchain environment for a target.
///
/// Configured tool paths are used verbatim; the graph may be executed on
/// another machine, so they are not required to exist here. Tools left
/// unconfigured are searched for on PATH by their family's executable name.
pub fn resolve_environment(
    config: &ToolchainConfig,
    project_root: &Path,
) -> Result<ToolchainEnvironment> {
    let tc = &config.toolchain;
    let settings = config.platform_settings();
    let compiler = tc.compiler.unwrap_or_default();
    let (cl_name, link_name, lib_name) = compiler.tool_names(settings.allow_clang_linker);

    let compiler_path = find_tool(tc.cl.as_deref(), cl_name)?;
    let linker_path = find_tool(tc.link.as_deref(), link_name)?;
    let librarian_path = find_tool(tc.lib.as_deref(), lib_name)?;
    let resource_compiler = match find_tool(tc.rc.as_deref(), "rc") {
        Ok(path) => path,
        Err(_) => {
            tracing::warn!("resource compiler not found, using `rc.exe` from the executor's PATH");
            PathBuf::from("rc.exe")
        }
    };

    let toolchain_version = match &tc.toolchain_version {
        Some(v) => parse_toolchain_version(v)?,
        None => compiler.default_toolchain_version(),
    };

    let build_tool = match &tc.build_tool {
        Some(path) => path.clone(),
        None => std::env::current_exe().unwrap_or_else(|_| PathBuf::from("vcgraph")),
    };

    let root_dir = tc
        .root_dir
        .as_ref()
        .map(|r| project_root.join(r))
        .unwrap_or_else(|| project_root.to_path_buf());

    let compiler_version = tc
        .compiler_version
        .clone()
        .unwrap_or_else(|| toolchain_version.to_string());

    tracing::debug!("Using {} from {}", compiler, compiler_path.display());

    let tools = ToolPaths {
        compiler: compiler_path,
        linker: linker_path,
        librarian: librarian_path,
        resource_compiler,
        link_filter: tc.link_filter.clone(),
        cl_filter: tc.cl_filter.clone(),
        build_tool,
    };

    Ok(ToolchainEnvironment::new(
        compiler,
        compiler_version,
        toolchain_version,
        tools,
        root_dir,
        settings,
    )
    .with_include_paths(tc.include_paths.clone())
    .with_library_paths(tc.library_paths.clone())
    .with_windows_sdk_version(tc.windows_sdk_version.clone()))
}

/// Parse an MSVC toolset version such as `14.29.30133` or `14.29`.
pub fn parse_toolchain_version(text: &str) -> Result<Version> {
    let mut parts = text.trim().split('.').map(|p| p.parse::<u64>());
    let mut next = |name: &str| -> Result<u64> {
        match parts.next() {
            Some(part) => {
                part.with_context(|| format!("invalid {} in toolchain version `{}`", name, text))
            }
            None => Ok(0),
        }
    };

    let major = next("major")?;
    let minor = next("minor")?;
    let patch = next("patch")?;
    Ok(Version::new(major, minor, patch))
}

fn find_tool(configured: Option<&Path>, name: &str) -> Result<PathBuf> {
    if let Some(path) = configured {
        if !path.exists() {
            tracing::debug!("configured tool {} does not exist on this host", path.display());
        }
        return Ok(path.to_path_buf());
    }

    which::which(name).map_err(|_| {
        anyhow!(
            "`{}` not found\n\
             \n\
             Run from a developer command prompt, or set the tool path in\n\
             `.vcgraph/toolchain.toml` under [toolchain].",
            name
        )
    })
}
