//! Fixtures for vcgraph unit tests.
//!
//! Toolchains built here point at fake tool paths; nothing is ever spawned,
//! so the paths only need to be stable. Tests that write stub or response
//! files use [`ProjectFixture`], which roots everything in a temp directory.

pub mod fixtures;

use std::path::{Path, PathBuf};

use crate::builder::toolchain::{CompilerKind, PlatformSettings, ToolPaths, ToolchainEnvironment};
use crate::core::{CompileEnvironment, LinkEnvironment};

pub use fixtures::*;

/// Tool paths for a compiler kind, under `/vc/bin`.
pub fn tool_paths(compiler: CompilerKind, settings: &PlatformSettings) -> ToolPaths {
    let (cl, link, lib) = compiler.tool_names(settings.allow_clang_linker);
    ToolPaths {
        compiler: PathBuf::from(format!("/vc/bin/{}.exe", cl)),
        linker: PathBuf::from(format!("/vc/bin/{}.exe", link)),
        librarian: PathBuf::from(format!("/vc/bin/{}.exe", lib)),
        resource_compiler: PathBuf::from("/sdk/bin/rc.exe"),
        link_filter: None,
        cl_filter: None,
        build_tool: PathBuf::from("/tools/vcgraph.exe"),
    }
}

/// A toolchain rooted at `root` with one system include and library path.
pub fn toolchain_in(
    root: &Path,
    compiler: CompilerKind,
    settings: PlatformSettings,
) -> ToolchainEnvironment {
    let tools = tool_paths(compiler, &settings);
    let version = compiler.default_toolchain_version();
    ToolchainEnvironment::new(
        compiler,
        version.to_string(),
        version,
        tools,
        root,
        settings,
    )
    .with_include_paths(vec![PathBuf::from("/sdk/include/ucrt")])
    .with_library_paths(vec![PathBuf::from("/sdk/lib/x64")])
}

/// A toolchain rooted at `/proj` with custom settings.
pub fn toolchain_with(compiler: CompilerKind, settings: PlatformSettings) -> ToolchainEnvironment {
    toolchain_in(Path::new("/proj"), compiler, settings)
}

/// A toolchain rooted at `/proj` with default settings.
pub fn toolchain(compiler: CompilerKind) -> ToolchainEnvironment {
    toolchain_with(compiler, PlatformSettings::default())
}

/// A Development compile environment with optimization on.
pub fn compile_env() -> CompileEnvironment {
    CompileEnvironment::default()
}

/// A link environment for `output`, with intermediates beside it.
pub fn link_env(output: &str) -> LinkEnvironment {
    let output = PathBuf::from(output);
    let intermediate = output
        .parent()
        .map(|p| p.join("Intermediate"))
        .unwrap_or_else(|| PathBuf::from("Intermediate"));
    LinkEnvironment {
        output_file_path: output,
        intermediate_directory: intermediate,
        ..Default::default()
    }
}
