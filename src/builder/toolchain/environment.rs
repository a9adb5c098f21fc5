//! The resolved toolchain a target builds with.

use std::path::{Path, PathBuf};

use semver::Version;
use serde::{Deserialize, Serialize};

use super::{Architecture, CompilerFamily, CompilerKind, TargetPlatform};

/// Platform-wide build switches.
///
/// Resolved once from configuration and injected into the toolchain
/// environment; nothing in argument building queries the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    pub architecture: Architecture,
    pub platform: TargetPlatform,

    /// `/permissive-` and friends (VS2017 and later)
    pub strict_conformance_mode: bool,
    /// `/Gw`
    pub optimize_global_data: bool,
    /// `/Zm` factor; 0 picks the default, negative omits the switch
    pub pch_memory_allocation_factor: i32,
    pub strip_unreferenced_symbols: bool,
    pub merge_identical_comdats: bool,
    pub create_hotpatchable_image: bool,
    /// Manifest embedded into linked binaries
    pub manifest_file: Option<PathBuf>,
    /// Use lld-link for clang builds
    pub allow_clang_linker: bool,
    pub clang_time_trace: bool,
    pub compiler_trace: bool,
    pub show_includes: bool,
    pub print_toolchain_timing_info: bool,
    pub parse_timing_info_for_tracing: bool,
    /// Diagnostic `"obj" -> "source"` map, appended to per compile
    pub obj_src_map_file: Option<PathBuf>,
    /// Always pass compile arguments through a response file
    pub always_use_response_files: bool,
    /// Shell used for touch actions
    pub shell: PathBuf,

    /// Icon for project-specific resource compiles
    pub application_icon: Option<PathBuf>,
    pub default_application_icon: PathBuf,
    pub company_name: Option<String>,
    pub copyright_notice: Option<String>,
    pub product_name: Option<String>,
    /// Project descriptor; its stem becomes the product identifier
    pub project_file: Option<PathBuf>,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        PlatformSettings {
            architecture: Architecture::X64,
            platform: TargetPlatform::Win64,
            strict_conformance_mode: false,
            optimize_global_data: true,
            pch_memory_allocation_factor: 0,
            strip_unreferenced_symbols: false,
            merge_identical_comdats: false,
            create_hotpatchable_image: false,
            manifest_file: None,
            allow_clang_linker: false,
            clang_time_trace: false,
            compiler_trace: false,
            show_includes: false,
            print_toolchain_timing_info: false,
            parse_timing_info_for_tracing: false,
            obj_src_map_file: None,
            always_use_response_files: true,
            shell: PathBuf::from("cmd.exe"),
            application_icon: None,
            default_application_icon: PathBuf::from("Build/Windows/Resources/Default.ico"),
            company_name: None,
            copyright_notice: None,
            product_name: None,
            project_file: None,
        }
    }
}

impl PlatformSettings {
    /// Whether compiles emit `.timing` files for parsing.
    pub fn wants_timing_files(&self) -> bool {
        self.print_toolchain_timing_info || self.compiler_trace
    }
}

/// Executables the driver invokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    pub compiler: PathBuf,
    pub linker: PathBuf,
    pub librarian: PathBuf,
    pub resource_compiler: PathBuf,
    /// Wrapper that runs the linker and post-processes its output
    pub link_filter: Option<PathBuf>,
    /// Wrapper that turns `/showIncludes` output into a dependency list
    pub cl_filter: Option<PathBuf>,
    /// This build tool, for recursive timing actions
    pub build_tool: PathBuf,
}

/// Compiler, tools and search paths for one target's build.
///
/// Created once per target and never mutated afterwards; every argument
/// builder and orchestrator reads from it.
#[derive(Debug, Clone, Serialize)]
pub struct ToolchainEnvironment {
    compiler: CompilerKind,
    compiler_version: String,
    toolchain_version: Version,
    windows_sdk_version: Option<String>,
    tools: ToolPaths,
    include_paths: Vec<PathBuf>,
    library_paths: Vec<PathBuf>,
    root_dir: PathBuf,
    settings: PlatformSettings,
}

impl ToolchainEnvironment {
    /// Create the environment for a target.
    ///
    /// A stale object/source map from a previous build is removed here; the
    /// map is advisory, so failures are only traced.
    pub fn new(
        compiler: CompilerKind,
        compiler_version: impl Into<String>,
        toolchain_version: Version,
        tools: ToolPaths,
        root_dir: impl Into<PathBuf>,
        settings: PlatformSettings,
    ) -> Self {
        tracing::trace!("Compiler: {}", tools.compiler.display());
        tracing::trace!("Linker: {}", tools.linker.display());
        tracing::trace!("Library Manager: {}", tools.librarian.display());
        tracing::trace!("Resource Compiler: {}", tools.resource_compiler.display());

        if let Some(map) = &settings.obj_src_map_file {
            if let Err(e) = std::fs::remove_file(map) {
                tracing::debug!("could not remove object/source map {}: {}", map.display(), e);
            }
        }

        ToolchainEnvironment {
            compiler,
            compiler_version: compiler_version.into(),
            toolchain_version,
            windows_sdk_version: None,
            tools,
            include_paths: Vec::new(),
            library_paths: Vec::new(),
            root_dir: root_dir.into(),
            settings,
        }
    }

    /// Set the system include directories, in search order.
    pub fn with_include_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.include_paths = paths;
        self
    }

    /// Set the system library directories, in search order.
    pub fn with_library_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.library_paths = paths;
        self
    }

    /// Record the Windows SDK version for version reporting.
    pub fn with_windows_sdk_version(mut self, version: Option<String>) -> Self {
        self.windows_sdk_version = version;
        self
    }

    pub fn compiler(&self) -> CompilerKind {
        self.compiler
    }

    pub fn family(&self) -> CompilerFamily {
        self.compiler.family()
    }

    pub fn compiler_version(&self) -> &str {
        &self.compiler_version
    }

    pub fn toolchain_version(&self) -> &Version {
        &self.toolchain_version
    }

    pub fn compiler_path(&self) -> &Path {
        &self.tools.compiler
    }

    pub fn linker_path(&self) -> &Path {
        &self.tools.linker
    }

    pub fn librarian_path(&self) -> &Path {
        &self.tools.librarian
    }

    pub fn resource_compiler_path(&self) -> &Path {
        &self.tools.resource_compiler
    }

    pub fn link_filter_path(&self) -> Option<&Path> {
        self.tools.link_filter.as_deref()
    }

    pub fn cl_filter_path(&self) -> Option<&Path> {
        self.tools.cl_filter.as_deref()
    }

    pub fn build_tool_path(&self) -> &Path {
        &self.tools.build_tool
    }

    /// System include directories, in search order.
    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    /// System library directories, in search order.
    pub fn library_paths(&self) -> &[PathBuf] {
        &self.library_paths
    }

    /// Base directory include paths are shortened against; also the working
    /// directory of every action.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn settings(&self) -> &PlatformSettings {
        &self.settings
    }

    /// One-line description printed before a build.
    pub fn version_info(&self) -> String {
        let sdk = self
            .windows_sdk_version
            .as_deref()
            .map(|v| format!(" and Windows {} SDK", v))
            .unwrap_or_default();

        if self.compiler.visual_studio_year().is_some() {
            format!(
                "Using {} {} toolchain ({}){}.",
                self.compiler,
                self.toolchain_version,
                self.compiler_dir().display(),
                sdk
            )
        } else {
            format!(
                "Using {} {} compiler ({}) with MSVC {} runtime{}.",
                self.compiler,
                self.compiler_version,
                self.compiler_dir().display(),
                self.toolchain_version,
                sdk
            )
        }
    }

    fn compiler_dir(&self) -> &Path {
        self.tools.compiler.parent().unwrap_or_else(|| Path::new(""))
    }
}
