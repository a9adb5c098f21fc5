//! Build descriptions.
//!
//! A build description is a TOML file listing compile units (one module's
//! sources sharing a compile environment) and link units (one binary each).
//! Planning a description produces a [`BuildGraph`] with every action the
//! executor needs to run. Relative paths in a description are resolved
//! against the directory containing it.
//!
//! ```toml
//! target = "Game"
//!
//! [[compile]]
//! module = "Core"
//! sources = ["Source/Core/*.cpp"]
//!
//! [compile.environment]
//! configuration = "debug"
//!
//! [[link]]
//! objects_from = ["Core"]
//!
//! [link.environment]
//! output_file_path = "Binaries/Win64/Game.exe"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::args::{build_compile_arguments, build_link_arguments};
use crate::builder::compile::{compile_cpp_files, CppOutput};
use crate::builder::graph::{ActionGraph, BuildGraph};
use crate::builder::link::link_files;
use crate::builder::resource::{compile_rc_files, generate_type_library_header, TypeLibrary};
use crate::builder::timing::finalize_output;
use crate::builder::toolchain::{PlatformSettings, ToolchainEnvironment};
use crate::core::{CompileEnvironment, FileItem, LinkEnvironment};
use crate::util::config::{ToolchainConfig, ToolchainSettings};
use crate::util::fs::{glob_files, read_to_string};

/// Default intermediate directory, relative to the description.
const DEFAULT_INTERMEDIATE_DIR: &str = "Intermediate";

/// Contents of a build description file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildDescription {
    /// Target name, used for timing aggregation
    pub target: Option<String>,

    /// Root of per-module output directories
    pub intermediate_dir: Option<PathBuf>,

    /// Toolchain overrides applied over the loaded configuration
    pub toolchain: ToolchainSettings,

    /// Platform settings overriding the loaded configuration
    pub platform: Option<PlatformSettings>,

    pub compile: Vec<CompileUnit>,
    pub link: Vec<LinkUnit>,
}

/// Sources of one module sharing a compile environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileUnit {
    pub module: String,

    /// Output directory (default: `<intermediate_dir>/<module>`)
    pub output_dir: Option<PathBuf>,

    /// C/C++ source globs
    pub sources: Vec<String>,

    /// Resource script globs
    pub resources: Vec<String>,

    pub type_libraries: Vec<TypeLibrary>,

    /// Module whose PCH this unit includes
    pub pch_from: Option<String>,

    pub environment: CompileEnvironment,
}

/// One binary to link or archive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkUnit {
    /// Only generate the import library
    pub import_library_only: bool,

    /// Modules whose object files are linked in
    pub objects_from: Vec<String>,

    pub environment: LinkEnvironment,
}

/// Command-line flags of one unit, as reported by `vcgraph flags`.
#[derive(Debug, Clone, Serialize)]
pub struct UnitFlags {
    pub name: String,
    pub kind: &'static str,
    pub arguments: Vec<String>,
}

impl BuildDescription {
    /// Load a build description from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse build description: {}", path.display()))
    }

    /// Toolchain configuration carried by this description.
    pub fn toolchain_config(&self) -> ToolchainConfig {
        ToolchainConfig {
            toolchain: self.toolchain.clone(),
            platform: self.platform.clone(),
        }
    }

    fn intermediate_dir(&self, base: &Path) -> PathBuf {
        base.join(
            self.intermediate_dir
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_INTERMEDIATE_DIR)),
        )
    }

    /// Resolve every relative path against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let intermediate = self.intermediate_dir(base);

        for unit in &mut self.compile {
            let output_dir = match &unit.output_dir {
                Some(dir) => base.join(dir),
                None => intermediate.join(&unit.module),
            };
            unit.output_dir = Some(output_dir);
            resolve_compile_paths(&mut unit.environment, base);
        }

        for unit in &mut self.link {
            let env = &mut unit.environment;
            env.output_file_path = base.join(&env.output_file_path);
            env.intermediate_directory = if env.intermediate_directory.as_os_str().is_empty() {
                intermediate.join(env.output_stem())
            } else {
                base.join(&env.intermediate_directory)
            };
            resolve_link_paths(env, base);
        }
    }

    /// Flags each unit compiles or links with.
    pub fn flags(&self, toolchain: &ToolchainEnvironment) -> Vec<UnitFlags> {
        let compile = self.compile.iter().map(|unit| UnitFlags {
            name: unit.module.clone(),
            kind: "compile",
            arguments: build_compile_arguments(&unit.environment, toolchain),
        });
        let link = self.link.iter().map(|unit| UnitFlags {
            name: unit.environment.output_file_name(),
            kind: if unit.import_library_only {
                "import_library"
            } else if unit.environment.is_building_library {
                "archive"
            } else {
                "link"
            },
            arguments: build_link_arguments(
                &unit.environment,
                toolchain,
                unit.import_library_only,
            ),
        });
        compile.chain(link).collect()
    }
}

fn resolve_compile_paths(env: &mut CompileEnvironment, base: &Path) {
    for path in env
        .user_include_paths
        .iter_mut()
        .chain(env.system_include_paths.iter_mut())
    {
        *path = base.join(&*path);
    }
    if let Some(header) = &mut env.precompiled_header_include {
        *header = base.join(&*header);
    }
    for item in env
        .force_include_files
        .iter_mut()
        .chain(env.additional_prerequisites.iter_mut())
        .chain(env.precompiled_header_file.iter_mut())
    {
        *item = FileItem::new(base.join(item.path()));
    }
}

fn resolve_link_paths(env: &mut LinkEnvironment, base: &Path) {
    for path in env
        .libraries
        .iter_mut()
        .chain(env.system_library_paths.iter_mut())
        .chain(env.module_definition_file.iter_mut())
    {
        *path = base.join(&*path);
    }
    for item in &mut env.input_files {
        *item = FileItem::new(base.join(item.path()));
    }
}

/// Plan every action of a description whose paths are already resolved.
pub fn plan_actions(
    description: &BuildDescription,
    base: &Path,
    toolchain: &ToolchainEnvironment,
) -> Result<BuildGraph> {
    let mut graph = BuildGraph::new(base);
    let mut modules: BTreeMap<&str, CppOutput> = BTreeMap::new();

    for unit in &description.compile {
        let output_dir = unit
            .output_dir
            .clone()
            .unwrap_or_else(|| description.intermediate_dir(base).join(&unit.module));

        let mut env = unit.environment.clone();
        if let Some(provider) = &unit.pch_from {
            let pch = modules
                .get(provider.as_str())
                .and_then(|output| output.precompiled_header_file.clone());
            match pch {
                Some(pch) => env.precompiled_header_file = Some(pch),
                None => bail!(
                    "module `{}` uses the PCH of `{}`, which is not an earlier PCH-creating module",
                    unit.module,
                    provider
                ),
            }
        }

        // Sources find generated headers through the output directory.
        let mut headers = Vec::new();
        for library in &unit.type_libraries {
            let header = output_dir.join(&library.header);
            generate_type_library_header(toolchain, &env, library, &header, &mut graph)?;
            headers.push(FileItem::new(header));
        }
        if !headers.is_empty() {
            env.user_include_paths.push(output_dir.clone());
            env.additional_prerequisites.extend(headers);
        }

        let sources = glob_files(base, &unit.sources)?;
        if sources.is_empty() && unit.resources.is_empty() {
            tracing::warn!("module `{}` has no sources", unit.module);
        }
        let sources: Vec<FileItem> = sources.into_iter().map(FileItem::new).collect();
        let mut output =
            compile_cpp_files(toolchain, &env, &sources, &output_dir, &unit.module, &mut graph)?;

        let resources: Vec<FileItem> = glob_files(base, &unit.resources)?
            .into_iter()
            .map(FileItem::new)
            .collect();
        let compiled = compile_rc_files(toolchain, &env, &resources, &output_dir, &mut graph)?;
        output.object_files.extend(compiled.object_files);

        tracing::debug!(
            "module `{}`: {} object file(s)",
            unit.module,
            output.object_files.len()
        );
        modules.insert(unit.module.as_str(), output);
    }

    for unit in &description.link {
        let mut env = unit.environment.clone();
        for module in &unit.objects_from {
            let output = modules
                .get(module.as_str())
                .with_context(|| format!("link of `{}` uses unknown module `{}`", env.output_file_name(), module))?;
            env.input_files.extend(output.object_files.iter().cloned());
        }

        let produced = link_files(toolchain, &env, unit.import_library_only, &mut graph)?;
        graph.add_output_item(produced);
    }

    if let Some(target) = &description.target {
        finalize_output(&mut graph, toolchain, target, &description.intermediate_dir(base))?;
    }

    Ok(graph)
}
