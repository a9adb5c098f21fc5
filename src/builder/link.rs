//! Link orchestration.
//!
//! Plans the action that links an executable or DLL, archives a static
//! library, or generates an import library ahead of a full link. Which
//! secondary artifacts are declared depends on whether the binary is
//! cross-referenced: such a binary already has an authoritative import
//! library from an earlier import-library pass, so the full link writes its
//! own copy under a throwaway name and tracks neither it nor the export
//! file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::builder::action::ActionKind;
use crate::builder::args::{build_link_arguments, quoted};
use crate::builder::graph::ActionGraph;
use crate::builder::toolchain::ToolchainEnvironment;
use crate::core::{FileItem, LinkEnvironment};
use crate::errors::ToolchainError;
use crate::util::fs::write_string;

/// How a build product is used after the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildProductType {
    BuildResource,
    MapFile,
}

/// Where the import library of a binary is written.
pub fn import_library_path(env: &LinkEnvironment, import_library_only: bool) -> PathBuf {
    let stem = env.output_stem();
    if env.is_cross_referenced && !import_library_only {
        env.intermediate_directory
            .join(format!("{}.suppressed.lib", stem))
    } else if env.compile_as_dll {
        env.output_directory().join(format!("{}.lib", stem))
    } else {
        env.intermediate_directory.join(format!("{}.lib", stem))
    }
}

/// Write the directories holding the binary's object files and libraries,
/// so tools reading the map file can find them.
fn export_object_file_paths(
    env: &LinkEnvironment,
    toolchain: &ToolchainEnvironment,
    path: &Path,
) -> Result<()> {
    let mut directories: BTreeSet<PathBuf> = BTreeSet::new();
    directories.extend(env.input_files.iter().map(|f| f.directory().to_path_buf()));
    directories.extend(
        env.libraries
            .iter()
            .filter_map(|l| l.parent().map(|p| p.to_path_buf())),
    );
    directories.extend(env.system_library_paths.iter().cloned());
    directories.extend(toolchain.library_paths().iter().cloned());

    let mut contents = directories
        .iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    contents.push('\n');
    write_string(path, &contents)
}

/// Plan the link, archive or import-library action for a binary.
///
/// Returns the file the action produces: the import library when
/// `import_library_only`, otherwise the binary or static library.
pub fn link_files(
    toolchain: &ToolchainEnvironment,
    env: &LinkEnvironment,
    import_library_only: bool,
    graph: &mut dyn ActionGraph,
) -> Result<FileItem> {
    if env.is_building_library {
        if let Some(definition) = &env.module_definition_file {
            return Err(ToolchainError::ModuleDefinitionForLibrary {
                definition: definition.clone(),
            }
            .into());
        }
    }

    let library_or_import = env.is_building_library || import_library_only;
    let mut args = build_link_arguments(env, toolchain, import_library_only);

    let import_library = FileItem::new(import_library_path(env, import_library_only));
    let output_file = if import_library_only {
        import_library.clone()
    } else {
        FileItem::new(&env.output_file_path)
    };

    let mut produced = vec![output_file.clone()];
    let mut prerequisites: Vec<FileItem> = Vec::new();

    for input in &env.input_files {
        args.push(quoted(input.path()));
        prerequisites.push(input.clone());
    }

    if !library_or_import {
        for library in &env.libraries {
            args.push(quoted(library));
            prerequisites.push(FileItem::new(library));
        }
        for library in &env.system_libraries {
            args.push(format!("\"{}\"", library));
        }
    }

    args.push(format!("/OUT:{}", quoted(output_file.path())));

    // Cross-referenced links still write these, but they are not tracked.
    if env.has_exports && !env.is_building_library && !env.is_cross_referenced {
        produced.push(import_library.with_extension("exp"));
    }

    if !library_or_import {
        if env.has_exports {
            args.push(format!("/IMPLIB:{}", quoted(import_library.path())));
            if !env.is_cross_referenced {
                produced.push(import_library.clone());
            }
        }

        let output_dir = env.output_directory();
        let stem = output_file.file_stem();
        if env.create_debug_info {
            let pdb = output_dir.join(format!("{}.pdb", stem));
            args.push(format!("/PDB:{}", quoted(&pdb)));
            produced.push(FileItem::new(pdb));
        }

        if env.create_map_file {
            let map = output_dir.join(format!("{}.map", stem));
            args.push(format!("/MAP:{}", quoted(&map)));
            produced.push(FileItem::new(&map));
            export_object_file_paths(env, toolchain, &map.with_extension("objpaths"))?;
        }

        if let Some(extra) = env.additional_arguments.as_deref() {
            let extra = extra.trim();
            if !extra.is_empty() {
                args.push(extra.to_string());
            }
        }
    }

    for function in &env.include_functions {
        args.push(format!("/INCLUDE:{}", function));
    }

    let response_path = env
        .intermediate_directory
        .join(format!("{}.response", output_file.file_name()));
    let response_file = graph.create_intermediate_text_file(&response_path, &args.join("\n"))?;
    prerequisites.push(response_file);

    let mut action = graph.create_action(ActionKind::Link);
    action.command_description = "Link".to_string();
    action.command_version = toolchain.toolchain_version().to_string();
    action.status_description = output_file.file_name();
    let response_argument = format!("@{}", quoted(&response_path));
    if library_or_import {
        action.command_path = toolchain.librarian_path().to_path_buf();
        action.arguments = vec![response_argument];
    } else if let Some(filter) = toolchain.link_filter_path() {
        action.command_path = filter.to_path_buf();
        action.arguments = vec![
            "--".to_string(),
            quoted(toolchain.linker_path()),
            response_argument,
        ];
    } else {
        action.command_path = toolchain.linker_path().to_path_buf();
        action.arguments = vec![response_argument];
    }
    action.add_prerequisites(prerequisites);

    // Unmodified libraries keep their old timestamps; delete them so the
    // rewrite is always visible.
    if import_library_only || (env.has_exports && !library_or_import) {
        action.delete_items.extend(
            produced
                .iter()
                .filter(|p| p.has_extension("lib") || p.has_extension("exp"))
                .cloned(),
        );
    }
    if !env.use_incremental_linking {
        action
            .delete_items
            .extend(produced.iter().filter(|p| p.has_extension("pdb")).cloned());
    }

    for item in produced {
        action.add_produced(item);
    }

    action.produces_import_library = import_library_only || env.is_building_dll;
    action.can_execute_remotely = true;

    tracing::trace!("linking {}: {}", action.status_description, args.join(" "));
    graph.add_action(action.build())?;
    Ok(output_file)
}

/// Additional files a linked binary leaves behind for packaging.
pub fn build_products(env: &LinkEnvironment) -> Vec<(FileItem, BuildProductType)> {
    let mut products = Vec::new();
    let stem = env.output_stem();

    if env.is_building_dll {
        let dir = if env.compile_as_dll {
            env.output_directory().to_path_buf()
        } else {
            env.intermediate_directory.clone()
        };
        products.push((
            FileItem::new(dir.join(format!("{}.lib", stem))),
            BuildProductType::BuildResource,
        ));
    }

    if !env.is_building_dll && !env.is_building_library && env.create_map_file {
        let dir = env.output_directory();
        for extension in ["map", "objpaths"] {
            products.push((
                FileItem::new(dir.join(format!("{}.{}", stem, extension))),
                BuildProductType::MapFile,
            ));
        }
    }

    products
}
