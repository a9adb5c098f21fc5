//! Compile orchestration.
//!
//! Turns a module's compile environment and source list into compile
//! actions: one per source, plus a dependency scan for each module
//! interface and a timing parse for each source when timing is on.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::builder::action::{ActionBuilder, ActionKind};
use crate::builder::args::compile::{
    c_arguments, cpp_arguments, definition_arguments, global_arguments, include_arguments,
    timing_arguments,
};
use crate::builder::args::quoted;
use crate::builder::graph::ActionGraph;
use crate::builder::timing::parse_timing_info_action;
use crate::builder::toolchain::{CompilerFamily, ToolchainEnvironment};
use crate::core::{CompileEnvironment, FileItem, Language, PchAction};
use crate::errors::ToolchainError;
use crate::util::fs::append_line;

/// PDB shared by plain C sources that do not use a PCH.
const PLAIN_C_PDB: &str = "MiscPlainC.pdb";

/// Files a batch of compiles produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CppOutput {
    /// Object files, or preprocessed files in preprocess-only mode
    pub object_files: Vec<FileItem>,
    pub compiled_module_interfaces: Vec<FileItem>,
    pub precompiled_header_file: Option<FileItem>,
}

/// Directory compiled module interfaces are written to.
pub fn module_interface_dir(output_dir: &Path) -> PathBuf {
    output_dir.join("Ifc")
}

/// Header a PCH is built through, required by both PCH actions.
fn pch_header<'a>(env: &'a CompileEnvironment, action: &'static str) -> Result<&'a Path, ToolchainError> {
    env.precompiled_header_include
        .as_deref()
        .ok_or(ToolchainError::PchMisconfigured {
            action,
            missing: "a precompiled header include",
        })
}

fn validate(env: &CompileEnvironment, module_name: &str) -> Result<(), ToolchainError> {
    match env.pch_action {
        PchAction::None => {}
        PchAction::Create => {
            pch_header(env, "create")?;
        }
        PchAction::Include => {
            pch_header(env, "include")?;
            if env.precompiled_header_file.is_none() {
                return Err(ToolchainError::PchMisconfigured {
                    action: "include",
                    missing: "a precompiled header file",
                });
            }
        }
    }

    if env.preprocess_only && env.generate_dependencies_file {
        return Err(ToolchainError::DependencyFileInPreprocessMode {
            module: module_name.to_string(),
        });
    }

    Ok(())
}

/// Compile a batch of sources sharing one environment.
///
/// The environment is validated before any action is created, so a
/// misconfigured batch leaves the graph untouched.
pub fn compile_cpp_files(
    toolchain: &ToolchainEnvironment,
    env: &CompileEnvironment,
    files: &[FileItem],
    output_dir: &Path,
    module_name: &str,
    graph: &mut dyn ActionGraph,
) -> Result<CppOutput> {
    validate(env, module_name)?;

    let settings = toolchain.settings();
    let family = toolchain.family();

    let mut shared_args = include_arguments(env, toolchain);
    shared_args.extend(definition_arguments(env));

    // PCH companion header goes ahead of every other forced include.
    let mut force_includes: Vec<FileItem> = Vec::new();
    let mut pch_use_args: Vec<String> = Vec::new();
    let mut pch_prerequisite: Option<FileItem> = None;
    if env.pch_action == PchAction::Include {
        let header = pch_header(env, "include")?;
        let pch = env
            .precompiled_header_file
            .clone()
            .ok_or(ToolchainError::PchMisconfigured {
                action: "include",
                missing: "a precompiled header file",
            })?;
        if family == CompilerFamily::Clang {
            force_includes.push(FileItem::new(pch.path().with_extension("")));
        } else {
            force_includes.push(FileItem::new(header));
            pch_use_args.push(format!("/Yu{}", quoted(header)));
            pch_use_args.push(format!("/Fp{}", quoted(pch.path())));
        }
        pch_prerequisite = Some(pch);
    }
    force_includes.extend(env.force_include_files.iter().cloned());
    shared_args.extend(force_includes.iter().map(|f| format!("/FI{}", quoted(f.path()))));

    shared_args.extend(global_arguments(env, toolchain));
    shared_args.extend(timing_arguments(env, toolchain));

    let mut output = CppOutput::default();

    for source in files {
        let language = Language::from_path(source.path());
        let mut input = source.clone();
        let mut file_args: Vec<String> = Vec::new();
        let mut produced: Vec<FileItem> = Vec::new();
        let mut created_pch: Option<FileItem> = None;

        if env.pch_action == PchAction::Create {
            let header = pch_header(env, "create")?;
            let stub = format!(
                "// Compiler: {}\n#include \"{}\"\r\n",
                toolchain.compiler_version(),
                header.display().to_string().replace('\\', "/")
            );
            input = graph.create_intermediate_text_file(&header.with_extension("cpp"), &stub)?;

            // Named after the real source, not the generated stub.
            let pch = FileItem::new(output_dir.join(format!("{}.pch", source.file_name())));
            if env.is_building_library {
                let symbol = header
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                file_args.push(format!("/Yl{}", symbol));
            }
            file_args.push(format!("/Yc{}", quoted(header)));
            file_args.push(format!("/Fp{}", quoted(pch.path())));
            produced.push(pch.clone());
            created_pch = Some(pch);
        } else {
            file_args.extend(pch_use_args.iter().cloned());
        }

        let mut action = graph.create_action(ActionKind::Compile);
        action.command_path = toolchain.compiler_path().to_path_buf();
        action.command_version = toolchain.compiler_version().to_string();
        action.status_description = source.file_name();
        action.command_description = match (env.preprocess_only, env.pch_action) {
            (true, _) => "Preprocess",
            (false, PchAction::Create) => "CreatePCH",
            _ => "Compile",
        }
        .to_string();
        action.add_prerequisite(input.clone());
        action.add_prerequisites(force_includes.iter().cloned());
        action.add_prerequisites(env.additional_prerequisites.iter().cloned());
        if let Some(pch) = &pch_prerequisite {
            action.add_prerequisite(pch.clone());
        }

        let mut output_args: Vec<String> = Vec::new();
        let response_file = if env.preprocess_only {
            let preprocessed = FileItem::new(output_dir.join(format!("{}.i", source.file_name())));
            output_args.push("/P".to_string());
            output_args.push(format!("/Fi{}", quoted(preprocessed.path())));
            produced.push(preprocessed.clone());
            output.object_files.push(preprocessed.clone());
            preprocessed.with_suffix(".response")
        } else {
            let object = FileItem::new(output_dir.join(format!("{}.obj", source.file_name())));
            output_args.push(format!("/Fo{}", quoted(object.path())));

            if let Some(map) = &settings.obj_src_map_file {
                append_line(
                    map,
                    &format!("\"{}\" -> \"{}\"", object.file_name(), source.path().display()),
                )?;
            }

            if family == CompilerFamily::Clang && settings.clang_time_trace {
                file_args.push("-Xclang".to_string());
                file_args.push("-ftime-trace".to_string());
                produced.push(object.with_extension("json"));
            }

            produced.push(object.clone());
            output.object_files.push(object.clone());
            object.with_suffix(".response")
        };

        // PCH creation is on the critical path; keep it local.
        action.can_execute_remotely =
            env.pch_action != PchAction::Create || env.allow_remotely_compiled_pchs;

        let mut common_args = file_args;
        common_args.extend(shared_args.iter().cloned());
        match language {
            Language::C => common_args.extend(c_arguments()),
            Language::Cxx => common_args.extend(cpp_arguments(env, toolchain)),
        }
        if let Some(extra) = env.additional_arguments.as_deref().filter(|a| !a.is_empty()) {
            common_args.push(extra.to_string());
        }

        if env.uses_pdb_files() || env.supports_edit_and_continue() {
            let pdb = pdb_location(env, source, language, output_dir);
            if env.pch_action != PchAction::None {
                // Shared with the PCH compile.
                common_args.push("/FS".to_string());
            }
            common_args.push(format!("/Fd{}", quoted(&pdb)));
            action
                .shared_resources
                .insert(format!("pdb:{}", pdb.display()));
            action.can_execute_remotely = false;
        }

        // The scan shares everything but the outputs.
        let scan = source.has_extension("ixx").then(|| action.clone());

        let mut args = vec![quoted(input.path())];
        args.extend(output_args);
        args.extend(common_args.iter().cloned());

        let mut dependency_list = None;
        if let Some(mut scan) = scan {
            let directives =
                FileItem::new(output_dir.join(format!("{}.md.json", source.file_name())));
            scan.arguments = vec![quoted(input.path())];
            scan.arguments.extend(common_args);
            scan.arguments.push(format!(
                "/sourceDependencies:directives {}",
                quoted(directives.path())
            ));
            scan.command_description = "ScanModule".to_string();
            scan.add_produced(directives.clone());
            scan.write_response_file(
                directives.with_suffix(".response").path(),
                settings.always_use_response_files,
            )?;
            scan.can_execute_remotely_with_secondary =
                scan.can_execute_remotely && !env.build_locally_with_secondary;
            graph.add_action(scan.build())?;

            let ifc = FileItem::new(
                module_interface_dir(output_dir).join(format!("{}.ifc", source.file_stem())),
            );
            args.push("/interface".to_string());
            args.push(format!("/ifcOutput {}", quoted(ifc.path())));
            action.add_prerequisite(directives);
            produced.push(ifc.clone());
            output.compiled_module_interfaces.push(ifc);
        } else if env.generate_dependencies_file {
            let list = FileItem::new(output_dir.join(format!("{}.txt", source.file_name())));
            produced.push(list.clone());
            dependency_list = Some(list);
        }

        action.arguments = args;
        match &dependency_list {
            Some(list) => add_dependency_list(toolchain, &mut action, list, &response_file)?,
            None => {
                action.write_response_file(
                    response_file.path(),
                    settings.always_use_response_files,
                )?;
            }
        }

        for item in produced {
            action.add_produced(item);
        }

        if settings.wants_timing_files() {
            let timing = FileItem::new(output_dir.join(format!("{}.timing", source.file_name())));
            action.add_produced(timing.clone());
            parse_timing_info_action(toolchain, source, &timing, graph)?;
        }

        action.can_execute_remotely_with_secondary =
            action.can_execute_remotely && !env.build_locally_with_secondary;
        graph.add_action(action.build())?;

        if let Some(pch) = created_pch {
            output.precompiled_header_file.get_or_insert(pch);
        }
    }

    Ok(output)
}

fn pdb_location(
    env: &CompileEnvironment,
    source: &FileItem,
    language: Language,
    output_dir: &Path,
) -> PathBuf {
    match env.pch_action {
        // Every user of a PCH writes to the PDB it was built with.
        PchAction::Include => env
            .precompiled_header_file
            .as_ref()
            .map(|pch| pch.path().with_extension("pdb"))
            .unwrap_or_else(|| output_dir.join(PLAIN_C_PDB)),
        PchAction::Create => {
            let header = env
                .precompiled_header_include
                .as_deref()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            output_dir.join(format!("{}.pdb", header))
        }
        PchAction::None if language == Language::Cxx => {
            output_dir.join(format!("{}.pdb", source.file_name()))
        }
        PchAction::None => output_dir.join(PLAIN_C_PDB),
    }
}

/// Emit a header dependency list alongside the object file.
///
/// With a cl filter configured the compile runs through it and the filter
/// turns `/showIncludes` output into the list; otherwise the compiler writes
/// the list itself.
fn add_dependency_list(
    toolchain: &ToolchainEnvironment,
    action: &mut ActionBuilder,
    dependencies: &FileItem,
    response_file: &FileItem,
) -> Result<()> {
    let settings = toolchain.settings();
    match toolchain.cl_filter_path() {
        Some(filter) => {
            action.write_response_file(response_file.path(), settings.always_use_response_files)?;
            let compiler = quoted(toolchain.compiler_path());
            let mut wrapped = vec![
                format!("-dependencies={}", quoted(dependencies.path())),
                format!("-compiler={}", compiler),
                "--".to_string(),
                compiler,
            ];
            wrapped.append(&mut action.arguments);
            wrapped.push("/showIncludes".to_string());
            action.arguments = wrapped;
            action.command_path = filter.to_path_buf();
        }
        None => {
            action
                .arguments
                .push(format!("/sourceDependencies {}", quoted(dependencies.path())));
            if settings.show_includes {
                action.arguments.push("/showIncludes".to_string());
            }
            action.write_response_file(response_file.path(), settings.always_use_response_files)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::graph::BuildGraph;
    use crate::builder::toolchain::{CompilerKind, PlatformSettings, ToolPaths};
    use crate::core::{Configuration, DebugInfo};
    use crate::test_support::{tool_paths, ProjectFixture};

    fn inline_settings() -> PlatformSettings {
        PlatformSettings {
            always_use_response_files: false,
            ..Default::default()
        }
    }

    fn compile(
        project: &ProjectFixture,
        toolchain: &ToolchainEnvironment,
        env: &CompileEnvironment,
        files: &[FileItem],
    ) -> (BuildGraph, CppOutput) {
        let mut graph = project.graph();
        let output = compile_cpp_files(
            toolchain,
            env,
            files,
            &project.output_dir("Core"),
            "Core",
            &mut graph,
        )
        .unwrap();
        (graph, output)
    }

    fn error_of(err: anyhow::Error) -> ToolchainError {
        err.downcast::<ToolchainError>().unwrap()
    }

    #[test]
    fn test_debug_single_source() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, inline_settings());
        let source = project.source("Source/Core/Engine.cpp", "int main() { return 0; }");
        let env = CompileEnvironment {
            configuration: Configuration::Debug,
            debug_info: DebugInfo::Pdb,
            ..Default::default()
        };

        let (graph, output) = compile(&project, &tc, &env, &[source.clone()]);
        let out = project.output_dir("Core");
        let object = FileItem::new(out.join("Engine.cpp.obj"));
        assert_eq!(output.object_files, vec![object.clone()]);
        assert!(output.precompiled_header_file.is_none());

        let action = &graph.actions()[0];
        assert_eq!(graph.actions().len(), 1);
        assert!(action.produces(&object));
        assert_eq!(action.produced_items().len(), 1);
        assert!(action.requires(&source));
        let args = action.arguments();
        assert!(args.contains(&"/Od".to_string()));
        assert!(args.contains(&"/Os".to_string()));
        let pdb = out.join("Engine.cpp.pdb");
        assert!(args.contains(&format!("/Fd\"{}\"", pdb.display())));
        assert!(!action.can_execute_remotely());
        assert!(!action.can_execute_remotely_with_secondary());
        assert_eq!(action.command_description(), "Compile");
    }

    #[test]
    fn test_response_file_written_when_forced() {
        let project = ProjectFixture::new();
        let tc = project.toolchain(CompilerKind::VisualStudio2019);
        let source = project.source("Source/Core/Engine.cpp", "");
        let (graph, _) = compile(&project, &tc, &CompileEnvironment::default(), &[source]);

        let rsp = project.output_dir("Core").join("Engine.cpp.obj.response");
        let action = &graph.actions()[0];
        assert_eq!(action.arguments(), &[format!("@\"{}\"", rsp.display())]);
        assert!(action.requires(&FileItem::new(&rsp)));
        assert!(project.read(&rsp).contains("/nologo\n"));
        assert!(action.can_execute_remotely());
        assert!(action.can_execute_remotely_with_secondary());
    }

    #[test]
    fn test_pch_include_forced_first_and_required() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, inline_settings());
        let source = project.source("Source/Core/Engine.cpp", "");
        let header = project.path("Source/Core/CorePCH.h");
        let other = FileItem::new(project.path("Source/Core/Definitions.h"));
        let pch = FileItem::new(project.output_dir("Core").join("CorePCH.h.pch"));
        let env = CompileEnvironment {
            pch_action: PchAction::Include,
            precompiled_header_include: Some(header.clone()),
            precompiled_header_file: Some(pch.clone()),
            force_include_files: vec![other.clone()],
            ..Default::default()
        };

        let (graph, _) = compile(&project, &tc, &env, &[source]);
        let action = &graph.actions()[0];
        assert!(action.requires(&pch));

        let forced: Vec<_> = action
            .arguments()
            .iter()
            .filter(|a| a.starts_with("/FI"))
            .cloned()
            .collect();
        assert_eq!(
            forced,
            vec![
                format!("/FI\"{}\"", header.display()),
                format!("/FI\"{}\"", other.path().display()),
            ]
        );
        assert!(action
            .arguments()
            .contains(&format!("/Yu\"{}\"", header.display())));
    }

    #[test]
    fn test_clang_pch_include_forces_pch_stem() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::Clang, inline_settings());
        let source = project.source("Source/Core/Engine.cpp", "");
        let header = project.path("Source/Core/CorePCH.h");
        let pch = FileItem::new(project.output_dir("Core").join("CorePCH.h.pch"));
        let env = CompileEnvironment {
            pch_action: PchAction::Include,
            precompiled_header_include: Some(header),
            precompiled_header_file: Some(pch.clone()),
            ..Default::default()
        };

        let (graph, _) = compile(&project, &tc, &env, &[source]);
        let action = &graph.actions()[0];
        assert!(action.requires(&pch));

        let forced: Vec<_> = action
            .arguments()
            .iter()
            .filter(|a| a.starts_with("/FI"))
            .cloned()
            .collect();
        assert_eq!(
            forced,
            vec![format!("/FI\"{}\"", pch.path().with_extension("").display())]
        );
        assert!(!action
            .arguments()
            .iter()
            .any(|a| a.starts_with("/Yu") || a.starts_with("/Fp")));
    }

    #[test]
    fn test_pch_include_shares_pch_pdb() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, inline_settings());
        let a = project.source("Source/Core/A.cpp", "");
        let b = project.source("Source/Core/B.cpp", "");
        let pch = FileItem::new(project.output_dir("Core").join("CorePCH.h.pch"));
        let env = CompileEnvironment {
            pch_action: PchAction::Include,
            precompiled_header_include: Some(project.path("Source/Core/CorePCH.h")),
            precompiled_header_file: Some(pch.clone()),
            debug_info: DebugInfo::Pdb,
            ..Default::default()
        };

        let (graph, _) = compile(&project, &tc, &env, &[a, b]);
        let expected = format!("/Fd\"{}\"", pch.path().with_extension("pdb").display());
        for action in graph.actions() {
            assert!(action.arguments().contains(&expected));
            assert!(action.arguments().contains(&"/FS".to_string()));
            assert!(!action.can_execute_remotely());
        }
    }

    #[test]
    fn test_pch_create_for_library() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, inline_settings());
        let source = project.source("Source/Core/SharedPCH.Core.cpp", "");
        let header = project.path("Source/Core/CorePCH.h");
        let env = CompileEnvironment {
            pch_action: PchAction::Create,
            precompiled_header_include: Some(header.clone()),
            is_building_library: true,
            ..Default::default()
        };

        let (graph, output) = compile(&project, &tc, &env, &[source.clone()]);
        let pch = FileItem::new(project.output_dir("Core").join("SharedPCH.Core.cpp.pch"));
        assert_eq!(output.precompiled_header_file, Some(pch.clone()));

        let action = &graph.actions()[0];
        assert!(action.produces(&pch));
        assert_eq!(action.command_description(), "CreatePCH");
        assert!(!action.can_execute_remotely());

        let retention: Vec<_> = action
            .arguments()
            .iter()
            .filter(|a| a.starts_with("/Yl"))
            .collect();
        assert_eq!(retention, vec!["/YlCorePCH"]);

        let stub = header.with_extension("cpp");
        assert!(action.requires(&FileItem::new(&stub)));
        let contents = project.read(&stub);
        assert!(contents.starts_with(&format!("// Compiler: {}\n", tc.compiler_version())));
        assert!(contents.ends_with("CorePCH.h\"\r\n"));

        let (again, _) = compile(&project, &tc, &env, &[source]);
        assert_eq!(again.actions()[0].arguments(), action.arguments());
    }

    #[test]
    fn test_pch_create_remote_when_allowed() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, inline_settings());
        let source = project.source("Source/Core/CorePCH.cpp", "");
        let env = CompileEnvironment {
            pch_action: PchAction::Create,
            precompiled_header_include: Some(project.path("Source/Core/CorePCH.h")),
            allow_remotely_compiled_pchs: true,
            build_locally_with_secondary: true,
            ..Default::default()
        };

        let (graph, _) = compile(&project, &tc, &env, &[source]);
        let action = &graph.actions()[0];
        assert!(action.can_execute_remotely());
        assert!(!action.can_execute_remotely_with_secondary());
    }

    #[test]
    fn test_plain_c_sources_share_pdb() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, inline_settings());
        let zlib = project.source("ThirdParty/zlib/inflate.c", "");
        let png = project.source("ThirdParty/png/png.C", "");
        let env = CompileEnvironment {
            debug_info: DebugInfo::Pdb,
            ..Default::default()
        };

        let (graph, _) = compile(&project, &tc, &env, &[zlib, png]);
        let pdb = format!(
            "/Fd\"{}\"",
            project.output_dir("Core").join("MiscPlainC.pdb").display()
        );
        for action in graph.actions() {
            let args = action.arguments();
            assert!(args.contains(&pdb));
            assert!(args.contains(&"/TC".to_string()));
            assert!(args.contains(&"/W0".to_string()));
            assert!(!args.contains(&"/TP".to_string()));
        }
    }

    #[test]
    fn test_module_interface_scan_precedes_compile() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2022, inline_settings());
        let source = project.source("Source/Core/Math.ixx", "export module Math;");
        let env = CompileEnvironment::default();

        let (graph, output) = compile(&project, &tc, &env, &[source.clone()]);
        let out = project.output_dir("Core");
        let directives = FileItem::new(out.join("Math.ixx.md.json"));
        let ifc = FileItem::new(out.join("Ifc").join("Math.ifc"));
        assert_eq!(output.compiled_module_interfaces, vec![ifc.clone()]);

        let order = graph.execution_order().unwrap();
        assert_eq!(order.len(), 2);
        let (scan, compile) = (order[0], order[1]);
        assert_eq!(scan.command_description(), "ScanModule");
        assert!(scan.produces(&directives));
        assert_eq!(scan.produced_items().len(), 1);
        assert!(scan.requires(&source));

        assert!(compile.requires(&directives));
        assert!(compile.produces(&ifc));
        assert!(compile.arguments().contains(&"/interface".to_string()));
    }

    #[test]
    fn test_module_interface_scan_shares_pdb() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2022, inline_settings());
        let source = project.source("Source/Core/Math.ixx", "export module Math;");
        let env = CompileEnvironment {
            debug_info: DebugInfo::Pdb,
            ..Default::default()
        };

        let (graph, _) = compile(&project, &tc, &env, &[source]);
        let pdb = project.output_dir("Core").join("Math.ixx.pdb");
        let fd = format!("/Fd\"{}\"", pdb.display());
        let tag = format!("pdb:{}", pdb.display());

        let order = graph.execution_order().unwrap();
        for action in order {
            assert!(action.arguments().contains(&fd), "{}", action.command_description());
            assert!(action.shared_resources().contains(&tag));
            assert!(!action.can_execute_remotely());
        }
        assert_eq!(graph.actions()[0].command_description(), "ScanModule");
    }

    #[test]
    fn test_dependency_list_without_filter() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, inline_settings());
        let source = project.source("Source/Core/Engine.cpp", "");
        let env = CompileEnvironment {
            generate_dependencies_file: true,
            ..Default::default()
        };

        let (graph, _) = compile(&project, &tc, &env, &[source]);
        let list = project.output_dir("Core").join("Engine.cpp.txt");
        let action = &graph.actions()[0];
        assert!(action.produces(&FileItem::new(&list)));
        assert!(action
            .arguments()
            .contains(&format!("/sourceDependencies \"{}\"", list.display())));
    }

    #[test]
    fn test_dependency_list_through_cl_filter() {
        let project = ProjectFixture::new();
        let kind = CompilerKind::VisualStudio2019;
        let settings = PlatformSettings::default();
        let tools = ToolPaths {
            cl_filter: Some(PathBuf::from("/tools/cl-filter.exe")),
            ..tool_paths(kind, &settings)
        };
        let version = kind.default_toolchain_version();
        let tc = ToolchainEnvironment::new(
            kind,
            version.to_string(),
            version,
            tools,
            project.root(),
            settings,
        );
        let source = project.source("Source/Core/Engine.cpp", "");
        let env = CompileEnvironment {
            generate_dependencies_file: true,
            ..Default::default()
        };

        let (graph, _) = compile(&project, &tc, &env, &[source]);
        let out = project.output_dir("Core");
        let list = out.join("Engine.cpp.txt");
        let response = out.join("Engine.cpp.obj.response");
        let action = &graph.actions()[0];

        assert_eq!(action.command_path(), Path::new("/tools/cl-filter.exe"));
        assert_eq!(
            action.arguments(),
            [
                format!("-dependencies=\"{}\"", list.display()),
                "-compiler=\"/vc/bin/cl.exe\"".to_string(),
                "--".to_string(),
                "\"/vc/bin/cl.exe\"".to_string(),
                format!("@\"{}\"", response.display()),
                "/showIncludes".to_string(),
            ]
        );
        assert!(action.produces(&FileItem::new(&list)));
        assert!(action.requires(&FileItem::new(&response)));
        assert!(!project.read(&response).contains("/sourceDependencies"));
    }

    #[test]
    fn test_preprocess_only() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, inline_settings());
        let source = project.source("Source/Core/Engine.cpp", "");
        let env = CompileEnvironment {
            preprocess_only: true,
            ..Default::default()
        };

        let (graph, output) = compile(&project, &tc, &env, &[source]);
        let preprocessed = FileItem::new(project.output_dir("Core").join("Engine.cpp.i"));
        assert_eq!(output.object_files, vec![preprocessed.clone()]);
        let action = &graph.actions()[0];
        assert!(action.produces(&preprocessed));
        assert_eq!(action.command_description(), "Preprocess");
        assert!(action.arguments().contains(&"/P".to_string()));
    }

    #[test]
    fn test_dependency_file_in_preprocess_mode_rejected() {
        let project = ProjectFixture::new();
        let tc = project.toolchain(CompilerKind::VisualStudio2019);
        let source = project.source("Source/Core/Engine.cpp", "");
        let env = CompileEnvironment {
            preprocess_only: true,
            generate_dependencies_file: true,
            ..Default::default()
        };

        let mut graph = project.graph();
        let err = compile_cpp_files(&tc, &env, &[source], Path::new("/out"), "Core", &mut graph)
            .unwrap_err();
        assert!(matches!(
            error_of(err),
            ToolchainError::DependencyFileInPreprocessMode { .. }
        ));
        assert!(graph.actions().is_empty());
    }

    #[test]
    fn test_pch_include_without_file_rejected() {
        let project = ProjectFixture::new();
        let tc = project.toolchain(CompilerKind::VisualStudio2019);
        let source = project.source("Source/Core/Engine.cpp", "");
        let env = CompileEnvironment {
            pch_action: PchAction::Include,
            precompiled_header_include: Some(project.path("Source/Core/CorePCH.h")),
            ..Default::default()
        };

        let mut graph = project.graph();
        let err = compile_cpp_files(&tc, &env, &[source], Path::new("/out"), "Core", &mut graph)
            .unwrap_err();
        assert!(matches!(error_of(err), ToolchainError::PchMisconfigured { .. }));
        assert!(graph.actions().is_empty());
    }

    #[test]
    fn test_timing_files_and_parse_actions() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(
            CompilerKind::VisualStudio2019,
            PlatformSettings {
                print_toolchain_timing_info: true,
                always_use_response_files: false,
                ..Default::default()
            },
        );
        let source = project.source("Source/Core/Engine.cpp", "");
        let (graph, _) = compile(&project, &tc, &CompileEnvironment::default(), &[source]);

        let out = project.output_dir("Core");
        let timing = FileItem::new(out.join("Engine.cpp.timing"));
        let cta = FileItem::new(out.join("Engine.cpp.cta"));
        let parse = graph
            .actions()
            .iter()
            .find(|a| a.kind() == ActionKind::ParseTimingInfo)
            .unwrap();
        assert!(parse.requires(&timing));
        assert!(parse.produces(&cta));
        assert!(graph.producer_of(&timing).is_some());
    }

    #[test]
    fn test_obj_src_map_lines() {
        let project = ProjectFixture::new();
        let map = project.path("Intermediate/ObjSrcMap.txt");
        let tc = project.toolchain_with(
            CompilerKind::VisualStudio2019,
            PlatformSettings {
                obj_src_map_file: Some(map.clone()),
                always_use_response_files: false,
                ..Default::default()
            },
        );
        let source = project.source("Source/Core/Engine.cpp", "");
        compile(&project, &tc, &CompileEnvironment::default(), &[source.clone()]);

        assert_eq!(
            project.read(&map),
            format!("\"Engine.cpp.obj\" -> \"{}\"\n", source.path().display())
        );
    }

    #[test]
    fn test_clang_time_trace_output() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(
            CompilerKind::Clang,
            PlatformSettings {
                clang_time_trace: true,
                always_use_response_files: false,
                ..Default::default()
            },
        );
        let source = project.source("Source/Core/Engine.cpp", "");
        let (graph, _) = compile(&project, &tc, &CompileEnvironment::default(), &[source]);

        let trace = FileItem::new(project.output_dir("Core").join("Engine.cpp.json"));
        assert!(graph.actions()[0].produces(&trace));
    }
}
