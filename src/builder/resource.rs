//! Resource scripts and COM type libraries.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::builder::action::ActionKind;
use crate::builder::args::compile::{
    define_argument, definition_argument, include_path_argument, system_include_path_argument,
};
use crate::builder::args::quoted;
use crate::builder::compile::CppOutput;
use crate::builder::graph::ActionGraph;
use crate::builder::toolchain::ToolchainEnvironment;
use crate::core::{CompileEnvironment, FileItem};

/// A type library to generate a header from with `#import`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeLibrary {
    /// Library file name, resolved by the compiler's search path
    pub file_name: String,
    /// Extra `#import` attributes (`named_guids raw_interfaces_only`)
    #[serde(default)]
    pub attributes: Option<String>,
    /// Header name the compiler generates
    pub header: String,
}

/// Strip characters that must be paired inside a command-line macro.
fn sanitize_macro_value(value: &str) -> String {
    value.chars().filter(|c| *c != '\'' && *c != '"').collect()
}

/// Compile `.rc` scripts into `.res` files.
pub fn compile_rc_files(
    toolchain: &ToolchainEnvironment,
    env: &CompileEnvironment,
    files: &[FileItem],
    output_dir: &Path,
    graph: &mut dyn ActionGraph,
) -> Result<CppOutput> {
    let settings = toolchain.settings();
    let mut output = CppOutput::default();

    for rc_file in files {
        let mut action = graph.create_action(ActionKind::Compile);
        action.command_description = "Resource".to_string();
        action.command_path = toolchain.resource_compiler_path().to_path_buf();
        action.status_description = rc_file.file_name();
        action.add_prerequisites(env.force_include_files.iter().cloned());
        action.add_prerequisites(env.additional_prerequisites.iter().cloned());
        action.can_execute_remotely = true;
        action.can_execute_remotely_with_secondary = false;

        let mut args = vec!["/nologo".to_string()];
        if settings.architecture.is_64bit() {
            args.push(definition_argument("_WIN64", None));
        }
        args.push("/l 0x409".to_string());

        // Paths stay absolute; rc has no notion of the project root.
        for path in env
            .user_include_paths
            .iter()
            .chain(&env.system_include_paths)
            .chain(toolchain.include_paths())
        {
            args.push(format!("/I {}", quoted(path)));
        }

        for define in &env.definitions {
            let rendered = define_argument(define);
            if !rendered.contains("_API") {
                args.push(rendered);
            }
        }

        // Project icons only apply outside the shared build environment.
        let icon = match &settings.application_icon {
            Some(icon) if !env.use_shared_build_environment => icon.clone(),
            _ => settings.default_application_icon.clone(),
        };
        action.add_prerequisite(FileItem::new(&icon));
        let icon_value = format!(
            "\"\\\"{}\\\"\"",
            icon.display().to_string().replace('\\', "\\\\")
        );
        args.push(definition_argument("BUILD_ICON_FILE_NAME", Some(&icon_value)));

        if !env.use_shared_build_environment {
            let project_values = [
                ("PROJECT_COMPANY_NAME", settings.company_name.clone()),
                ("PROJECT_COPYRIGHT_STRING", settings.copyright_notice.clone()),
                ("PROJECT_PRODUCT_NAME", settings.product_name.clone()),
                (
                    "PROJECT_PRODUCT_IDENTIFIER",
                    settings
                        .project_file
                        .as_ref()
                        .and_then(|p| p.file_stem())
                        .map(|s| s.to_string_lossy().into_owned()),
                ),
            ];
            for (name, value) in project_values {
                if let Some(value) = value.filter(|v| !v.is_empty()) {
                    args.push(definition_argument(name, Some(&sanitize_macro_value(&value))));
                }
            }
        }

        let compiled = FileItem::new(output_dir.join(format!("{}.res", rc_file.file_name())));
        args.push(format!("/fo {}", quoted(compiled.path())));
        args.push(quoted(rc_file.path()));

        action.arguments = args;
        action.add_prerequisite(rc_file.clone());
        action.add_produced(compiled.clone());
        graph.add_action(action.build())?;

        output.object_files.push(compiled);
    }

    Ok(output)
}

/// Generate the header for a type library.
///
/// The compiler writes the header as a side effect of compiling a stub that
/// `#import`s the library, and leaves it with an old timestamp when the
/// contents are unchanged, so a second action touches it.
pub fn generate_type_library_header(
    toolchain: &ToolchainEnvironment,
    env: &CompileEnvironment,
    type_library: &TypeLibrary,
    output_file: &Path,
    graph: &mut dyn ActionGraph,
) -> Result<()> {
    let mut contents = String::from("#include <windows.h>\n#include <unknwn.h>\n\n");
    contents.push_str(&format!("#import \"{}\"", type_library.file_name));
    if let Some(attributes) = type_library.attributes.as_deref().filter(|a| !a.is_empty()) {
        contents.push(' ');
        contents.push_str(attributes);
    }
    contents.push('\n');

    let header = FileItem::new(output_file);
    let input = graph.create_intermediate_text_file(&output_file.with_extension("cpp"), &contents)?;
    let object = header.with_extension("obj");

    let mut args = vec![
        quoted(input.path()),
        "/c".to_string(),
        "/nologo".to_string(),
        format!("/Fo{}", quoted(object.path())),
    ];
    for path in &env.user_include_paths {
        args.push(include_path_argument(path, toolchain, env.preprocess_only));
    }
    for path in env.system_include_paths.iter().chain(toolchain.include_paths()) {
        args.push(system_include_path_argument(path, toolchain, env.preprocess_only));
    }

    let mut compile = graph.create_action(ActionKind::Compile);
    compile.command_description = "GenerateTLH".to_string();
    compile.command_path = toolchain.compiler_path().to_path_buf();
    compile.status_description = type_library.header.clone();
    compile.arguments = args;
    compile.add_prerequisite(input);
    compile.add_produced(object.clone());
    compile.delete_items.insert(header.clone());
    // Generated headers are written next to the stub, so this runs locally.
    compile.can_execute_remotely = false;
    graph.add_action(compile.build())?;

    let mut touch = graph.create_action(ActionKind::BuildProject);
    touch.command_description = "Touch".to_string();
    touch.command_path = toolchain.settings().shell.clone();
    touch.arguments = vec![format!(
        "/C \"copy /b \"{0}\"+,, \"{0}\" 1>nul:\"",
        header.path().display()
    )];
    touch.status_description = header.file_name();
    touch.add_prerequisite(object);
    touch.add_produced(header);
    graph.add_action(touch.build())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::builder::toolchain::{CompilerKind, PlatformSettings};
    use crate::core::Define;
    use crate::test_support::ProjectFixture;

    fn branded_settings(project: &ProjectFixture) -> PlatformSettings {
        PlatformSettings {
            application_icon: Some(project.path("Build/Windows/Game.ico")),
            default_application_icon: PathBuf::from("/engine/Default.ico"),
            company_name: Some("Epic's Games".to_string()),
            copyright_notice: Some("Copyright \"2024\"".to_string()),
            product_name: Some("Shooter".to_string()),
            project_file: Some(project.path("Shooter.uproject")),
            ..Default::default()
        }
    }

    #[test]
    fn test_resource_arguments() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, branded_settings(&project));
        let env = CompileEnvironment {
            user_include_paths: vec![project.path("Source/Game")],
            definitions: vec![
                Define::key_value("GAME_API", "DLLEXPORT"),
                Define::key_value("WITH_EDITOR", "0"),
            ],
            ..Default::default()
        };
        let rc = project.source("Source/Game/Game.rc", "");
        let out = project.output_dir("Game");
        let mut graph = project.graph();
        let output = compile_rc_files(&tc, &env, &[rc.clone()], &out, &mut graph).unwrap();

        let res = FileItem::new(out.join("Game.rc.res"));
        assert_eq!(output.object_files, vec![res.clone()]);

        let action = &graph.actions()[0];
        let args = action.arguments();
        assert_eq!(&args[..3], ["/nologo", "/D_WIN64", "/l 0x409"]);
        assert_eq!(args[3], format!("/I \"{}\"", project.path("Source/Game").display()));
        assert!(args.contains(&"/DWITH_EDITOR=0".to_string()));
        assert!(!args.iter().any(|a| a.contains("GAME_API")));
        assert!(args.contains(&"/DPROJECT_COMPANY_NAME=\"Epics Games\"".to_string()));
        assert!(args.contains(&"/DPROJECT_COPYRIGHT_STRING=\"Copyright 2024\"".to_string()));
        assert!(args.contains(&"/DPROJECT_PRODUCT_NAME=Shooter".to_string()));
        assert!(args.contains(&"/DPROJECT_PRODUCT_IDENTIFIER=Shooter".to_string()));
        assert_eq!(args[args.len() - 2], format!("/fo {}", quoted(res.path())));
        assert_eq!(args[args.len() - 1], quoted(rc.path()));

        assert!(action.requires(&rc));
        assert!(action.requires(&FileItem::new(project.path("Build/Windows/Game.ico"))));
        assert!(action.can_execute_remotely());
        assert!(!action.can_execute_remotely_with_secondary());
        assert_eq!(action.command_path(), tc.resource_compiler_path());
    }

    #[test]
    fn test_shared_environment_uses_default_icon() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, branded_settings(&project));
        let env = CompileEnvironment {
            use_shared_build_environment: true,
            ..Default::default()
        };
        let rc = project.source("Source/Editor/Editor.rc", "");
        let mut graph = project.graph();
        compile_rc_files(&tc, &env, &[rc], &project.output_dir("Editor"), &mut graph).unwrap();

        let action = &graph.actions()[0];
        assert!(action.requires(&FileItem::new("/engine/Default.ico")));
        assert!(action
            .arguments()
            .contains(&"/DBUILD_ICON_FILE_NAME=\"\\\"/engine/Default.ico\\\"\"".to_string()));
        assert!(!action.arguments().iter().any(|a| a.starts_with("/DPROJECT_")));
    }

    #[test]
    fn test_type_library_header() {
        let project = ProjectFixture::new();
        let tc = project.toolchain(CompilerKind::VisualStudio2019);
        let library = TypeLibrary {
            file_name: "msxml6.dll".to_string(),
            attributes: Some("named_guids".to_string()),
            header: "msxml6.tlh".to_string(),
        };
        let header = project.output_dir("Game").join("msxml6.tlh");
        let mut graph = project.graph();
        generate_type_library_header(&tc, &CompileEnvironment::default(), &library, &header, &mut graph)
            .unwrap();

        let stub = project.read(&header.with_extension("cpp"));
        assert_eq!(
            stub,
            "#include <windows.h>\n#include <unknwn.h>\n\n#import \"msxml6.dll\" named_guids\n"
        );

        let header = FileItem::new(header);
        let object = header.with_extension("obj");
        let compile = graph.producer_of(&object).unwrap();
        assert!(compile.delete_items().contains(&header));
        assert!(!compile.can_execute_remotely());
        assert_eq!(compile.command_description(), "GenerateTLH");

        let touch = graph.producer_of(&header).unwrap();
        assert_eq!(touch.kind(), ActionKind::BuildProject);
        assert!(touch.requires(&object));
        assert!(touch.arguments()[0].starts_with("/C \"copy /b"));

        let order = graph.execution_order().unwrap();
        assert_eq!(order[0].command_description(), "GenerateTLH");
    }
}
