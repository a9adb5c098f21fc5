//! Linker and librarian arguments.

use std::collections::BTreeSet;

use super::quoted;
use crate::builder::toolchain::{CompilerFamily, ToolchainEnvironment};
use crate::core::{Configuration, LinkEnvironment};

fn uses_clang_linker(toolchain: &ToolchainEnvironment) -> bool {
    toolchain.family() == CompilerFamily::Clang && toolchain.settings().allow_clang_linker
}

fn subsystem(env: &LinkEnvironment) -> &'static str {
    if env.is_building_console_application {
        "/SUBSYSTEM:CONSOLE"
    } else {
        "/SUBSYSTEM:WINDOWS"
    }
}

/// Arguments for linking an executable or DLL.
pub fn linker_arguments(env: &LinkEnvironment, toolchain: &ToolchainEnvironment) -> Vec<String> {
    let settings = toolchain.settings();
    let clang_linker = uses_clang_linker(toolchain);
    let mut args = Vec::new();

    if clang_linker && !env.omit_frame_pointers {
        args.push("--disable-fp-elim".to_string());
    }

    match &settings.manifest_file {
        Some(manifest) => {
            args.push("/MANIFEST:EMBED".to_string());
            args.push(format!("/MANIFESTINPUT:{}", quoted(manifest)));
        }
        None => args.push("/MANIFEST:NO".to_string()),
    }

    args.push("/NOLOGO".to_string());

    if env.create_debug_info {
        if env.use_fast_pdb_linking && toolchain.compiler().visual_studio_year().is_some() {
            args.push("/DEBUG:FASTLINK".to_string());
        } else if env.use_fast_pdb_linking && clang_linker {
            args.push("/DEBUG:GHASH".to_string());
        } else {
            args.push("/DEBUG".to_string());
        }
    }

    args.push("/errorReport:prompt".to_string());
    args.push(format!("/MACHINE:{}", settings.architecture.machine()));
    args.push(subsystem(env).to_string());

    if env.is_building_console_application && !env.is_building_dll {
        if let Some(entry) = &env.entry_point_override {
            args.push(format!("/ENTRY:{}", entry));
        }
    }

    // Relocatable images with ASLR and DEP.
    args.push("/FIXED:No".to_string());
    args.push("/NXCOMPAT".to_string());

    if env.default_stack_size_commit > 0 {
        args.push(format!(
            "/STACK:{},{}",
            env.default_stack_size, env.default_stack_size_commit
        ));
    } else {
        args.push(format!("/STACK:{}", env.default_stack_size));
    }

    args.push("/DELAY:UNLOAD".to_string());

    if env.is_building_dll {
        args.push("/DLL".to_string());
    }

    if env.create_debug_info {
        // Record only the PDB file name so binaries are relocatable.
        args.push("/PDBALTPATH:%_PDB%".to_string());
    }

    if env.allow_ltcg {
        args.push("/LTCG".to_string());
    }

    if env.configuration == Configuration::Shipping {
        args.push("/RELEASE".to_string());
    }

    args.push(
        if settings.strip_unreferenced_symbols {
            "/OPT:REF"
        } else {
            "/OPT:NOREF"
        }
        .to_string(),
    );
    args.push(
        if settings.merge_identical_comdats {
            "/OPT:ICF"
        } else {
            "/OPT:NOICF"
        }
        .to_string(),
    );

    if env.use_incremental_linking {
        args.push("/INCREMENTAL".to_string());
        args.push("/verbose:incr".to_string());
    } else {
        args.push("/INCREMENTAL:NO".to_string());
    }

    // Delay-loaded DLL without imports.
    args.push("/ignore:4199".to_string());
    // Missing PDBs for static libraries.
    args.push("/ignore:4099".to_string());

    args
}

/// Arguments for archiving a static library.
pub fn librarian_arguments(env: &LinkEnvironment, toolchain: &ToolchainEnvironment) -> Vec<String> {
    let mut args = vec![
        "/NOLOGO".to_string(),
        "/errorReport:prompt".to_string(),
        format!("/MACHINE:{}", toolchain.settings().architecture.machine()),
        subsystem(env).to_string(),
    ];

    if env.configuration == Configuration::Shipping {
        args.push("/LTCG".to_string());
    }

    args
}

/// The option part of a link or archive command line.
///
/// Inputs, outputs and the secondary artifacts a link declares are added by
/// the link orchestrator.
pub fn build_link_arguments(
    env: &LinkEnvironment,
    toolchain: &ToolchainEnvironment,
    import_library_only: bool,
) -> Vec<String> {
    let flags = toolchain.family().flags();
    let library_or_import = env.is_building_library || import_library_only;

    let mut args = if library_or_import {
        librarian_arguments(env, toolchain)
    } else {
        linker_arguments(env, toolchain)
    };

    if env.print_timing_info && flags.linker_timing {
        args.push("/time+".to_string());
    }

    if import_library_only {
        args.push("/DEF".to_string());
        args.push(format!("/NAME:\"{}\"", env.output_file_name()));
        // Object files that define no public symbols.
        args.push("/IGNORE:4221".to_string());
    }

    if !library_or_import {
        let delay_loads: BTreeSet<&str> = env.delay_load_dlls.iter().map(String::as_str).collect();
        for dll in delay_loads {
            args.push(format!("/DELAYLOAD:\"{}\"", dll));
        }

        if let Some(definition) = &env.module_definition_file {
            args.push(format!("/DEF:{}", quoted(definition)));
        }
    }

    if import_library_only {
        args.push("/NODEFAULTLIB".to_string());
    } else if !env.is_building_library {
        for path in env.system_library_paths.iter().chain(toolchain.library_paths()) {
            args.push(format!("/LIBPATH:{}", quoted(path)));
        }
        for library in &env.excluded_libraries {
            args.push(format!("/NODEFAULTLIB:\"{}\"", library));
        }
    }

    if !import_library_only && toolchain.settings().create_hotpatchable_image {
        args.push("/FUNCTIONPADMIN".to_string());
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::{CompilerKind, PlatformSettings};
    use crate::test_support::{link_env, toolchain, toolchain_with};
    use std::path::PathBuf;

    fn has(args: &[String], flag: &str) -> bool {
        args.iter().any(|a| a == flag)
    }

    #[test]
    fn test_shipping_ltcg_link() {
        let tc = toolchain(CompilerKind::VisualStudio2022);
        let env = LinkEnvironment {
            configuration: Configuration::Shipping,
            allow_ltcg: true,
            ..link_env("/proj/Binaries/Game.exe")
        };
        let args = build_link_arguments(&env, &tc, false);
        assert!(has(&args, "/LTCG"));
        assert!(has(&args, "/RELEASE"));
        assert!(has(&args, "/INCREMENTAL:NO"));
    }

    #[test]
    fn test_debug_link_defaults() {
        let tc = toolchain(CompilerKind::VisualStudio2019);
        let env = LinkEnvironment {
            configuration: Configuration::Debug,
            use_incremental_linking: true,
            ..link_env("/proj/Binaries/Game.exe")
        };
        let args = build_link_arguments(&env, &tc, false);
        for flag in [
            "/MANIFEST:NO",
            "/NOLOGO",
            "/DEBUG",
            "/MACHINE:x64",
            "/SUBSYSTEM:WINDOWS",
            "/STACK:5000000",
            "/INCREMENTAL",
            "/verbose:incr",
            "/OPT:NOREF",
            "/OPT:NOICF",
        ] {
            assert!(has(&args, flag), "missing {}", flag);
        }
        assert!(!has(&args, "/RELEASE"));
        assert!(!has(&args, "/DLL"));
    }

    #[test]
    fn test_fast_pdb_linking_per_family() {
        let env = LinkEnvironment {
            use_fast_pdb_linking: true,
            ..link_env("/proj/Binaries/Game.exe")
        };

        let vs = toolchain(CompilerKind::VisualStudio2019);
        assert!(has(&linker_arguments(&env, &vs), "/DEBUG:FASTLINK"));

        let lld = toolchain_with(
            CompilerKind::Clang,
            PlatformSettings {
                allow_clang_linker: true,
                ..Default::default()
            },
        );
        assert!(has(&linker_arguments(&env, &lld), "/DEBUG:GHASH"));

        let clang_link = toolchain(CompilerKind::Clang);
        assert!(has(&linker_arguments(&env, &clang_link), "/DEBUG"));
    }

    #[test]
    fn test_console_entry_point() {
        let tc = toolchain(CompilerKind::VisualStudio2019);
        let env = LinkEnvironment {
            is_building_console_application: true,
            entry_point_override: Some("wmainCRTStartup".to_string()),
            default_stack_size_commit: 4096,
            ..link_env("/proj/Binaries/Tool.exe")
        };
        let args = linker_arguments(&env, &tc);
        assert!(has(&args, "/SUBSYSTEM:CONSOLE"));
        assert!(has(&args, "/ENTRY:wmainCRTStartup"));
        assert!(has(&args, "/STACK:5000000,4096"));
    }

    #[test]
    fn test_library_uses_librarian_switches() {
        let tc = toolchain(CompilerKind::VisualStudio2019);
        let env = LinkEnvironment {
            is_building_library: true,
            configuration: Configuration::Shipping,
            system_library_paths: vec![PathBuf::from("/sdk/lib")],
            ..link_env("/proj/Intermediate/Core.lib")
        };
        let args = build_link_arguments(&env, &tc, false);
        assert_eq!(
            args,
            vec![
                "/NOLOGO",
                "/errorReport:prompt",
                "/MACHINE:x64",
                "/SUBSYSTEM:WINDOWS",
                "/LTCG"
            ]
        );
    }

    #[test]
    fn test_import_library_only() {
        let tc = toolchain(CompilerKind::VisualStudio2019);
        let env = LinkEnvironment {
            is_building_dll: true,
            delay_load_dlls: vec!["d3d12.dll".to_string()],
            ..link_env("/proj/Binaries/Engine.dll")
        };
        let args = build_link_arguments(&env, &tc, true);
        assert!(has(&args, "/DEF"));
        assert!(has(&args, "/NAME:\"Engine.dll\""));
        assert!(has(&args, "/IGNORE:4221"));
        assert!(has(&args, "/NODEFAULTLIB"));
        assert!(!args.iter().any(|a| a.starts_with("/DELAYLOAD")));
        assert!(!args.iter().any(|a| a.starts_with("/LIBPATH")));
    }

    #[test]
    fn test_delay_loads_are_distinct_and_library_paths_ordered() {
        let tc = toolchain(CompilerKind::VisualStudio2019);
        let env = LinkEnvironment {
            delay_load_dlls: vec![
                "b.dll".to_string(),
                "a.dll".to_string(),
                "b.dll".to_string(),
            ],
            system_library_paths: vec![PathBuf::from("/proj/ThirdParty/lib")],
            excluded_libraries: vec!["LIBCMT".to_string()],
            ..link_env("/proj/Binaries/Game.exe")
        };
        let args = build_link_arguments(&env, &tc, false);

        let delay: Vec<_> = args.iter().filter(|a| a.starts_with("/DELAYLOAD")).collect();
        assert_eq!(delay, vec!["/DELAYLOAD:\"a.dll\"", "/DELAYLOAD:\"b.dll\""]);

        let libpaths: Vec<_> = args.iter().filter(|a| a.starts_with("/LIBPATH")).collect();
        assert_eq!(
            libpaths,
            vec!["/LIBPATH:\"/proj/ThirdParty/lib\"", "/LIBPATH:\"/sdk/lib/x64\""]
        );
        assert!(has(&args, "/NODEFAULTLIB:\"LIBCMT\""));
    }

    #[test]
    fn test_hotpatchable_image() {
        let tc = toolchain_with(
            CompilerKind::VisualStudio2019,
            PlatformSettings {
                create_hotpatchable_image: true,
                ..Default::default()
            },
        );
        let env = link_env("/proj/Binaries/Game.exe");
        assert!(has(&build_link_arguments(&env, &tc, false), "/FUNCTIONPADMIN"));
        assert!(!has(&build_link_arguments(&env, &tc, true), "/FUNCTIONPADMIN"));
    }

    #[test]
    fn test_link_arguments_are_deterministic() {
        let tc = toolchain(CompilerKind::VisualStudio2019);
        let env = LinkEnvironment {
            delay_load_dlls: vec!["x.dll".to_string(), "y.dll".to_string()],
            ..link_env("/proj/Binaries/Game.exe")
        };
        assert_eq!(
            build_link_arguments(&env, &tc, false),
            build_link_arguments(&env.clone(), &tc, false)
        );
    }
}
