//! Compiler arguments.

use std::path::Path;

use crate::builder::toolchain::family::CppModeFlag;
use crate::builder::toolchain::{CompilerFamily, TargetPlatform, ToolchainEnvironment, WarningStyle};
use crate::core::{CompileEnvironment, Configuration, DebugInfo, Define, PchAction, StaticAnalyzer, WarningLevel};
use crate::util::fs::relative_to;

/// Shadowed-declaration warnings (local, member, global).
const SHADOW_WARNINGS: &[u32] = &[4456, 4458, 4459];
/// Undefined macro in `#if`.
const UNDEFINED_IDENTIFIER_WARNINGS: &[u32] = &[4668];
/// Lossy and narrowing conversions.
const UNSAFE_CAST_WARNINGS: &[u32] = &[4244, 4838];

/// First toolset that understands `/d1reportTime`.
const REPORT_TIME_MIN_VERSION: semver::Version = semver::Version::new(14, 14, 26316);

const CLANG_ANALYZER_CHECKERS: &[&str] = &[
    "core",
    "unix.Malloc",
    "unix.MallocSizeof",
    "cplusplus",
    "optin.cplusplus.UninitializedObject",
    "optin.cplusplus.VirtualCall",
];

/// Render a `/D` definition.
///
/// Values containing a space or `$` are quoted unless already quoted.
pub fn definition_argument(name: &str, value: Option<&str>) -> String {
    match value {
        Some(v) if !v.starts_with('"') && (v.contains(' ') || v.contains('$')) => {
            format!("/D{}=\"{}\"", name, v)
        }
        Some(v) => format!("/D{}={}", name, v),
        None => format!("/D{}", name),
    }
}

/// Render a [`Define`].
pub fn define_argument(define: &Define) -> String {
    let (name, value) = define.parts();
    definition_argument(name, value)
}

/// Render a user include directory as `/I path`.
///
/// Paths under the root directory are shortened to a relative form, except
/// for compilers that resolve includes against the source file and for
/// preprocess-only runs whose output is consumed elsewhere.
pub fn include_path_argument(
    path: &Path,
    toolchain: &ToolchainEnvironment,
    preprocess_only: bool,
) -> String {
    let relative = if toolchain.family().flags().relative_include_paths && !preprocess_only {
        relative_to(toolchain.root_dir(), path)
    } else {
        None
    };
    let rendered = relative.as_deref().unwrap_or(path).display().to_string();

    if rendered.contains(' ') {
        format!("/I \"{}\"", rendered)
    } else {
        format!("/I {}", rendered)
    }
}

/// Render a system include directory.
pub fn system_include_path_argument(
    path: &Path,
    toolchain: &ToolchainEnvironment,
    preprocess_only: bool,
) -> String {
    match toolchain.family().flags().system_include_flag {
        Some(flag) => format!("{} \"{}\"", flag, path.display()),
        None => include_path_argument(path, toolchain, preprocess_only),
    }
}

/// Include directory arguments: user paths, then module system paths, then
/// the toolchain's own.
pub fn include_arguments(env: &CompileEnvironment, toolchain: &ToolchainEnvironment) -> Vec<String> {
    let mut args = Vec::new();
    for path in &env.user_include_paths {
        args.push(include_path_argument(path, toolchain, env.preprocess_only));
    }
    for path in env.system_include_paths.iter().chain(toolchain.include_paths()) {
        args.push(system_include_path_argument(path, toolchain, env.preprocess_only));
    }
    args
}

/// Definition arguments, in declaration order.
pub fn definition_arguments(env: &CompileEnvironment) -> Vec<String> {
    env.definitions.iter().map(define_argument).collect()
}

fn msvc_warning_arguments(level: WarningLevel, codes: &[u32], args: &mut Vec<String>) {
    let prefix = match level {
        WarningLevel::Off => "/wd",
        // /wLNNNN sets warning NNNN to level L
        WarningLevel::Warning => "/w4",
        WarningLevel::Error => "/we",
    };
    args.extend(codes.iter().map(|code| format!("{}{}", prefix, code)));
}

fn clang_warning_arguments(level: WarningLevel, group: &str, args: &mut Vec<String>) {
    match level {
        WarningLevel::Off => args.push(format!("-Wno-{}", group)),
        WarningLevel::Warning => {
            args.push(format!("-W{}", group));
            args.push(format!("-Wno-error={}", group));
        }
        WarningLevel::Error => args.push(format!("-W{}", group)),
    }
}

fn static_analyzer_arguments(family: CompilerFamily, args: &mut Vec<String>) {
    if family == CompilerFamily::Clang {
        // Backend-only analysis; the frontend switch enables unwanted checkers.
        for flag in [
            "-analyze",
            "-analyzer-output=text",
            "-analyzer-opt-analyze-nested-blocks",
        ] {
            args.push("-Xclang".to_string());
            args.push(flag.to_string());
        }
        args.extend(
            [
                "-Xclang",
                "-analyzer-config",
                "-Xclang",
                "aggressive-binary-operation-simplification=true",
                "-Xclang",
                "-setup-static-analyzer",
            ]
            .map(String::from),
        );
        for checker in CLANG_ANALYZER_CHECKERS {
            args.push("-Xclang".to_string());
            args.push(format!("-analyzer-checker={}", checker));
        }
    } else {
        args.push("/analyze".to_string());
        args.push("/analyze:WX-".to_string());
        args.push("/analyze:stacksize81940".to_string());
    }
}

fn optimization_arguments(env: &CompileEnvironment, args: &mut Vec<String>) {
    if env.configuration == Configuration::Debug {
        args.extend(["/Od", "/Os", "/RTCs"].map(String::from));
        return;
    }

    if !env.optimize_code {
        args.push("/Od".to_string());
    } else {
        args.extend(["/Ox", "/Ot", "/GF"].map(String::from));
        // /Ox implies /Oy
        if !env.omit_frame_pointers {
            args.push("/Oy-".to_string());
        }
    }

    if env.allow_ltcg {
        args.push("/GL".to_string());
    }
}

fn debug_info_arguments(env: &CompileEnvironment, args: &mut Vec<String>) {
    match env.debug_info {
        DebugInfo::None => {}
        DebugInfo::Embedded => args.push("/Z7".to_string()),
        DebugInfo::Pdb => args.push("/Zi".to_string()),
        DebugInfo::EditAndContinue => args.push("/ZI".to_string()),
    }

    // Incrementally linked PDBs are updated by several compiles at once.
    if env.debug_info.uses_pdb() && env.use_incremental_linking {
        args.push("/FS".to_string());
    }
}

fn crt_argument(env: &CompileEnvironment) -> &'static str {
    match (env.use_static_crt, env.use_debug_crt) {
        (true, true) => "/MTd",
        (true, false) => "/MT",
        (false, true) => "/MDd",
        (false, false) => "/MD",
    }
}

fn warning_arguments(
    env: &CompileEnvironment,
    toolchain: &ToolchainEnvironment,
    args: &mut Vec<String>,
) {
    let flags = toolchain.family().flags();
    let is_visual_studio = toolchain.compiler().visual_studio_year().is_some();

    if flags.warning_style == WarningStyle::MsvcCodes && is_visual_studio {
        msvc_warning_arguments(env.shadow_variable_warning_level, SHADOW_WARNINGS, args);
        if !env.preprocess_only {
            msvc_warning_arguments(
                env.undefined_identifier_warning_level,
                UNDEFINED_IDENTIFIER_WARNINGS,
                args,
            );
        }
    }

    if is_visual_studio {
        // Bit-field overflow when assigning 1 to a signed single-bit field.
        args.push("/wd4463".to_string());
    }

    let cast_level = if toolchain.settings().platform == TargetPlatform::Win64 {
        env.unsafe_type_cast_warning_level
    } else {
        WarningLevel::Off
    };
    msvc_warning_arguments(cast_level, UNSAFE_CAST_WARNINGS, args);
}

/// Arguments shared by every C and C++ translation unit of a module.
pub fn global_arguments(env: &CompileEnvironment, toolchain: &ToolchainEnvironment) -> Vec<String> {
    let family = toolchain.family();
    let flags = family.flags();
    let compiler = toolchain.compiler();
    let settings = toolchain.settings();
    let analyze = env.static_analyzer == StaticAnalyzer::Default;
    let mut args: Vec<String> = vec!["/Zc:inline".to_string()];

    args.extend(flags.driver_preamble.iter().map(|s| s.to_string()));
    if analyze {
        static_analyzer_arguments(family, &mut args);
    }

    args.push("/nologo".to_string());
    args.push("/Oi".to_string());

    if family == CompilerFamily::Clang {
        args.push(format!("--target={}", settings.architecture.clang_target()));
        if settings.architecture.is_x86_family() {
            args.push("-mssse3".to_string());
        }
    }

    args.push("/c".to_string());

    if settings.optimize_global_data {
        args.push("/Gw".to_string());
    }
    args.push("/Gy".to_string());

    match settings.pch_memory_allocation_factor {
        0 if analyze => args.push("/Zm750".to_string()),
        0 => args.push("/Zm1000".to_string()),
        factor if factor > 0 => args.push(format!("/Zm{}", factor)),
        _ => {}
    }

    // Characters not representable in the current code page.
    args.push("/wd4819".to_string());

    if compiler.is_visual_studio_at_least(2017) && settings.strict_conformance_mode {
        args.push(definition_argument("SAL_NO_ATTRIBUTE_DECLARATIONS", Some("1")));
        args.push("/permissive-".to_string());
        // Windows headers are not const-correct for string literals.
        args.push("/Zc:strictStrings-".to_string());
    }

    if compiler.is_visual_studio_at_least(2015) || family == CompilerFamily::Clang {
        args.push(definition_argument("_CRT_STDIO_LEGACY_WIDE_SPECIFIERS", Some("1")));
        args.push(definition_argument("_SILENCE_STDEXT_HASH_DEPRECATION_WARNINGS", Some("1")));
    }

    if family == CompilerFamily::Clang {
        args.push(definition_argument("_CRT_SECURE_NO_WARNINGS", None));
    }

    if env.is_building_dll {
        args.push(definition_argument("_WINDLL", None));
    }

    args.push(definition_argument("_DISABLE_EXTENDED_ALIGNED_STORAGE", None));

    if compiler.is_visual_studio_at_least(2015) {
        args.push("/source-charset:utf-8".to_string());
        args.push("/execution-charset:utf-8".to_string());
    }

    if !env.supports_edit_and_continue() && env.use_inlining {
        args.push("/Ob2".to_string());
    } else {
        args.push("/Ob0".to_string());
    }

    optimization_arguments(env, &mut args);

    if env.use_avx {
        args.push("/arch:AVX".to_string());
        for define in [
            "PLATFORM_ENABLE_VECTORINTRINSICS",
            "PLATFORM_MAYBE_HAS_SSE4_1",
            "PLATFORM_ALWAYS_HAS_SSE4_1",
            "PLATFORM_MAYBE_HAS_AVX",
            "PLATFORM_ALWAYS_HAS_AVX",
        ] {
            args.push(definition_argument(define, Some("1")));
        }
    }

    if flags.error_report {
        args.push("/errorReport:prompt".to_string());
    }

    args.push(flags.exceptions.select(env.enable_exceptions).to_string());

    debug_info_arguments(env, &mut args);

    args.push(crt_argument(env).to_string());

    if flags.big_obj {
        args.push("/bigobj".to_string());
    }

    args.push(flags.floating_point.to_string());

    if env.optimize_code {
        args.push("/Zo".to_string());
    }

    args.push("/Zp8".to_string());

    warning_arguments(env, toolchain, &mut args);

    args
}

/// Compiler timing instrumentation switches.
pub fn timing_arguments(env: &CompileEnvironment, toolchain: &ToolchainEnvironment) -> Vec<String> {
    let mut args = Vec::new();
    let wanted = env.print_timing_info || toolchain.settings().compiler_trace;
    if !wanted || !toolchain.family().flags().timing_switches {
        return args;
    }

    if env.print_timing_info {
        args.push("/Bt+".to_string());
        args.push("/d2cgsummary".to_string());
    }

    if *toolchain.toolchain_version() >= REPORT_TIME_MIN_VERSION {
        args.push("/d1reportTime".to_string());
    }

    args
}

/// Arguments for C++ translation units.
pub fn cpp_arguments(env: &CompileEnvironment, toolchain: &ToolchainEnvironment) -> Vec<String> {
    let flags = toolchain.family().flags();
    let mut args = Vec::new();

    match flags.compile_as_cpp {
        CppModeFlag::Switch(flag) => args.push(flag.to_string()),
        CppModeFlag::ClangLanguage => {
            let specifier = if env.pch_action == PchAction::Create {
                "c++-header"
            } else {
                "c++"
            };
            args.extend(["-Xclang", "-x", "-Xclang", specifier].map(String::from));
        }
    }

    if !env.enable_buffer_security_checks {
        args.push("/GS-".to_string());
    }

    args.push(flags.rtti.select(env.use_rtti).to_string());
    args.push(flags.warning_level.to_string());

    if env.warnings_as_errors {
        args.push("/WX".to_string());
    }

    match flags.fixed_cpp_standard {
        Some(standard) => args.push(standard.to_string()),
        None => args.push(format!("/std:{}", env.cpp_standard.as_msvc_flag_value())),
    }

    if flags.warning_style == WarningStyle::ClangGroups {
        if toolchain.settings().allow_clang_linker {
            args.push("-gcodeview-ghash".to_string());
        }

        // Must follow the warning level switch.
        args.extend(flags.cpp_warning_overrides.iter().map(|s| s.to_string()));

        clang_warning_arguments(env.shadow_variable_warning_level, "shadow", &mut args);
        if !env.preprocess_only {
            clang_warning_arguments(env.undefined_identifier_warning_level, "undef", &mut args);
        }
    }

    args
}

/// Arguments for plain C translation units, typically vendored sources.
pub fn c_arguments() -> Vec<String> {
    vec!["/TC".to_string(), "/W0".to_string()]
}

/// The complete argument list for a C++ translation unit of a module,
/// excluding per-file inputs, outputs and precompiled header switches.
pub fn build_compile_arguments(
    env: &CompileEnvironment,
    toolchain: &ToolchainEnvironment,
) -> Vec<String> {
    let mut args = include_arguments(env, toolchain);
    args.extend(definition_arguments(env));
    args.extend(global_arguments(env, toolchain));
    args.extend(timing_arguments(env, toolchain));
    args.extend(cpp_arguments(env, toolchain));
    args
}
