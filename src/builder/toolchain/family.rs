//! Per-family flag spellings.
//!
//! cl, clang-cl and icl accept the same driver syntax but disagree on a
//! handful of concepts. Each family gets one `FamilyFlags` entry; argument
//! building looks concepts up here instead of branching on the compiler.

use serde::{Deserialize, Serialize};

/// Compiler family sharing one flag dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerFamily {
    Msvc,
    Clang,
    Intel,
}

impl CompilerFamily {
    /// Get the flag table for this family.
    pub fn flags(&self) -> &'static FamilyFlags {
        match self {
            CompilerFamily::Msvc => &MSVC_FLAGS,
            CompilerFamily::Clang => &CLANG_FLAGS,
            CompilerFamily::Intel => &INTEL_FLAGS,
        }
    }

    /// Get the family name as a string.
    pub fn as_str(&self) -> &'static str {
        self.flags().name
    }
}

/// Enable/disable spellings of a boolean feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagPair {
    pub enabled: &'static str,
    pub disabled: &'static str,
}

impl FlagPair {
    /// Pick the spelling for the given state.
    pub fn select(&self, on: bool) -> &'static str {
        if on {
            self.enabled
        } else {
            self.disabled
        }
    }
}

/// How warning categories are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningStyle {
    /// Numbered `/wdNNNN`, `/w4NNNN`, `/weNNNN` codes
    MsvcCodes,
    /// `-W<group>` diagnostic groups
    ClangGroups,
}

/// How a translation unit is forced to C++.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CppModeFlag {
    /// A single driver switch (`/TP`)
    Switch(&'static str),
    /// `-Xclang -x -Xclang "c++"`, or `c++-header` when building a PCH
    ClangLanguage,
}

/// Flag table for one compiler family.
#[derive(Debug)]
pub struct FamilyFlags {
    pub name: &'static str,
    pub compile_as_cpp: CppModeFlag,
    /// Default floating-point model
    pub floating_point: &'static str,
    pub rtti: FlagPair,
    pub exceptions: FlagPair,
    /// Warning level for C++ translation units
    pub warning_level: &'static str,
    /// Style used for shadow-variable and undefined-identifier warnings
    pub warning_style: WarningStyle,
    /// Fixed `/Qstd` style standard switch that overrides the module's floor
    pub fixed_cpp_standard: Option<&'static str>,
    /// Flag used for system include directories, if distinct from `/I`
    pub system_include_flag: Option<&'static str>,
    /// Include paths may be shortened relative to the root directory
    pub relative_include_paths: bool,
    pub big_obj: bool,
    pub error_report: bool,
    /// Emits the `/d1reportTime` and `/Bt+` timing switches
    pub timing_switches: bool,
    /// Supports `/time+` on the linker
    pub linker_timing: bool,
    /// Leading driver switches for every compile
    pub driver_preamble: &'static [&'static str],
    /// Diagnostics silenced for C++ translation units
    pub cpp_warning_overrides: &'static [&'static str],
}

static MSVC_FLAGS: FamilyFlags = FamilyFlags {
    name: "msvc",
    compile_as_cpp: CppModeFlag::Switch("/TP"),
    floating_point: "/fp:fast",
    rtti: FlagPair {
        enabled: "/GR",
        disabled: "/GR-",
    },
    exceptions: FlagPair {
        enabled: "/EHsc",
        disabled: "/D_HAS_EXCEPTIONS=0",
    },
    warning_level: "/W4",
    warning_style: WarningStyle::MsvcCodes,
    fixed_cpp_standard: None,
    system_include_flag: None,
    relative_include_paths: true,
    big_obj: true,
    error_report: true,
    timing_switches: true,
    linker_timing: true,
    driver_preamble: &[],
    cpp_warning_overrides: &[],
};

// clang-cl's fast-math contraction is too imprecise for vector normalisation.
static CLANG_FLAGS: FamilyFlags = FamilyFlags {
    name: "clang",
    compile_as_cpp: CppModeFlag::ClangLanguage,
    floating_point: "/fp:precise",
    rtti: FlagPair {
        enabled: "/GR",
        disabled: "/GR-",
    },
    exceptions: FlagPair {
        enabled: "/EHsc",
        disabled: "/D_HAS_EXCEPTIONS=0",
    },
    warning_level: "/W4",
    warning_style: WarningStyle::ClangGroups,
    fixed_cpp_standard: None,
    system_include_flag: Some("/imsvc"),
    relative_include_paths: false,
    big_obj: false,
    error_report: true,
    timing_switches: false,
    linker_timing: false,
    driver_preamble: &["-fms-compatibility-version=19.24"],
    cpp_warning_overrides: &[
        "-Werror",
        "-Wno-microsoft",
        "-Wno-msvc-include",
        "-Wno-inconsistent-missing-override",
        "-Wno-unused-variable",
        "-Wno-unused-local-typedefs",
        "-Wno-unused-function",
        "-Wno-unused-private-field",
        "-Wno-unused-value",
        "-Wno-inline-new-delete",
        "-Wno-implicit-exception-spec-mismatch",
        "-Wno-undefined-bool-conversion",
        "-Wno-deprecated-declarations",
        "-Wno-deprecated-writable-strings",
        "-Wno-deprecated-register",
        "-Wno-switch-enum",
        "-Wno-logical-op-parentheses",
        "-Wno-null-arithmetic",
        "-Wno-return-type-c-linkage",
        "-Wno-ignored-attributes",
        "-Wno-uninitialized",
        "-Wno-tautological-compare",
        "-Wno-switch",
        "-Wno-invalid-offsetof",
        "-Wno-unused-parameter",
        "-Wno-ignored-qualifiers",
        "-Wno-expansion-to-defined",
        "-Wno-gnu-string-literal-operator-template",
        "-Wno-sign-compare",
        "-Wno-undefined-var-template",
        "-Wno-missing-field-initializers",
        "-Wno-unused-lambda-capture",
        "-Wno-nonportable-include-path",
        "-Wno-invalid-token-paste",
        "-Wno-null-pointer-arithmetic",
        "-Wno-constant-logical-operand",
    ],
};

static INTEL_FLAGS: FamilyFlags = FamilyFlags {
    name: "intel",
    compile_as_cpp: CppModeFlag::Switch("/TP"),
    floating_point: "/fp:precise",
    rtti: FlagPair {
        enabled: "/GR",
        disabled: "/GR-",
    },
    exceptions: FlagPair {
        enabled: "/EHsc",
        disabled: "/D_HAS_EXCEPTIONS=0",
    },
    warning_level: "/W0",
    warning_style: WarningStyle::MsvcCodes,
    fixed_cpp_standard: Some("/Qstd=c++14"),
    system_include_flag: None,
    relative_include_paths: true,
    big_obj: true,
    error_report: false,
    timing_switches: false,
    linker_timing: true,
    driver_preamble: &[],
    cpp_warning_overrides: &[],
};
