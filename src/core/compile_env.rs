//! Compile environment: everything the driver needs to know about one module
//! in one configuration.
//!
//! Instances are produced by module-rules resolution outside this crate and
//! are read-only here.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::file_item::FileItem;
use crate::core::language::CppStandard;

/// Build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Configuration {
    Debug,
    #[default]
    Development,
    Shipping,
}

/// Severity a warning category is reported at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    #[default]
    Off,
    Warning,
    Error,
}

/// Role of the precompiled header for a compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PchAction {
    #[default]
    None,
    Create,
    Include,
}

/// How debug information is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DebugInfo {
    /// No debug information.
    #[default]
    None,
    /// C7 debug info embedded in each object file (`/Z7`).
    #[serde(alias = "c7")]
    Embedded,
    /// Debug info written to PDB files (`/Zi`).
    #[serde(alias = "full")]
    Pdb,
    /// PDB debug info usable for edit-and-continue (`/ZI`).
    EditAndContinue,
}

impl DebugInfo {
    /// Whether any debug information is produced.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, DebugInfo::None)
    }

    /// Whether compiles write to PDB files.
    pub fn uses_pdb(&self) -> bool {
        matches!(self, DebugInfo::Pdb | DebugInfo::EditAndContinue)
    }
}

/// Static analysis mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StaticAnalyzer {
    #[default]
    None,
    Default,
}

/// A preprocessor definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Define {
    /// `NAME` or unsplit `NAME=VALUE` text
    Flag(String),
    /// Explicit name and value
    KeyValue { name: String, value: String },
}

impl Define {
    /// Create a define without a value.
    pub fn flag(name: impl Into<String>) -> Self {
        Define::Flag(name.into())
    }

    /// Create a define with a value.
    pub fn key_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Define::KeyValue {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Name and optional value; `Flag` text is split at the first `=`.
    pub fn parts(&self) -> (&str, Option<&str>) {
        match self {
            Define::Flag(text) => match text.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (text, None),
            },
            Define::KeyValue { name, value } => (name, Some(value)),
        }
    }

    /// Get the define name.
    pub fn name(&self) -> &str {
        self.parts().0
    }
}

impl From<&str> for Define {
    fn from(text: &str) -> Self {
        Define::Flag(text.to_string())
    }
}

/// Settings for compiling the sources of one module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileEnvironment {
    pub configuration: Configuration,

    /// Sources are compiled into a DLL (`_WINDLL`)
    pub is_building_dll: bool,
    /// Sources are archived into a static library
    pub is_building_library: bool,

    pub optimize_code: bool,
    pub omit_frame_pointers: bool,
    pub use_inlining: bool,
    pub allow_ltcg: bool,
    pub use_avx: bool,

    pub debug_info: DebugInfo,
    /// Incremental linking will patch the PDBs these objects feed
    pub use_incremental_linking: bool,

    pub enable_exceptions: bool,
    pub use_rtti: bool,
    pub enable_buffer_security_checks: bool,
    pub use_static_crt: bool,
    pub use_debug_crt: bool,

    pub warnings_as_errors: bool,
    pub shadow_variable_warning_level: WarningLevel,
    pub undefined_identifier_warning_level: WarningLevel,
    pub unsafe_type_cast_warning_level: WarningLevel,
    pub static_analyzer: StaticAnalyzer,

    pub cpp_standard: CppStandard,

    pub pch_action: PchAction,
    /// The `.pch` file consumed by `PchAction::Include`
    pub precompiled_header_file: Option<FileItem>,
    /// Header the PCH is built through
    pub precompiled_header_include: Option<PathBuf>,
    pub allow_remotely_compiled_pchs: bool,

    pub force_include_files: Vec<FileItem>,
    pub user_include_paths: Vec<PathBuf>,
    pub system_include_paths: Vec<PathBuf>,
    pub definitions: Vec<Define>,

    pub additional_prerequisites: Vec<FileItem>,
    pub additional_arguments: Option<String>,

    pub preprocess_only: bool,
    pub generate_dependencies_file: bool,
    pub print_timing_info: bool,
    /// Sources use `#import`, which the secondary distribution system cannot run
    pub build_locally_with_secondary: bool,
    /// Environment shared by many targets (no project-specific resources)
    pub use_shared_build_environment: bool,
}

impl Default for CompileEnvironment {
    fn default() -> Self {
        CompileEnvironment {
            configuration: Configuration::Development,
            is_building_dll: false,
            is_building_library: false,
            optimize_code: true,
            omit_frame_pointers: true,
            use_inlining: true,
            allow_ltcg: false,
            use_avx: false,
            debug_info: DebugInfo::None,
            use_incremental_linking: false,
            enable_exceptions: false,
            use_rtti: false,
            enable_buffer_security_checks: true,
            use_static_crt: false,
            use_debug_crt: false,
            warnings_as_errors: false,
            shadow_variable_warning_level: WarningLevel::Warning,
            undefined_identifier_warning_level: WarningLevel::Off,
            unsafe_type_cast_warning_level: WarningLevel::Off,
            static_analyzer: StaticAnalyzer::None,
            cpp_standard: CppStandard::default(),
            pch_action: PchAction::None,
            precompiled_header_file: None,
            precompiled_header_include: None,
            allow_remotely_compiled_pchs: false,
            force_include_files: Vec::new(),
            user_include_paths: Vec::new(),
            system_include_paths: Vec::new(),
            definitions: Vec::new(),
            additional_prerequisites: Vec::new(),
            additional_arguments: None,
            preprocess_only: false,
            generate_dependencies_file: false,
            print_timing_info: false,
            build_locally_with_secondary: false,
            use_shared_build_environment: true,
        }
    }
}

impl CompileEnvironment {
    /// Whether compiles write debug info to PDB files.
    pub fn uses_pdb_files(&self) -> bool {
        self.debug_info.uses_pdb()
    }

    /// Whether edit-and-continue debug info is requested.
    pub fn supports_edit_and_continue(&self) -> bool {
        self.debug_info == DebugInfo::EditAndContinue
    }
}
