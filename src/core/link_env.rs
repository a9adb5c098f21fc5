//! Link environment for one binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::compile_env::Configuration;
use crate::core::file_item::FileItem;

/// Settings for linking or archiving one binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkEnvironment {
    pub configuration: Configuration,

    /// Produce a static library with the librarian
    pub is_building_library: bool,
    pub is_building_dll: bool,
    pub is_building_console_application: bool,
    /// Entry point for console executables (`/ENTRY`)
    pub entry_point_override: Option<String>,

    /// The binary exports symbols and gets an import library
    pub has_exports: bool,
    /// The binary is part of a build-order cycle broken by a provisional import library
    pub is_cross_referenced: bool,

    pub use_incremental_linking: bool,
    pub allow_ltcg: bool,
    pub create_debug_info: bool,
    pub use_fast_pdb_linking: bool,
    pub create_map_file: bool,
    pub omit_frame_pointers: bool,
    pub print_timing_info: bool,

    pub default_stack_size: u64,
    /// Zero leaves the commit size to the linker
    pub default_stack_size_commit: u64,

    pub delay_load_dlls: Vec<String>,
    pub module_definition_file: Option<PathBuf>,

    pub system_library_paths: Vec<PathBuf>,
    pub excluded_libraries: Vec<String>,
    /// Libraries given by path; tracked as prerequisites
    pub libraries: Vec<PathBuf>,
    /// Libraries found through the library search path
    pub system_libraries: Vec<String>,
    pub include_functions: Vec<String>,

    pub input_files: Vec<FileItem>,
    pub output_file_path: PathBuf,
    pub intermediate_directory: PathBuf,

    /// The whole target is compiled as a DLL; import libraries land beside the binary
    pub compile_as_dll: bool,
    pub additional_arguments: Option<String>,
}

impl Default for LinkEnvironment {
    fn default() -> Self {
        LinkEnvironment {
            configuration: Configuration::Development,
            is_building_library: false,
            is_building_dll: false,
            is_building_console_application: false,
            entry_point_override: None,
            has_exports: false,
            is_cross_referenced: false,
            use_incremental_linking: false,
            allow_ltcg: false,
            create_debug_info: true,
            use_fast_pdb_linking: false,
            create_map_file: false,
            omit_frame_pointers: true,
            print_timing_info: false,
            default_stack_size: 5_000_000,
            default_stack_size_commit: 0,
            delay_load_dlls: Vec::new(),
            module_definition_file: None,
            system_library_paths: Vec::new(),
            excluded_libraries: Vec::new(),
            libraries: Vec::new(),
            system_libraries: Vec::new(),
            include_functions: Vec::new(),
            input_files: Vec::new(),
            output_file_path: PathBuf::new(),
            intermediate_directory: PathBuf::new(),
            compile_as_dll: false,
            additional_arguments: None,
        }
    }
}

impl LinkEnvironment {
    /// Directory the binary is written to.
    pub fn output_directory(&self) -> &Path {
        self.output_file_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Binary file name without extension (`Engine` for `Engine.dll`).
    pub fn output_stem(&self) -> String {
        self.output_file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Binary file name (`Engine.dll`).
    pub fn output_file_name(&self) -> String {
        self.output_file_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
