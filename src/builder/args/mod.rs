//! Command-line argument building.
//!
//! Everything here is a pure function of a compile or link environment and
//! the toolchain environment: no I/O, no validation, and identical inputs
//! always yield identical token lists.

pub mod compile;
pub mod link;

pub use compile::{
    build_compile_arguments, c_arguments, cpp_arguments, define_argument, definition_argument,
    global_arguments, include_path_argument, system_include_path_argument,
};
pub use link::{build_link_arguments, librarian_arguments, linker_arguments};

/// Quote a path for the command line: `"C:/a b/c.obj"`.
pub fn quoted(path: &std::path::Path) -> String {
    format!("\"{}\"", path.display())
}
