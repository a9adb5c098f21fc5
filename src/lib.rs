//! vcgraph - action graphs for MSVC-family toolchains
//!
//! This crate turns declarative compile and link environments into a
//! dependency-tracked graph of compiler, linker and librarian invocations
//! for cl, clang-cl and the Intel compiler.

pub mod builder;
pub mod core;
pub mod errors;
pub mod util;

/// Fixtures for vcgraph unit tests.
///
/// Only available when compiling tests.
#[cfg(test)]
pub mod test_support;

pub use builder::{ActionGraph, BuildGraph, ToolchainEnvironment};
pub use core::{CompileEnvironment, FileItem, LinkEnvironment};
pub use errors::ToolchainError;
