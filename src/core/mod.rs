//! Core data structures for vcgraph.
//!
//! This module contains the inputs the toolchain driver consumes:
//! - File identity (FileItem)
//! - Source language and C++ standard levels
//! - Compile and link environments for one module or binary

pub mod compile_env;
pub mod file_item;
pub mod language;
pub mod link_env;

pub use compile_env::{
    CompileEnvironment, Configuration, DebugInfo, Define, PchAction, StaticAnalyzer, WarningLevel,
};
pub use file_item::FileItem;
pub use language::{CppStandard, Language};
pub use link_env::LinkEnvironment;
