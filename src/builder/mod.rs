//! MSVC-family action planning.
//!
//! Orchestrators in this module translate compile and link environments
//! into actions on an [`ActionGraph`]. They never run a tool; executing the
//! graph is left to whoever consumes it.

pub mod action;
pub mod args;
pub mod compile;
pub mod graph;
pub mod link;
pub mod plan;
pub mod resource;
pub mod timing;
pub mod toolchain;

pub use action::{Action, ActionBuilder, ActionKind};
pub use compile::{compile_cpp_files, CppOutput};
pub use graph::{ActionGraph, BuildGraph};
pub use link::{build_products, link_files, BuildProductType};
pub use plan::{plan_actions, BuildDescription};
pub use resource::{compile_rc_files, generate_type_library_header, TypeLibrary};
pub use timing::finalize_output;
pub use toolchain::{resolve_environment, CompilerKind, PlatformSettings, ToolchainEnvironment};
