//! Contract violations raised while planning actions.

use std::path::PathBuf;

use thiserror::Error;

/// A compile or link request the toolchain driver refuses to plan.
///
/// These are caller errors: the environment handed in asks for a
/// combination the toolchain cannot honour, or the resulting graph would
/// be ambiguous.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("precompiled header action `{action}` requires {missing}")]
    PchMisconfigured {
        action: &'static str,
        missing: &'static str,
    },

    #[error("module `{module}` requests dependency files for a preprocess-only compile")]
    DependencyFileInPreprocessMode { module: String },

    #[error("module definition file `{}` cannot be used when building a static library", definition.display())]
    ModuleDefinitionForLibrary { definition: PathBuf },

    #[error("`{}` is produced by both `{first}` and `{second}`", file.display())]
    DuplicateProducer {
        file: PathBuf,
        first: String,
        second: String,
    },

    #[error("action `{action}` writes shared resource `{resource}` but is marked remote-eligible")]
    RemoteSharedWriter { action: String, resource: String },

    #[error("cycle detected in action graph involving `{action}`")]
    CycleDetected { action: String },
}
