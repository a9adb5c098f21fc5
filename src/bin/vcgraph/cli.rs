//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use vcgraph::builder::CompilerKind;

/// vcgraph - action graphs for MSVC-family toolchains
#[derive(Parser)]
#[command(name = "vcgraph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Global toolchain config file (defaults to the user config directory)
    #[arg(long, env = "VCGRAPH_GLOBAL_CONFIG", global = true)]
    pub global_config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan the actions of a build description and print them as JSON
    Plan(PlanArgs),

    /// Show the compile and link flags of each unit
    Flags(FlagsArgs),

    /// Toolchain configuration
    Toolchain(ToolchainArgs),
}

#[derive(Args)]
pub struct PlanArgs {
    /// Build description file
    #[arg(default_value = "vcgraph.toml")]
    pub description: PathBuf,

    /// Write the plan to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Build description file
    #[arg(default_value = "vcgraph.toml")]
    pub description: PathBuf,

    /// Only show units with this name
    #[arg(long)]
    pub unit: Option<String>,

    /// Show compile flags only
    #[arg(long, conflicts_with = "link")]
    pub compile: bool,

    /// Show link flags only
    #[arg(long)]
    pub link: bool,

    /// Print flags as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ToolchainArgs {
    #[command(subcommand)]
    pub command: ToolchainCommands,
}

#[derive(Subcommand)]
pub enum ToolchainCommands {
    /// Show the resolved toolchain
    Show(ToolchainShowArgs),

    /// Write toolchain settings to the project (or global) config
    Set(ToolchainSetArgs),
}

#[derive(Args)]
pub struct ToolchainShowArgs {
    /// Build description whose toolchain overrides apply
    #[arg(long)]
    pub description: Option<PathBuf>,
}

#[derive(Args)]
pub struct ToolchainSetArgs {
    /// Compiler release (vs2019, vs2022, clang, intel)
    #[arg(long)]
    pub compiler: Option<CompilerKind>,

    /// MSVC toolset version (e.g. 14.29.30133)
    #[arg(long)]
    pub toolchain_version: Option<String>,

    /// Compiler path
    #[arg(long)]
    pub cl: Option<PathBuf>,

    /// Linker path
    #[arg(long)]
    pub link: Option<PathBuf>,

    /// Librarian path
    #[arg(long)]
    pub lib: Option<PathBuf>,

    /// Resource compiler path
    #[arg(long)]
    pub rc: Option<PathBuf>,

    /// Write to the global config instead of the project's
    #[arg(long)]
    pub global: bool,
}
