//! `vcgraph toolchain` command

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::{load_config, Session};
use crate::cli::{ToolchainArgs, ToolchainCommands, ToolchainSetArgs, ToolchainShowArgs};
use vcgraph::builder::{resolve_environment, ToolchainEnvironment};
use vcgraph::util::config::{
    global_toolchain_config_path, project_toolchain_config_path, ToolchainConfig,
};

pub fn execute(args: ToolchainArgs, global_config: Option<PathBuf>) -> Result<()> {
    match args.command {
        ToolchainCommands::Show(show) => show_toolchain(show, global_config),
        ToolchainCommands::Set(set) => set_toolchain(set, global_config),
    }
}

fn show_toolchain(args: ToolchainShowArgs, global_config: Option<PathBuf>) -> Result<()> {
    let toolchain = match &args.description {
        Some(path) => Session::load(path, global_config)?.toolchain,
        None => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            let config = load_config(global_config, &cwd, None);
            resolve_environment(&config, &cwd)?
        }
    };
    print_toolchain(&toolchain);
    Ok(())
}

fn print_toolchain(toolchain: &ToolchainEnvironment) {
    println!("{}", toolchain.version_info());
    println!();
    println!("Toolchain:");
    println!("  Compiler:   {}", toolchain.compiler());
    println!("  Version:    {}", toolchain.toolchain_version());
    println!("  CL:         {}", toolchain.compiler_path().display());
    println!("  LINK:       {}", toolchain.linker_path().display());
    println!("  LIB:        {}", toolchain.librarian_path().display());
    println!("  RC:         {}", toolchain.resource_compiler_path().display());
    if let Some(filter) = toolchain.link_filter_path() {
        println!("  Link filter: {}", filter.display());
    }
    if let Some(filter) = toolchain.cl_filter_path() {
        println!("  CL filter:  {}", filter.display());
    }

    println!();
    println!("Platform:");
    let settings = toolchain.settings();
    println!("  Architecture: {}", settings.architecture.machine());
    println!("  Root:         {}", toolchain.root_dir().display());

    if !toolchain.include_paths().is_empty() {
        println!();
        println!("Include paths:");
        for path in toolchain.include_paths() {
            println!("  {}", path.display());
        }
    }
    if !toolchain.library_paths().is_empty() {
        println!();
        println!("Library paths:");
        for path in toolchain.library_paths() {
            println!("  {}", path.display());
        }
    }
}

fn set_toolchain(args: ToolchainSetArgs, global_config: Option<PathBuf>) -> Result<()> {
    let path = if args.global {
        global_config
            .or_else(global_toolchain_config_path)
            .context("could not determine the global config directory")?
    } else {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        project_toolchain_config_path(&cwd)
    };

    let mut config = if path.exists() {
        ToolchainConfig::load(&path)?
    } else {
        ToolchainConfig::default()
    };

    let mut update = ToolchainConfig::default();
    update.toolchain.compiler = args.compiler;
    update.toolchain.toolchain_version = args.toolchain_version;
    update.toolchain.cl = args.cl;
    update.toolchain.link = args.link;
    update.toolchain.lib = args.lib;
    update.toolchain.rc = args.rc;
    config.merge(update);

    config.save(&path)?;
    tracing::info!("Wrote toolchain settings to {}", path.display());
    Ok(())
}
