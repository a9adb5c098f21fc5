//! vcgraph CLI - plan MSVC-family build actions

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("vcgraph=debug")
    } else {
        EnvFilter::new("vcgraph=info")
    };

    // Logs go to stderr so planned output can be piped.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let global_config = cli.global_config.clone();
    match cli.command {
        Commands::Plan(args) => commands::plan::execute(args, global_config),
        Commands::Flags(args) => commands::flags::execute(args, global_config),
        Commands::Toolchain(args) => commands::toolchain::execute(args, global_config),
    }
}
