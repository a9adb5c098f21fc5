//! `vcgraph plan` command

use std::path::PathBuf;

use anyhow::Result;

use super::Session;
use crate::cli::PlanArgs;
use vcgraph::builder::{plan_actions, ActionGraph};
use vcgraph::util::fs::write_string;

pub fn execute(args: PlanArgs, global_config: Option<PathBuf>) -> Result<()> {
    let session = Session::load(&args.description, global_config)?;
    tracing::info!("{}", session.toolchain.version_info());

    let graph = plan_actions(&session.description, &session.base, &session.toolchain)?;
    let json = graph.to_json()?;

    match &args.output {
        Some(path) => {
            write_string(path, &json)?;
            tracing::info!(
                "Planned {} action(s) into {}",
                graph.actions().len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
