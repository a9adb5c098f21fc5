//! `vcgraph flags` command

use std::path::PathBuf;

use anyhow::{bail, Result};

use super::Session;
use crate::cli::FlagsArgs;

pub fn execute(args: FlagsArgs, global_config: Option<PathBuf>) -> Result<()> {
    let session = Session::load(&args.description, global_config)?;

    let units: Vec<_> = session
        .description
        .flags(&session.toolchain)
        .into_iter()
        .filter(|u| args.unit.as_deref().map_or(true, |name| u.name == name))
        .filter(|u| !args.compile || u.kind == "compile")
        .filter(|u| !args.link || u.kind != "compile")
        .collect();

    if units.is_empty() {
        match &args.unit {
            Some(name) => bail!(
                "unit `{}` not found\n\
                 help: units are named after compile modules and link output files",
                name
            ),
            None => bail!("no units in {}", args.description.display()),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&units)?);
        return Ok(());
    }

    for (i, unit) in units.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("# {} flags for `{}`:", unit.kind, unit.name);
        for arg in &unit.arguments {
            println!("  {}", arg);
        }
    }

    Ok(())
}
