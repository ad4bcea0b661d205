//! Live command - Live/dead report of every unit against the index

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use schemagraph_core::LiveUnit;

use super::{gradle_path, print_info, print_json, Session};
use crate::GlobalOptions;

/// Arguments for the live command
#[derive(Args, Debug)]
pub struct LiveArgs {
    /// Metadata tree (JSON)
    metadata: PathBuf,

    /// Only report units of this project
    #[arg(long)]
    project: Option<String>,

    /// Only report dead units
    #[arg(long)]
    dead: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the live command
pub fn execute(args: LiveArgs, global: &GlobalOptions, session: &Session) -> Result<()> {
    let map = session.load_map(&args.metadata)?;
    map.resolve().context("Failed to resolve schema")?;

    let project = args.project.as_deref().map(gradle_path);
    if let Some(ref path) = project {
        // surfaces the list of known projects on a miss
        map.project(path)?;
    }

    let reader = session.reader(Some(&map));
    let units: Vec<LiveUnit> = map
        .live_report(&reader)?
        .into_iter()
        .filter(|u| project.as_deref().is_none_or(|p| u.project == p))
        .filter(|u| !args.dead || !u.live)
        .collect();

    if args.json {
        return print_json(&units);
    }

    let live = units.iter().filter(|u| u.live).count();
    print_info(
        &format!(
            "{} of {} units live (index: {})",
            live,
            units.len(),
            reader.index_dir().display()
        ),
        global.quiet,
    );
    for unit in &units {
        let verdict = match (unit.live, unit.explicit) {
            (true, true) => "live*",
            (true, false) => "live",
            (false, _) => "dead",
        };
        println!("{:<6} {} {}:{}", verdict, unit.project, unit.platform, unit.module);
    }
    Ok(())
}
