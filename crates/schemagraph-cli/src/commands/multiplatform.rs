//! Multiplatform command - Is a project built beyond the main/test units

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::{gradle_path, parse_coords, print_info, print_json, Session};
use crate::GlobalOptions;

/// Arguments for the multiplatform command
#[derive(Args, Debug)]
pub struct MultiplatformArgs {
    /// Project path (e.g. `:app` or `app`)
    project: String,

    /// Unit coordinate whose flag file is consulted
    #[arg(default_value = "")]
    coords: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the multiplatform command
pub fn execute(args: MultiplatformArgs, global: &GlobalOptions, session: &Session) -> Result<()> {
    let path = gradle_path(&args.project);
    let coords = parse_coords(&args.coords)?;
    let reader = session.reader(None);
    let multi = reader.is_multi_platform(&path, &coords);

    if args.json {
        return print_json(&json!({
            "project": path,
            "index_dir": reader.project_dir(&path),
            "multiplatform": multi,
        }));
    }

    print_info(
        &format!("{} (index dir {})", path, reader.project_dir(&path)),
        global.quiet,
    );
    println!("{}", multi);
    Ok(())
}
