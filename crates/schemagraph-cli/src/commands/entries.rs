//! Entries command - Classified index entries of one unit

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use schemagraph_core::{SchemaModule, SchemaPlatform};
use serde_json::json;

use super::{gradle_path, parse_coords, print_json, Session};
use crate::GlobalOptions;

/// Arguments for the entries command
#[derive(Args, Debug)]
pub struct EntriesArgs {
    /// Project path (e.g. `:app` or `app`)
    project: String,

    /// Unit coordinate (`platform:module`, `module`, or `platform:`)
    #[arg(default_value = "")]
    coords: String,

    /// Metadata tree (JSON) supplying group, version and publish patterns
    #[arg(long, short = 'm')]
    metadata: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the entries command
pub fn execute(args: EntriesArgs, _global: &GlobalOptions, session: &Session) -> Result<()> {
    let path = gradle_path(&args.project);
    let coords = parse_coords(&args.coords)?;

    let map = args
        .metadata
        .as_deref()
        .map(|m| session.load_map(m))
        .transpose()?;
    let reader = session.reader(map.as_ref());
    let names = reader.names().clone();

    let (name, platform, module) = match map {
        Some(ref map) => {
            let project = map.project(&path)?;
            let platform = map
                .platforms(&path)?
                .into_iter()
                .find(|p| p.name == coords.platform_or(&names))
                .unwrap_or_else(|| SchemaPlatform::new(coords.platform_or(&names)));
            let module = map
                .modules(&path)?
                .into_iter()
                .find(|m| m.name == coords.module_or(&names))
                .unwrap_or_else(|| SchemaModule::new(coords.module_or(&names)));
            (project.name().to_string(), platform, module)
        }
        None => (
            path.rsplit(':')
                .find(|s| !s.is_empty())
                .unwrap_or(session.config.build.name.as_str())
                .to_string(),
            SchemaPlatform::new(coords.platform_or(&names)),
            SchemaModule::new(coords.module_or(&names)),
        ),
    };

    let result = reader.entries(&path, &name, &platform, &module);
    let live = reader.has_entries(&path, &name, &platform, &module);

    if args.json {
        return print_json(&json!({
            "project": path,
            "platform": platform.name,
            "module": module.name,
            "liveness": result.liveness,
            "live": live,
            "internal": result.internal,
            "external": result.external,
            "projects": result.projects,
            "unknown": result.unknown,
        }));
    }

    println!(
        "{} {}:{} liveness {} ({})",
        path,
        platform.name,
        module.name,
        result.liveness,
        if live { "live" } else { "dead" }
    );
    print_bucket("internal", &result.internal);
    print_bucket("external", &result.external);
    print_bucket("projects", &result.projects);
    print_bucket("unknown", &result.unknown);
    Ok(())
}

fn print_bucket(label: &str, files: &[PathBuf]) {
    if files.is_empty() {
        return;
    }
    println!("  {} ({})", label, files.len());
    for file in files {
        println!("    {}", file.file_name().map(Path::new).unwrap_or(file.as_path()).display());
    }
}
