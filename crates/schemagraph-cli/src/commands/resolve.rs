//! Resolve command - Build the project graph and print it

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use schemagraph_core::{PlatformModule, ProjectId, ProjectTree, SchemaPlatform};
use serde_json::json;

use super::{print_info, print_json, Session};
use crate::GlobalOptions;

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Metadata tree (JSON)
    metadata: PathBuf,

    /// Print units in dependency order instead of the project tree
    #[arg(long)]
    order: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the resolve command
pub fn execute(args: ResolveArgs, global: &GlobalOptions, session: &Session) -> Result<()> {
    let map = session.load_map(&args.metadata)?;
    map.resolve().context("Failed to resolve schema")?;

    if args.order {
        let graph = map.module_graph()?;
        let order = graph
            .build_order()
            .context("Unit graph has a cycle; no build order exists")?;
        if args.json {
            return print_json(&order);
        }
        print_info(
            &format!("{} units, {} edges", graph.node_count(), graph.edge_count()),
            global.quiet,
        );
        for unit in order {
            println!("{}", unit);
        }
        return Ok(());
    }

    let tree = map.snapshot()?;
    if args.json {
        let projects: Vec<_> = tree.all().into_iter().map(|id| project_json(&tree, id)).collect();
        return print_json(&json!({
            "build": map.metadata().name,
            "group": map.group(),
            "version": map.version(),
            "explicit_platform": map.explicit_platform(),
            "projects": projects,
        }));
    }

    print_info(
        &format!("Build {} ({}:{})", map.metadata().name, map.group(), map.version()),
        global.quiet,
    );
    for id in tree.all() {
        print_project(&tree, id);
    }
    Ok(())
}

fn project_json(tree: &ProjectTree, id: ProjectId) -> serde_json::Value {
    let project = tree.get(id);
    let dependencies: Vec<_> = project
        .dependencies()
        .iter()
        .map(|(key, deps)| json!({ "on": key_label(key), "dependencies": deps }))
        .collect();
    json!({
        "path": project.path_gradle(),
        "multiplatform": project.is_multiplatform(),
        "virtual": project.is_virtual(),
        "inherit": project.is_inherit(),
        "platforms": tree.all_platforms(id),
        "modules": tree.all_modules(id),
        "dependencies": dependencies,
    })
}

fn print_project(tree: &ProjectTree, id: ProjectId) {
    let project = tree.get(id);
    let mut flags = Vec::new();
    if project.is_multiplatform() {
        flags.push("multiplatform");
    }
    if project.is_virtual() {
        flags.push("virtual");
    }
    if flags.is_empty() {
        println!("{}", project.path_gradle());
    } else {
        println!("{} [{}]", project.path_gradle(), flags.join(", "));
    }

    let platforms: Vec<String> = tree.all_platforms(id).iter().map(platform_label).collect();
    println!("  platforms: {}", platforms.join(", "));

    let modules: Vec<String> = tree
        .all_modules(id)
        .iter()
        .map(|m| {
            if m.include.is_empty() {
                m.name.clone()
            } else {
                let include: Vec<&str> = m.include.iter().map(String::as_str).collect();
                format!("{} [{}]", m.name, include.join(", "))
            }
        })
        .collect();
    println!("  modules: {}", modules.join(", "));

    for (key, deps) in project.dependencies() {
        for dep in deps {
            println!("  {:<16} {} ({})", key_label(key), dep, dep.transitivity);
        }
    }
}

fn platform_label(platform: &SchemaPlatform) -> String {
    let mut label = platform.name.clone();
    if let Some(replace) = platform.replace() {
        label.push_str(&format!(" -> {}", replace));
    }
    if platform.disabled {
        label.push_str(" (disabled)");
    }
    label
}

fn key_label(key: &PlatformModule) -> String {
    if key.is_any() {
        "*".to_string()
    } else {
        key.to_string()
    }
}
