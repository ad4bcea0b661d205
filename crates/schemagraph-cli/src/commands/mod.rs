//! CLI command implementations

pub mod entries;
pub mod live;
pub mod multiplatform;
pub mod resolve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use schemagraph_config::{ConfigLoader, GraphConfig};
use schemagraph_core::{
    BuildCoordinates, PatternResolver, PlatformModule, SchemaIndexReader, SchemaMap, SchemaMetadata,
    UNKNOWN_VALUE,
};
use tracing::debug;

use crate::GlobalOptions;

/// Workspace and merged configuration shared by every command.
#[derive(Debug)]
pub struct Session {
    pub workspace: PathBuf,
    pub config: GraphConfig,
}

impl Session {
    /// Load a metadata file into a map configured from this session.
    pub fn load_map(&self, metadata: &Path) -> Result<SchemaMap> {
        let meta = SchemaMetadata::load_json(metadata)
            .with_context(|| format!("Failed to load metadata from {}", metadata.display()))?;
        Ok(SchemaMap::from_config(meta, &self.config))
    }

    /// Index reader for a map, or for the configured build when there is none.
    pub fn reader(&self, map: Option<&SchemaMap>) -> SchemaIndexReader {
        let reader = match map {
            Some(map) => map.index_reader(&self.config, &self.workspace),
            None => SchemaIndexReader::new(
                self.config.index_dir(&self.workspace),
                BuildCoordinates::from_config(&self.config, UNKNOWN_VALUE, UNKNOWN_VALUE),
                PatternResolver::from_config(&self.config),
            ),
        };
        debug!("Reading index at {}", reader.index_dir().display());
        reader
    }
}

/// Resolve the workspace path from options or current directory.
pub fn resolve_workspace(global: &GlobalOptions) -> Result<PathBuf> {
    if let Some(ref ws) = global.workspace {
        if !ws.is_dir() {
            anyhow::bail!("Workspace '{}' is not a directory", ws.display());
        }
        return ws.canonicalize().context("Failed to resolve workspace path");
    }
    std::env::current_dir().context("Failed to get current directory")
}

/// Load configuration: global, local, environment, then CLI overrides.
pub fn load_config(global: &GlobalOptions, workspace: &Path) -> Result<GraphConfig> {
    let overrides = global.to_config_overrides();
    ConfigLoader::new()
        .load(workspace, Some(&overrides))
        .context("Failed to load configuration")
}

/// Parse a `platform:module` argument.
pub fn parse_coords(input: &str) -> Result<PlatformModule> {
    PlatformModule::parse(input).with_context(|| format!("Invalid coordinate '{}'", input))
}

/// Prefix a bare project name with `:`.
pub fn gradle_path(project: &str) -> String {
    if project.starts_with(':') {
        project.to_string()
    } else {
        format!(":{}", project)
    }
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
