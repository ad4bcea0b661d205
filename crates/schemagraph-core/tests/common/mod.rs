//! Common test utilities for integration tests.
//!
//! Builds synthetic liveness indexes on disk and small metadata trees.

#![allow(dead_code)]

use schemagraph_core::{
    BuildCoordinates, CoordinateNames, ModuleDecl, PatternResolver, PlatformDecl, SchemaIndexReader,
    SchemaMetadata,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Synthetic index
// ============================================================================

/// Link direction inside a unit directory.
#[derive(Debug, Clone, Copy)]
pub enum Link {
    In,
    Out,
}

/// A liveness index written into a temporary directory.
pub struct IndexFixture {
    dir: TempDir,
}

impl IndexFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `path/<project>/<key>/live`.
    pub fn live(&self, project: &str, key: &str, level: u32) -> &Self {
        write(
            self.path().join("path").join(project).join(key).join("live"),
            &format!("{}\n", level),
        );
        self
    }

    /// Write `path/<project>/<key>/<in|out>/<to_project>/<to_key>/link`.
    pub fn link(&self, project: &str, key: &str, direction: Link, to_project: &str, to_key: &str) -> &Self {
        let dir = match direction {
            Link::In => "in",
            Link::Out => "out",
        };
        write(
            self.path()
                .join("path")
                .join(project)
                .join(key)
                .join(dir)
                .join(to_project)
                .join(to_key)
                .join("link"),
            "",
        );
        self
    }

    /// Write a dependency file under `coord/<group>/<name>/<version>/<bucket>`.
    pub fn entry(&self, group: &str, name: &str, version: &str, bucket: &str, file: &str) -> &Self {
        write(
            self.path()
                .join("coord")
                .join(group)
                .join(name)
                .join(version)
                .join(bucket)
                .join(file),
            "",
        );
        self
    }

    /// Reader for a root build with the given group and version.
    pub fn reader(&self, group: &str, version: &str) -> SchemaIndexReader {
        SchemaIndexReader::new(
            self.path(),
            BuildCoordinates::new("_", group, version),
            PatternResolver::new(CoordinateNames::default()),
        )
    }
}

fn write(path: PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create index dir");
    }
    fs::write(path, content).expect("Failed to write index file");
}

// ============================================================================
// Metadata helpers
// ============================================================================

pub fn platform(name: &str, replace: Option<&str>) -> PlatformDecl {
    PlatformDecl {
        name: name.to_string(),
        replace: replace.map(str::to_string),
        ..Default::default()
    }
}

pub fn module(name: &str, include: &[&str]) -> ModuleDecl {
    ModuleDecl {
        name: name.to_string(),
        include: include.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

/// The `app` build: platforms `main` and `jre` (replacing `main`), modules
/// `main` and `test` (including `main`).
pub fn app_build() -> SchemaMetadata {
    SchemaMetadata::from_json_str(
        r#"{
            "name": "build",
            "group": "com.example",
            "version": "1.0",
            "projects": [{
                "name": "app",
                "platforms": [
                    {"name": "main"},
                    {"name": "jre", "replace": "main"}
                ],
                "modules": [
                    {"name": "main"},
                    {"name": "test", "include": ["main"], "test": true}
                ]
            }]
        }"#,
    )
    .expect("Failed to parse app metadata")
}
