//! SchemaGraph Core - platform × module build-unit resolution
//!
//! This crate provides the core functionality for resolving build units:
//! - Platform:module coordinates and their textual forms
//! - Platform and module descriptors with replace/include semantics
//! - Dependency records and group/name publish patterns
//! - The project tree and the single-shot `SchemaMap` resolver
//! - The on-disk liveness index reader
//! - A petgraph view of the resolved units

pub mod coords;
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod index;
pub mod map;
pub mod metadata;
pub mod pattern;
pub mod project;

// Re-exports for convenience
pub use coords::{unparse, CoordinateNames, PlatformModule};
pub use dependency::{
    supersede_stubs, DependencyType, SchemaDependency, Transitivity, UNKNOWN_VALUE,
};
pub use descriptor::{SchemaModule, SchemaPlatform};
pub use error::{Result, SchemaError};
pub use graph::{ModuleGraph, UnitEdge, UnitNode};
pub use index::{mangle_project_path, project_dir_name, IndexLayout, IndexResult, SchemaIndexReader};
pub use map::{LiveUnit, SchemaMap};
pub use metadata::{ModuleDecl, PlatformDecl, RequireDecl, SchemaMetadata};
pub use pattern::{BuildCoordinates, PatternResolver, PatternValues};
pub use project::{ProjectFlags, ProjectId, ProjectTree, SchemaProject};
