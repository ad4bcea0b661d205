//! Liveness index
//!
//! Read side of the persisted index: directory layout helpers and the
//! memoizing [`SchemaIndexReader`].

pub mod layout;
pub mod reader;

pub use layout::{mangle_project_path, project_dir_name, IndexLayout};
pub use reader::{IndexResult, SchemaIndexReader};
