//! On-disk layout of the liveness index
//!
//! ```text
//! <index>/coord/<group>/<name>/<version>/{internal,external,projects,unknown}/<dep-file>
//! <index>/path/<project-dir>/<key>/live
//! <index>/path/<project-dir>/<key>/{in,out}/<project-dir>/<key>/link
//! <index>/path/<project-dir>/multiplatform
//! <index>/path/<project-dir>/<key>/multiplatform
//! ```
//!
//! `<key>` is the unparsed coordinate (see [`PlatformModule::unparse`]) and
//! `<project-dir>` the mangled gradle path.
//!
//! [`PlatformModule::unparse`]: crate::coords::PlatformModule::unparse

use std::path::{Path, PathBuf};

pub const COORD_DIR: &str = "coord";
pub const PATH_DIR: &str = "path";
pub const LIVE_FILE: &str = "live";
pub const LINK_FILE: &str = "link";
pub const IN_DIR: &str = "in";
pub const OUT_DIR: &str = "out";
pub const MULTIPLATFORM_FILE: &str = "multiplatform";

pub const BUCKET_INTERNAL: &str = "internal";
pub const BUCKET_EXTERNAL: &str = "external";
pub const BUCKET_PROJECTS: &str = "projects";
pub const BUCKET_UNKNOWN: &str = "unknown";

/// Turn a gradle path into a filesystem-safe token.
///
/// `:a:b` becomes `_a_b` and the root `:` becomes `_`.
pub fn mangle_project_path(path: &str) -> String {
    let mangled = path.replace(':', "_");
    if mangled.starts_with('_') {
        mangled
    } else {
        format!("_{}", mangled)
    }
}

/// Index directory name for a project.
///
/// The root of a named (non `_`) build is stored as `_<build>`.
pub fn project_dir_name(path: &str, build_name: &str) -> String {
    let mangled = mangle_project_path(path);
    if mangled == "_" && !build_name.is_empty() && build_name != "_" {
        format!("_{}", build_name)
    } else {
        mangled
    }
}

/// Paths inside one index directory.
#[derive(Debug, Clone)]
pub struct IndexLayout {
    root: PathBuf,
}

impl IndexLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn coord_dir(&self, group: &str, name: &str, version: &str) -> PathBuf {
        self.root
            .join(COORD_DIR)
            .join(group)
            .join(name)
            .join(version)
    }

    pub fn project_dir(&self, project_dir: &str) -> PathBuf {
        self.root.join(PATH_DIR).join(project_dir)
    }

    pub fn module_dir(&self, project_dir: &str, key: &str) -> PathBuf {
        self.project_dir(project_dir).join(key)
    }

    pub fn live_file(&self, project_dir: &str, key: &str) -> PathBuf {
        self.module_dir(project_dir, key).join(LIVE_FILE)
    }
}
