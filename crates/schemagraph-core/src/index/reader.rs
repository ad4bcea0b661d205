//! Liveness index reader
//!
//! Reads the directory-shaped graph written by the external indexer and
//! answers whether a project's platform:module unit is live. Results are
//! memoized in concurrent maps for the lifetime of the reader, so one reader
//! can be shared across threads for a whole resolution pass.
//!
//! Nothing in here returns an error: missing or unreadable files degrade to
//! "dead".

use crate::coords::{unparse, CoordinateNames, PlatformModule};
use crate::dependency::{DependencyType, SchemaDependency};
use crate::descriptor::{SchemaModule, SchemaPlatform};
use crate::index::layout::{
    self, IndexLayout, BUCKET_EXTERNAL, BUCKET_INTERNAL, BUCKET_PROJECTS, BUCKET_UNKNOWN, IN_DIR,
    LINK_FILE, LIVE_FILE, MULTIPLATFORM_FILE, OUT_DIR,
};
use crate::pattern::{BuildCoordinates, PatternResolver, PatternValues};
use dashmap::DashMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

// ============================================================================
// IndexResult
// ============================================================================

/// Classified dependency files of one unit plus its liveness level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexResult {
    pub internal: Vec<PathBuf>,
    pub external: Vec<PathBuf>,
    pub projects: Vec<PathBuf>,
    pub unknown: Vec<PathBuf>,
    pub liveness: u32,
}

impl IndexResult {
    /// External or project entries express direct user intent.
    pub fn has_explicit_dependencies(&self) -> bool {
        !self.external.is_empty() || !self.projects.is_empty()
    }

    pub fn total(&self) -> usize {
        self.internal.len() + self.external.len() + self.projects.len() + self.unknown.len()
    }
}

// ============================================================================
// SchemaIndexReader
// ============================================================================

/// Read-only view over a liveness index directory.
#[derive(Debug)]
pub struct SchemaIndexReader {
    layout: IndexLayout,
    build: BuildCoordinates,
    patterns: PatternResolver,
    /// `project platform module` -> classified entries
    entries: DashMap<String, Arc<IndexResult>>,
    /// `project-dir@key` -> liveness
    liveness: DashMap<String, bool>,
}

impl SchemaIndexReader {
    pub fn new(index_dir: impl Into<PathBuf>, build: BuildCoordinates, patterns: PatternResolver) -> Self {
        Self {
            layout: IndexLayout::new(index_dir),
            build,
            patterns,
            entries: DashMap::new(),
            liveness: DashMap::new(),
        }
    }

    pub fn index_dir(&self) -> &Path {
        self.layout.root()
    }

    pub fn names(&self) -> &CoordinateNames {
        self.patterns.names()
    }

    pub fn build(&self) -> &BuildCoordinates {
        &self.build
    }

    /// Index directory name of a project given its gradle path.
    pub fn project_dir(&self, project_path: &str) -> String {
        layout::project_dir_name(project_path, &self.build.build_name)
    }

    /// Drop every memoized result.
    pub fn clear(&self) {
        self.entries.clear();
        self.liveness.clear();
    }

    // ------------------------------------------------------------------------
    // Entries
    // ------------------------------------------------------------------------

    /// Classified dependency files for a unit, read once and cached.
    ///
    /// `project_name` is substituted for `$name` in publish patterns.
    pub fn entries(
        &self,
        project_path: &str,
        project_name: &str,
        platform: &SchemaPlatform,
        module: &SchemaModule,
    ) -> Arc<IndexResult> {
        let key = entries_key(project_path, &platform.name, &module.name);
        if let Some(found) = self.entries.get(&key) {
            return Arc::clone(&found);
        }
        let result = Arc::new(self.read_index(project_path, project_name, platform, module));
        Arc::clone(self.entries.entry(key).or_insert(result).value())
    }

    /// [`entries`](Self::entries) for a path and coordinate, using undecorated
    /// descriptors and the last path segment as project name.
    pub fn entries_for_path(&self, project_path: &str, coords: &PlatformModule) -> Arc<IndexResult> {
        let names = self.names();
        let platform = SchemaPlatform::new(coords.platform_or(names));
        let module = SchemaModule::new(coords.module_or(names));
        let name = project_name_of(project_path, &self.build.build_name);
        self.entries(project_path, &name, &platform, &module)
    }

    fn read_index(
        &self,
        project_path: &str,
        project_name: &str,
        platform: &SchemaPlatform,
        module: &SchemaModule,
    ) -> IndexResult {
        let values = PatternValues {
            build: &self.build.build_name,
            name: project_name,
            group: &self.build.group,
            version: &self.build.version,
            platform: &platform.name,
            module: &module.name,
        };
        let group_pattern = self
            .patterns
            .group_pattern(&platform.name, platform.publish_pattern.as_deref());
        let name_pattern = self
            .patterns
            .name_pattern(&module.name, module.publish_pattern.as_deref());
        let group = self.patterns.resolve(group_pattern, &values);
        let name = self.patterns.resolve(name_pattern, &values);

        let mut result = IndexResult::default();
        let version_dir = self.layout.coord_dir(&group, &name, &self.build.version);
        trace!("Reading index entries from {:?}", version_dir);

        if version_dir.is_dir() {
            let walker = WalkDir::new(&version_dir)
                .min_depth(1)
                .max_depth(2)
                .sort_by_file_name();
            for entry in walker.into_iter().filter_map(|e| e.ok()) {
                let is_dir = entry.file_type().is_dir();
                match entry.depth() {
                    1 if is_dir => {
                        let bucket = entry.file_name().to_string_lossy();
                        if !is_bucket(&bucket) {
                            warn!("Unexpected index directory {:?}", entry.path());
                        }
                    }
                    1 => result.unknown.push(entry.into_path()),
                    _ => {
                        let bucket = entry
                            .path()
                            .parent()
                            .and_then(Path::file_name)
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        let path = entry.into_path();
                        match bucket.as_str() {
                            BUCKET_INTERNAL => result.internal.push(path),
                            BUCKET_EXTERNAL => result.external.push(path),
                            BUCKET_PROJECTS => result.projects.push(path),
                            _ => result.unknown.push(path),
                        }
                    }
                }
            }
        }

        let key = unparse(&platform.name, &module.name, self.names());
        result.liveness = read_level(&self.layout.live_file(&self.project_dir(project_path), &key));
        debug!(
            "Index for {} {}:{} -> {}:{} has {} entries, liveness {}",
            project_path,
            platform.name,
            module.name,
            group,
            name,
            result.total(),
            result.liveness
        );
        result
    }

    // ------------------------------------------------------------------------
    // Liveness
    // ------------------------------------------------------------------------

    /// Whether a unit is live: explicit entries, or a positive on-disk verdict.
    pub fn has_entries(
        &self,
        project_path: &str,
        project_name: &str,
        platform: &SchemaPlatform,
        module: &SchemaModule,
    ) -> bool {
        let result = self.entries(project_path, project_name, platform, module);
        if result.has_explicit_dependencies() {
            info!(
                "{} {}:{} is live because it has explicit dependencies",
                project_path, platform.name, module.name
            );
            return true;
        }
        let key = unparse(&platform.name, &module.name, self.names());
        self.check_live(&self.project_dir(project_path), &key)
    }

    /// Liveness of `<project_dir>/<key>` from the persisted level and links.
    ///
    /// Level 0 (or no readable file) is dead, 2 and above is live. Level 1 is
    /// live only when both the `in` and `out` directories hold a link to a
    /// live unit. Nodes on the current evaluation path count as not live,
    /// which makes cycles terminate.
    pub fn check_live(&self, project_dir: &str, key: &str) -> bool {
        let mut visiting = HashSet::new();
        let (live, tainted) = self.evaluate(project_dir, key, &mut visiting);
        if tainted {
            self.liveness.insert(liveness_key(project_dir, key), live);
        }
        live
    }

    /// Returns the verdict and whether it depended on an in-progress node.
    fn evaluate(&self, project_dir: &str, key: &str, visiting: &mut HashSet<String>) -> (bool, bool) {
        let cache_key = liveness_key(project_dir, key);
        if let Some(cached) = self.liveness.get(&cache_key) {
            return (*cached, false);
        }
        if visiting.contains(&cache_key) {
            trace!("Cycle through {}, treating as not live", cache_key);
            return (false, true);
        }
        visiting.insert(cache_key.clone());

        let module_dir = self.layout.module_dir(project_dir, key);
        let level = read_level(&module_dir.join(LIVE_FILE));
        let (live, tainted) = match level {
            0 => (false, false),
            1 => {
                let out_dir = module_dir.join(OUT_DIR);
                let in_dir = module_dir.join(IN_DIR);
                if !out_dir.is_dir() || !in_dir.is_dir() {
                    (false, false)
                } else {
                    match self.dir_has_liveness(&out_dir, visiting) {
                        (false, tainted) => (false, tainted),
                        (true, out_tainted) => {
                            let (live, in_tainted) = self.dir_has_liveness(&in_dir, visiting);
                            (live, out_tainted || in_tainted)
                        }
                    }
                }
            }
            _ => (true, false),
        };

        visiting.remove(&cache_key);
        if live || !tainted {
            self.liveness.entry(cache_key).or_insert(live);
        }
        trace!("{}@{} level {} -> live={}", project_dir, key, level, live);
        (live, tainted)
    }

    /// Whether any `<dir>/<project>/<key>/link` points at a live unit.
    fn dir_has_liveness(&self, dir: &Path, visiting: &mut HashSet<String>) -> (bool, bool) {
        let mut tainted = false;
        for project in sorted_subdirs(dir) {
            let project_name = file_name(&project);
            for platmod in sorted_subdirs(&project) {
                if !platmod.join(LINK_FILE).exists() {
                    continue;
                }
                let (live, t) = self.evaluate(&project_name, &file_name(&platmod), visiting);
                if live {
                    return (true, tainted || t);
                }
                tainted |= t;
            }
        }
        (false, tainted)
    }

    // ------------------------------------------------------------------------
    // Other queries
    // ------------------------------------------------------------------------

    /// Whether a project is built for more than the conventional units, or is
    /// flagged multiplatform at module or project level.
    pub fn is_multi_platform(&self, project_path: &str, coords: &PlatformModule) -> bool {
        let project_dir = self.layout.project_dir(&self.project_dir(project_path));

        let entries: Vec<String> = std::fs::read_dir(&project_dir)
            .map(|rd| {
                rd.filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .filter(|n| n != MULTIPLATFORM_FILE)
                    .collect()
            })
            .unwrap_or_default();
        if entries.len() > 1
            && (entries.len() != 2 || entries.iter().any(|n| n != "main" && n != "test"))
        {
            return true;
        }

        let key = coords.unparse(self.names());
        if let Some(flag) = read_flag(&project_dir.join(&key).join(MULTIPLATFORM_FILE)) {
            return flag;
        }
        read_flag(&project_dir.join(MULTIPLATFORM_FILE)).unwrap_or(false)
    }

    /// Whether the unit a dependency points at has a non-zero liveness file.
    ///
    /// External dependencies always exist.
    pub fn dependency_exists(
        &self,
        dep: &SchemaDependency,
        project_path: &str,
        coords: &PlatformModule,
    ) -> bool {
        let target_project = match dep.dep_type {
            DependencyType::External => return true,
            DependencyType::Internal => project_path,
            DependencyType::Project | DependencyType::Unknown => dep.name.as_str(),
        };
        let target_path = if target_project.starts_with(':') {
            target_project.to_string()
        } else {
            format!(":{}", target_project)
        };
        let key = dep.coords.or(coords).unparse(self.names());
        let live = self.layout.live_file(&self.project_dir(&target_path), &key);
        live.exists() && read_level(&live) != 0
    }
}

fn entries_key(project_path: &str, platform: &str, module: &str) -> String {
    if project_path.is_empty() || project_path == ":" {
        format!("{} {}", platform, module)
    } else {
        format!("{} {} {}", project_path, platform, module)
    }
}

fn liveness_key(project_dir: &str, key: &str) -> String {
    format!("{}@{}", project_dir, key)
}

fn is_bucket(name: &str) -> bool {
    matches!(
        name,
        BUCKET_INTERNAL | BUCKET_EXTERNAL | BUCKET_PROJECTS | BUCKET_UNKNOWN
    )
}

fn project_name_of(project_path: &str, build_name: &str) -> String {
    match project_path.rsplit(':').find(|s| !s.is_empty()) {
        Some(last) => last.to_string(),
        None => build_name.to_string(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sorted_subdirs(dir: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect()
        })
        .unwrap_or_default();
    dirs.sort();
    dirs
}

/// Parse a liveness file; anything missing or unparseable is level 0.
fn read_level(path: &Path) -> u32 {
    match std::fs::read_to_string(path) {
        Ok(content) => content.trim().parse().unwrap_or_else(|_| {
            debug!("Unparseable liveness {:?} in {:?}, treating as 0", content.trim(), path);
            0
        }),
        Err(_) => 0,
    }
}

fn read_flag(path: &Path) -> Option<bool> {
    std::fs::read_to_string(path)
        .ok()
        .map(|content| content.trim() == "true")
}
