//! Schema map: graph builder and resolver
//!
//! [`SchemaMap`] turns a metadata tree into a wired [`ProjectTree`]. Resolution
//! is lazy and runs at most once per map, however many threads ask for it.
//! Callbacks registered with [`SchemaMap::when_resolved`] run after the walk,
//! outside every lock, so a callback may query or re-resolve the map.

use crate::coords::{CoordinateNames, PlatformModule};
use crate::dependency::{DependencyType, SchemaDependency, UNKNOWN_VALUE};
use crate::descriptor::{SchemaModule, SchemaPlatform};
use crate::error::{Result, SchemaError};
use crate::graph::ModuleGraph;
use crate::index::SchemaIndexReader;
use crate::metadata::SchemaMetadata;
use crate::pattern::{BuildCoordinates, PatternResolver};
use crate::project::{ProjectFlags, ProjectId, ProjectTree, SchemaProject};
use parking_lot::{Condvar, Mutex, RwLock};
use rayon::prelude::*;
use schemagraph_config::GraphConfig;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::thread::ThreadId;
use tracing::{debug, info, warn};

type Callback = Box<dyn FnOnce(&SchemaMap) + Send>;

/// Resolution is a one-way latch.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolveState {
    Unresolved,
    Resolving(ThreadId),
    Resolved,
    Failed(String),
}

/// Liveness verdict for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveUnit {
    pub project: String,
    pub platform: String,
    pub module: String,
    /// Live because of in-memory external/project requirements
    pub explicit: bool,
    pub live: bool,
}

/// Group and version a metadata node passes down to its children.
#[derive(Debug, Clone)]
struct Inherited {
    group: String,
    version: String,
    inherit: bool,
    multiplatform: bool,
}

/// Builds and owns the project graph of one build.
pub struct SchemaMap {
    metadata: SchemaMetadata,
    names: CoordinateNames,
    explicit_platform: Option<String>,
    tree: RwLock<ProjectTree>,
    state: Mutex<ResolveState>,
    ready: Condvar,
    pending: Mutex<Vec<Callback>>,
}

impl std::fmt::Debug for SchemaMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().clone();
        let pending = self.pending.lock().len();
        f.debug_struct("SchemaMap")
            .field("root", &self.metadata.name)
            .field("state", &state)
            .field("pending", &pending)
            .finish()
    }
}

impl SchemaMap {
    pub fn new(metadata: SchemaMetadata, names: CoordinateNames) -> Self {
        let tree = ProjectTree::new(metadata.name.clone(), names.clone());
        Self {
            metadata,
            names,
            explicit_platform: None,
            tree: RwLock::new(tree),
            state: Mutex::new(ResolveState::Unresolved),
            ready: Condvar::new(),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Create a map using configured default names and explicit platform list.
    pub fn from_config(metadata: SchemaMetadata, config: &GraphConfig) -> Self {
        let map = Self::new(metadata, CoordinateNames::from_settings(&config.schema));
        match config.schema.explicit_platform.as_deref() {
            Some(explicit) => map.with_explicit_platform(explicit),
            None => map,
        }
    }

    /// Trim every project to this comma-separated platform list while resolving.
    pub fn with_explicit_platform(mut self, explicit: impl Into<String>) -> Self {
        let explicit = explicit.into();
        self.explicit_platform = (!explicit.trim().is_empty()).then_some(explicit);
        self
    }

    pub fn names(&self) -> &CoordinateNames {
        &self.names
    }

    pub fn metadata(&self) -> &SchemaMetadata {
        &self.metadata
    }

    pub fn explicit_platform(&self) -> Option<&str> {
        self.explicit_platform.as_deref()
    }

    /// Group of the build; the root name when none is declared.
    pub fn group(&self) -> String {
        match self.metadata.group.as_deref() {
            Some(group) if !group.trim().is_empty() && group != UNKNOWN_VALUE => group.to_string(),
            _ => self.metadata.name.clone(),
        }
    }

    /// Version of the build; the unknown sentinel when none is declared.
    pub fn version(&self) -> String {
        match self.metadata.version.as_deref() {
            Some(version) if !version.trim().is_empty() => version.to_string(),
            _ => UNKNOWN_VALUE.to_string(),
        }
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    pub fn is_resolved(&self) -> bool {
        *self.state.lock() == ResolveState::Resolved
    }

    /// Build the graph if that has not happened yet, then run pending callbacks.
    ///
    /// Concurrent callers block until the resolving thread finishes. A call
    /// from the resolving thread itself is an error. A failed resolution stays
    /// failed.
    pub fn resolve(&self) -> Result<()> {
        let current = std::thread::current().id();
        {
            let mut state = self.state.lock();
            loop {
                match state.clone() {
                    ResolveState::Resolved => {
                        drop(state);
                        self.drain_callbacks();
                        return Ok(());
                    }
                    ResolveState::Failed(message) => return Err(SchemaError::ResolveFailed(message)),
                    ResolveState::Resolving(owner) if owner == current => {
                        return Err(SchemaError::ReentrantResolve)
                    }
                    ResolveState::Resolving(_) => self.ready.wait(&mut state),
                    ResolveState::Unresolved => {
                        *state = ResolveState::Resolving(current);
                        break;
                    }
                }
            }
        }

        let outcome = self.build();
        {
            let mut state = self.state.lock();
            *state = match &outcome {
                Ok(()) => ResolveState::Resolved,
                Err(e) => ResolveState::Failed(e.to_string()),
            };
            self.ready.notify_all();
        }
        if outcome.is_err() {
            self.discard_callbacks();
        }
        outcome?;

        self.drain_callbacks();
        Ok(())
    }

    /// Run `callback` once the map is resolved; immediately if it already is.
    ///
    /// Callbacks never run if resolution fails.
    pub fn when_resolved<F>(&self, callback: F)
    where
        F: FnOnce(&SchemaMap) + Send + 'static,
    {
        {
            let mut pending = self.pending.lock();
            match *self.state.lock() {
                ResolveState::Resolved => {}
                ResolveState::Failed(ref message) => {
                    warn!("Dropping resolution callback, schema failed to resolve: {}", message);
                    return;
                }
                _ => {
                    pending.push(Box::new(callback));
                    return;
                }
            }
        }
        callback(self);
    }

    fn discard_callbacks(&self) {
        let dropped = std::mem::take(&mut *self.pending.lock()).len();
        if dropped > 0 {
            warn!("Dropped {} resolution callbacks after failed resolve", dropped);
        }
    }

    /// Swap the queue for an empty one and run it, until nothing new arrives.
    fn drain_callbacks(&self) {
        loop {
            let batch = std::mem::take(&mut *self.pending.lock());
            if batch.is_empty() {
                return;
            }
            debug!("Running {} resolution callbacks", batch.len());
            for callback in batch {
                callback(self);
            }
        }
    }

    fn build(&self) -> Result<()> {
        info!("Resolving schema for build {}", self.metadata.name);
        let mut tree = self.tree.write();
        let root = tree.root();
        let inherited = Inherited {
            group: self.group(),
            version: self.version(),
            inherit: true,
            multiplatform: false,
        };
        self.load_metadata(&mut tree, root, &self.metadata, &inherited)?;

        if let Some(explicit) = self.explicit_platform.as_deref() {
            for id in tree.all() {
                tree.trim_platforms(id, explicit)?;
            }
        }

        self.wire(&mut tree)?;
        info!("Resolved {} projects", tree.len());
        Ok(())
    }

    fn load_metadata(
        &self,
        tree: &mut ProjectTree,
        id: ProjectId,
        meta: &SchemaMetadata,
        inherited: &Inherited,
    ) -> Result<()> {
        let path = tree.get(id).path_gradle().to_string();
        debug!("Loading metadata for {}", path);

        for decl in &meta.platforms {
            tree.add_platform(id, &decl.to_platform(&self.names));
        }
        for decl in &meta.modules {
            tree.add_module(id, &decl.to_module(&self.names));
        }

        if tree.get(id).is_root() {
            if tree.all_platforms(id).is_empty() {
                let platform = tree.default_platform(id);
                tree.add_platform(id, &platform);
            }
            if tree.all_modules(id).is_empty() {
                let module = tree.default_module(id);
                tree.add_module(id, &module);
            }
        }

        let here = Inherited {
            group: meta.group.clone().unwrap_or_else(|| inherited.group.clone()),
            version: meta
                .version
                .clone()
                .unwrap_or_else(|| inherited.version.clone()),
            inherit: meta.inherit.unwrap_or(inherited.inherit),
            multiplatform: meta.multiplatform.unwrap_or(inherited.multiplatform),
        };

        for child_meta in &meta.projects {
            let inherit = child_meta.inherit.unwrap_or(here.inherit);
            let flags = ProjectFlags {
                inherit,
                multiplatform: child_meta
                    .multiplatform
                    .unwrap_or(inherit && here.multiplatform),
                is_virtual: child_meta.is_virtual.unwrap_or(false),
            };
            let child = tree.child_or_create(id, &child_meta.name, flags)?;
            self.load_metadata(tree, child, child_meta, &here)?;

            if !tree.get(child).is_inherit() {
                let platform = tree.default_platform(id);
                if !tree.has_platform(child, &platform.name) {
                    tree.set_platform(child, platform);
                }
                let module = tree.default_module(id);
                if !tree.has_module(child, &module.name) {
                    tree.set_module(child, module);
                }
            }
        }

        for require in &meta.requires {
            let (key, dep) =
                require.to_dependency(&path, &here.group, &here.version, &self.names)?;
            tree.get_mut(id).add_dependency(key, dep);
        }
        Ok(())
    }

    /// Rewrite replace/include relations into internal dependencies and close
    /// the published flag over them. Safe to run more than once.
    fn wire(&self, tree: &mut ProjectTree) -> Result<()> {
        let group = self.group();
        let version = self.version();

        for id in tree.all() {
            let path = tree.get(id).path_gradle().to_string();

            let mut once = HashSet::new();
            for platform in tree.all_platforms(id) {
                if platform.published && !platform.disabled {
                    publish_replaced(tree, id, platform.replace(), &mut once)?;
                }
            }

            let mut once = HashSet::new();
            for (platform, module) in tree.platforms_and_modules(id) {
                if platform.disabled {
                    continue;
                }
                let from = PlatformModule::new(&platform.name, &module.name);

                if let Some(replace) = platform.replace() {
                    let into = from.edit(Some(replace), None);
                    let dep = self.internal(&into, &group, &version);
                    if tree.get_mut(id).add_dependency(from.clone(), dep) {
                        debug!("{}: {} replaces {}", path, from, into);
                    }
                }

                for include in &module.include {
                    if !tree.has_module(id, include) {
                        return Err(SchemaError::unknown_module(
                            &path,
                            include,
                            tree.all_modules(id).into_iter().map(|m| m.name).collect(),
                        ));
                    }
                    let into = from.edit(None, Some(include));
                    let dep = self.internal(&into, &group, &version);
                    if tree.get_mut(id).add_dependency(from.clone(), dep) {
                        debug!("{}: {} includes {}", path, from, into);
                    }
                    let published = tree.module(id, &module.name)?.published;
                    if published {
                        publish_included(tree, id, include, &mut once)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn internal(&self, into: &PlatformModule, group: &str, version: &str) -> SchemaDependency {
        SchemaDependency::new(
            DependencyType::Internal,
            into.clone(),
            group,
            version,
            into.to_string_strict(&self.names),
        )
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Resolve, then read the tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(&ProjectTree) -> R) -> Result<R> {
        self.resolve()?;
        Ok(f(&self.tree.read()))
    }

    /// A copy of the resolved tree.
    pub fn snapshot(&self) -> Result<ProjectTree> {
        self.with_tree(ProjectTree::clone)
    }

    /// Look up a project by path; the miss lists every known path.
    pub fn project(&self, path: &str) -> Result<SchemaProject> {
        self.with_tree(|tree| match tree.find(path) {
            Some(id) => Ok(tree.get(id).clone()),
            None => Err(SchemaError::unknown_project(path, tree.paths())),
        })?
    }

    pub fn root_project(&self) -> Result<SchemaProject> {
        self.with_tree(|tree| tree.get(tree.root()).clone())
    }

    /// Every project in pre-order.
    pub fn all_projects(&self) -> Result<Vec<SchemaProject>> {
        self.with_tree(|tree| tree.all().into_iter().map(|id| tree.get(id).clone()).collect())
    }

    /// Whether a path names a project, or a child of a multiplatform project.
    pub fn has_project(&self, path: &str) -> Result<bool> {
        self.with_tree(|tree| {
            if tree.find(path).is_some() {
                return true;
            }
            let name = path.trim_start_matches(':');
            tree.all().into_iter().any(|id| {
                tree.get(id).is_multiplatform() && tree.child(id, name).is_some()
            })
        })
    }

    /// Effective platforms of a project.
    pub fn platforms(&self, path: &str) -> Result<Vec<SchemaPlatform>> {
        self.with_tree(|tree| {
            let id = find(tree, path)?;
            Ok(tree.all_platforms(id))
        })?
    }

    /// Effective modules of a project.
    pub fn modules(&self, path: &str) -> Result<Vec<SchemaModule>> {
        self.with_tree(|tree| {
            let id = find(tree, path)?;
            Ok(tree.all_modules(id))
        })?
    }

    /// Graph of units and their internal/project edges.
    pub fn module_graph(&self) -> Result<ModuleGraph> {
        self.with_tree(ModuleGraph::build)
    }

    /// Index reader for this build, using configured build coordinates and
    /// patterns with this map's group and version as fallback.
    pub fn index_reader(&self, config: &GraphConfig, workspace_root: &Path) -> SchemaIndexReader {
        SchemaIndexReader::new(
            config.index_dir(workspace_root),
            BuildCoordinates::from_config(config, &self.group(), &self.version()),
            PatternResolver::from_config(config),
        )
    }

    /// Whether a unit is live: in-memory explicit requirements, or the index.
    pub fn is_live(
        &self,
        reader: &SchemaIndexReader,
        path: &str,
        coords: &PlatformModule,
    ) -> Result<bool> {
        let (unit, name, platform, module) = self.with_tree(|tree| -> Result<_> {
            let id = find(tree, path)?;
            let platform = tree.platform(id, coords.platform_or(&self.names))?;
            let module = tree.module(id, coords.module_or(&self.names))?;
            let unit = unit_of(tree, id, &platform.name, &module.name);
            Ok((unit, tree.get(id).name().to_string(), platform, module))
        })??;
        if unit.explicit {
            return Ok(true);
        }
        // the tree lock is released before touching the index
        Ok(reader.has_entries(&unit.project, &name, &platform, &module))
    }

    /// Liveness of every enabled unit of every project, evaluated in parallel
    /// against one shared reader.
    pub fn live_report(&self, reader: &SchemaIndexReader) -> Result<Vec<LiveUnit>> {
        let work = self.with_tree(|tree| {
            let mut work = Vec::new();
            for id in tree.all() {
                let name = tree.get(id).name().to_string();
                for (platform, module) in tree.platforms_and_modules(id) {
                    if platform.disabled {
                        continue;
                    }
                    let unit = unit_of(tree, id, &platform.name, &module.name);
                    work.push((unit, name.clone(), platform, module));
                }
            }
            work
        })?;

        Ok(work
            .into_par_iter()
            .map(|(mut unit, name, platform, module)| {
                unit.live =
                    unit.explicit || reader.has_entries(&unit.project, &name, &platform, &module);
                unit
            })
            .collect())
    }
}

fn find(tree: &ProjectTree, path: &str) -> Result<ProjectId> {
    tree.find(path)
        .ok_or_else(|| SchemaError::unknown_project(path, tree.paths()))
}

fn unit_of(tree: &ProjectTree, id: ProjectId, platform: &str, module: &str) -> LiveUnit {
    let project = tree.get(id);
    let explicit = project.has_explicit_dependencies(platform, module);
    LiveUnit {
        project: project.path_gradle().to_string(),
        platform: platform.to_string(),
        module: module.to_string(),
        explicit,
        live: explicit,
    }
}

/// Mark every module reachable through `include` as published.
fn publish_included(
    tree: &mut ProjectTree,
    id: ProjectId,
    include: &str,
    once: &mut HashSet<String>,
) -> Result<()> {
    if !once.insert(include.to_string()) {
        return Ok(());
    }
    let included = tree.module(id, include)?;
    if !included.published {
        debug!("{}: publishing included module {}", tree.get(id).path_gradle(), include);
        tree.set_module(id, included.clone().with_published(true));
    }
    for child in &included.include {
        publish_included(tree, id, child, once)?;
    }
    Ok(())
}

/// Mark every platform on a `replace` chain as published.
fn publish_replaced(
    tree: &mut ProjectTree,
    id: ProjectId,
    replace: Option<&str>,
    once: &mut HashSet<String>,
) -> Result<()> {
    let Some(replace) = replace else {
        return Ok(());
    };
    if !once.insert(replace.to_string()) {
        return Ok(());
    }
    let replaced = tree.platform(id, replace)?;
    if !replaced.published {
        debug!("{}: publishing replaced platform {}", tree.get(id).path_gradle(), replace);
        tree.set_platform(id, replaced.clone().with_published(true));
    }
    publish_replaced(tree, id, replaced.replace(), once)
}
