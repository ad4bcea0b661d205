//! Project tree
//!
//! Projects live in an arena ([`ProjectTree`]) and refer to each other by
//! [`ProjectId`]. Each node owns its local platform and module declarations
//! plus a multi-map of dependencies keyed by coordinate. In dependency keys an
//! unset side is a wildcard, so the any/any key applies to every unit.
//!
//! Nodes are never removed. Pruned platforms stay in place with
//! `disabled = true`.

use crate::coords::{CoordinateNames, PlatformModule};
use crate::dependency::{supersede_stubs, SchemaDependency, Transitivity};
use crate::descriptor::{SchemaModule, SchemaPlatform};
use crate::error::{Result, SchemaError};
use crate::index::layout;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

/// Handle to a project inside a [`ProjectTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(usize);

/// Flags set when a project is declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectFlags {
    pub multiplatform: bool,
    pub is_virtual: bool,
    pub inherit: bool,
}

// ============================================================================
// SchemaProject
// ============================================================================

/// One node of the project tree.
#[derive(Debug, Clone)]
pub struct SchemaProject {
    name: String,
    parent: Option<ProjectId>,
    children: Vec<ProjectId>,
    path_gradle: String,
    platforms: Vec<SchemaPlatform>,
    modules: Vec<SchemaModule>,
    dependencies: BTreeMap<PlatformModule, Vec<SchemaDependency>>,
    multiplatform: bool,
    is_virtual: bool,
    inherit: bool,
}

impl SchemaProject {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<ProjectId> {
        self.parent
    }

    pub fn children(&self) -> &[ProjectId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// `:`-joined ancestor chain, `:` for the root.
    pub fn path_gradle(&self) -> &str {
        &self.path_gradle
    }

    /// `/`-joined ancestor chain, empty for the root.
    pub fn path_slash(&self) -> String {
        self.path_gradle.trim_start_matches(':').replace(':', "/")
    }

    /// Directory name of this project in the liveness index.
    pub fn path_index(&self, build_name: &str) -> String {
        layout::project_dir_name(&self.path_gradle, build_name)
    }

    /// Platforms declared directly on this node.
    pub fn local_platforms(&self) -> &[SchemaPlatform] {
        &self.platforms
    }

    /// Modules declared directly on this node.
    pub fn local_modules(&self) -> &[SchemaModule] {
        &self.modules
    }

    pub fn dependencies(&self) -> &BTreeMap<PlatformModule, Vec<SchemaDependency>> {
        &self.dependencies
    }

    pub fn is_multiplatform(&self) -> bool {
        self.multiplatform
    }

    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    pub fn is_inherit(&self) -> bool {
        self.inherit
    }

    /// Every dependency applicable to `platform:module`.
    ///
    /// Buckets whose key leaves a side unset match any value on that side.
    /// `Stub` records are dropped when an `Impl` with the same identity exists.
    pub fn dependencies_of(&self, platform: &str, module: &str) -> Vec<SchemaDependency> {
        let matching = self
            .dependencies
            .iter()
            .filter(|(key, _)| key_matches(key, platform, module))
            .flat_map(|(_, deps)| deps.iter().cloned())
            .collect();
        supersede_stubs(matching)
    }

    /// Whether any bucket matching `platform:module` holds an external or
    /// project requirement. Unset key sides match like in [`Self::dependencies_of`].
    pub fn has_explicit_dependencies(&self, platform: &str, module: &str) -> bool {
        self.dependencies
            .iter()
            .filter(|(key, _)| key_matches(key, platform, module))
            .any(|(_, deps)| deps.iter().any(|d| d.dep_type.is_explicit()))
    }

    /// Add a dependency to a bucket unless an equal record is present.
    ///
    /// An `Impl` replaces an equal `Stub` already in the bucket.
    pub fn add_dependency(&mut self, key: PlatformModule, dep: SchemaDependency) -> bool {
        let bucket = self.dependencies.entry(key).or_default();
        match bucket.iter_mut().find(|existing| **existing == dep) {
            Some(existing)
                if existing.transitivity == Transitivity::Stub
                    && dep.transitivity == Transitivity::Impl =>
            {
                *existing = dep;
                true
            }
            Some(_) => false,
            None => {
                bucket.push(dep);
                true
            }
        }
    }

    fn merge_platform(&mut self, platform: &SchemaPlatform) {
        match self.platforms.iter_mut().find(|p| p.name == platform.name) {
            Some(existing) => *existing = existing.update(platform),
            None => self.platforms.push(platform.clone()),
        }
    }

    fn merge_module(&mut self, module: &SchemaModule) {
        match self.modules.iter_mut().find(|m| m.name == module.name) {
            Some(existing) => *existing = existing.update(module),
            None => self.modules.push(module.clone()),
        }
    }
}

/// A dependency bucket applies to a unit when each set side of its key matches.
fn key_matches(key: &PlatformModule, platform: &str, module: &str) -> bool {
    key.platform.as_deref().is_none_or(|p| p == platform)
        && key.module.as_deref().is_none_or(|m| m == module)
}

// ============================================================================
// ProjectTree
// ============================================================================

/// Arena holding every project of one build.
#[derive(Debug, Clone)]
pub struct ProjectTree {
    projects: Vec<SchemaProject>,
    by_path: HashMap<String, ProjectId>,
    names: CoordinateNames,
}

impl ProjectTree {
    /// Create a tree with a root project named `root_name`.
    pub fn new(root_name: impl Into<String>, names: CoordinateNames) -> Self {
        let root = SchemaProject {
            name: root_name.into(),
            parent: None,
            children: Vec::new(),
            path_gradle: ":".to_string(),
            platforms: Vec::new(),
            modules: Vec::new(),
            dependencies: BTreeMap::new(),
            multiplatform: false,
            is_virtual: false,
            inherit: true,
        };
        let mut by_path = HashMap::new();
        by_path.insert(":".to_string(), ProjectId(0));
        Self {
            projects: vec![root],
            by_path,
            names,
        }
    }

    pub fn names(&self) -> &CoordinateNames {
        &self.names
    }

    pub fn root(&self) -> ProjectId {
        ProjectId(0)
    }

    pub fn get(&self, id: ProjectId) -> &SchemaProject {
        &self.projects[id.0]
    }

    pub fn get_mut(&mut self, id: ProjectId) -> &mut SchemaProject {
        &mut self.projects[id.0]
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Look up a project by gradle path; a missing leading `:` is added.
    pub fn find(&self, path: &str) -> Option<ProjectId> {
        if path.starts_with(':') {
            self.by_path.get(path).copied()
        } else {
            self.by_path.get(&format!(":{}", path)).copied()
        }
    }

    /// Every attached project path, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.by_path.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Attached projects in pre-order, root first.
    pub fn all(&self) -> Vec<ProjectId> {
        let mut out = Vec::with_capacity(self.projects.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.get(id).children.iter().rev());
        }
        out
    }

    /// Create a project under `parent` without attaching it.
    pub fn new_project(&mut self, parent: ProjectId, name: &str, flags: ProjectFlags) -> ProjectId {
        let parent_path = self.get(parent).path_gradle.as_str();
        let path_gradle = if parent_path == ":" {
            format!(":{}", name)
        } else {
            format!("{}:{}", parent_path, name)
        };
        let id = ProjectId(self.projects.len());
        self.projects.push(SchemaProject {
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            path_gradle,
            platforms: Vec::new(),
            modules: Vec::new(),
            dependencies: BTreeMap::new(),
            multiplatform: flags.multiplatform,
            is_virtual: flags.is_virtual,
            inherit: flags.inherit,
        });
        id
    }

    /// Attach a project created by [`new_project`](Self::new_project) to its parent.
    ///
    /// Attaching twice is a no-op; attaching over a different node with the
    /// same name is an error.
    pub fn attach(&mut self, child: ProjectId) -> Result<()> {
        let project = self.get(child);
        let Some(parent) = project.parent else {
            return Ok(());
        };
        let path = project.path_gradle.clone();
        match self.by_path.get(&path).copied() {
            Some(existing) if existing == child => Ok(()),
            Some(_) => Err(SchemaError::ConflictingChild {
                parent: self.get(parent).path_gradle.clone(),
                name: self.get(child).name.clone(),
            }),
            None => {
                self.by_path.insert(path, child);
                self.get_mut(parent).children.push(child);
                Ok(())
            }
        }
    }

    pub fn child(&self, parent: ProjectId, name: &str) -> Option<ProjectId> {
        self.get(parent)
            .children
            .iter()
            .copied()
            .find(|c| self.get(*c).name == name)
    }

    /// Reuse the named child of `parent` or create and attach a new one.
    ///
    /// A reused child picks up `multiplatform`/`virtual` when set.
    pub fn child_or_create(
        &mut self,
        parent: ProjectId,
        name: &str,
        flags: ProjectFlags,
    ) -> Result<ProjectId> {
        if let Some(existing) = self.child(parent, name) {
            let project = self.get_mut(existing);
            project.multiplatform |= flags.multiplatform;
            project.is_virtual |= flags.is_virtual;
            return Ok(existing);
        }
        let id = self.new_project(parent, name, flags);
        self.attach(id)?;
        debug!("Created project {}", self.get(id).path_gradle);
        Ok(id)
    }

    // ------------------------------------------------------------------------
    // Platforms and modules
    // ------------------------------------------------------------------------

    /// Merge a platform into a project and every existing descendant.
    pub fn add_platform(&mut self, id: ProjectId, platform: &SchemaPlatform) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let project = self.get_mut(next);
            project.merge_platform(platform);
            stack.extend(project.children.iter().copied());
        }
    }

    /// Merge a module into a project and every existing descendant.
    pub fn add_module(&mut self, id: ProjectId, module: &SchemaModule) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let project = self.get_mut(next);
            project.merge_module(module);
            stack.extend(project.children.iter().copied());
        }
    }

    /// Replace a platform on this project only.
    pub fn set_platform(&mut self, id: ProjectId, platform: SchemaPlatform) {
        let project = self.get_mut(id);
        match project.platforms.iter_mut().find(|p| p.name == platform.name) {
            Some(existing) => *existing = platform,
            None => project.platforms.push(platform),
        }
    }

    /// Replace a module on this project only.
    pub fn set_module(&mut self, id: ProjectId, module: SchemaModule) {
        let project = self.get_mut(id);
        match project.modules.iter_mut().find(|m| m.name == module.name) {
            Some(existing) => *existing = module,
            None => project.modules.push(module),
        }
    }

    /// Effective platforms: inherited ones shadowed by local declarations.
    pub fn all_platforms(&self, id: ProjectId) -> Vec<SchemaPlatform> {
        let project = self.get(id);
        let mut all = match project.parent {
            Some(parent) if project.inherit => self.all_platforms(parent),
            _ => Vec::new(),
        };
        all.retain(|p| !project.platforms.contains(p));
        all.extend(project.platforms.iter().cloned());
        all
    }

    /// Effective modules: inherited ones shadowed by local declarations.
    pub fn all_modules(&self, id: ProjectId) -> Vec<SchemaModule> {
        let project = self.get(id);
        let mut all = match project.parent {
            Some(parent) if project.inherit => self.all_modules(parent),
            _ => Vec::new(),
        };
        all.retain(|m| !project.modules.contains(m));
        all.extend(project.modules.iter().cloned());
        all
    }

    pub fn platform(&self, id: ProjectId, name: &str) -> Result<SchemaPlatform> {
        let all = self.all_platforms(id);
        match all.iter().find(|p| p.name == name) {
            Some(found) => Ok(found.clone()),
            None => Err(SchemaError::unknown_platform(
                self.get(id).path_gradle(),
                name,
                all.into_iter().map(|p| p.name).collect(),
            )),
        }
    }

    pub fn module(&self, id: ProjectId, name: &str) -> Result<SchemaModule> {
        let all = self.all_modules(id);
        match all.iter().find(|m| m.name == name) {
            Some(found) => Ok(found.clone()),
            None => Err(SchemaError::unknown_module(
                self.get(id).path_gradle(),
                name,
                all.into_iter().map(|m| m.name).collect(),
            )),
        }
    }

    pub fn has_module(&self, id: ProjectId, name: &str) -> bool {
        self.all_modules(id).iter().any(|m| m.name == name)
    }

    pub fn has_platform(&self, id: ProjectId, name: &str) -> bool {
        self.all_platforms(id).iter().any(|p| p.name == name)
    }

    /// The default platform of a project, or a fresh descriptor if undeclared.
    pub fn default_platform(&self, id: ProjectId) -> SchemaPlatform {
        let name = &self.names.default_platform;
        self.platform(id, name)
            .unwrap_or_else(|_| SchemaPlatform::new(name.as_str()).with_published(true))
    }

    /// The default module of a project, or a fresh descriptor if undeclared.
    pub fn default_module(&self, id: ProjectId) -> SchemaModule {
        let name = &self.names.default_module;
        self.module(id, name)
            .unwrap_or_else(|_| SchemaModule::new(name.as_str()).with_published(true))
    }

    /// Every effective platform × module pair of a project.
    pub fn platforms_and_modules(&self, id: ProjectId) -> Vec<(SchemaPlatform, SchemaModule)> {
        let modules = self.all_modules(id);
        self.all_platforms(id)
            .into_iter()
            .flat_map(|p| modules.iter().map(move |m| (p.clone(), m.clone())))
            .collect()
    }

    /// Disable every platform outside the closure of the comma-separated
    /// allow-list.
    ///
    /// A winner keeps every platform on its `replace` chain alive. A listed
    /// platform missing from the project logs a warning; when it is the only
    /// entry and nothing else won, the default platform is kept instead.
    /// Returns the winning platform names.
    pub fn trim_platforms(&mut self, id: ProjectId, explicit: &str) -> Result<BTreeSet<String>> {
        let all = self.all_platforms(id);
        let path = self.get(id).path_gradle.clone();
        let single = !explicit.contains(',');
        let find = |name: &str| all.iter().find(|p| p.name == name);

        let mut winners: BTreeSet<String> = BTreeSet::new();
        for allowed in explicit.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let mut winner = find(allowed);
            if winner.is_none() {
                warn!("Project {} did not have platform {}", path, allowed);
                if winners.is_empty() && single {
                    warn!(
                        "Project {} will instead retain platform '{}'",
                        path, self.names.default_platform
                    );
                    winner = find(&self.names.default_platform);
                }
            }

            let mut seen = HashSet::new();
            while let Some(current) = winner {
                if !seen.insert(current.name.as_str()) {
                    break;
                }
                winners.insert(current.name.clone());
                winner = match current.replace() {
                    Some(replace) => Some(find(replace).ok_or_else(|| {
                        SchemaError::unknown_platform(
                            &path,
                            replace,
                            all.iter().map(|p| p.name.clone()).collect(),
                        )
                    })?),
                    None => None,
                };
            }
        }

        for platform in &all {
            if !winners.contains(&platform.name) && !platform.disabled {
                info!("Project {} pruning non-live platform {}", path, platform.name);
                let mut pruned = platform.clone();
                pruned.disabled = true;
                self.set_platform(id, pruned);
            }
        }
        Ok(winners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::{DependencyType, UNKNOWN_VALUE};
    use pretty_assertions::assert_eq;

    fn inherit() -> ProjectFlags {
        ProjectFlags {
            inherit: true,
            ..Default::default()
        }
    }

    fn names_of(platforms: &[SchemaPlatform]) -> Vec<&str> {
        platforms.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_paths() {
        let mut tree = ProjectTree::new("build", CoordinateNames::default());
        let a = tree.child_or_create(tree.root(), "a", inherit()).unwrap();
        let b = tree.child_or_create(a, "b", inherit()).unwrap();

        assert_eq!(tree.get(tree.root()).path_gradle(), ":");
        assert_eq!(tree.get(a).path_gradle(), ":a");
        assert_eq!(tree.get(b).path_gradle(), ":a:b");
        assert_eq!(tree.get(b).path_slash(), "a/b");
        assert_eq!(tree.get(b).path_index("_"), "_a_b");
        assert_eq!(tree.find("a:b"), Some(b));
        assert_eq!(tree.all(), vec![tree.root(), a, b]);
    }

    #[test]
    fn test_child_reuse_and_conflict() {
        let mut tree = ProjectTree::new("build", CoordinateNames::default());
        let root = tree.root();
        let first = tree.child_or_create(root, "a", inherit()).unwrap();
        let again = tree
            .child_or_create(
                root,
                "a",
                ProjectFlags {
                    is_virtual: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(first, again);
        assert!(tree.get(first).is_virtual());

        let imposter = tree.new_project(root, "a", inherit());
        let err = tree.attach(imposter).unwrap_err();
        assert!(matches!(err, SchemaError::ConflictingChild { .. }));
        assert!(tree.attach(first).is_ok());
    }

    #[test]
    fn test_add_platform_reaches_existing_children() {
        let mut tree = ProjectTree::new("build", CoordinateNames::default());
        let root = tree.root();
        let child = tree.child_or_create(root, "a", ProjectFlags::default()).unwrap();

        tree.add_platform(root, &SchemaPlatform::new("jre"));
        tree.add_platform(root, &SchemaPlatform::new("jre").with_published(true));

        assert_eq!(names_of(tree.get(child).local_platforms()), vec!["jre"]);
        assert!(tree.get(child).local_platforms()[0].published);
        assert_eq!(tree.get(root).local_platforms().len(), 1);
    }

    #[test]
    fn test_inheritance_shadowing() {
        let mut tree = ProjectTree::new("build", CoordinateNames::default());
        let root = tree.root();
        tree.add_platform(root, &SchemaPlatform::new("A"));
        tree.add_platform(root, &SchemaPlatform::new("B"));
        let child = tree.child_or_create(root, "c", inherit()).unwrap();
        tree.set_platform(child, SchemaPlatform::new("B").with_test(true));

        let all = tree.all_platforms(child);
        assert_eq!(names_of(&all), vec!["A", "B"]);
        assert!(all[1].test);

        let isolated = tree.child_or_create(root, "d", ProjectFlags::default()).unwrap();
        assert!(tree.all_platforms(isolated).is_empty());
    }

    #[test]
    fn test_lookup_miss_lists_names() {
        let mut tree = ProjectTree::new("build", CoordinateNames::default());
        let root = tree.root();
        tree.add_module(root, &SchemaModule::new("main"));
        tree.add_module(root, &SchemaModule::new("test"));

        let err = tree.module(root, "api").unwrap_err();
        assert!(err.to_string().contains("main, test"));
        assert!(tree.platform(root, "gwt").is_err());
    }

    fn replace_chain() -> (ProjectTree, ProjectId) {
        let mut tree = ProjectTree::new("build", CoordinateNames::default());
        let root = tree.root();
        tree.add_platform(root, &SchemaPlatform::new("A").with_replace("B"));
        tree.add_platform(root, &SchemaPlatform::new("B").with_replace("C"));
        tree.add_platform(root, &SchemaPlatform::new("C"));
        (tree, root)
    }

    #[test]
    fn test_trim_follows_replace_chain() {
        let (mut tree, root) = replace_chain();
        let winners = tree.trim_platforms(root, "A").unwrap();
        assert_eq!(winners.into_iter().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert!(tree.all_platforms(root).iter().all(|p| !p.disabled));

        let (mut tree, root) = replace_chain();
        let winners = tree.trim_platforms(root, "B").unwrap();
        assert_eq!(winners.into_iter().collect::<Vec<_>>(), vec!["B", "C"]);
        let a = tree.platform(root, "A").unwrap();
        assert!(a.disabled);
    }

    #[test]
    fn test_trim_missing_falls_back_to_default() {
        let mut tree = ProjectTree::new("build", CoordinateNames::default());
        let root = tree.root();
        tree.add_platform(root, &SchemaPlatform::new("main"));
        tree.add_platform(root, &SchemaPlatform::new("gwt"));

        let winners = tree.trim_platforms(root, "jre").unwrap();
        assert_eq!(winners.into_iter().collect::<Vec<_>>(), vec!["main"]);
        assert!(tree.platform(root, "gwt").unwrap().disabled);

        // a list with several entries gets no fallback
        let mut tree = ProjectTree::new("build", CoordinateNames::default());
        let root = tree.root();
        tree.add_platform(root, &SchemaPlatform::new("main"));
        let winners = tree.trim_platforms(root, "jre,gwt").unwrap();
        assert!(winners.is_empty());
        assert!(tree.platform(root, "main").unwrap().disabled);
    }

    #[test]
    fn test_trim_rejects_dangling_replace() {
        let mut tree = ProjectTree::new("build", CoordinateNames::default());
        let root = tree.root();
        tree.add_platform(root, &SchemaPlatform::new("jre").with_replace("ghost"));
        let err = tree.trim_platforms(root, "jre").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownPlatform { .. }));
    }

    #[test]
    fn test_dependencies_of_matches_wildcards() {
        let mut tree = ProjectTree::new("build", CoordinateNames::default());
        let root = tree.root();
        let dep = |name: &str| {
            SchemaDependency::new(
                DependencyType::Project,
                PlatformModule::any(),
                UNKNOWN_VALUE,
                UNKNOWN_VALUE,
                name,
            )
        };
        let project = tree.get_mut(root);
        project.add_dependency(PlatformModule::any(), dep("everywhere"));
        project.add_dependency(PlatformModule::with_module("test"), dep("tests"));
        project.add_dependency(PlatformModule::new("gwt", "main"), dep("gwt-only"));
        assert!(!project.add_dependency(PlatformModule::any(), dep("everywhere")));

        let names = |deps: Vec<SchemaDependency>| {
            let mut n: Vec<String> = deps.into_iter().map(|d| d.name).collect();
            n.sort();
            n
        };
        let project = tree.get(root);
        assert_eq!(names(project.dependencies_of("jre", "test")), vec!["everywhere", "tests"]);
        assert_eq!(names(project.dependencies_of("gwt", "main")), vec!["everywhere", "gwt-only"]);
        assert!(project.has_explicit_dependencies("gwt", "main"));
        // the any/any bucket applies to every unit
        assert!(project.has_explicit_dependencies("jre", "main"));
    }

    #[test]
    fn test_internal_dependencies_are_not_explicit() {
        let mut tree = ProjectTree::new("build", CoordinateNames::default());
        let root = tree.root();
        let internal = SchemaDependency::new(
            DependencyType::Internal,
            PlatformModule::with_module("test"),
            UNKNOWN_VALUE,
            UNKNOWN_VALUE,
            "main",
        );
        let external = SchemaDependency::new(
            DependencyType::External,
            PlatformModule::with_module("main"),
            "org.lib",
            "1.0",
            "lib",
        );
        let project = tree.get_mut(root);
        project.add_dependency(PlatformModule::with_module("test"), internal);
        project.add_dependency(PlatformModule::with_module("main"), external);

        let project = tree.get(root);
        assert!(!project.has_explicit_dependencies("main", "test"));
        assert!(project.has_explicit_dependencies("main", "main"));
        assert!(project.has_explicit_dependencies("jre", "main"));
    }

    #[test]
    fn test_impl_replaces_stub_in_bucket() {
        let mut tree = ProjectTree::new("build", CoordinateNames::default());
        let root = tree.root();
        let dep = SchemaDependency::new(
            DependencyType::External,
            PlatformModule::any(),
            "g",
            "1",
            "lib",
        );
        let project = tree.get_mut(root);
        project.add_dependency(PlatformModule::any(), dep.clone().with_transitivity(Transitivity::Stub));
        assert!(project.add_dependency(PlatformModule::any(), dep.clone().with_transitivity(Transitivity::Impl)));
        assert!(!project.add_dependency(PlatformModule::any(), dep.with_transitivity(Transitivity::Stub)));

        let deps = tree.get(root).dependencies_of("main", "main");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].transitivity, Transitivity::Impl);
    }
}
