//! Unit dependency graph
//!
//! A petgraph view over a resolved [`ProjectTree`]: one node per enabled
//! project × platform:module unit, one edge per internal or project
//! dependency between units. External and unknown requirements have no node
//! to point at and are left out.

use crate::coords::PlatformModule;
use crate::dependency::{DependencyType, Transitivity};
use crate::project::ProjectTree;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

// ============================================================================
// Node and edge data
// ============================================================================

/// One build unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitNode {
    /// `<project-path>@<platform>:<module>`
    pub id: String,
    pub project: String,
    pub platform: String,
    pub module: String,
    pub published: bool,
    pub test: bool,
}

impl UnitNode {
    pub fn unit_id(project: &str, platform: &str, module: &str) -> String {
        format!("{}@{}:{}", project, platform, module)
    }
}

/// A dependency between two units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEdge {
    pub dep_type: DependencyType,
    pub transitivity: Transitivity,
}

// ============================================================================
// ModuleGraph
// ============================================================================

/// Directed graph of build units.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    graph: StableGraph<UnitNode, UnitEdge, petgraph::Directed>,
    node_index_map: HashMap<String, NodeIndex>,
}

impl ModuleGraph {
    /// Build the graph of every enabled unit in a resolved tree.
    pub fn build(tree: &ProjectTree) -> Self {
        let names = tree.names();
        let mut graph = ModuleGraph::default();

        for id in tree.all() {
            let path = tree.get(id).path_gradle();
            for (platform, module) in tree.platforms_and_modules(id) {
                if platform.disabled {
                    continue;
                }
                graph.add_node(UnitNode {
                    id: UnitNode::unit_id(path, &platform.name, &module.name),
                    project: path.to_string(),
                    platform: platform.name.clone(),
                    module: module.name.clone(),
                    published: platform.published && module.published,
                    test: platform.test || module.test,
                });
            }
        }

        for id in tree.all() {
            let project = tree.get(id);
            for (platform, module) in tree.platforms_and_modules(id) {
                if platform.disabled {
                    continue;
                }
                let here = PlatformModule::new(&platform.name, &module.name);
                let source = UnitNode::unit_id(project.path_gradle(), &platform.name, &module.name);

                for dep in project.dependencies_of(&platform.name, &module.name) {
                    let target_project = match dep.dep_type {
                        DependencyType::Internal => Some(id),
                        DependencyType::Project => tree.find(&dep.name),
                        DependencyType::External | DependencyType::Unknown => None,
                    };
                    let Some(target_project) = target_project else {
                        continue;
                    };
                    let coords = dep.coords.or(&here).resolve(names);
                    let target = UnitNode::unit_id(
                        tree.get(target_project).path_gradle(),
                        coords.platform_or(names),
                        coords.module_or(names),
                    );
                    let edge = UnitEdge {
                        dep_type: dep.dep_type,
                        transitivity: dep.transitivity,
                    };
                    if graph.add_edge(&source, &target, edge).is_none() {
                        trace!("Skipping edge {} -> {}: target is not a live unit", source, target);
                    }
                }
            }
        }
        graph
    }

    /// Add a node, replacing any node with the same ID.
    pub fn add_node(&mut self, node: UnitNode) -> NodeIndex {
        let node_id = node.id.clone();
        if let Some(&existing_idx) = self.node_index_map.get(&node_id) {
            self.graph.remove_node(existing_idx);
        }
        let idx = self.graph.add_node(node);
        self.node_index_map.insert(node_id, idx);
        idx
    }

    /// Add an edge between two existing nodes; `None` if either is missing.
    pub fn add_edge(&mut self, source: &str, target: &str, edge: UnitEdge) -> Option<()> {
        let source_idx = *self.node_index_map.get(source)?;
        let target_idx = *self.node_index_map.get(target)?;
        if self.graph.find_edge(source_idx, target_idx).is_none() {
            self.graph.add_edge(source_idx, target_idx, edge);
        }
        Some(())
    }

    pub fn get_node(&self, id: &str) -> Option<&UnitNode> {
        self.node_index_map
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index_map.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = &UnitNode> {
        self.graph.node_weights()
    }

    /// Units of one project.
    pub fn units_of<'a>(&'a self, project: &'a str) -> impl Iterator<Item = &'a UnitNode> + 'a {
        self.graph
            .node_weights()
            .filter(move |n| n.project == project)
    }

    /// Units depending on `id`.
    pub fn incoming(&self, id: &str) -> Vec<(&UnitNode, &UnitEdge)> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Units `id` depends on.
    pub fn outgoing(&self, id: &str) -> Vec<(&UnitNode, &UnitEdge)> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<(&UnitNode, &UnitEdge)> {
        let Some(&idx) = self.node_index_map.get(id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, direction)
            .filter_map(|edge_ref| {
                let other = match direction {
                    Direction::Incoming => edge_ref.source(),
                    Direction::Outgoing => edge_ref.target(),
                };
                Some((self.graph.node_weight(other)?, edge_ref.weight()))
            })
            .collect()
    }

    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Unit IDs with every dependency before its consumers, or `None` when
    /// the graph has a cycle.
    pub fn build_order(&self) -> Option<Vec<String>> {
        let order = toposort(&self.graph, None).ok()?;
        let mut ids: Vec<String> = order
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx).map(|n| n.id.clone()))
            .collect();
        ids.reverse();
        Some(ids)
    }

    pub fn inner(&self) -> &StableGraph<UnitNode, UnitEdge, petgraph::Directed> {
        &self.graph
    }
}
