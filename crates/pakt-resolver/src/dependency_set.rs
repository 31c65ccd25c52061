//! Package dependency graph with per-package version constraints.

use std::collections::HashMap;
use std::fmt;

use pakt_core::dependency::PackageDependency;
use pakt_core::package::PackageId;
use pakt_core::version::VersionInterval;
use pakt_util::errors::PaktError;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

/// A package vertex: its identity (absent for an anonymous root) and the
/// version ranges each requiring parent accepts.
#[derive(Debug, Clone)]
struct PackageNode {
    id: Option<PackageId>,
    intervals: crate::interval_map::SplitIntervalMap<NodeIndex>,
}

impl PackageNode {
    fn new(id: Option<PackageId>) -> Self {
        Self {
            id,
            intervals: Default::default(),
        }
    }
}

/// One package in resolution order, with the version ranges acceptable to
/// every package that requires it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub id: PackageId,
    pub valid_intervals: Vec<VersionInterval>,
}

impl fmt::Display for ResolvedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let intervals: Vec<String> = self.valid_intervals.iter().map(|i| i.to_string()).collect();
        write!(f, "{} [{}]", self.id, intervals.join(", "))
    }
}

/// Directed graph of package dependencies rooted at the consuming project.
///
/// Edges point from dependent to dependency. Each (target, dependency) pair
/// may be declared only once.
pub struct DependencySet {
    graph: DiGraph<PackageNode, ()>,
    /// Lookup from package id to vertex (the root is included when it has an id).
    index: HashMap<PackageId, NodeIndex>,
    root: NodeIndex,
}

impl DependencySet {
    /// A dependency set whose root is an anonymous project.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(PackageNode::new(None));
        Self {
            graph,
            index: HashMap::new(),
            root,
        }
    }

    /// A dependency set whose root vertex is addressable as `root_id`.
    pub fn with_root(root_id: PackageId) -> Self {
        let mut set = Self::new();
        set.graph[set.root].id = Some(root_id.clone());
        set.index.insert(root_id, set.root);
        set
    }

    /// Declare that the root project depends on `dependency`.
    pub fn add_direct_dependency(&mut self, dependency: &PackageDependency) -> miette::Result<()> {
        self.add_edge_from(self.root, dependency)
    }

    /// Declare that `target_id` depends on `dependency`.
    ///
    /// The target must already be part of the set.
    pub fn add_dependency(
        &mut self,
        target_id: &PackageId,
        dependency: &PackageDependency,
    ) -> miette::Result<()> {
        let target = self.index.get(target_id).copied().ok_or_else(|| PaktError::Graph {
            message: format!("missing dependency target {target_id}"),
        })?;
        self.add_edge_from(target, dependency)
    }

    fn add_edge_from(
        &mut self,
        target: NodeIndex,
        dependency: &PackageDependency,
    ) -> miette::Result<()> {
        let dependency_id = dependency.id();
        let node = self.get_or_add_node(&dependency_id);

        if self.graph.contains_edge(target, node) {
            return Err(PaktError::Graph {
                message: format!(
                    "dependency {dependency_id} was already declared for {}",
                    self.label(target)
                ),
            }
            .into());
        }
        self.graph.add_edge(target, node, ());

        for interval in dependency.intervals() {
            self.graph[node].intervals.insert(interval, target);
        }
        Ok(())
    }

    fn get_or_add_node(&mut self, id: &PackageId) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(PackageNode::new(Some(id.clone())));
        self.index.insert(id.clone(), idx);
        idx
    }

    fn label(&self, idx: NodeIndex) -> String {
        match &self.graph[idx].id {
            Some(id) => id.to_string(),
            None => "the root project".to_string(),
        }
    }

    /// Whether `id` is a vertex of the set.
    pub fn contains(&self, id: &PackageId) -> bool {
        self.index.contains_key(id)
    }

    /// Whether the edge `target_id -> dependency_id` has been declared.
    pub fn contains_dependency(&self, target_id: &PackageId, dependency_id: &PackageId) -> bool {
        match (self.index.get(target_id), self.index.get(dependency_id)) {
            (Some(&target), Some(&dependency)) => self.graph.contains_edge(target, dependency),
            _ => false,
        }
    }

    /// Whether the root project directly depends on `dependency_id`.
    pub fn contains_direct_dependency(&self, dependency_id: &PackageId) -> bool {
        self.index
            .get(dependency_id)
            .is_some_and(|&dependency| self.graph.contains_edge(self.root, dependency))
    }

    /// Number of packages (excluding the root).
    pub fn len(&self) -> usize {
        self.graph.node_count().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every package in dependency-first order, annotated with the intervals
    /// acceptable to all of its requiring parents.
    ///
    /// Fails if the package graph contains a cycle.
    pub fn calculate_resolution_order(&self) -> miette::Result<Vec<ResolvedPackage>> {
        let sorted = toposort(&self.graph, None).map_err(|cycle| PaktError::Graph {
            message: format!("dependency cycle detected at {}", self.label(cycle.node_id())),
        })?;

        let mut order = Vec::with_capacity(sorted.len());
        for idx in sorted.into_iter().rev() {
            if idx == self.root {
                continue;
            }
            let node = &self.graph[idx];
            let Some(id) = node.id.clone() else {
                continue;
            };
            let num_targets = self
                .graph
                .neighbors_directed(idx, Direction::Incoming)
                .count();
            let valid_intervals = node.intervals.intervals_with_min_count(num_targets);
            tracing::debug!(
                "resolved {id}: {num_targets} requiring package(s), {} valid interval(s)",
                valid_intervals.len()
            );
            order.push(ResolvedPackage {
                id,
                valid_intervals,
            });
        }
        Ok(order)
    }
}

impl Default for DependencySet {
    fn default() -> Self {
        Self::new()
    }
}
