//! Target build graph construction and build ordering.

use std::collections::{BTreeSet, HashMap};

use pakt_core::import::{ImportEntry, ImportStore};
use pakt_core::package::PackageSpecifier;
use pakt_core::target::TargetStore;
use pakt_util::errors::PaktError;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{depth_first_search, DfsEvent};
use url::Url;

/// Directed graph of build targets, borrowed from the project's stores.
///
/// Edges point from a target to the targets it depends on, either directly
/// through `depends` or through a `Target` import.
pub struct BuildGraph<'a> {
    targets: &'a TargetStore,
    imports: &'a ImportStore,
    graph: DiGraph<String, ()>,
    /// Lookup from target name to vertex.
    index: HashMap<String, NodeIndex>,
    requested_requirements: BTreeSet<PackageSpecifier>,
    requested_package_urls: BTreeSet<Url>,
}

impl<'a> BuildGraph<'a> {
    /// Build the graph, failing on the first reference to a missing target or import.
    pub fn create(targets: &'a TargetStore, imports: &'a ImportStore) -> miette::Result<Self> {
        let mut graph = DiGraph::new();
        let mut index = HashMap::with_capacity(targets.len());
        for (name, _) in targets.iter() {
            let idx = graph.add_node(name.clone());
            index.insert(name.clone(), idx);
        }

        let mut requested_requirements = BTreeSet::new();
        let mut requested_package_urls = BTreeSet::new();
        let mut import_targets: HashMap<&str, NodeIndex> = HashMap::new();
        for (import_name, entry) in imports.iter() {
            match entry {
                ImportEntry::Target { target_name } => {
                    let idx = index.get(target_name).copied().ok_or_else(|| PaktError::Config {
                        message: format!(
                            "import '{import_name}' refers to nonexistent target '{target_name}'"
                        ),
                    })?;
                    import_targets.insert(import_name.as_str(), idx);
                }
                ImportEntry::Requirement { requirement_spec } => {
                    requested_requirements.insert(requirement_spec.clone());
                }
                ImportEntry::Package { package_url } => {
                    requested_package_urls.insert(package_url.clone());
                }
            }
        }

        for (name, entry) in targets.iter() {
            let from = index[name];
            for dependency in &entry.depends {
                let to = index.get(dependency).copied().ok_or_else(|| PaktError::Config {
                    message: format!(
                        "target '{name}' refers to nonexistent target dependency '{dependency}'"
                    ),
                })?;
                graph.update_edge(from, to, ());
            }
            for import_name in &entry.imports {
                if !imports.has_import(import_name) {
                    return Err(PaktError::Config {
                        message: format!(
                            "target '{name}' refers to nonexistent import '{import_name}'"
                        ),
                    }
                    .into());
                }
                if let Some(&to) = import_targets.get(import_name.as_str()) {
                    graph.update_edge(from, to, ());
                }
            }
        }

        tracing::debug!(
            "build graph: {} target(s), {} edge(s), {} requirement(s), {} package url(s)",
            graph.node_count(),
            graph.edge_count(),
            requested_requirements.len(),
            requested_package_urls.len()
        );

        Ok(Self {
            targets,
            imports,
            graph,
            index,
            requested_requirements,
            requested_package_urls,
        })
    }

    /// Names of every target reachable from `target_name`, dependencies first.
    pub fn calculate_build_order(&self, target_name: &str) -> miette::Result<Vec<String>> {
        let start = self.index.get(target_name).copied().ok_or_else(|| PaktError::Graph {
            message: format!("unknown build target '{target_name}'"),
        })?;

        let mut order = Vec::new();
        depth_first_search(&self.graph, Some(start), |event| {
            if let DfsEvent::Finish(idx, _) = event {
                order.push(self.graph[idx].clone());
            }
        });
        Ok(order)
    }

    pub fn requested_requirements(&self) -> &BTreeSet<PackageSpecifier> {
        &self.requested_requirements
    }

    pub fn requested_package_urls(&self) -> &BTreeSet<Url> {
        &self.requested_package_urls
    }

    pub fn target_store(&self) -> &'a TargetStore {
        self.targets
    }

    pub fn import_store(&self) -> &'a ImportStore {
        self.imports
    }

    pub fn has_target(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn num_targets(&self) -> usize {
        self.graph.node_count()
    }

    pub(crate) fn graph(&self) -> &DiGraph<String, ()> {
        &self.graph
    }

    /// Vertices in reverse target-store order.
    pub(crate) fn reverse_target_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.targets.iter().rev().map(|(name, _)| self.index[name])
    }
}
