//! Cycle detection over a [`BuildGraph`].

use std::collections::BTreeSet;

use petgraph::visit::{depth_first_search, DfsEvent};

use crate::build_graph::BuildGraph;

/// Every back edge found by a full depth-first search of a build graph.
///
/// Each record is the DFS path from the traversal root to the offending
/// target, closed with the back edge's destination. The same cycle reached
/// along different paths is recorded once per path.
#[derive(Debug, Clone, Default)]
pub struct TargetCycleDetector {
    cycles: BTreeSet<Vec<String>>,
}

impl TargetCycleDetector {
    pub fn new(build_graph: &BuildGraph<'_>) -> Self {
        let graph = build_graph.graph();
        let mut path: Vec<String> = Vec::new();
        let mut cycles = BTreeSet::new();

        depth_first_search(graph, build_graph.reverse_target_nodes(), |event| match event {
            DfsEvent::Discover(idx, _) => path.push(graph[idx].clone()),
            DfsEvent::BackEdge(_, to) => {
                let mut cycle = path.clone();
                cycle.push(graph[to].clone());
                tracing::debug!("found cycle: {}", cycle.join(" -> "));
                cycles.insert(cycle);
            }
            DfsEvent::Finish(_, _) => {
                path.pop();
            }
            _ => {}
        });

        Self { cycles }
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    pub fn num_cycles(&self) -> usize {
        self.cycles.len()
    }

    pub fn cycles(&self) -> impl Iterator<Item = &[String]> {
        self.cycles.iter().map(Vec::as_slice)
    }
}
