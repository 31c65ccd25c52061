//! Target build graphs with cycle detection, and package dependency selection:
//! a dependency set of per-package version intervals driven by a selector that
//! consults a package resolver.

pub mod build_graph;
pub mod cycle;
pub mod dependency_set;
pub mod interval_map;
pub mod selector;
pub mod static_resolver;
