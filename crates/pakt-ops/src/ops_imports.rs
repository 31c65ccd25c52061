//! Operation: turn a project's package imports into a resolved package order.
//!
//! Requirement imports become direct dependencies on a specific version.
//! Package imports are downloaded first and then depended on through their
//! local manifest. The selector resolves everything transitively.

use std::collections::{BTreeMap, HashMap};

use pakt_core::fetcher::PackageFetcher;
use pakt_core::import::ImportEntry;
use pakt_core::resolver::PackageResolver;
use pakt_resolver::build_graph::BuildGraph;
use pakt_resolver::selector::{DependencySelector, Selection};
use pakt_util::errors::PaktError;
use url::Url;

/// Result of [`ImportSolver::solve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    /// Every selected package, dependencies before dependents.
    pub order: Vec<Selection>,
    /// Requirement import name to the package URL of its selection.
    pub shortcuts: BTreeMap<String, Url>,
    /// Package import name to the package URL of its selection.
    pub import_bases: BTreeMap<String, Url>,
}

/// Collects a project's imports and resolves them into an [`ImportPlan`].
pub struct ImportSolver<R, F> {
    selector: DependencySelector<R>,
    fetcher: F,
    /// Package import name to the URL it is fetched from.
    package_urls: BTreeMap<String, Url>,
}

impl<R: PackageResolver, F: PackageFetcher> ImportSolver<R, F> {
    pub fn new(resolver: R, fetcher: F) -> Self {
        Self {
            selector: DependencySelector::new(resolver),
            fetcher,
            package_urls: BTreeMap::new(),
        }
    }

    pub fn add_import(&mut self, name: &str, entry: &ImportEntry) -> miette::Result<()> {
        match entry {
            ImportEntry::Requirement { requirement_spec } => {
                self.selector
                    .add_direct_dependency_specifier(requirement_spec, Some(name));
            }
            ImportEntry::Package { package_url } => {
                if package_url.cannot_be_a_base() {
                    return Err(PaktError::Config {
                        message: format!(
                            "cannot import '{name}'; package must refer to an absolute url"
                        ),
                    }
                    .into());
                }
                if self.package_urls.contains_key(name) {
                    return Err(PaktError::Config {
                        message: format!("import already defined for '{name}'"),
                    }
                    .into());
                }
                self.package_urls.insert(name.to_string(), package_url.clone());
            }
            ImportEntry::Target { target_name } => {
                tracing::debug!("import '{name}' refers to target '{target_name}', nothing to solve");
            }
        }
        Ok(())
    }

    /// Add every import of the graph's project.
    pub fn add_build_graph_imports(&mut self, build_graph: &BuildGraph<'_>) -> miette::Result<()> {
        for (name, entry) in build_graph.import_store().iter() {
            self.add_import(name, entry)?;
        }
        Ok(())
    }

    pub fn solve(mut self) -> miette::Result<ImportPlan> {
        let mut fetched = Vec::with_capacity(self.package_urls.len());
        let mut failed = false;
        for (name, url) in &self.package_urls {
            match self.fetcher.fetch(url) {
                Ok(path) => {
                    tracing::debug!("import '{name}' fetched to {}", path.display());
                    fetched.push((name.clone(), path));
                }
                Err(e) => {
                    tracing::error!("failed to download {url} for import '{name}': {e}");
                    failed = true;
                }
            }
        }
        if failed {
            return Err(PaktError::Download {
                message: "not all requested packages could be downloaded".to_string(),
            }
            .into());
        }

        let mut selection_imports: HashMap<String, String> = HashMap::new();
        for (name, path) in fetched {
            let selection_id = self.selector.add_direct_dependency_path(&path, None);
            selection_imports.insert(selection_id, name);
        }

        let order = self.selector.calculate_dependency_order()?;

        let mut shortcuts = BTreeMap::new();
        let mut import_bases = BTreeMap::new();
        for selection in &order {
            if let Some(shortcut) = &selection.shortcut {
                shortcuts.insert(shortcut.clone(), selection.specifier.to_url()?);
                tracing::debug!("added shortcut '{shortcut}' for {}", selection.specifier);
            } else if let Some(name) = selection_imports.get(&selection.id) {
                import_bases.insert(name.clone(), selection.specifier.to_url()?);
                tracing::debug!("import '{name}' is based on {}", selection.specifier);
            }
        }

        tracing::info!("resolved {} package(s) for import", order.len());
        Ok(ImportPlan {
            order,
            shortcuts,
            import_bases,
        })
    }
}
