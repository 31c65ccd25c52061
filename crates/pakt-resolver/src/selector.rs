//! Dependency selection: drives a [`DependencySet`] from a worklist of direct
//! and transitive dependency requests, consulting a [`PackageResolver`].
//!
//! Every package id is pinned to the highest version requested for it so far.
//! A version's own dependencies are expanded exactly when it becomes the pin.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};

use pakt_core::dependency::PackageDependency;
use pakt_core::package::{PackageId, PackageSpecifier};
use pakt_core::package_reader::PackageReader;
use pakt_core::requirement::VersionRequirement;
use pakt_core::resolver::PackageResolver;
use pakt_core::version::PackageVersion;
use pakt_util::errors::PaktError;
use url::Url;

use crate::dependency_set::DependencySet;

/// One resolved, pinned, installable package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Id of the request that produced this selection.
    pub id: String,
    pub specifier: PackageSpecifier,
    pub url: Url,
    pub shortcut: Option<String>,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.specifier, self.url)?;
        if let Some(shortcut) = &self.shortcut {
            write!(f, " as '{shortcut}'")?;
        }
        Ok(())
    }
}

/// Entry in the selection worklist.
#[derive(Debug, Clone)]
enum PendingSelection {
    /// Latest unpruned version of a package.
    Id {
        selection_id: String,
        package_id: PackageId,
        shortcut: Option<String>,
    },
    /// Exactly this version.
    Specifier {
        selection_id: String,
        specifier: PackageSpecifier,
        shortcut: Option<String>,
    },
    /// Package manifest found at a local path.
    Path {
        selection_id: String,
        path: PathBuf,
        shortcut: Option<String>,
    },
    /// A committed package declares a dependency.
    Transitive {
        selection_id: String,
        parent: PackageSpecifier,
        dependency: PackageSpecifier,
    },
}

/// Resolves direct dependency requests into an ordered list of [`Selection`]s.
pub struct DependencySelector<R> {
    resolver: R,
    dependencies: DependencySet,
    pending: VecDeque<PendingSelection>,
    /// Highest version requested per package id.
    pins: HashMap<PackageId, PackageVersion>,
    /// Source URL (and originating request) of every expanded version.
    package_urls: HashMap<PackageSpecifier, (String, Url)>,
    /// Request id of each direct dependency.
    direct_ids: HashMap<PackageId, String>,
    shortcuts: HashMap<PackageId, String>,
    next_selection: u64,
}

impl<R: PackageResolver> DependencySelector<R> {
    pub fn new(resolver: R) -> Self {
        Self::with_dependency_set(resolver, DependencySet::new())
    }

    /// Use a pre-seeded dependency set, e.g. one whose root has a package id.
    pub fn with_dependency_set(resolver: R, dependencies: DependencySet) -> Self {
        Self {
            resolver,
            dependencies,
            pending: VecDeque::new(),
            pins: HashMap::new(),
            package_urls: HashMap::new(),
            direct_ids: HashMap::new(),
            shortcuts: HashMap::new(),
            next_selection: 0,
        }
    }

    fn next_selection_id(&mut self) -> String {
        self.next_selection += 1;
        format!("selection-{}", self.next_selection)
    }

    /// Depend on the latest unpruned version of `package_id`.
    pub fn add_direct_dependency_id(&mut self, package_id: &PackageId, shortcut: Option<&str>) -> String {
        let selection_id = self.next_selection_id();
        self.pending.push_back(PendingSelection::Id {
            selection_id: selection_id.clone(),
            package_id: package_id.clone(),
            shortcut: shortcut.map(str::to_string),
        });
        selection_id
    }

    /// Depend on exactly `specifier`.
    pub fn add_direct_dependency_specifier(
        &mut self,
        specifier: &PackageSpecifier,
        shortcut: Option<&str>,
    ) -> String {
        let selection_id = self.next_selection_id();
        self.pending.push_back(PendingSelection::Specifier {
            selection_id: selection_id.clone(),
            specifier: specifier.clone(),
            shortcut: shortcut.map(str::to_string),
        });
        selection_id
    }

    /// Depend on the package whose manifest lives at `path`.
    pub fn add_direct_dependency_path(&mut self, path: &Path, shortcut: Option<&str>) -> String {
        let selection_id = self.next_selection_id();
        self.pending.push_back(PendingSelection::Path {
            selection_id: selection_id.clone(),
            path: path.to_path_buf(),
            shortcut: shortcut.map(str::to_string),
        });
        selection_id
    }

    /// Drain the worklist, committing versions and discovering transitive
    /// dependencies breadth-first.
    pub fn select_dependencies(&mut self) -> miette::Result<()> {
        while let Some(pending) = self.pending.pop_front() {
            match pending {
                PendingSelection::Id {
                    selection_id,
                    package_id,
                    shortcut,
                } => self.depend_on_latest_version(selection_id, &package_id, shortcut)?,
                PendingSelection::Specifier {
                    selection_id,
                    specifier,
                    shortcut,
                } => self.depend_on_specified_version(selection_id, specifier, shortcut)?,
                PendingSelection::Path {
                    selection_id,
                    path,
                    shortcut,
                } => self.depend_on_specified_path(selection_id, &path, shortcut)?,
                PendingSelection::Transitive {
                    selection_id,
                    parent,
                    dependency,
                } => self.depend_transitively(selection_id, &parent, dependency)?,
            }
        }
        Ok(())
    }

    fn depend_on_latest_version(
        &mut self,
        selection_id: String,
        package_id: &PackageId,
        shortcut: Option<String>,
    ) -> miette::Result<()> {
        let collection = self.resolver.get_collection(package_id)?;
        let latest = collection.latest_unpruned().ok_or_else(|| PaktError::Resolution {
            message: format!("no usable version found for '{package_id}'"),
        })?;
        tracing::debug!("latest usable version of {package_id} is {latest}");
        let specifier = PackageSpecifier::new(package_id.clone(), latest);
        self.depend_on_specified_version(selection_id, specifier, shortcut)
    }

    fn depend_on_specified_version(
        &mut self,
        selection_id: String,
        specifier: PackageSpecifier,
        shortcut: Option<String>,
    ) -> miette::Result<()> {
        let package = self.resolver.get_package(&specifier.id, &specifier.version)?;
        let requested: Vec<PackageSpecifier> = package.dependencies.into_iter().collect();
        self.commit_direct(selection_id, specifier, shortcut, package.url, requested)
    }

    fn depend_on_specified_path(
        &mut self,
        selection_id: String,
        path: &Path,
        shortcut: Option<String>,
    ) -> miette::Result<()> {
        let reader = PackageReader::open(path)?;
        let specifier = reader.read_package_specifier();
        let requested: Vec<PackageSpecifier> = reader
            .read_requirements_map()
            .map(|(id, version)| PackageSpecifier::new(id.clone(), *version))
            .collect();

        let absolute = std::fs::canonicalize(path).map_err(PaktError::from)?;
        let url = Url::from_file_path(&absolute).map_err(|()| PaktError::Parse {
            message: format!("cannot express {} as a file url", absolute.display()),
        })?;
        self.commit_direct(selection_id, specifier, shortcut, url, requested)
    }

    fn commit_direct(
        &mut self,
        selection_id: String,
        specifier: PackageSpecifier,
        shortcut: Option<String>,
        url: Url,
        requested: Vec<PackageSpecifier>,
    ) -> miette::Result<()> {
        let dependency = PackageDependency::new(&specifier.id)
            .with_requirement(VersionRequirement::Exact(specifier.version));
        self.dependencies.add_direct_dependency(&dependency)?;

        if let Some(shortcut) = shortcut {
            self.shortcuts.insert(specifier.id.clone(), shortcut);
        }
        self.direct_ids
            .insert(specifier.id.clone(), selection_id.clone());

        if self.pin(&specifier) {
            tracing::info!("selected {specifier}");
            self.expand(selection_id, specifier, url, requested);
        } else {
            tracing::debug!("direct dependency {specifier} is superseded by a higher pinned version");
        }
        Ok(())
    }

    fn depend_transitively(
        &mut self,
        selection_id: String,
        parent: &PackageSpecifier,
        dependency: PackageSpecifier,
    ) -> miette::Result<()> {
        if !self.dependencies.contains_dependency(&parent.id, &dependency.id) {
            let declared = PackageDependency::new(&dependency.id)
                .with_requirement(VersionRequirement::Caret(dependency.version));
            self.dependencies.add_dependency(&parent.id, &declared)?;
        }

        if !self.pin(&dependency) {
            tracing::debug!("{parent} requires {dependency}, already satisfied");
            return Ok(());
        }

        tracing::info!("selected {dependency} (required by {parent})");
        let package = self.resolver.get_package(&dependency.id, &dependency.version)?;
        let requested: Vec<PackageSpecifier> = package.dependencies.into_iter().collect();
        self.expand(selection_id, dependency, package.url, requested);
        Ok(())
    }

    /// Raise the pin for `specifier.id` to `specifier.version`.
    ///
    /// Returns `true` if the pin was set or advanced.
    fn pin(&mut self, specifier: &PackageSpecifier) -> bool {
        match self.pins.get(&specifier.id) {
            Some(pinned) if *pinned >= specifier.version => false,
            _ => {
                self.pins.insert(specifier.id.clone(), specifier.version);
                true
            }
        }
    }

    /// Record where `specifier` comes from and queue its own dependencies.
    fn expand(
        &mut self,
        selection_id: String,
        specifier: PackageSpecifier,
        url: Url,
        requested: Vec<PackageSpecifier>,
    ) {
        for dependency in requested {
            let transitive_id = self.next_selection_id();
            self.pending.push_back(PendingSelection::Transitive {
                selection_id: transitive_id,
                parent: specifier.clone(),
                dependency,
            });
        }
        self.package_urls.insert(specifier, (selection_id, url));
    }

    /// Select all dependencies and return them in install order (dependencies
    /// before dependents).
    pub fn calculate_dependency_order(&mut self) -> miette::Result<Vec<Selection>> {
        self.select_dependencies()?;

        let resolution_order = self.dependencies.calculate_resolution_order()?;
        let mut selections = Vec::with_capacity(resolution_order.len());
        for resolved in resolution_order {
            let version = *self.pins.get(&resolved.id).ok_or_else(|| PaktError::Graph {
                message: format!("no version was pinned for {}", resolved.id),
            })?;
            let specifier = PackageSpecifier::new(resolved.id.clone(), version);

            if !resolved
                .valid_intervals
                .iter()
                .any(|interval| interval.contains(&version))
            {
                tracing::warn!(
                    "selected {specifier} does not satisfy every package that requires {}",
                    resolved.id
                );
            }

            let (committed_id, url) =
                self.package_urls.get(&specifier).ok_or_else(|| PaktError::Graph {
                    message: format!("missing package url for {specifier}"),
                })?;
            let id = self
                .direct_ids
                .get(&resolved.id)
                .unwrap_or(committed_id)
                .clone();

            selections.push(Selection {
                id,
                specifier,
                url: url.clone(),
                shortcut: self.shortcuts.get(&resolved.id).cloned(),
            });
        }
        Ok(selections)
    }
}
