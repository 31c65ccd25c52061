//! The package resolver seam: "which versions exist" and "what does version X need".

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use url::Url;

use crate::package::{PackageId, PackageSpecifier};
use crate::version::PackageVersion;

/// Metadata about one published version within a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionVersion {
    pub uploaded_at: Option<DateTime<Utc>>,
    pub pruned: bool,
}

/// Every published version of one package id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDescriptor {
    pub id: PackageId,
    pub versions: BTreeMap<PackageVersion, CollectionVersion>,
}

impl CollectionDescriptor {
    /// The highest version that has not been pruned.
    pub fn latest_unpruned(&self) -> Option<PackageVersion> {
        self.versions
            .iter()
            .rev()
            .find(|(_, entry)| !entry.pruned)
            .map(|(version, _)| *version)
    }
}

/// One concrete package version: its dependencies and where to download it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub id: PackageId,
    pub version: PackageVersion,
    pub dependencies: BTreeSet<PackageSpecifier>,
    pub url: Url,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub pruned: bool,
}

impl PackageDescriptor {
    pub fn specifier(&self) -> PackageSpecifier {
        PackageSpecifier::new(self.id.clone(), self.version)
    }
}

/// Summary of a collection listed in a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryCollection {
    pub description: Option<String>,
}

/// Every collection hosted for one domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    pub collections: BTreeMap<PackageId, RepositoryCollection>,
}

/// Source of package metadata consulted by the dependency selector.
///
/// Implementations are synchronous; any network or filesystem access they
/// perform blocks the caller.
pub trait PackageResolver {
    /// All published versions of `id`.
    fn get_collection(&self, id: &PackageId) -> miette::Result<CollectionDescriptor>;

    /// Dependencies and download URL of one concrete version.
    fn get_package(
        &self,
        id: &PackageId,
        version: &PackageVersion,
    ) -> miette::Result<PackageDescriptor>;

    /// Alias of [`PackageResolver::get_package`] for resolvers that only
    /// describe single versions.
    fn describe_package_version(
        &self,
        id: &PackageId,
        version: &PackageVersion,
    ) -> miette::Result<PackageDescriptor> {
        self.get_package(id, version)
    }
}

impl<R: PackageResolver + ?Sized> PackageResolver for &R {
    fn get_collection(&self, id: &PackageId) -> miette::Result<CollectionDescriptor> {
        (**self).get_collection(id)
    }

    fn get_package(
        &self,
        id: &PackageId,
        version: &PackageVersion,
    ) -> miette::Result<PackageDescriptor> {
        (**self).get_package(id, version)
    }
}
