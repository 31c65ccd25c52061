//! In-memory [`PackageResolver`] over a fixed set of package descriptors.

use std::collections::{BTreeMap, HashMap};

use pakt_core::package::{PackageId, PackageSpecifier};
use pakt_core::resolver::{
    CollectionDescriptor, CollectionVersion, PackageDescriptor, PackageResolver,
};
use pakt_core::version::PackageVersion;
use pakt_util::errors::PaktError;

/// Resolver backed by a fixed descriptor table. Every version is unpruned.
#[derive(Debug, Clone, Default)]
pub struct StaticPackageResolver {
    packages: HashMap<PackageSpecifier, PackageDescriptor>,
    collections: HashMap<PackageId, CollectionDescriptor>,
}

impl StaticPackageResolver {
    pub fn new(packages: impl IntoIterator<Item = PackageDescriptor>) -> Self {
        Self::from_map(
            packages
                .into_iter()
                .map(|package| (package.specifier(), package))
                .collect(),
        )
    }

    pub fn from_map(packages: HashMap<PackageSpecifier, PackageDescriptor>) -> Self {
        let mut collections: HashMap<PackageId, CollectionDescriptor> = HashMap::new();
        for specifier in packages.keys() {
            collections
                .entry(specifier.id.clone())
                .or_insert_with(|| CollectionDescriptor {
                    id: specifier.id.clone(),
                    versions: BTreeMap::new(),
                })
                .versions
                .insert(specifier.version, CollectionVersion::default());
        }
        Self {
            packages,
            collections,
        }
    }
}

impl PackageResolver for StaticPackageResolver {
    fn get_collection(&self, id: &PackageId) -> miette::Result<CollectionDescriptor> {
        self.collections.get(id).cloned().ok_or_else(|| {
            PaktError::Resolution {
                message: format!("missing collection {id}"),
            }
            .into()
        })
    }

    fn get_package(
        &self,
        id: &PackageId,
        version: &PackageVersion,
    ) -> miette::Result<PackageDescriptor> {
        let specifier = PackageSpecifier::new(id.clone(), *version);
        self.packages.get(&specifier).cloned().ok_or_else(|| {
            PaktError::Resolution {
                message: format!("missing package {specifier}"),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use url::Url;

    fn descriptor(spec: &str) -> PackageDescriptor {
        let specifier: PackageSpecifier = spec.parse().unwrap();
        PackageDescriptor {
            id: specifier.id.clone(),
            version: specifier.version,
            dependencies: BTreeSet::new(),
            url: Url::parse("https://pkgs.example.com/p.pakt").unwrap(),
            uploaded_at: None,
            pruned: false,
        }
    }

    #[test]
    fn collections_are_derived_from_packages() {
        let resolver = StaticPackageResolver::new(vec![
            descriptor("a-1.0.0@example.com"),
            descriptor("a-1.2.0@example.com"),
            descriptor("b-0.1.0@example.com"),
        ]);
        let collection = resolver
            .get_collection(&PackageId::new("a", "example.com"))
            .unwrap();
        assert_eq!(collection.versions.len(), 2);
        assert_eq!(collection.latest_unpruned(), Some(PackageVersion::new(1, 2, 0)));
    }

    #[test]
    fn describe_delegates_to_get_package() {
        let resolver = StaticPackageResolver::new(vec![descriptor("a-1.0.0@example.com")]);
        let described = resolver
            .describe_package_version(&PackageId::new("a", "example.com"), &PackageVersion::new(1, 0, 0))
            .unwrap();
        assert_eq!(described.specifier().to_string(), "a-1.0.0@example.com");
    }

    #[test]
    fn unknown_entries_are_errors() {
        let resolver = StaticPackageResolver::default();
        let id = PackageId::new("a", "example.com");
        let err = resolver.get_collection(&id).unwrap_err();
        assert!(err.to_string().contains("missing collection a@example.com"));
        let err = resolver.get_package(&id, &PackageVersion::new(1, 0, 0)).unwrap_err();
        assert!(err.to_string().contains("missing package a-1.0.0@example.com"));
    }
}
