use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::package::PackageSpecifier;

/// Discriminant of an [`ImportEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportType {
    Target,
    Requirement,
    Package,
}

/// A named import from `[imports.<name>]`.
///
/// The `type` key selects the variant; each variant carries exactly one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImportEntry {
    /// Another target in the same project.
    Target {
        #[serde(rename = "target-name")]
        target_name: String,
    },
    /// An external package pinned by specifier.
    Requirement {
        #[serde(rename = "requirement-spec")]
        requirement_spec: PackageSpecifier,
    },
    /// An external package fetched from an absolute URL.
    Package {
        #[serde(rename = "package-url")]
        package_url: Url,
    },
}

impl ImportEntry {
    pub fn import_type(&self) -> ImportType {
        match self {
            Self::Target { .. } => ImportType::Target,
            Self::Requirement { .. } => ImportType::Requirement,
            Self::Package { .. } => ImportType::Package,
        }
    }
}

/// Name-keyed collection of every import in a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportStore {
    imports: BTreeMap<String, ImportEntry>,
}

impl ImportStore {
    pub fn new(imports: BTreeMap<String, ImportEntry>) -> Self {
        Self { imports }
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: ImportEntry) {
        self.imports.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&ImportEntry> {
        self.imports.get(name)
    }

    pub fn has_import(&self, name: &str) -> bool {
        self.imports.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ImportEntry)> {
        self.imports.iter()
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }
}

impl FromIterator<(String, ImportEntry)> for ImportStore {
    fn from_iter<T: IntoIterator<Item = (String, ImportEntry)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
