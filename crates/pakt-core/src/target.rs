use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::package::PackageSpecifier;
use crate::version::PackageVersion;

/// Kind of buildable unit a target produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    Program,
    Library,
    Archive,
}

/// A buildable target from `[targets.<name>]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TargetEntry {
    #[serde(rename = "type")]
    pub target_type: TargetType,

    pub specifier: PackageSpecifier,

    #[serde(default)]
    pub version: Option<PackageVersion>,

    /// Names of targets that must be built before this one.
    #[serde(default)]
    pub depends: BTreeSet<String>,

    /// Names of imports (see `[imports]`) this target references.
    #[serde(default)]
    pub imports: BTreeSet<String>,

    #[serde(default)]
    pub program_main: Option<String>,

    #[serde(default)]
    pub program_modules: Vec<String>,

    #[serde(default)]
    pub library_modules: Vec<String>,

    #[serde(default)]
    pub archive_modules: Vec<String>,
}

impl TargetEntry {
    pub fn new(target_type: TargetType, specifier: PackageSpecifier) -> Self {
        Self {
            target_type,
            specifier,
            version: None,
            depends: BTreeSet::new(),
            imports: BTreeSet::new(),
            program_main: None,
            program_modules: Vec::new(),
            library_modules: Vec::new(),
            archive_modules: Vec::new(),
        }
    }

    pub fn with_depends<I, S>(mut self, depends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends.extend(depends.into_iter().map(Into::into));
        self
    }

    pub fn with_imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports.extend(imports.into_iter().map(Into::into));
        self
    }

    /// The module list relevant to this target's type.
    pub fn modules(&self) -> &[String] {
        match self.target_type {
            TargetType::Program => &self.program_modules,
            TargetType::Library => &self.library_modules,
            TargetType::Archive => &self.archive_modules,
        }
    }
}

/// Name-keyed collection of every target in a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetStore {
    targets: BTreeMap<String, TargetEntry>,
}

impl TargetStore {
    pub fn new(targets: BTreeMap<String, TargetEntry>) -> Self {
        Self { targets }
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: TargetEntry) {
        self.targets.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&TargetEntry> {
        self.targets.get(name)
    }

    pub fn has_target(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// Targets in name order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&String, &TargetEntry)> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl FromIterator<(String, TargetEntry)> for TargetStore {
    fn from_iter<T: IntoIterator<Item = (String, TargetEntry)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
