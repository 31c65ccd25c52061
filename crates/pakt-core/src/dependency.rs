use std::collections::BTreeSet;
use std::fmt;

use crate::package::PackageId;
use crate::requirement::VersionRequirement;
use crate::version::VersionInterval;

/// A dependency on a named package, with the union of acceptable version ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDependency {
    pub name: String,
    pub domain: String,
    pub requirements: BTreeSet<VersionRequirement>,
}

impl PackageDependency {
    pub fn new(id: &PackageId) -> Self {
        Self {
            name: id.name.clone(),
            domain: id.domain.clone(),
            requirements: BTreeSet::new(),
        }
    }

    /// Builder-style helper that adds one requirement.
    pub fn with_requirement(mut self, requirement: VersionRequirement) -> Self {
        self.requirements.insert(requirement);
        self
    }

    pub fn add_requirement(&mut self, requirement: VersionRequirement) {
        self.requirements.insert(requirement);
    }

    /// The `PackageId` this dependency refers to.
    pub fn id(&self) -> PackageId {
        PackageId::new(&self.name, &self.domain)
    }

    /// Intervals for every declared requirement, in requirement order.
    pub fn intervals(&self) -> impl Iterator<Item = VersionInterval> + '_ {
        self.requirements.iter().map(VersionRequirement::interval)
    }
}

impl fmt::Display for PackageDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.domain)?;
        let reqs: Vec<String> = self.requirements.iter().map(|r| r.to_string()).collect();
        if !reqs.is_empty() {
            write!(f, " ({})", reqs.join(", "))?;
        }
        Ok(())
    }
}
