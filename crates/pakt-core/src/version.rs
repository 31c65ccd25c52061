//! Package versions and the half-open intervals built from them.

use std::fmt;
use std::str::FromStr;

use pakt_util::errors::PaktError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A `major.minor.patch` package version, ordered lexicographically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PackageVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// The next version in the discrete version domain (patch + 1).
    ///
    /// Saturates at `u32::MAX`, where a version is its own successor.
    /// Requirement parsing rejects bounds the resulting interval would exclude.
    pub fn successor(&self) -> Self {
        Self::new(self.major, self.minor, self.patch.saturating_add(1))
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for PackageVersion {
    type Err = PaktError;

    /// Parse a strict `a.b.c` version.
    ///
    /// Pre-release and build metadata are rejected, as are leading zeros on
    /// multi-digit components and components that do not fit in a `u32`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| PaktError::Parse {
            message: format!("invalid package version '{s}': {reason}"),
        };

        let parsed = semver::Version::parse(s).map_err(|e| invalid(&e.to_string()))?;
        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(invalid("pre-release and build metadata are not supported"));
        }

        let component =
            |n: u64| u32::try_from(n).map_err(|_| invalid("component is out of range"));
        Ok(Self::new(
            component(parsed.major)?,
            component(parsed.minor)?,
            component(parsed.patch)?,
        ))
    }
}

impl Serialize for PackageVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A half-open interval `[closed_lower_bound, open_upper_bound)` of versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionInterval {
    pub closed_lower_bound: PackageVersion,
    pub open_upper_bound: PackageVersion,
}

impl VersionInterval {
    pub fn new(closed_lower_bound: PackageVersion, open_upper_bound: PackageVersion) -> Self {
        Self {
            closed_lower_bound,
            open_upper_bound,
        }
    }

    /// The interval containing exactly one version.
    pub fn exact(version: PackageVersion) -> Self {
        Self::new(version, version.successor())
    }

    pub fn is_empty(&self) -> bool {
        self.closed_lower_bound >= self.open_upper_bound
    }

    pub fn contains(&self, version: &PackageVersion) -> bool {
        self.closed_lower_bound <= *version && *version < self.open_upper_bound
    }
}

impl fmt::Display for VersionInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.closed_lower_bound, self.open_upper_bound)
    }
}
