//! Version requirements and their interval semantics.

use std::fmt;
use std::str::FromStr;

use pakt_util::errors::PaktError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::version::{PackageVersion, VersionInterval};

/// A constraint on acceptable versions of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionRequirement {
    /// Exactly this version: `=1.2.3` (or a bare `1.2.3`).
    Exact(PackageVersion),
    /// Inclusive range: `1.2.3-1.4.0`.
    Range(PackageVersion, PackageVersion),
    /// Same major and minor, at least this patch: `~1.2.3`.
    Tilde(PackageVersion),
    /// Same major, at least this version: `^1.2.3`.
    Caret(PackageVersion),
}

impl VersionRequirement {
    /// The half-open interval of versions accepted by this requirement.
    ///
    /// A range's upper bound is inclusive, so its open bound is the successor
    /// of the declared upper version.
    pub fn interval(&self) -> VersionInterval {
        match *self {
            Self::Exact(v) => VersionInterval::exact(v),
            Self::Range(lo, hi) => VersionInterval::new(lo, hi.successor()),
            Self::Tilde(v) => VersionInterval::new(
                v,
                PackageVersion::new(v.major, v.minor.saturating_add(1), 0),
            ),
            Self::Caret(v) => {
                VersionInterval::new(v, PackageVersion::new(v.major.saturating_add(1), 0, 0))
            }
        }
    }

    pub fn satisfied_by(&self, version: &PackageVersion) -> bool {
        self.interval().contains(version)
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "={v}"),
            Self::Range(lo, hi) => write!(f, "{lo}-{hi}"),
            Self::Tilde(v) => write!(f, "~{v}"),
            Self::Caret(v) => write!(f, "^{v}"),
        }
    }
}

impl FromStr for VersionRequirement {
    type Err = PaktError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let requirement = Self::parse_unchecked(s)?;
        let declared = match requirement {
            Self::Range(_, hi) => hi,
            Self::Exact(v) | Self::Tilde(v) | Self::Caret(v) => v,
        };
        if !requirement.satisfied_by(&declared) {
            return Err(PaktError::Parse {
                message: format!(
                    "invalid requirement '{s}': version bound exceeds the supported range"
                ),
            });
        }
        Ok(requirement)
    }
}

impl VersionRequirement {
    fn parse_unchecked(s: &str) -> Result<Self, PaktError> {
        if s.is_empty() {
            return Err(PaktError::Parse {
                message: "empty requirement string".to_string(),
            });
        }

        if let Some(rest) = s.strip_prefix('=') {
            return Ok(Self::Exact(rest.trim().parse()?));
        }
        if let Some(rest) = s.strip_prefix('~') {
            return Ok(Self::Tilde(rest.trim().parse()?));
        }
        if let Some(rest) = s.strip_prefix('^') {
            return Ok(Self::Caret(rest.trim().parse()?));
        }
        if let Some((lo, hi)) = s.split_once('-') {
            let lo: PackageVersion = lo.trim().parse()?;
            let hi: PackageVersion = hi.trim().parse()?;
            if hi < lo {
                return Err(PaktError::Parse {
                    message: format!("invalid requirement '{s}': upper bound is below lower bound"),
                });
            }
            return Ok(Self::Range(lo, hi));
        }
        Ok(Self::Exact(s.parse()?))
    }
}

impl Serialize for VersionRequirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionRequirement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
