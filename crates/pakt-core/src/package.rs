//! Package identity: ids, specifiers and their string, URL and filesystem forms.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use pakt_util::errors::PaktError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::version::PackageVersion;

/// URL scheme used for package specifier URLs.
pub const PACKAGE_URL_SCHEME: &str = "pakt-pkg";

/// File extension of packaged archives on disk.
pub const PACKAGE_FILE_SUFFIX: &str = ".pakt";

/// A package identity (`name@domain`), independent of version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageId {
    pub name: String,
    pub domain: String,
}

impl PackageId {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.domain)
    }
}

impl FromStr for PackageId {
    type Err = PaktError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((name, domain)) if !name.is_empty() && !domain.is_empty() => {
                Ok(Self::new(name, domain))
            }
            _ => Err(PaktError::Parse {
                message: format!("invalid package id '{s}', expected 'name@domain'"),
            }),
        }
    }
}

impl Serialize for PackageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A concrete installable package: an id pinned to one version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageSpecifier {
    pub id: PackageId,
    pub version: PackageVersion,
}

impl PackageSpecifier {
    pub fn new(id: PackageId, version: PackageVersion) -> Self {
        Self { id, version }
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn domain(&self) -> &str {
        &self.id.domain
    }

    /// `pakt-pkg://name-1.2.3@domain`
    pub fn to_url(&self) -> Result<Url, PaktError> {
        let raw = format!("{PACKAGE_URL_SCHEME}://{self}");
        Url::parse(&raw).map_err(|e| PaktError::Parse {
            message: format!("cannot express {self} as a url: {e}"),
        })
    }

    pub fn from_url(url: &Url) -> Result<Self, PaktError> {
        if url.scheme() != PACKAGE_URL_SCHEME {
            return Err(PaktError::Parse {
                message: format!("'{url}' is not a {PACKAGE_URL_SCHEME} url"),
            });
        }
        let host = url.host_str().unwrap_or_default();
        Self::from_parts(url.username(), host)
    }

    /// Filesystem-safe name, e.g. `dev.zuri_test-1.2.3.pakt` for `test-1.2.3@zuri.dev`.
    pub fn to_filesystem_name(&self) -> String {
        let reversed: Vec<&str> = self.domain().split('.').rev().collect();
        format!(
            "{}_{}-{}{PACKAGE_FILE_SUFFIX}",
            reversed.join("."),
            self.name(),
            self.version
        )
    }

    pub fn to_filesystem_path(&self, base: &Path) -> PathBuf {
        base.join(self.to_filesystem_name())
    }

    pub fn from_filesystem_name(filename: &str) -> Result<Self, PaktError> {
        let invalid = || PaktError::Parse {
            message: format!("invalid package file name '{filename}'"),
        };

        let stem = filename
            .strip_suffix(PACKAGE_FILE_SUFFIX)
            .ok_or_else(invalid)?;
        let (reversed_domain, name_and_version) = stem.split_once('_').ok_or_else(invalid)?;
        let domain: Vec<&str> = reversed_domain.split('.').rev().collect();
        Self::from_parts(name_and_version, &domain.join("."))
    }

    /// Build a specifier from `name-1.2.3` and a domain.
    fn from_parts(name_and_version: &str, domain: &str) -> Result<Self, PaktError> {
        let invalid = |reason: &str| PaktError::Parse {
            message: format!("invalid package specifier '{name_and_version}@{domain}': {reason}"),
        };

        if domain.is_empty() {
            return Err(invalid("missing domain"));
        }
        let (name, version) = name_and_version
            .rsplit_once('-')
            .ok_or_else(|| invalid("missing version"))?;
        if name.is_empty() {
            return Err(invalid("missing name"));
        }
        let version: PackageVersion = version.parse()?;
        Ok(Self::new(PackageId::new(name, domain), version))
    }
}

impl Ord for PackageSpecifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id
            .domain
            .cmp(&other.id.domain)
            .then_with(|| self.id.name.cmp(&other.id.name))
            .then_with(|| self.version.cmp(&other.version))
    }
}

impl PartialOrd for PackageSpecifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}@{}", self.id.name, self.version, self.id.domain)
    }
}

impl FromStr for PackageSpecifier {
    type Err = PaktError;

    /// Parse `name-1.2.3@domain`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name_and_version, domain) = s.rsplit_once('@').ok_or_else(|| PaktError::Parse {
            message: format!("invalid package specifier '{s}', expected 'name-1.2.3@domain'"),
        })?;
        Self::from_parts(name_and_version, domain)
    }
}

impl Serialize for PackageSpecifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageSpecifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(s: &str) -> PackageSpecifier {
        s.parse().unwrap()
    }

    #[test]
    fn parse_from_string() {
        let s = spec("test-1.2.3@zuri.dev");
        assert_eq!(s.name(), "test");
        assert_eq!(s.domain(), "zuri.dev");
        assert_eq!(s.version, PackageVersion::new(1, 2, 3));
    }

    #[test]
    fn name_may_contain_dashes() {
        let s = spec("my-cool-lib-0.10.0@example.com");
        assert_eq!(s.name(), "my-cool-lib");
        assert_eq!(s.version, PackageVersion::new(0, 10, 0));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("test@zuri.dev".parse::<PackageSpecifier>().is_err());
        assert!("test-1.2.3".parse::<PackageSpecifier>().is_err());
        assert!("-1.2.3@zuri.dev".parse::<PackageSpecifier>().is_err());
        assert!("test-1.2@zuri.dev".parse::<PackageSpecifier>().is_err());
        assert!("test-1.2.3@".parse::<PackageSpecifier>().is_err());
    }

    #[test]
    fn string_roundtrip() {
        let s = spec("test-1.2.3@zuri.dev");
        assert_eq!(spec(&s.to_string()), s);
    }

    #[test]
    fn url_form() {
        let s = spec("test-1.2.3@zuri.dev");
        let url = s.to_url().unwrap();
        assert_eq!(url.scheme(), "pakt-pkg");
        assert_eq!(url.username(), "test-1.2.3");
        assert_eq!(url.host_str(), Some("zuri.dev"));
        assert_eq!(PackageSpecifier::from_url(&url).unwrap(), s);
    }

    #[test]
    fn from_url_rejects_other_schemes() {
        let url = Url::parse("https://test-1.2.3@zuri.dev").unwrap();
        assert!(PackageSpecifier::from_url(&url).is_err());
    }

    #[test]
    fn filesystem_name_reverses_domain() {
        let s = spec("test-1.2.3@zuri.dev");
        assert_eq!(s.to_filesystem_name(), "dev.zuri_test-1.2.3.pakt");
    }

    #[test]
    fn filesystem_roundtrip() {
        let s = spec("under_score-2.0.1@pkgs.corp.example");
        let path = s.to_filesystem_path(Path::new("/var/cache/pakt"));
        let filename = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(PackageSpecifier::from_filesystem_name(filename).unwrap(), s);
    }

    #[test]
    fn from_filesystem_name_requires_suffix() {
        assert!(PackageSpecifier::from_filesystem_name("dev.zuri_test-1.2.3.zip").is_err());
    }

    #[test]
    fn specifier_ordering_is_domain_name_version() {
        let a = spec("zzz-1.0.0@a.dev");
        let b = spec("aaa-1.0.0@b.dev");
        let c = spec("aaa-2.0.0@b.dev");
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn package_id_roundtrip() {
        let id: PackageId = "json@example.com".parse().unwrap();
        assert_eq!(id, PackageId::new("json", "example.com"));
        assert_eq!(id.to_string(), "json@example.com");
        assert!("json".parse::<PackageId>().is_err());
        assert!("@example.com".parse::<PackageId>().is_err());
    }
}
