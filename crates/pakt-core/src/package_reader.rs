//! Reader for the manifest of a package available on the local filesystem.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::package::{PackageId, PackageSpecifier};
use crate::version::PackageVersion;

/// File name of a package's own manifest inside its directory.
pub const PACKAGE_MANIFEST_FILE: &str = "package.toml";

#[derive(Debug, Clone, Deserialize)]
struct PackageManifest {
    package: PackageSection,
    #[serde(default)]
    requirements: BTreeMap<PackageId, PackageVersion>,
}

#[derive(Debug, Clone, Deserialize)]
struct PackageSection {
    specifier: PackageSpecifier,
}

/// Opened package manifest.
///
/// `path` may point at the manifest file itself or at the package directory
/// containing `package.toml`.
#[derive(Debug, Clone)]
pub struct PackageReader {
    path: PathBuf,
    manifest: PackageManifest,
}

impl PackageReader {
    pub fn open(path: &Path) -> miette::Result<Self> {
        let manifest_path = if path.is_dir() {
            path.join(PACKAGE_MANIFEST_FILE)
        } else {
            path.to_path_buf()
        };

        tracing::debug!("reading package manifest {}", manifest_path.display());
        let content = std::fs::read_to_string(&manifest_path).map_err(|e| {
            pakt_util::errors::PaktError::Resolution {
                message: format!("Failed to read package manifest {}: {e}", manifest_path.display()),
            }
        })?;
        let manifest: PackageManifest = toml::from_str(&content).map_err(|e| {
            pakt_util::errors::PaktError::Resolution {
                message: format!(
                    "Failed to parse package manifest {}: {e}",
                    manifest_path.display()
                ),
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            manifest,
        })
    }

    /// Path the reader was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_package_specifier(&self) -> PackageSpecifier {
        self.manifest.package.specifier.clone()
    }

    /// Declared dependencies, each pinned to a minimum version.
    pub fn read_requirements_map(&self) -> impl Iterator<Item = (&PackageId, &PackageVersion)> {
        self.manifest.requirements.iter()
    }
}
