use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::import::ImportStore;
use crate::target::TargetStore;

/// File name of a project manifest.
pub const MANIFEST_FILE: &str = "pakt.toml";

/// The parsed representation of a `pakt.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub project: Option<ProjectMetadata>,

    #[serde(default)]
    pub targets: TargetStore,

    #[serde(default)]
    pub imports: ImportStore,
}

/// Project identity from the optional `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Manifest {
    /// Load and parse a `pakt.toml` file from the given path.
    ///
    /// A directory is accepted too, in which case its `pakt.toml` is read.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let path = if path.is_dir() {
            path.join(MANIFEST_FILE)
        } else {
            path.to_path_buf()
        };
        let content = std::fs::read_to_string(&path).map_err(|e| {
            pakt_util::errors::PaktError::Config {
                message: format!("Failed to read {}: {e}", path.display()),
            }
        })?;

        Self::from_str(&content)
    }

    /// Parse a `pakt.toml` from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            pakt_util::errors::PaktError::Config {
                message: format!("Failed to parse {MANIFEST_FILE}: {e}"),
            }
            .into()
        })
    }
}
