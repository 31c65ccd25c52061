use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration loaded from `~/.pakt/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Package resolver settings from `[resolver]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Location document consulted when a domain has no well-known location.
    #[serde(default, rename = "default-location")]
    pub default_location: Option<String>,
    #[serde(default = "default_timeout_secs", rename = "timeout-secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_location: None,
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

/// Download cache configuration from `[cache]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> String {
    "~/.pakt/downloads".to_string()
}

impl CacheConfig {
    /// The cache directory with a leading `~` expanded to the home directory.
    pub fn resolved_dir(&self) -> PathBuf {
        match self.dir.strip_prefix("~/") {
            Some(rest) => home_dir().join(rest),
            None => PathBuf::from(&self.dir),
        }
    }
}

impl GlobalConfig {
    /// Load the global configuration from `~/.pakt/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load from an explicit path, or return defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if path.is_file() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                pakt_util::errors::PaktError::Config {
                    message: format!("Failed to read global config: {e}"),
                }
            })?;
            toml::from_str(&content).map_err(|e| {
                pakt_util::errors::PaktError::Config {
                    message: format!("Failed to parse global config: {e}"),
                }
                .into()
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
}

/// Returns the path to the Pakt data directory (`~/.pakt/`).
pub fn dirs_path() -> PathBuf {
    home_dir().join(".pakt")
}
