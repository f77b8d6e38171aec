//! Session configuration, persisted as TOML.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gloss::Similarity;
use crate::mapping::{MapMode, MappingConfig};

/// Errors from reading or writing the configuration file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(concepticon::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}")]
    #[diagnostic(
        code(concepticon::config::parse),
        help("Check the TOML syntax. Only `repos` is required; see `CatalogConfig` for the other keys.")
    )]
    ConfigParse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(concepticon::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    ConfigWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Where the catalogue lives and how to search it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Root of a concepticon-data checkout.
    pub repos: PathBuf,
    /// Default language of glosses to map.
    #[serde(default = "default_language")]
    pub language: String,
    /// Worst similarity accepted as a match (1-10).
    #[serde(default = "default_similarity_level")]
    pub similarity_level: u8,
    /// Relation hops searched when comparing lists.
    #[serde(default = "default_search_depth")]
    pub search_depth: usize,
    /// Score every pair instead of using the token buckets.
    #[serde(default)]
    pub full_search: bool,
}

fn default_language() -> String {
    "en".into()
}
fn default_similarity_level() -> u8 {
    Similarity::DEFAULT_LEVEL.get()
}
fn default_search_depth() -> usize {
    crate::compare::DEFAULT_SEARCH_DEPTH
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::with_repos(".")
    }
}

impl CatalogConfig {
    /// A config for the given repository, other fields default.
    pub fn with_repos(repos: impl Into<PathBuf>) -> Self {
        Self {
            repos: repos.into(),
            language: default_language(),
            similarity_level: default_similarity_level(),
            search_depth: default_search_depth(),
            full_search: false,
        }
    }

    /// Mapper settings derived from this config.
    pub fn mapping_config(&self) -> MappingConfig {
        MappingConfig {
            mode: if self.full_search {
                MapMode::Exhaustive
            } else {
                MapMode::Approximate
            },
            similarity_level: Similarity::new(self.similarity_level),
            language: self.language.clone(),
        }
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigRead {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ConfigWrite {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::ConfigWrite {
            path: path.display().to_string(),
            source: e,
        })
    }
}
