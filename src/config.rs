//! File-based configuration.
//!
//! An optional `.sift.toml` in the scan root (or a file passed with
//! `--config`) can replace the filter sets, the model profile and the
//! output path. Every key is optional; missing keys keep the defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::filter::{FilterRules, DEFAULT_BUILD_FILES, DEFAULT_IGNORE, DEFAULT_SUFFIXES};
use crate::tokens::DEFAULT_MODEL;

/// Config file looked up in the scan root.
pub const CONFIG_FILE_NAME: &str = ".sift.toml";

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "project-prompt.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level config structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub tokens: TokensConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[filter]` section; each list replaces the corresponding default set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    pub ignore: Option<Vec<String>>,
    pub suffixes: Option<Vec<String>>,
    pub build_files: Option<Vec<String>>,
}

/// `[tokens]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokensConfig {
    /// Model profile used for counting.
    pub model: Option<String>,
}

/// `[output]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load an explicitly requested config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Loaded config from file");
        Ok(config)
    }

    /// Load `.sift.toml` from the scan root if present.
    ///
    /// A missing file is not an error; a malformed one is logged and
    /// ignored.
    pub fn discover(root: &Path) -> Self {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load config file, using defaults");
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Filter rules with defaults filled in for absent lists.
    pub fn filter_rules(&self) -> FilterRules {
        fn or_default(list: &Option<Vec<String>>, default: &[&str]) -> Vec<String> {
            match list {
                Some(list) => list.clone(),
                None => default.iter().map(|s| s.to_string()).collect(),
            }
        }

        FilterRules::new(
            or_default(&self.filter.ignore, DEFAULT_IGNORE),
            or_default(&self.filter.suffixes, DEFAULT_SUFFIXES),
            or_default(&self.filter.build_files, DEFAULT_BUILD_FILES),
        )
    }

    pub fn model(&self) -> &str {
        self.tokens.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }
}
