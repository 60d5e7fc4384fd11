//! fpsutil configuration (`.fpsutil` file plus `FPSUTIL_*` environment)
//!
//! Looked up at the `--config` path if given, otherwise in the home
//! directory. No key affects sampling; only logging reads it today.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

const CONFIG_NAME: &str = ".fpsutil";
const ENV_PREFIX: &str = "FPSUTIL_";

/// Settings loaded once at startup and passed to whoever needs them
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log filter directive, e.g. "info" or "fpsutil=debug"
    pub log_level: Option<String>,

    /// File the settings came from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load using the real home directory and process environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let home = dirs::home_dir();
        Self::load_from(explicit, home.as_deref(), |key| env::var(key).ok())
    }

    /// An explicit path must exist. A missing file in `home` just means
    /// defaults.
    pub fn load_from<F>(explicit: Option<&Path>, home: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match home.and_then(find_in) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(lookup);
        Ok(config)
    }

    /// Parse a config file. The format follows the extension: `.yaml`/`.yml`
    /// is YAML, `.json` is JSON, anything else is TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_err = |reason: String| Error::ConfigParse {
            path: path.to_path_buf(),
            reason,
        };

        let mut config: Config = match Format::of(path) {
            Format::Yaml => serde_yaml::from_str(&contents).map_err(|e| parse_err(e.to_string()))?,
            Format::Json => serde_json::from_str(&contents).map_err(|e| parse_err(e.to_string()))?,
            Format::Toml => toml::from_str(&contents).map_err(|e| parse_err(e.to_string()))?,
        };

        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Startup notice naming the file in use, if any
    pub fn banner(&self) -> Option<String> {
        self.source
            .as_ref()
            .map(|path| format!("Using config file: {}", path.display()))
    }

    /// `FPSUTIL_LOG_LEVEL` overrides the file
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(&format!("{ENV_PREFIX}LOG_LEVEL")) {
            if !val.is_empty() {
                self.log_level = Some(val);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml") | Some("yml") => Self::Yaml,
            Some("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// Candidate file names, in lookup order
fn candidates(dir: &Path) -> [PathBuf; 5] {
    [
        dir.join(format!("{CONFIG_NAME}.yaml")),
        dir.join(format!("{CONFIG_NAME}.yml")),
        dir.join(format!("{CONFIG_NAME}.toml")),
        dir.join(format!("{CONFIG_NAME}.json")),
        dir.join(CONFIG_NAME),
    ]
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    candidates(dir).into_iter().find(|p| p.is_file())
}
