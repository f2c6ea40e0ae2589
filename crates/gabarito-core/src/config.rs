//! Configuration loading.
//!
//! `gabarito.toml` declares where the flat files live and the default
//! classification metadata for sources that do not embed their own.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One response-table source: a file path plus the classification defaults
/// applied to rows that do not carry the corresponding columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the delimited response table.
    pub path: PathBuf,
    /// Grade level for this source (e.g. "7º Ano").
    pub grade: String,
    /// Subject for this source (e.g. "letras").
    pub subject: String,
    /// School for this source.
    #[serde(default)]
    pub school: String,
}

/// Top-level gabarito configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Response-table sources.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    /// Directory holding answer-key files, located by naming convention.
    #[serde(default = "default_keys_dir")]
    pub keys_dir: PathBuf,
    /// Directory where score artifacts are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Default decline threshold (percentage points) for report comparison.
    #[serde(default = "default_decline_threshold")]
    pub decline_threshold: f64,
}

fn default_keys_dir() -> PathBuf {
    PathBuf::from("./data/keys")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./gabarito-results")
}
fn default_decline_threshold() -> f64 {
    5.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            keys_dir: default_keys_dir(),
            output_dir: default_output_dir(),
            decline_threshold: default_decline_threshold(),
        }
    }
}

/// Default config file name searched in the working directory.
pub const CONFIG_FILE: &str = "gabarito.toml";

/// Load configuration from an explicit path, or from `./gabarito.toml` when
/// none is given. A missing default file yields `Config::default()`; a
/// missing explicit path is an error.
pub fn load_config_from(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => read_config(p),
        None => {
            let default = Path::new(CONFIG_FILE);
            if default.exists() {
                read_config(default)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    Ok(config)
}
