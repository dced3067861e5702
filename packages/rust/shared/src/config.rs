//! Application configuration for jirest.
//!
//! User config lives at `~/.jirest/jirest.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{JirestError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "jirest.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".jirest";

/// Default catalog file name inside the config directory.
const CATALOG_FILE_NAME: &str = "api.json";

/// Well-known location of the Jira Cloud platform REST reference.
pub const DEFAULT_SOURCE_URL: &str = "https://developer.atlassian.com/cloud/jira/platform/rest/v3";

// ---------------------------------------------------------------------------
// Config structs (matching jirest.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the reference document comes from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Where the persisted catalog lives.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the API reference page.
    #[serde(default = "default_source_url")]
    pub url: String,

    /// Timeout for the document fetch, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.into()
}
fn default_timeout_secs() -> u64 {
    60
}

/// `[catalog]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog file path. Defaults to `~/.jirest/api.json` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl CatalogConfig {
    /// Resolve the catalog path, expanding a leading `~/`.
    pub fn resolve_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(p) => expand_home(p),
            None => Ok(config_dir()?.join(CATALOG_FILE_NAME)),
        }
    }
}

fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| JirestError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.jirest/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| JirestError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.jirest/jirest.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| JirestError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        JirestError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    url::Url::parse(&config.source.url).map_err(|e| {
        JirestError::config(format!("invalid source url '{}': {e}", config.source.url))
    })?;

    if config.source.timeout_secs == 0 {
        return Err(JirestError::config(format!(
            "invalid source timeout_secs in {}: must be at least 1",
            path.display()
        )));
    }

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| JirestError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| JirestError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| JirestError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
