//! Configuration types for odufrn components.
//!
//! Values come from three layers, lowest priority first:
//! built-in defaults -> `config.toml` -> command line flags / environment.
//! This module covers the first two; the CLI applies the last one.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AppError;

/// Portal used when nothing else is configured.
pub const DEFAULT_PORTAL_URL: &str = "http://dados.ufrn.br/";

/// HTTP client configuration for portal calls.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    /// `None` waits for the portal indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("odufrn/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
        }
    }
}

impl HttpConfig {
    /// Sets a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Fuzzy search tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Share of the keyword length tolerated as edits.
    pub distance_ratio: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            distance_ratio: 0.3,
        }
    }
}

impl SearchConfig {
    /// Creates a config with a custom ratio, clamped to `0.0..=1.0`.
    pub fn with_distance_ratio(ratio: f64) -> Self {
        Self {
            distance_ratio: ratio.clamp(0.0, 1.0),
        }
    }

    /// Exclusive distance limit for a (normalized) keyword.
    ///
    /// `max(1, ceil(chars(keyword) * distance_ratio))`: a candidate matches when
    /// its distance is strictly below this value, so the floor of 1 still
    /// allows exact matches for very short keywords.
    pub fn threshold(&self, keyword: &str) -> usize {
        let length = keyword.chars().count() as f64;
        ((length * self.distance_ratio).ceil() as usize).max(1)
    }
}

/// Options for one download call.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Directory receiving one sub-directory per downloaded entity.
    pub destination: PathBuf,
    /// Download data dictionary resources too.
    pub include_dictionary: bool,
    /// Only download resources mentioning these years.
    pub years: Option<Vec<u32>>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("."),
            include_dictionary: true,
            years: None,
        }
    }
}

impl DownloadOptions {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            ..Default::default()
        }
    }

    pub fn without_dictionary(mut self) -> Self {
        self.include_dictionary = false;
        self
    }

    pub fn with_years(mut self, years: Vec<u32>) -> Self {
        self.years = Some(years);
        self
    }

    /// Same options, rooted at another destination.
    pub fn with_destination(&self, destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            ..self.clone()
        }
    }
}

// =============================================================================
// Configuration file (config.toml)
// =============================================================================

/// Contents of `config.toml`. Every key is optional.
///
/// # Example
///
/// ```toml
/// base_url = "http://dados.ufrn.br"
/// timeout_secs = 60
/// destination = "/data/ufrn"
/// dictionary = false
/// distance_ratio = 0.25
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub destination: Option<PathBuf>,
    pub dictionary: Option<bool>,
    pub distance_ratio: Option<f64>,
}

impl FileConfig {
    /// Portal URL, falling back to [`DEFAULT_PORTAL_URL`].
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_PORTAL_URL)
    }

    pub fn http_config(&self) -> HttpConfig {
        let mut config = HttpConfig::default();
        if let Some(agent) = &self.user_agent {
            config.user_agent = agent.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    pub fn search_config(&self) -> SearchConfig {
        self.distance_ratio
            .map(SearchConfig::with_distance_ratio)
            .unwrap_or_default()
    }
}

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Returns the default configuration directory path: `~/.config/odufrn/`.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("odufrn"))
}

/// Returns the default configuration file path: `~/.config/odufrn/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join(CONFIG_FILE_NAME))
}

/// Load configuration from a TOML file.
///
/// # Arguments
/// * `path` - Optional custom path. If `None`, uses the default path.
///
/// # Returns
/// * `Ok(Some(config))` - Configuration loaded successfully
/// * `Ok(None)` - No file at the default path
/// * `Err(e)` - A custom path is missing, or the file is invalid
pub fn load_config(path: Option<PathBuf>) -> Result<Option<FileConfig>, AppError> {
    let using_default_path = path.is_none();
    let config_path = match path.or_else(default_config_path) {
        Some(p) => p,
        None => return Ok(None),
    };

    if !config_path.exists() {
        if using_default_path {
            tracing::debug!(path = %config_path.display(), "No configuration file");
            return Ok(None);
        }
        return Err(AppError::ConfigError(format!(
            "Config file not found: {}",
            config_path.display()
        )));
    }

    read_config(&config_path).map(Some)
}

fn read_config(path: &Path) -> Result<FileConfig, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::ConfigError(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    toml::from_str(&content).map_err(|e| {
        AppError::ConfigError(format!("Invalid TOML in '{}': {}", path.display(), e))
    })
}
