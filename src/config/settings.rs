//! TOML-based configuration for Lakeview.
//!
//! Supports a config file (lakeview.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//!
//! [metadata]
//! unknown_path = "strict"
//!
//! [store]
//! backend = "sqlite"
//! path = "${HOME}/.lakeview/catalog.db"
//! seed_demo = true
//!
//! [client]
//! base_url = "http://127.0.0.1:5000"
//! timeout_ms = 10000
//! retries = 2
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::metadata::UnknownPathPolicy;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LAKEVIEW_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub metadata: MetadataSettings,
    pub store: StoreSettings,
    pub client: ClientSettings,
}

/// HTTP listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServerSettings {
    /// `host:port` for binding.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Metadata lookup configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// Behavior for paths outside the catalog: "lenient" or "strict".
    pub unknown_path: UnknownPathPolicy,
}

/// Catalog store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Catalog store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,

    /// SQLite database path (supports ${ENV_VAR} expansion).
    pub path: Option<String>,

    /// Insert the demo bookmarks and recent tables into an empty store.
    pub seed_demo: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: None,
            seed_demo: true,
        }
    }
}

impl StoreSettings {
    /// The database path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the metadata API (supports ${ENV_VAR} expansion).
    pub base_url: String,

    /// Per-request timeout.
    pub timeout_ms: u64,

    /// Retries after the first attempt for transient failures.
    pub retries: u32,

    /// Backoff before the first retry; doubles per attempt.
    pub retry_base_ms: u64,

    /// Upper bound for a single backoff.
    pub retry_max_ms: u64,

    /// How long a cached response is served without refetching.
    pub stale_seconds: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 10_000,
            retries: 2,
            retry_base_ms: 1_000,
            retry_max_ms: 10_000,
            stale_seconds: 300,
        }
    }
}

impl ClientSettings {
    pub fn resolved_base_url(&self) -> Result<String, SettingsError> {
        let url = expand_env_vars(&self.base_url)?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SettingsError::InvalidConfig(format!(
                "client.base_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        Ok(url.trim_end_matches('/').to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_seconds)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `LAKEVIEW_CONFIG`
    /// 2. `./lakeview.toml`
    /// 3. `~/.config/lakeview/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("lakeview.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("lakeview").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Load from an explicit file when given, otherwise search.
    pub fn load_from(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|&ch| ch != '}') {
                name.push(ch);
            }
            chars.next(); // consume '}'
            name
        } else {
            // $VAR ends at non-alphanumeric/underscore
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
