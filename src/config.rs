//! Configuration management for eventreg using the prefer crate.
//!
//! Resolution order (later wins):
//! 1. Built-in defaults
//! 2. Config file (`--config`, or auto-discovered `eventreg.{toml,yaml,json}`)
//! 3. Environment variables (`.env` is loaded first by `main`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::GeminiConfig;
use crate::session::IdentityToolkitConfig;

/// Default server bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3030";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// Administrator profile written to the store when the server starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    /// Identity provider user id of the administrator.
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_admin_name")]
    pub display_name: String,
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

impl BootstrapAdmin {
    pub fn new(id: String) -> Self {
        Self {
            id,
            email: String::new(),
            display_name: default_admin_name(),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (port, host, or host:port).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    /// Cap on concurrent form scans served by the HTTP API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_scans: Option<usize>,
    /// Extraction capability settings.
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Identity provider settings.
    #[serde(default)]
    pub identity: IdentityToolkitConfig,
    /// Approved admin seeded at startup, so role-gated routes have an actor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer for file discovery.
    /// Falls back to defaults when no file is found or it cannot be parsed.
    pub async fn load() -> Self {
        match prefer::load("eventreg").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await.unwrap_or_else(|e| {
                    tracing::warn!("{}; using defaults", e);
                    Self::default()
                }),
                None => Self::default(),
            },
            Err(_) => {
                tracing::debug!("No eventreg config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file path.
    /// The format is picked from the extension; anything unknown is read as JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        match ext {
            "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            }),
            _ => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            }),
        }
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind: String,
    pub max_concurrent_scans: Option<usize>,
    pub gemini: GeminiConfig,
    pub identity: IdentityToolkitConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(Config::default())
    }
}

impl Settings {
    /// Build settings from a file config, without environment overrides.
    pub fn from_config(config: Config) -> Self {
        Self {
            bind: config.bind.unwrap_or_else(|| DEFAULT_BIND.to_string()),
            max_concurrent_scans: config.max_concurrent_scans.filter(|n| *n > 0),
            gemini: config.gemini,
            identity: config.identity,
            bootstrap_admin: config.bootstrap_admin,
        }
    }

    /// Apply environment variable overrides.
    ///
    /// `EVENTREG_ADMIN_ID` replaces the bootstrap admin's id (creating one if
    /// the file had none); `EVENTREG_ADMIN_EMAIL` sets its email.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(bind) = std::env::var("EVENTREG_BIND").ok().filter(|s| !s.is_empty()) {
            tracing::debug!("Using EVENTREG_BIND from environment: {}", bind);
            self.bind = bind;
        }
        if let Some(cap) = std::env::var("EVENTREG_MAX_CONCURRENT_SCANS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
        {
            self.max_concurrent_scans = (cap > 0).then_some(cap);
        }
        if let Some(id) = std::env::var("EVENTREG_ADMIN_ID").ok().filter(|s| !s.is_empty()) {
            match self.bootstrap_admin.as_mut() {
                Some(admin) => admin.id = id,
                None => self.bootstrap_admin = Some(BootstrapAdmin::new(id)),
            }
        }
        if let (Some(admin), Some(email)) = (
            self.bootstrap_admin.as_mut(),
            std::env::var("EVENTREG_ADMIN_EMAIL").ok().filter(|s| !s.is_empty()),
        ) {
            admin.email = email;
        }
        self.gemini = self.gemini.with_env_overrides();
        self.identity = self.identity.with_env_overrides();
        self
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides discovery).
    pub config_path: Option<PathBuf>,
}

/// Load settings with explicit options.
pub async fn load_settings(options: LoadOptions) -> anyhow::Result<Settings> {
    let config = match options.config_path {
        // An explicit file that cannot be read is an error, not a silent default.
        Some(path) => Config::load_from_path(&path).await?,
        None => Config::load().await,
    };
    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }
    Ok(Settings::from_config(config).with_env_overrides())
}
