//! Application configuration.
//!
//! Values come from an optional TOML file and are then overridden by
//! `GRAPH_STUDIO_*` environment variables:
//!
//! ```toml
//! [api]
//! backend = "http"          # or "memory"
//! base_url = "http://localhost:8000/api"
//! token = "..."
//! timeout_secs = 30
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{GraphApi, HttpGraphClient, InMemoryGraphApi};

pub const ENV_CONFIG: &str = "GRAPH_STUDIO_CONFIG";
pub const ENV_API_URL: &str = "GRAPH_STUDIO_API_URL";
pub const ENV_API_TOKEN: &str = "GRAPH_STUDIO_API_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "GRAPH_STUDIO_TIMEOUT_SECS";
pub const ENV_BACKEND: &str = "GRAPH_STUDIO_BACKEND";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("unknown backend {0:?} (expected \"http\" or \"memory\")")]
    UnknownBackend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Http,
    /// In-process store seeded with sample files.
    Memory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Backend::Http),
            "memory" => Ok(Backend::Memory),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Http => "http",
            Backend::Memory => "memory",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub backend: Backend,
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Http,
            base_url: "http://localhost:8000/api".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub api: ApiConfig,
}

impl StudioConfig {
    /// Reads `path` if given, then applies the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        info!(
            "config: backend={} url={} timeout={}s token={}",
            config.api.backend,
            config.api.base_url,
            config.api.timeout_secs,
            if config.api.token.is_some() { "set" } else { "unset" }
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overrides fields from variables returned by `lookup`. Empty values are ignored.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(token) = get(ENV_API_TOKEN) {
            self.api.token = Some(token);
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            self.api.timeout_secs =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnv {
                        var: ENV_TIMEOUT_SECS,
                        value: raw.clone(),
                    })?;
        }
        if let Some(raw) = get(ENV_BACKEND) {
            self.api.backend = raw.parse()?;
        }
        Ok(())
    }

    /// Config file from the first CLI argument, else `GRAPH_STUDIO_CONFIG`.
    pub fn path_from(
        mut args: impl Iterator<Item = String>,
        env: Option<String>,
    ) -> Option<PathBuf> {
        args.next()
            .or(env)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }

    pub fn build_client(&self) -> Arc<dyn GraphApi> {
        match self.api.backend {
            Backend::Http => Arc::new(HttpGraphClient::new(
                self.api.base_url.clone(),
                self.api.token.clone(),
                self.api.timeout(),
            )),
            Backend::Memory => Arc::new(InMemoryGraphApi::with_sample_files()),
        }
    }
}
