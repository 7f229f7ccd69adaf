/// Service configuration loader - parses aquarisk.toml
///
/// Keeps feed locations, cache policy and fallback sizing out of the code so
/// an operator can repoint feeds or tune the TTL without recompiling. Every
/// section is optional; a missing file yields the defaults.
///
/// The feed bearer token is never stored in the file. `[feeds].token_env`
/// names the environment variable that holds it, and `.env` is loaded first
/// so local runs can keep it there.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default config location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "aquarisk.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feeds: FeedsConfig,
    pub cache: CacheConfig,
    pub daemon: DaemonSection,
    pub synthetic: SyntheticConfig,
    pub endpoint: EndpointConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub sites_url: String,
    pub vessels_url: String,
    pub timeout_secs: u64,
    /// Name of the environment variable holding the bearer token.
    pub token_env: String,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            sites_url: "https://api.aquarisk.no/v1/localities".to_string(),
            vessels_url: "https://api.aquarisk.no/v1/vessels".to_string(),
            timeout_secs: 15,
            token_env: "AQUARISK_API_TOKEN".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub ttl_minutes: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".cache/aquarisk"),
            ttl_minutes: crate::cache::DEFAULT_TTL_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonSection {
    pub poll_interval_minutes: u64,
}

impl Default for DaemonSection {
    fn default() -> Self {
        Self { poll_interval_minutes: 15 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Absent means a fresh entropy seed on every generation.
    pub seed: Option<u64>,
    pub site_count: usize,
    pub vessel_count: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: None,
            site_count: 60,
            vessel_count: 25,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub port: Option<u16>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses and validates a config document.
pub fn parse_config(contents: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads `path`, falling back to defaults when the file does not exist.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents, path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_minutes <= 0 {
            return Err(ConfigError::Invalid("cache.ttl_minutes must be positive".into()));
        }
        if self.daemon.poll_interval_minutes == 0 {
            return Err(ConfigError::Invalid("daemon.poll_interval_minutes must be positive".into()));
        }
        if self.feeds.timeout_secs == 0 {
            return Err(ConfigError::Invalid("feeds.timeout_secs must be positive".into()));
        }
        for (key, url) in [("feeds.sites_url", &self.feeds.sites_url), ("feeds.vessels_url", &self.feeds.vessels_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!("{} must be an http(s) URL, got {:?}", key, url)));
            }
        }
        Ok(())
    }

    /// Bearer token from the environment (after loading `.env`), if set and
    /// non-blank.
    pub fn api_token(&self) -> Option<String> {
        dotenv::dotenv().ok();
        env::var(&self.feeds.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
