//! Configuration loader for newsbot.
//!
//! Reads `config.toml` (by default from the data directory, `~/.newsbot/`)
//! into [`AppConfig`], applies environment overrides for endpoints, and
//! resolves API credentials from the environment. A missing or malformed
//! file falls back to defaults.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use newsbot_types::config::AppConfig;
use newsbot_types::error::ConfigError;

pub const DATA_DIR_ENV: &str = "NEWSBOT_DATA_DIR";
pub const DATABASE_URL_ENV: &str = "NEWSBOT_DATABASE_URL";
pub const QDRANT_URL_ENV: &str = "QDRANT_URL";
pub const QDRANT_API_KEY_ENV: &str = "QDRANT_API_KEY";
pub const JINA_API_KEY_ENV: &str = "JINA_API_KEY";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Resolve the data directory: `NEWSBOT_DATA_DIR`, else `~/.newsbot`.
pub fn resolve_data_dir() -> PathBuf {
    if let Some(dir) = non_blank(std::env::var(DATA_DIR_ENV).ok()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".newsbot")
}

/// `{data_dir}/config.toml`.
pub fn default_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_config(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

/// Apply endpoint overrides from the process environment.
pub fn apply_env_overrides(config: &mut AppConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply endpoint overrides from `lookup`. Blank values are ignored.
pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = non_blank(lookup(DATABASE_URL_ENV)) {
        config.store.database_url = Some(url);
    }
    if let Some(url) = non_blank(lookup(QDRANT_URL_ENV)) {
        config.vector.url = url;
    }
}

/// API keys for the upstream providers.
pub struct Credentials {
    pub jina_api_key: SecretString,
    pub gemini_api_key: SecretString,
    /// Only needed for secured Qdrant deployments.
    pub qdrant_api_key: Option<SecretString>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            non_blank(lookup(key))
                .map(SecretString::from)
                .ok_or(ConfigError::MissingCredential(key))
        };

        Ok(Self {
            jina_api_key: required(JINA_API_KEY_ENV)?,
            gemini_api_key: required(GEMINI_API_KEY_ENV)?,
            qdrant_api_key: non_blank(lookup(QDRANT_API_KEY_ENV)).map(SecretString::from),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
