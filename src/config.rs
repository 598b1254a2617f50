//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.lectio/config.toml` (user)
//! 3. `/etc/lectio/config.toml` (system)
//!
//! A missing file means defaults. Secrets are loaded separately with
//! mandatory permission checks:
//! 1. `~/.lectio/secrets.toml` (user, must be 0600)
//! 2. `/etc/lectio/secrets.toml` (system, must be 0600)
//!
//! Keys absent from the secrets file fall back to environment variables.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::gateway::{Lectio, LectioBuilder, PrimaryKind};
use crate::providers::{RetryConfig, bible_api};
use crate::{LectioError, Result};

/// Gemini key slots in rotation order: `(env var, label)`.
pub const GEMINI_ENV_KEYS: &[(&str, &str)] = &[
    ("GEMINI_API_KEY_2", "Gemini Key 2 (Primary)"),
    ("GEMINI_API_KEY", "Gemini Key 1 (Secondary)"),
    ("GEMINI_API_KEY_3", "Gemini Key 3 (Tertiary)"),
    ("GEMINI_API_KEY_4", "Gemini Key 4 (Quaternary)"),
];

pub const OPENAI_ENV_KEY: &str = "OPENAI_API_KEY";
pub const BIBLE_ENV_KEY: &str = "BIBLE_API_KEY";
pub const BIBLE_ID_ENV: &str = "BIBLE_ID";

/// Gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub primary: PrimaryConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub bible: BibleConfig,
    #[serde(default)]
    pub retry: RetrySection,
}

/// Primary generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryConfig {
    /// "gemini" (default) or "openai".
    #[serde(default)]
    pub provider: PrimaryKind,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Per-call timeout in seconds (default: 60).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            provider: PrimaryKind::default(),
            model: None,
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Entry lifetime in seconds (default: 86400).
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_ttl() -> u64 {
    24 * 3600
}

fn default_max_entries() -> u64 {
    10_000
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BibleConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    /// Translation id; falls back to `BIBLE_ID`, then Louis Segond.
    #[serde(default)]
    pub bible_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    5_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl CacheSection {
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .max_entries(self.max_entries)
            .ttl(Duration::from_secs(self.ttl_secs))
    }
}

impl RetrySection {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .max_attempts(self.max_attempts)
            .initial_delay(Duration::from_millis(self.initial_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, the first existing file
    /// of `~/.lectio/config.toml` and `/etc/lectio/config.toml` is used,
    /// or defaults when neither exists.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::from_file(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LectioError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            LectioError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(LectioError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".lectio").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/lectio/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// A gateway builder reflecting this configuration and `secrets`.
    pub fn builder(&self, secrets: &Secrets) -> LectioBuilder {
        self.builder_with_env(secrets, |name| std::env::var(name).ok())
    }

    /// Like [`builder`](Self::builder) with an explicit environment lookup.
    pub fn builder_with_env(
        &self,
        secrets: &Secrets,
        env: impl Fn(&str) -> Option<String>,
    ) -> LectioBuilder {
        let mut builder = Lectio::builder().primary_kind(self.primary.provider);
        if let Some(model) = &self.primary.model {
            builder = builder.model(model);
        }
        if let Some(url) = &self.primary.base_url {
            builder = builder.primary_base_url(url);
        }
        builder = builder
            .keys(secrets.primary_keys(self.primary.provider, &env))
            .call_timeout(Duration::from_secs(self.primary.timeout_secs))
            .cache(self.cache.to_cache_config())
            .retry(self.retry.to_retry_config());

        if let Some(api_key) = secrets.bible_api_key(&env) {
            let bible_id = self
                .bible
                .bible_id
                .clone()
                .or_else(|| env(BIBLE_ID_ENV))
                .unwrap_or_else(|| bible_api::DEFAULT_BIBLE_ID.to_string());
            builder = builder.bible_api(api_key).bible_id(bible_id);
            if let Some(url) = &self.bible.base_url {
                builder = builder.bible_api_url(url);
            }
        }
        builder
    }
}

/// Secrets configuration (API keys).
///
/// ```toml
/// [[gemini]]
/// label = "Gemini Key 2 (Primary)"
/// api_key = "..."
///
/// [bible]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    /// Gemini keys in rotation order.
    #[serde(default)]
    pub gemini: Vec<LabeledKey>,
    #[serde(default)]
    pub openai: Option<ApiKeySecret>,
    #[serde(default)]
    pub bible: Option<ApiKeySecret>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabeledKey {
    pub label: String,
    pub api_key: String,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists (keys may come from env vars).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".lectio").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/lectio/secrets.toml");
        if system_secrets.exists() {
            return Self::load_from(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Load a specific secrets file, enforcing permissions.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            LectioError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            LectioError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            LectioError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(LectioError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// `(label, secret)` pairs for the primary provider, in rotation order.
    ///
    /// Gemini keys from the file win; otherwise every env slot is returned,
    /// unset ones with an empty secret so they show up in status output.
    pub fn primary_keys(
        &self,
        kind: PrimaryKind,
        env: impl Fn(&str) -> Option<String>,
    ) -> Vec<(String, String)> {
        match kind {
            PrimaryKind::Gemini if !self.gemini.is_empty() => self
                .gemini
                .iter()
                .map(|k| (k.label.clone(), k.api_key.clone()))
                .collect(),
            PrimaryKind::Gemini => GEMINI_ENV_KEYS
                .iter()
                .map(|(var, label)| (label.to_string(), env(var).unwrap_or_default()))
                .collect(),
            PrimaryKind::OpenAi => self
                .openai
                .as_ref()
                .map(|s| s.api_key.clone())
                .or_else(|| env(OPENAI_ENV_KEY))
                .map(|key| vec![("OpenAI".to_string(), key)])
                .unwrap_or_default(),
        }
    }

    /// Retrieval API key, falling back to `BIBLE_API_KEY`.
    pub fn bible_api_key(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.bible
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| env(BIBLE_ENV_KEY))
            .filter(|k| !k.is_empty())
    }
}
