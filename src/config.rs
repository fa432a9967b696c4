use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::transport::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
use crate::error::{JulesError, Result};

pub const DEFAULT_BASE_URL: &str = "https://jules.googleapis.com/v1alpha";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub wait: WaitConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("JULES_CONFIG").ok().map(PathBuf::from));

        let path = match explicit {
            Some(path) => Some(path),
            None => default_config_path(),
        };
        if let Some(path) = path {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| JulesError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| JulesError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.api {
            self.api.merge(patch);
        }
        if let Some(patch) = patch.retry {
            self.retry.merge(patch);
        }
        if let Some(patch) = patch.wait {
            self.wait.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_string("JULES_API_KEY") {
            self.api.api_key = Some(value);
        }
        if let Some(value) = env_string("JULES_API_BASE_URL") {
            self.api.base_url = value;
        }
        if let Some(value) = env_string("JULES_AUTH_SCHEME") {
            self.api.auth = parse_auth_scheme(&value)?;
        }
        if let Some(value) = env_u64("JULES_HTTP_TIMEOUT_SECS")? {
            self.api.timeout_secs = value;
        }

        if let Some(value) = env_u32("JULES_RETRY_MAX_ATTEMPTS")? {
            self.retry.max_attempts = value;
        }
        if let Some(value) = env_u64("JULES_RETRY_BACKOFF_MS")? {
            self.retry.backoff_unit = Duration::from_millis(value);
        }

        if let Some(value) = env_u64("JULES_WAIT_TIMEOUT_SECS")? {
            self.wait.timeout = Duration::from_secs(value);
        }
        if let Some(value) = env_u64("JULES_WAIT_POLL_INTERVAL_SECS")? {
            self.wait.poll_interval = Duration::from_secs(value);
        }

        Ok(())
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jules/config.toml"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `x-goog-api-key: <key>`
    #[default]
    ApiKey,
    /// `Authorization: Bearer <key>`
    Bearer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub auth: AuthScheme,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            auth: AuthScheme::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    fn merge(&mut self, patch: ApiPatch) {
        if let Some(value) = patch.base_url {
            self.base_url = value;
        }
        if let Some(value) = patch.api_key {
            self.api_key = Some(value);
        }
        if let Some(value) = patch.auth {
            self.auth = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_unit", with = "humantime_serde")]
    pub backoff_unit: Duration,
}

const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

const fn default_backoff_unit() -> Duration {
    Duration::from_secs(1)
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_unit: default_backoff_unit(),
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff_unit: self.backoff_unit,
        }
    }

    fn merge(&mut self, patch: RetryPatch) {
        if let Some(value) = patch.max_attempts {
            self.max_attempts = value;
        }
        if let Some(value) = patch.backoff_unit {
            self.backoff_unit = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    #[serde(default = "default_wait_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

const fn default_wait_timeout() -> Duration {
    Duration::from_secs(300)
}

const fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: default_wait_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl WaitConfig {
    fn merge(&mut self, patch: WaitPatch) {
        if let Some(value) = patch.timeout {
            self.timeout = value;
        }
        if let Some(value) = patch.poll_interval {
            self.poll_interval = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub api: Option<ApiPatch>,
    pub retry: Option<RetryPatch>,
    pub wait: Option<WaitPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ApiPatch {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub auth: Option<AuthScheme>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RetryPatch {
    pub max_attempts: Option<u32>,
    #[serde(default, with = "humantime_serde")]
    pub backoff_unit: Option<Duration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WaitPatch {
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub poll_interval: Option<Duration>,
}

fn parse_auth_scheme(value: &str) -> Result<AuthScheme> {
    match value.to_lowercase().as_str() {
        "api_key" | "apikey" | "api-key" => Ok(AuthScheme::ApiKey),
        "bearer" => Ok(AuthScheme::Bearer),
        _ => Err(JulesError::Config(format!(
            "invalid auth scheme {value} (expected api_key|bearer)"
        ))),
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_u32(key: &str) -> Result<Option<u32>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<u32>().map(Some).map_err(|err| {
            JulesError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<u64>().map(Some).map_err(|err| {
            JulesError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}
