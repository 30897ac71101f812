//! Configuration module
//!
//! Env-var driven configuration with documented defaults. Components receive
//! the values they need at construction; nothing reads the environment after
//! startup.

use std::env;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_HOST_API_BASE: &str = "https://api.vimeo.com";
const DEFAULT_HOST_PRIVACY: &str = "unlisted";
/// Safety-net TTL on pending records: 6 hours. Must stay strictly longer
/// than the sweep staleness cutoff so the sweeper, not blind key expiry, is
/// the primary reclamation path.
const DEFAULT_PENDING_TTL_SECS: u64 = 6 * 3600;
/// Confirmed markers outlive pending records by a wide margin: 30 days.
const DEFAULT_CONFIRMED_TTL_SECS: u64 = 30 * 24 * 3600;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 900;
const DEFAULT_SWEEP_STALE_MINUTES: i64 = 120;
const DEFAULT_SWEEP_BATCH_LIMIT: usize = 50;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    cors_origins: Vec<String>,
    api_key: Option<String>,
    redis_url: String,
    host_api_base: String,
    host_access_token: String,
    host_default_privacy: String,
    host_showcase_id: Option<String>,
    pending_ttl_secs: u64,
    confirmed_ttl_secs: u64,
    sweep_enabled: bool,
    sweep_interval_secs: u64,
    sweep_stale_minutes: i64,
    sweep_batch_limit: usize,
    http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            api_key: None,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            host_api_base: DEFAULT_HOST_API_BASE.to_string(),
            host_access_token: String::new(),
            host_default_privacy: DEFAULT_HOST_PRIVACY.to_string(),
            host_showcase_id: None,
            pending_ttl_secs: DEFAULT_PENDING_TTL_SECS,
            confirmed_ttl_secs: DEFAULT_CONFIRMED_TTL_SECS,
            sweep_enabled: false,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            sweep_stale_minutes: DEFAULT_SWEEP_STALE_MINUTES,
            sweep_batch_limit: DEFAULT_SWEEP_BATCH_LIMIT,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from the environment, applying defaults where a
    /// variable is unset. `HOST_ACCESS_TOKEN` is required.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Config {
            server_port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            api_key: env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            host_api_base: env::var("HOST_API_BASE")
                .unwrap_or_else(|_| DEFAULT_HOST_API_BASE.to_string()),
            host_access_token: env::var("HOST_ACCESS_TOKEN").map_err(|_| {
                AppError::Config("HOST_ACCESS_TOKEN must be set".to_string())
            })?,
            host_default_privacy: env::var("HOST_DEFAULT_PRIVACY")
                .unwrap_or_else(|_| DEFAULT_HOST_PRIVACY.to_string()),
            host_showcase_id: env::var("HOST_SHOWCASE_ID").ok().filter(|s| !s.is_empty()),
            pending_ttl_secs: parse_var("PENDING_TTL_SECS", DEFAULT_PENDING_TTL_SECS)?,
            confirmed_ttl_secs: parse_var("CONFIRMED_TTL_SECS", DEFAULT_CONFIRMED_TTL_SECS)?,
            sweep_enabled: parse_var("SWEEP_ENABLED", false)?,
            sweep_interval_secs: parse_var("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS)?,
            sweep_stale_minutes: parse_var("SWEEP_STALE_MINUTES", DEFAULT_SWEEP_STALE_MINUTES)?,
            sweep_batch_limit: parse_var("SWEEP_BATCH_LIMIT", DEFAULT_SWEEP_BATCH_LIMIT)?,
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            cors_origins: Vec::new(),
        };

        config.cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        config.validate()?;
        Ok(config)
    }

    /// The safety-net TTL must strictly exceed the sweep staleness cutoff,
    /// otherwise keys expire before the sweeper has a chance to see them and
    /// remote placeholders leak.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.sweep_stale_minutes <= 0 {
            return Err(AppError::Config(
                "SWEEP_STALE_MINUTES must be positive".to_string(),
            ));
        }
        if self.sweep_batch_limit == 0 {
            return Err(AppError::Config(
                "SWEEP_BATCH_LIMIT must be positive".to_string(),
            ));
        }
        let stale_secs = (self.sweep_stale_minutes as u64).saturating_mul(60);
        if self.pending_ttl_secs <= stale_secs {
            return Err(AppError::Config(format!(
                "PENDING_TTL_SECS ({}) must be strictly greater than the sweep \
                 staleness cutoff ({} minutes)",
                self.pending_ttl_secs, self.sweep_stale_minutes
            )));
        }
        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }

    pub fn host_api_base(&self) -> &str {
        &self.host_api_base
    }

    pub fn host_access_token(&self) -> &str {
        &self.host_access_token
    }

    pub fn host_default_privacy(&self) -> &str {
        &self.host_default_privacy
    }

    pub fn host_showcase_id(&self) -> Option<&str> {
        self.host_showcase_id.as_deref()
    }

    pub fn pending_ttl(&self) -> Duration {
        Duration::from_secs(self.pending_ttl_secs)
    }

    pub fn confirmed_ttl(&self) -> Duration {
        Duration::from_secs(self.confirmed_ttl_secs)
    }

    pub fn sweep_enabled(&self) -> bool {
        self.sweep_enabled
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn sweep_stale_minutes(&self) -> i64 {
        self.sweep_stale_minutes
    }

    pub fn sweep_batch_limit(&self) -> usize {
        self.sweep_batch_limit
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Test-only knob: shrink the safety-net TTL without going through the
    /// environment.
    pub fn with_pending_ttl_secs(mut self, secs: u64) -> Self {
        self.pending_ttl_secs = secs;
        self
    }

    /// Test-only knob: set the API key without going through the environment.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_ttl_above_sweep_cutoff() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.pending_ttl().as_secs() > (config.sweep_stale_minutes() as u64) * 60);
    }

    #[test]
    fn ttl_at_or_below_cutoff_is_rejected() {
        let config = Config::default().with_pending_ttl_secs(120 * 60);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("PENDING_TTL_SECS"));
    }
}
