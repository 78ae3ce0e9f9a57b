//! # Load Test Configuration
//!
//! Everything a run needs is resolved once at startup into a [`LoadTestConfig`] and
//! passed down explicitly. Environment variables provide defaults; CLI flags
//! override them.
//!
//! ## Environment Variables
//!
//! ### `BASE_URL`
//!
//! Scheme, host and port of the service under test. Unset or empty falls back to
//! `http://localhost:1323`. The favorite endpoint path is appended to it.
//!
//! ### `FAVLOAD_PROFILE`
//!
//! Scenario to run when `--profile` is not given: `smoke`, `load`, `stress` or
//! `spike`. Default: `stress`.
//!
//! ### `FAVLOAD_THINK_TIME_MS`
//!
//! Pause after each iteration, per virtual user. Default: `100`.
//!
//! ### `FAVLOAD_REQUEST_TIMEOUT_MS`
//!
//! Timeout of the standalone HTTP client used by `favload once` / `favload probe`.
//! Goose applies its own client settings during `favload run`. Default: `30000`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use favload::config::LoadTestConfig;
//!
//! let config = LoadTestConfig::from_env()?;
//! println!("POST {}", config.endpoint_url());
//! # Ok::<(), favload::error::ConfigError>(())
//! ```

use std::env;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;
use crate::scenario::Profile;

pub const DEFAULT_BASE_URL: &str = "http://localhost:1323";
pub const FAVORITE_PATH: &str = "/api/v1/favorite";
pub const DEFAULT_THINK_TIME: Duration = Duration::from_millis(100);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTestConfig {
    /// Target base URL without the endpoint path
    pub base_url: String,
    /// Active scenario
    pub profile: Profile,
    /// Pause after each iteration
    pub think_time: Duration,
    /// Standalone client timeout
    pub request_timeout: Duration,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            profile: Profile::default(),
            think_time: DEFAULT_THINK_TIME,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl LoadTestConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = resolve_base_url(lookup("BASE_URL"))?;

        let profile = match lookup("FAVLOAD_PROFILE") {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => Profile::default(),
        };

        let think_time = lookup("FAVLOAD_THINK_TIME_MS")
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_THINK_TIME);

        let request_timeout = lookup("FAVLOAD_REQUEST_TIMEOUT_MS")
            .and_then(|s| s.trim().parse().ok())
            .filter(|ms: &u64| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        Ok(Self {
            base_url,
            profile,
            think_time,
            request_timeout,
        })
    }

    /// Replace the base URL, applying the same rules as `BASE_URL`.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = resolve_base_url(Some(raw.to_string()))?;
        Ok(self)
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }

    /// Full URL of the favorite endpoint.
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), FAVORITE_PATH)
    }
}

/// Empty or missing means the default; anything else must be an http(s) URL.
fn resolve_base_url(raw: Option<String>) -> Result<String, ConfigError> {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return Ok(DEFAULT_BASE_URL.to_string()),
    };

    let parsed = Url::parse(&raw).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw),
        other => Err(ConfigError::InvalidBaseUrl {
            url: raw.clone(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
