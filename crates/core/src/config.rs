use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

pub const ENDPOINT_KEY: &str = "REST_BACKEND_ENDPOINT";
pub const JWT_SECRET_KEY: &str = "JWT_SECRET";
pub const TIMEOUT_KEY: &str = "RULEHOOK_REQUEST_TIMEOUT_SECS";
pub const TOKEN_TTL_KEY: &str = "RULEHOOK_TOKEN_TTL_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

// ── Top-level config ──────────────────────────────────────────

/// Runtime settings for a rule evaluation pass.
///
/// Everything the engine needs to reach the outside world is carried here
/// and threaded through explicitly; nothing is read from ambient state
/// after construction.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the backend API (no trailing slash).
    pub api_endpoint: String,
    /// Secret used to sign per-user bearer tokens.
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// Deadline applied to every remote call.
    pub request_timeout: Duration,
    /// Lifetime stamped into issued tokens.
    pub token_ttl: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_endpoint", &self.api_endpoint)
            .field("jwt_secret", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl Config {
    /// Build a config with default timeouts.
    pub fn new(api_endpoint: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            api_endpoint: normalize_endpoint(&api_endpoint.into()),
            jwt_secret: jwt_secret.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let api_endpoint = get(ENDPOINT_KEY)
            .ok_or_else(|| CoreError::Config(format!("{ENDPOINT_KEY} is not set")))?;
        let jwt_secret = get(JWT_SECRET_KEY)
            .ok_or_else(|| CoreError::Config(format!("{JWT_SECRET_KEY} is not set")))?;

        let request_timeout = secs_or(get(TIMEOUT_KEY), TIMEOUT_KEY, DEFAULT_TIMEOUT_SECS)?;
        let token_ttl = secs_or(get(TOKEN_TTL_KEY), TOKEN_TTL_KEY, DEFAULT_TOKEN_TTL_SECS)?;

        Ok(Self {
            api_endpoint: normalize_endpoint(&api_endpoint),
            jwt_secret,
            request_timeout,
            token_ttl,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  api:      endpoint={}", self.api_endpoint);
        tracing::info!("  timeouts: request={:?}, token_ttl={:?}", self.request_timeout, self.token_ttl);
        tracing::info!("  auth:     jwt_secret=({} chars)", self.jwt_secret.len());
    }
}

fn normalize_endpoint(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn secs_or(value: Option<String>, key: &str, default: u64) -> Result<Duration, CoreError> {
    match value {
        None => Ok(Duration::from_secs(default)),
        Some(v) => v
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| CoreError::Config(format!("{key} must be a positive integer, got '{v}'"))),
    }
}
