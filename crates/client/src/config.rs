// crates/client/src/config.rs
//! Client configuration. Fixed once the client is built.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://api.jobtrack.dev";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const API_KEY_PREFIX: &str = "sk_";

/// Environment variables read by [`ClientConfig::from_env`].
pub const ENV_API_KEY: &str = "JOBTRACK_API_KEY";
pub const ENV_BASE_URL: &str = "JOBTRACK_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "JOBTRACK_TIMEOUT_SECS";
pub const ENV_MAX_ATTEMPTS: &str = "JOBTRACK_MAX_ATTEMPTS";

#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    /// Deadline for one attempt, covering send and body read.
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            user_agent: format!("jobtrack-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Build from `JOBTRACK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY)
            .ok_or_else(|| Error::Config(format!("{ENV_API_KEY} is not set")))?;
        let mut config = Self::new(api_key);

        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|_| not_an_integer(ENV_TIMEOUT_SECS, &raw))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(ENV_MAX_ATTEMPTS) {
            config.retry.max_attempts =
                raw.parse().map_err(|_| not_an_integer(ENV_MAX_ATTEMPTS, &raw))?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.retry.max_attempts = attempts;
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Reject configurations that can never produce a successful call.
    pub fn validate(&self) -> Result<()> {
        match self.api_key.strip_prefix(API_KEY_PREFIX) {
            Some(rest) if !rest.is_empty() => {}
            _ => {
                return Err(Error::Config(format!(
                    "API key must start with {API_KEY_PREFIX:?}"
                )))
            }
        }
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base URL must be http or https, got {:?}",
                url.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn not_an_integer(name: &str, raw: &str) -> Error {
    Error::Config(format!("{name} must be an integer, got {raw:?}"))
}

fn redact(key: &str) -> String {
    match key.get(..API_KEY_PREFIX.len() + 4) {
        Some(head) if key.len() > head.len() => format!("{head}…"),
        _ => "…".to_string(),
    }
}
