//! Client configuration and environment overrides.

use std::fmt;
use std::time::Duration;

use crate::error::ApiError;
use crate::query::ArrayFormat;

pub const DEFAULT_BASE_URL: &str = "https://api.telnyx.com/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_USER_AGENT: &str = concat!("telnyx-rust/", env!("CARGO_PKG_VERSION"));

pub const ENV_API_KEY: &str = "TELNYX_API_KEY";
pub const ENV_BASE_URL: &str = "TELNYX_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "TELNYX_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "TELNYX_MAX_RETRIES";

/// Cross-cutting options applied to every request.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub array_format: ArrayFormat,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            array_format: ArrayFormat::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Read `TELNYX_API_KEY` (required) plus the optional
    /// `TELNYX_BASE_URL`, `TELNYX_TIMEOUT_SECS` and `TELNYX_MAX_RETRIES`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let api_key = lookup(ENV_API_KEY)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ApiError::Config(format!("{ENV_API_KEY} is not set")))?;
        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw
                .parse::<u64>()
                .map_err(|e| ApiError::Config(format!("{ENV_TIMEOUT_SECS}={raw:?}: {e}")))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            config.max_retries = raw
                .parse::<u32>()
                .map_err(|e| ApiError::Config(format!("{ENV_MAX_RETRIES}={raw:?}: {e}")))?;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_array_format(mut self, array_format: ArrayFormat) -> Self {
        self.array_format = array_format;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("array_format", &self.array_format)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::new("KEY");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.array_format, ArrayFormat::Comma);
        assert!(config.user_agent.starts_with("telnyx-rust/"));
    }

    #[test]
    fn env_overrides_apply() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "KEY"),
            (ENV_BASE_URL, "http://localhost:3000"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_MAX_RETRIES, "0"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "KEY");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        let err = ClientConfig::from_lookup(lookup(&[(ENV_API_KEY, "  ")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn bad_numbers_are_config_errors() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_API_KEY, "KEY"), (ENV_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_SECS));
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", ClientConfig::new("SECRET123"));
        assert!(!rendered.contains("SECRET123"));
        assert!(rendered.contains("<redacted>"));
    }
}
