//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables;
//! the parse helpers take `Option<String>` so they can be exercised without touching the
//! environment.

use crate::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRIES,
};
use crate::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// What a data-access call does when the FHIR server cannot serve it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Serve the in-memory fixtures, tagged as fallback data, and log a warning.
    #[default]
    Fixtures,
    /// Surface the upstream error to the caller.
    Strict,
}

impl FromStr for FallbackPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixtures" => Ok(FallbackPolicy::Fixtures),
            "strict" => Ok(FallbackPolicy::Strict),
            other => Err(CoreError::Config(format!(
                "unknown fallback policy '{other}' (expected 'fixtures' or 'strict')"
            ))),
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackPolicy::Fixtures => f.write_str("fixtures"),
            FallbackPolicy::Strict => f.write_str("strict"),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    base_url: String,
    access_token: Option<String>,
    fallback_policy: FallbackPolicy,
    cache_ttl: Duration,
    retries: u32,
    request_timeout: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig` with default policy, TTL, retries and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if `base_url` is empty or not an http(s) URL.
    pub fn new(base_url: impl Into<String>) -> CoreResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(CoreError::Config("FHIR base URL cannot be empty".into()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CoreError::Config(format!(
                "FHIR base URL must start with http:// or https://, got '{base_url}'"
            )));
        }

        Ok(Self {
            base_url,
            access_token: None,
            fallback_policy: FallbackPolicy::default(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            retries: DEFAULT_RETRIES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_fallback_policy(mut self, policy: FallbackPolicy) -> Self {
        self.fallback_policy = policy;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Resolve the configuration from process environment variables.
    ///
    /// Call this once at startup (after `dotenvy::dotenv()`), never per request.
    ///
    /// - `MEDPLUM_BASE_URL` (required)
    /// - `MEDPLUM_ACCESS_TOKEN`
    /// - `TELECARE_FALLBACK_POLICY` (`fixtures` | `strict`)
    /// - `TELECARE_CACHE_TTL_SECS`
    /// - `TELECARE_RETRIES`
    /// - `TELECARE_REQUEST_TIMEOUT_SECS`
    pub fn from_env() -> CoreResult<Self> {
        let base_url = std::env::var("MEDPLUM_BASE_URL")
            .map_err(|_| CoreError::Config("MEDPLUM_BASE_URL is not set".into()))?;

        Ok(Self::new(base_url)?
            .with_access_token(std::env::var("MEDPLUM_ACCESS_TOKEN").ok())
            .with_fallback_policy(fallback_policy_from_env_value(
                std::env::var("TELECARE_FALLBACK_POLICY").ok(),
            )?)
            .with_cache_ttl(Duration::from_secs(secs_from_env_value(
                "TELECARE_CACHE_TTL_SECS",
                std::env::var("TELECARE_CACHE_TTL_SECS").ok(),
                DEFAULT_CACHE_TTL_SECS,
            )?))
            .with_retries(retries_from_env_value(
                std::env::var("TELECARE_RETRIES").ok(),
            )?)
            .with_request_timeout(Duration::from_secs(secs_from_env_value(
                "TELECARE_REQUEST_TIMEOUT_SECS",
                std::env::var("TELECARE_REQUEST_TIMEOUT_SECS").ok(),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback_policy
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the fallback policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`FallbackPolicy::Fixtures`].
pub fn fallback_policy_from_env_value(value: Option<String>) -> CoreResult<FallbackPolicy> {
    non_blank(value)
        .map(|v| v.parse())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse the retry count from an optional string value, defaulting to
/// [`DEFAULT_RETRIES`].
pub fn retries_from_env_value(value: Option<String>) -> CoreResult<u32> {
    non_blank(value)
        .map(|v| {
            v.parse::<u32>()
                .map_err(|e| CoreError::Config(format!("TELECARE_RETRIES '{v}': {e}")))
        })
        .transpose()
        .map(|r| r.unwrap_or(DEFAULT_RETRIES))
}

/// Parse a whole number of seconds from an optional string value.
pub fn secs_from_env_value(name: &str, value: Option<String>, default: u64) -> CoreResult<u64> {
    non_blank(value)
        .map(|v| {
            v.parse::<u64>()
                .map_err(|e| CoreError::Config(format!("{name} '{v}': {e}")))
        })
        .transpose()
        .map(|s| s.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slash() {
        let cfg = CoreConfig::new("https://api.medplum.com/fhir/R4/").expect("valid");
        assert_eq!(cfg.base_url(), "https://api.medplum.com/fhir/R4");
        assert_eq!(cfg.fallback_policy(), FallbackPolicy::Fixtures);
        assert_eq!(cfg.retries(), DEFAULT_RETRIES);
    }

    #[test]
    fn new_rejects_empty_and_non_http_urls() {
        assert!(matches!(CoreConfig::new("  "), Err(CoreError::Config(_))));
        assert!(matches!(
            CoreConfig::new("ftp://fhir.example"),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn blank_access_token_is_dropped() {
        let cfg = CoreConfig::new("http://localhost:8103/fhir/R4")
            .expect("valid")
            .with_access_token(Some("   ".into()));
        assert!(cfg.access_token().is_none());
    }

    #[test]
    fn fallback_policy_parsing() {
        assert_eq!(
            fallback_policy_from_env_value(None).expect("default"),
            FallbackPolicy::Fixtures
        );
        assert_eq!(
            fallback_policy_from_env_value(Some(" Strict ".into())).expect("strict"),
            FallbackPolicy::Strict
        );
        assert!(fallback_policy_from_env_value(Some("sometimes".into())).is_err());
    }

    #[test]
    fn numeric_values_default_and_validate() {
        assert_eq!(retries_from_env_value(None).expect("default"), DEFAULT_RETRIES);
        assert_eq!(retries_from_env_value(Some("0".into())).expect("zero"), 0);
        assert!(retries_from_env_value(Some("-1".into())).is_err());

        assert_eq!(
            secs_from_env_value("X", Some("".into()), 7).expect("default"),
            7
        );
        assert_eq!(secs_from_env_value("X", Some("60".into()), 7).expect("60"), 60);
        assert!(secs_from_env_value("X", Some("soon".into()), 7).is_err());
    }
}
