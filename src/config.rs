//! Client configuration.
//!
//! Everything the client needs is passed in explicitly through
//! [`ClientConfig`]; `from_env` is a convenience for binaries.

use crate::{Error, ErrorContext, Result};
use std::time::Duration;

/// Domain used to build a base URL from a bare instance name.
pub const DEFAULT_INSTANCE_DOMAIN: &str = "hotwax.io";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 32;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Clone)]
pub struct ClientConfig {
    /// Instance name (`demo`) or full base URL (`https://demo.example.com/api/`).
    pub instance_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
    /// Cap on concurrent requests through one transport.
    pub max_inflight: Option<usize>,
    pub proxy_url: Option<String>,
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("instance_url", &self.instance_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .field("max_inflight", &self.max_inflight)
            .field("proxy_url", &self.proxy_url)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(instance_url: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            max_inflight: None,
            proxy_url: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }

    /// Load configuration from `OMS_*` environment variables.
    ///
    /// - `OMS_INSTANCE_URL` (required)
    /// - `OMS_API_TOKEN`
    /// - `OMS_HTTP_TIMEOUT_SECS` (default 30)
    /// - `OMS_HTTP_POOL_MAX_IDLE_PER_HOST` (default 32)
    /// - `OMS_MAX_INFLIGHT`
    /// - `OMS_PROXY_URL`
    /// - `OMS_CACHE_TTL_SECS` (default 300)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let instance_url = lookup("OMS_INSTANCE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                Error::configuration_with_context(
                    "instance URL is not set",
                    ErrorContext::new()
                        .with_field_path("OMS_INSTANCE_URL")
                        .with_source("config"),
                )
            })?;

        let mut config = Self::new(instance_url);
        config.token = lookup("OMS_API_TOKEN").filter(|s| !s.is_empty());
        config.proxy_url = lookup("OMS_PROXY_URL").filter(|s| !s.is_empty());
        if let Some(secs) = parse_var::<u64>(&lookup, "OMS_HTTP_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(n) = parse_var::<usize>(&lookup, "OMS_HTTP_POOL_MAX_IDLE_PER_HOST")? {
            config.pool_max_idle_per_host = n;
        }
        if let Some(n) = parse_var::<usize>(&lookup, "OMS_MAX_INFLIGHT")? {
            config.max_inflight = Some(n.max(1));
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "OMS_CACHE_TTL_SECS")? {
            config.cache_ttl = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_inflight(mut self, n: usize) -> Self {
        self.max_inflight = Some(n.max(1));
        self
    }

    pub fn with_proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// The resolved, validated base URL for all backend calls.
    pub fn base_url(&self) -> Result<String> {
        let instance = self.instance_url.trim();
        if instance.is_empty() {
            return Err(Error::configuration_with_context(
                "instance URL is empty",
                ErrorContext::new()
                    .with_field_path("instance_url")
                    .with_source("config"),
            ));
        }
        let resolved = resolve_instance_url(instance);
        url::Url::parse(&resolved).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL: {}", e),
                ErrorContext::new()
                    .with_field_path("instance_url")
                    .with_details(resolved.clone())
                    .with_source("config"),
            )
        })?;
        Ok(resolved)
    }
}

/// Turn an instance name into a base URL; full URLs pass through unchanged.
pub fn resolve_instance_url(instance: &str) -> String {
    if instance.starts_with("http") {
        instance.to_string()
    } else {
        format!("https://{}.{}/api/", instance, DEFAULT_INSTANCE_DOMAIN)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            Error::configuration_with_context(
                "expected a non-negative integer",
                ErrorContext::new()
                    .with_field_path(key)
                    .with_details(raw)
                    .with_source("config"),
            )
        }),
    }
}
