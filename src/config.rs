//! Configuration: API credential, endpoints and transport options.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::client::ClientError;

/// Base URL of the credentialed search/geocode API.
pub const DEFAULT_API_BASE: &str = "https://dapi.kakao.com/v2/local";

/// Base URL of the place panel (detail) service.
pub const DEFAULT_PLACE_API_BASE: &str = "https://place-api.map.kakao.com/places/panel3";

pub const ENV_REST_API_KEY: &str = "REST_API_KEY";
pub const ENV_API_BASE: &str = "KAKAO_LOCAL_API_BASE";
pub const ENV_PLACE_API_BASE: &str = "KAKAO_PLACE_API_BASE";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "KAKAO_HTTP_TIMEOUT_SECS";

/// Transport configuration options.
///
/// Everything defaults to off, leaving reqwest's own defaults in charge.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Request timeout. If None, default client timeout is used.
    pub timeout: Option<Duration>,
    /// HTTP proxy URL.
    pub proxy: Option<String>,
    /// Additional HTTP headers for the search API. The place detail service
    /// never receives them.
    pub headers: HashMap<String, String>,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy = Some(proxy_url.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Everything [`LocalClient`](crate::client::LocalClient) needs to reach the service.
#[derive(Debug, Clone)]
pub struct Config {
    pub rest_api_key: String,
    pub api_base: String,
    pub place_api_base: String,
    pub transport: TransportOptions,
}

impl Config {
    /// Config with the production endpoints.
    pub fn new(rest_api_key: impl Into<String>) -> Self {
        Self {
            rest_api_key: rest_api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            place_api_base: DEFAULT_PLACE_API_BASE.to_string(),
            transport: TransportOptions::default(),
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// `REST_API_KEY` is required; a missing or empty key is an
    /// [`ClientError::Auth`]. Endpoint and timeout overrides are optional.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable lookup.
    /// Blank values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let key = var(ENV_REST_API_KEY)
            .ok_or_else(|| ClientError::Auth("missing REST API key".to_string()))?;

        let mut config = Self::new(key);
        if let Some(base) = var(ENV_API_BASE) {
            config.api_base = base;
        }
        if let Some(base) = var(ENV_PLACE_API_BASE) {
            config.place_api_base = base;
        }
        if let Some(secs) = var(ENV_HTTP_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ClientError::Config(format!("{ENV_HTTP_TIMEOUT_SECS} must be whole seconds, got {secs:?}"))
            })?;
            config.transport = config.transport.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn with_place_api_base(mut self, base: impl Into<String>) -> Self {
        self.place_api_base = base.into();
        self
    }

    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }
}
