//! Configuration management for the CTR service.
//!
//! This module provides configuration handling via environment variables with sensible defaults.
//! All configuration parameters can be customized through environment variables with the CTR_ prefix.
//!
//! # Environment Variables
//! - CTR_BIND_ADDRESS / CTR_PORT: Listen address (default: 0.0.0.0:8080)
//! - CTR_GOOGLE_API_KEY: Key sent to the directions service (required)
//! - CTR_GOOGLE_HOST: Directions service host (default: https://maps.googleapis.com)
//! - CTR_REQUEST_TIMEOUT_MS: Timeout of each directions lookup (default: 5000)
//! - CTR_MAX_CONCURRENT_LOOKUPS: Lookups in flight during a nearby query (default: 1)
//! - CTR_NEARBY_FAILURE_POLICY: skip, fail or unreachable (default: skip)
//! - CTR_MAX_TRAVEL_SECONDS: Optional nearby threshold (default: unset)
//! - CTR_SORT_NEARBY_BY_TRAVEL_TIME: Order nearby results by travel time (default: false)
//! - CTR_DRIVERS_PAGE_SIZE: Drivers per page (default: 10)
//! - CTR_ADMIN_USERNAME / CTR_ADMIN_PASSWORD: Seeded admin account (default: admin/password)
//! - CTR_BCRYPT_COST: Cost of stored password hashes (default: 12)
//! - CTR_CORS_ALLOWED_ORIGINS: Comma separated origins, `*` for any (default: none)

use actix_web::http::{header::HeaderValue, Uri};
use serde::Deserialize;
use std::env;

use crate::error::CtrError;
use crate::maps::DEFAULT_GOOGLE_HOST;

/// Prefix for all CTR service environment variables.
const ENV_PREFIX: &str = "CTR_";

/// What a nearby query does when the travel time of one request cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearbyFailurePolicy {
    /// Leave the request out and keep evaluating the others
    Skip,
    /// Abort the whole query with a service error
    Fail,
    /// Keep the request as if it were unreachable
    Unreachable,
}

/// Configuration parameters for the CTR service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,

    /// Key passed to the directions service. Must not be empty.
    pub google_api_key: String,
    /// Base URL of the directions service.
    pub google_host: String,
    /// Upper bound for a single directions lookup, in milliseconds.
    pub request_timeout_ms: u64,

    /// Number of lookups a nearby query may run at once.
    /// 1 evaluates the stored requests one after the other.
    pub max_concurrent_lookups: usize,
    pub nearby_failure_policy: NearbyFailurePolicy,
    /// When set, requests farther than this many seconds are left out.
    pub max_travel_seconds: Option<u64>,
    /// When false, results keep storage order.
    pub sort_nearby_by_travel_time: bool,

    pub drivers_page_size: usize,

    pub admin_username: String,
    pub admin_password: String,
    pub bcrypt_cost: u32,

    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Attempts to load configuration from environment variables.
    ///
    /// Variables must be prefixed with "CTR_", for example:
    /// - CTR_GOOGLE_API_KEY=abc
    /// - CTR_MAX_CONCURRENT_LOOKUPS=4
    ///
    /// Unset variables keep their default value.
    pub fn from_env() -> Result<Self, CtrError> {
        // Load .env file if it exists for local development
        dotenv::dotenv().ok();
        Self::from_vars(env::vars())
    }

    /// Parses configuration from an iterator of raw (prefixed) variables.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self, CtrError> {
        let env_vars: Vec<(String, String)> = vars
            .into_iter()
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .map(|(k, v)| (k.trim_start_matches(ENV_PREFIX).to_string(), v))
            .collect();

        let mut config = envy::from_iter::<_, Self>(env_vars)
            .map_err(|e| CtrError::Config(format!("Failed to parse environment variables: {}", e)))?;
        config.cors_allowed_origins = config
            .cors_allowed_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration parameters.
    ///
    /// # Returns
    /// - Ok(()) if all validation passes
    /// - Err(CtrError::Config) describing the first failure
    pub fn validate(&self) -> Result<(), CtrError> {
        let fail = |msg: &str| Err(CtrError::Config(msg.to_string()));

        if self.google_api_key.trim().is_empty() {
            return fail("google_api_key must be set");
        }
        if !(self.google_host.starts_with("http://") || self.google_host.starts_with("https://")) {
            return fail("google_host must be an http(s) URL");
        }
        if self.request_timeout_ms == 0 {
            return fail("request_timeout_ms must be positive");
        }
        if self.max_concurrent_lookups == 0 {
            return fail("max_concurrent_lookups must be positive");
        }
        if self.drivers_page_size == 0 {
            return fail("drivers_page_size must be positive");
        }
        if self.admin_username.trim().is_empty() || self.admin_password.is_empty() {
            return fail("admin credentials must not be empty");
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return fail("bcrypt_cost must be between 4 and 31");
        }
        if let Some(origin) = self
            .cors_allowed_origins
            .iter()
            .find(|origin| *origin != "*" && !is_valid_origin(origin))
        {
            return Err(CtrError::Config(format!("invalid CORS origin '{}'", origin)));
        }
        Ok(())
    }
}

/// An origin CORS can match on: an absolute URI that is also a valid header value.
fn is_valid_origin(origin: &str) -> bool {
    let absolute = origin
        .parse::<Uri>()
        .map(|uri| uri.scheme().is_some() && uri.host().is_some())
        .unwrap_or(false);
    absolute && HeaderValue::from_str(origin).is_ok()
}

/// Default configuration values. The API key is left empty and has to be provided.
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            google_api_key: String::new(),
            google_host: DEFAULT_GOOGLE_HOST.to_string(),
            request_timeout_ms: 5000,
            max_concurrent_lookups: 1,
            nearby_failure_policy: NearbyFailurePolicy::Skip,
            max_travel_seconds: None,
            sort_nearby_by_travel_time: false,
            drivers_page_size: 10,
            admin_username: "admin".to_string(),
            admin_password: "password".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cors_allowed_origins: Vec::new(),
        }
    }
}
