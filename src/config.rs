// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Credentials are read once at startup; everything else has a default
//! suitable for talking to the public Earth Engine and Protected Planet APIs.

use std::env;
use std::time::Duration;

/// Cache entries (lookup tables and per-polygon results) live for three days.
pub const DEFAULT_CACHE_EXPIRATION_SECS: u64 = 60 * 60 * 24 * 3;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    // --- Protected Planet registry ---
    /// API token, sent as the `token` query parameter
    pub ppapi_token: String,
    /// Registry base URL (v3 API)
    pub ppapi_base_url: String,

    // --- Earth Engine ---
    /// Service account email authorized for Earth Engine
    pub ee_account: String,
    /// Path to the service account private key (PEM)
    pub ee_private_key_file: String,
    /// Cloud project used for Earth Engine REST calls
    pub ee_project: String,
    /// Earth Engine REST base URL
    pub ee_base_url: String,
    /// OAuth2 token endpoint for the JWT bearer grant
    pub ee_token_uri: String,

    /// Expiration applied to every cache entry
    pub cache_expiration: Duration,
    /// Timeout for outbound HTTP requests
    pub http_timeout: Duration,
    /// Load templates from this directory instead of the built-in set
    pub template_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: parse_or("PORT", 8080),
            ppapi_token: env::var("PPAPI_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("PPAPI_TOKEN"))?,
            ppapi_base_url: env::var("PPAPI_BASE_URL")
                .unwrap_or_else(|_| "https://api.protectedplanet.net/v3".to_string()),
            ee_account: env::var("EE_ACCOUNT")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("EE_ACCOUNT"))?,
            ee_private_key_file: env::var("EE_PRIVATE_KEY_FILE")
                .unwrap_or_else(|_| "yskey.pem".to_string()),
            ee_project: env::var("EE_PROJECT").unwrap_or_else(|_| "earthengine-legacy".to_string()),
            ee_base_url: env::var("EE_BASE_URL")
                .unwrap_or_else(|_| "https://earthengine.googleapis.com/v1".to_string()),
            ee_token_uri: env::var("EE_TOKEN_URI")
                .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string()),
            cache_expiration: Duration::from_secs(parse_or(
                "CACHE_EXPIRATION_SECS",
                DEFAULT_CACHE_EXPIRATION_SECS,
            )),
            http_timeout: Duration::from_secs(parse_or(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            template_dir: env::var("TEMPLATE_DIR").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Offline config for tests. Base URLs point at an unroutable port.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            ppapi_token: "test_token".to_string(),
            ppapi_base_url: "http://127.0.0.1:9/v3".to_string(),
            ee_account: "test@test-project.iam.gserviceaccount.com".to_string(),
            ee_private_key_file: "tests/fixtures/test_service_account.pem".to_string(),
            ee_project: "test-project".to_string(),
            ee_base_url: "http://127.0.0.1:9/v1".to_string(),
            ee_token_uri: "http://127.0.0.1:9/token".to_string(),
            cache_expiration: Duration::from_secs(DEFAULT_CACHE_EXPIRATION_SECS),
            http_timeout: Duration::from_secs(5),
            template_dir: None,
        }
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
