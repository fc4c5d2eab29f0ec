// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Service-account credentials for Earth Engine.
//!
//! The private key is loaded once at startup. Access tokens are minted with
//! the OAuth2 JWT bearer grant and cached in memory until shortly before
//! they expire.

use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::{Mutex, RwLock};

/// OAuth scope granting Earth Engine access.
pub const EARTH_ENGINE_SCOPE: &str = "https://www.googleapis.com/auth/earthengine";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 60 * 60;
/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Claims of the signed assertion exchanged for an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Service account identity plus a cached access token.
pub struct ServiceAccountCredentials {
    http: reqwest::Client,
    account: String,
    token_uri: String,
    signing_key: EncodingKey,
    cached: RwLock<Option<CachedToken>>,
    /// Serializes token refreshes so concurrent requests share one exchange.
    refresh_lock: Mutex<()>,
}

impl ServiceAccountCredentials {
    /// Load credentials from a PEM private key file.
    pub fn from_pem_file<P: AsRef<Path>>(
        http: reqwest::Client,
        account: &str,
        key_path: P,
        token_uri: &str,
    ) -> Result<Self, AppError> {
        let pem = std::fs::read(key_path.as_ref()).map_err(|e| {
            AppError::Auth(format!(
                "Failed to read private key {}: {}",
                key_path.as_ref().display(),
                e
            ))
        })?;
        Self::from_pem(http, account, &pem, token_uri)
    }

    /// Build credentials from PEM-encoded RSA private key bytes.
    pub fn from_pem(
        http: reqwest::Client,
        account: &str,
        pem: &[u8],
        token_uri: &str,
    ) -> Result<Self, AppError> {
        let signing_key = EncodingKey::from_rsa_pem(pem)
            .map_err(|e| AppError::Auth(format!("Invalid private key: {}", e)))?;

        Ok(Self {
            http,
            account: account.to_string(),
            token_uri: token_uri.to_string(),
            signing_key,
            cached: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Service account email.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Claims for an assertion issued at `now`.
    pub fn assertion_claims(&self, now: DateTime<Utc>) -> AssertionClaims {
        AssertionClaims {
            iss: self.account.clone(),
            scope: EARTH_ENGINE_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Sign an RS256 assertion issued at `now`.
    pub fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, AppError> {
        encode(
            &Header::new(Algorithm::RS256),
            &self.assertion_claims(now),
            &self.signing_key,
        )
        .map_err(|e| AppError::Auth(format!("Failed to sign assertion: {}", e)))
    }

    /// Get a valid access token, exchanging a fresh assertion when needed.
    pub async fn access_token(&self) -> Result<String, AppError> {
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited.
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        let assertion = self.sign_assertion(Utc::now())?;
        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Token exchange failed with HTTP {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))?;

        let expires_at = Utc::now() + Duration::seconds(token.expires_in);
        *self.cached.write().await = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });

        tracing::info!(account = %self.account, %expires_at, "Earth Engine access token refreshed");
        Ok(token.access_token)
    }

    async fn cached_token(&self) -> Option<String> {
        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);
        self.cached
            .read()
            .await
            .as_ref()
            .filter(|cached| Utc::now() + margin < cached.expires_at)
            .map(|cached| cached.access_token.clone())
    }
}
