// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Protected Planet (WDPA) registry client.

use crate::error::AppError;
use crate::models::{ProtectedAreaFeature, ProtectedAreaSummary};
use async_trait::async_trait;
use geojson::JsonObject;
use serde::{de::DeserializeOwned, Deserialize};

/// Designation filter applied to every search. The API needs at least one
/// condition.
pub const DESIGNATION_FILTER: u32 = 17;

/// Registry operations used by the handlers.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// One page of protected areas matching the designation filter.
    async fn search_by_designation(&self, page: u32)
        -> Result<Vec<ProtectedAreaSummary>, AppError>;

    /// A full record with geometry, as a feature.
    async fn fetch_feature(&self, wdpaid: &str) -> Result<ProtectedAreaFeature, AppError>;

    /// Pages `1..=pages`, fetched one after another and concatenated in
    /// order. Any failed page fails the whole index.
    async fn fetch_all_pages(&self, pages: u32) -> Result<Vec<ProtectedAreaSummary>, AppError> {
        let mut result = Vec::new();
        for page in 1..=pages {
            result.extend(self.search_by_designation(page).await?);
        }
        Ok(result)
    }
}

/// Protected Planet API v3 client.
#[derive(Clone)]
pub struct ProtectedPlanetClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    protected_areas: Vec<SearchRecord>,
}

#[derive(Debug, Deserialize)]
struct SearchRecord {
    name: String,
    wdpa_id: u64,
}

#[derive(Debug, Deserialize)]
struct ProtectedAreaResponse {
    protected_area: JsonObject,
}

impl ProtectedPlanetClient {
    pub fn new(http: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// GET with the API token attached as a query parameter.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            // The URL carries the API token; keep it out of error messages.
            .map_err(|e| AppError::Registry(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Protected Planet rate limit hit (429)");
            }

            return Err(AppError::Registry(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Registry(format!("JSON parse error: {}", e.without_url())))
    }
}

#[async_trait]
impl RegistryClient for ProtectedPlanetClient {
    async fn search_by_designation(
        &self,
        page: u32,
    ) -> Result<Vec<ProtectedAreaSummary>, AppError> {
        let url = format!("{}/protected_areas/search", self.base_url);
        let response: SearchResponse = self
            .get_json(
                &url,
                &[
                    ("designation", DESIGNATION_FILTER.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;

        tracing::debug!(page, count = response.protected_areas.len(), "Registry search page");

        Ok(response
            .protected_areas
            .into_iter()
            .map(|record| ProtectedAreaSummary {
                name: record.name,
                wdpaid: record.wdpa_id,
            })
            .collect())
    }

    async fn fetch_feature(&self, wdpaid: &str) -> Result<ProtectedAreaFeature, AppError> {
        let url = format!(
            "{}/protected_areas/{}",
            self.base_url,
            urlencoding::encode(wdpaid)
        );
        let response: ProtectedAreaResponse = self
            .get_json(&url, &[("with_geometry", "1".to_string())])
            .await?;

        tracing::info!(wdpaid, "Fetched protected area");
        ProtectedAreaFeature::from_record(response.protected_area)
    }
}
