// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cached transition statistics per protected area.

use crate::error::AppError;
use crate::models::transition::join_transition_stats;
use crate::models::{LookupKind, LookupTable};
use crate::services::cache::{CacheStore, ReadThroughCache};
use crate::services::earth_engine::{GeospatialClient, ANALYSIS_SCALE};
use crate::services::registry::RegistryClient;
use std::sync::Arc;
use std::time::Duration;

/// Lookup tables and per-polygon statistics, read through the shared cache.
///
/// Concurrent misses for one polygon are not coordinated. Both requests
/// compute, the first stored result stays, and both return equal output
/// because the computation is deterministic.
#[derive(Clone)]
pub struct TransitionService {
    registry: Arc<dyn RegistryClient>,
    geospatial: Arc<dyn GeospatialClient>,
    cache: ReadThroughCache,
    expiration: Duration,
}

impl TransitionService {
    pub fn new(
        registry: Arc<dyn RegistryClient>,
        geospatial: Arc<dyn GeospatialClient>,
        store: Arc<dyn CacheStore>,
        expiration: Duration,
    ) -> Self {
        Self {
            registry,
            geospatial,
            cache: ReadThroughCache::new(store),
            expiration,
        }
    }

    /// Class code → name or color table, built from dataset metadata on miss.
    pub async fn get_or_build_lookup(&self, kind: LookupKind) -> Result<LookupTable, AppError> {
        self.cache
            .get_or_load(kind.cache_key(), self.expiration, || {
                self.geospatial.fetch_category_metadata(kind)
            })
            .await
    }

    /// Serialized `[[label, km2, color], ...]` for a protected area.
    ///
    /// On a hit the stored string is returned unchanged.
    pub async fn get_or_compute_stats(&self, wdpaid: &str) -> Result<String, AppError> {
        self.cache
            .get_or_load_raw(wdpaid, self.expiration, || self.compute_stats(wdpaid))
            .await
    }

    async fn compute_stats(&self, wdpaid: &str) -> Result<String, AppError> {
        tracing::info!(wdpaid, "Computing transition statistics");

        let feature = self.registry.fetch_feature(wdpaid).await?;
        let sums = self
            .geospatial
            .compute_transition_stats(&feature, ANALYSIS_SCALE)
            .await?;

        let names = self.get_or_build_lookup(LookupKind::Names).await?;
        let colors = self.get_or_build_lookup(LookupKind::Colors).await?;
        let stats = join_transition_stats(&sums, &names, &colors)?;

        serde_json::to_string(&stats).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to serialize statistics: {}", e))
        })
    }
}
