// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Expiring key-value cache and the read-through helper built on it.
//!
//! Values are stored as JSON strings. Writes use add-if-absent semantics:
//! the first value stored under a key stays authoritative until it expires.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// External ephemeral key-value store.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a live value.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` unless a live value already exists.
    /// Returns true if the value was stored.
    async fn add(&self, key: &str, value: String, ttl: Duration) -> bool;
}

#[derive(Clone)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// In-process cache store shared across requests.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet replaced.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Utc::now();
        let entry = self.entries.get(key)?;
        if entry.is_live(now) {
            return Some(entry.value.clone());
        }
        drop(entry);
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    async fn add(&self, key: &str, value: String, ttl: Duration) -> bool {
        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let entry = CacheEntry { value, expires_at };

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    return false;
                }
                occupied.insert(entry);
                true
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                true
            }
        }
    }
}

/// Cache-or-compute over a [`CacheStore`].
#[derive(Clone)]
pub struct ReadThroughCache {
    store: Arc<dyn CacheStore>,
}

impl ReadThroughCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Return the stored string for `key`, or run `loader`, store its output
    /// with `ttl` and return it. Nothing is stored when the loader fails.
    pub async fn get_or_load_raw<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> Result<String, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, AppError>>,
    {
        if let Some(value) = self.store.get(key).await {
            tracing::debug!(key, "Cache hit");
            return Ok(value);
        }

        tracing::debug!(key, "Cache miss");
        let value = loader().await?;

        if !self.store.add(key, value.clone(), ttl).await {
            // Lost a race with a concurrent miss; the stored value stays.
            tracing::debug!(key, "Cache entry already present, not overwritten");
        }
        Ok(value)
    }

    /// Typed variant of [`get_or_load_raw`](Self::get_or_load_raw), storing
    /// values as JSON. A stored value that no longer parses is reloaded.
    pub async fn get_or_load<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(raw) = self.store.get(key).await {
            match serde_json::from_str(&raw) {
                Ok(value) => {
                    tracing::debug!(key, "Cache hit");
                    return Ok(value);
                }
                Err(e) => tracing::warn!(key, error = %e, "Unreadable cache entry, reloading"),
            }
        }

        tracing::debug!(key, "Cache miss");
        let value = loader().await?;
        let raw = serde_json::to_string(&value)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize {}: {}", key, e)))?;
        self.store.add(key, raw, ttl).await;
        Ok(value)
    }
}
