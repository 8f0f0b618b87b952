//! Cache manager.

use super::backend::CacheBackend;
use super::key::CacheKey;
use crate::transport::ApiResponse;
use crate::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub default_ttl: Duration,
    pub enabled: bool,
    pub max_entry_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(crate::config::DEFAULT_CACHE_TTL_SECS),
            enabled: true,
            max_entry_size: 1024 * 1024,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Response cache in front of a [`CacheBackend`].
///
/// Only successful responses are stored; entries that fail to decode count as
/// misses.
pub struct CacheManager {
    config: CacheConfig,
    backend: Box<dyn CacheBackend>,
    stats: AtomicStats,
}

impl CacheManager {
    pub fn new(config: CacheConfig, backend: Box<dyn CacheBackend>) -> Self {
        Self {
            config,
            backend,
            stats: AtomicStats::default(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Result<Option<ApiResponse>> {
        if !self.config.enabled {
            return Ok(None);
        }
        match self.backend.get(key).await {
            Ok(Some(data)) => match serde_json::from_slice(&data) {
                Ok(resp) => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    Ok(Some(resp))
                }
                Err(_) => {
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    self.stats.misses.fetch_add(1, Ordering::Relaxed);
                    Ok(None)
                }
            },
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Store `response` unless it carries an error or exceeds the size limit.
    pub async fn put(&self, key: &CacheKey, response: &ApiResponse) -> Result<()> {
        if !self.config.enabled || response.has_error() || self.config.default_ttl.is_zero() {
            return Ok(());
        }
        let data = serde_json::to_vec(response)?;
        if data.len() > self.config.max_entry_size {
            return Ok(());
        }
        match self.backend.set(key, &data, self.config.default_ttl).await {
            Ok(()) => {
                self.stats.sets.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub async fn invalidate(&self, key: &CacheKey) -> Result<bool> {
        self.backend.delete(key).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.backend.clear().await
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}
