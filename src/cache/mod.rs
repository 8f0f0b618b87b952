//! # Response Caching Module
//!
//! Caches successful responses to cacheable requests (for example customer
//! contact details, which rarely change within a session).
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheManager`] | TTL, size limit and hit/miss statistics |
//! | [`CacheBackend`] | Trait for storage backends |
//! | [`MemoryCache`] | In-memory backend with LRU eviction |
//! | [`NullCache`] | No-op backend |
//! | [`CacheKey`] | SHA-256 over method, base URL, path and body |

mod backend;
mod key;
mod manager;

pub use backend::{CacheBackend, MemoryCache, NullCache};
pub use key::CacheKey;
pub use manager::{CacheConfig, CacheManager, CacheStats};
