//! Cache key generation.

use crate::transport::{ApiRequest, HttpMethod, RequestBody};
use sha2::{Digest, Sha256};

/// Hashed identity of a cacheable request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub hash: String,
}

impl CacheKey {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// Key over method, base URL, path and body.
    pub fn for_request(request: &ApiRequest, default_base_url: &str) -> Self {
        let base = request.base_url.as_deref().unwrap_or(default_base_url);
        Self::with_body(request.method, base, &request.path, &request.body)
    }

    pub fn from_parts(method: HttpMethod, base_url: &str, path: &str) -> Self {
        Self::with_body(method, base_url, path, &RequestBody::Empty)
    }

    pub fn with_body(method: HttpMethod, base_url: &str, path: &str, body: &RequestBody) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(method.as_str().as_bytes());
        hasher.update(b"\n");
        hasher.update(base_url.trim_end_matches('/').as_bytes());
        hasher.update(b"\n");
        hasher.update(path.trim_start_matches('/').as_bytes());
        match body {
            RequestBody::Empty => {}
            RequestBody::Json(value) => {
                hasher.update(b"\njson\n");
                // serde_json keeps object keys sorted, so equal bodies hash equally.
                hasher.update(value.to_string().as_bytes());
            }
            RequestBody::Multipart(fields) => {
                hasher.update(b"\nform");
                for (name, value) in fields {
                    hasher.update(b"\n");
                    hasher.update(name.as_bytes());
                    hasher.update(b"=");
                    hasher.update(value.as_bytes());
                }
            }
        }
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Self::new(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}
