//! Transport seam between the order service and the backend.
//!
//! Every backend call is described by an [`ApiRequest`] and answered by an
//! [`ApiResponse`]. [`Dispatch`] is the single async seam; [`HttpTransport`]
//! is the production implementation, tests substitute their own.

mod http;

pub use http::HttpTransport;

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Text fields sent as `multipart/form-data`.
    Multipart(Vec<(String, String)>),
}

/// Description of a single backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Path relative to the base URL, e.g. `performFind` or `orders/10001`.
    pub path: String,
    pub body: RequestBody,
    /// Overrides the transport's base URL for this call only.
    pub base_url: Option<String>,
    /// Successful responses may be served from the response cache.
    pub cacheable: bool,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            base_url: None,
            cacheable: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn cached(mut self) -> Self {
        self.cacheable = true;
        self
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// A response as received from the backend, whatever its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

/// Keys the backend uses to report errors inside an otherwise successful body.
const ERROR_KEYS: [&str; 3] = ["_ERROR_MESSAGE_", "_ERROR_MESSAGE_LIST_", "error"];

impl ApiResponse {
    pub fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }

    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the backend reported a failure: a non-2xx status, a body that
    /// is not a JSON object or array, or any of the backend error keys set.
    pub fn has_error(&self) -> bool {
        if !self.is_success_status() {
            return true;
        }
        match &self.data {
            Value::Object(map) => ERROR_KEYS
                .iter()
                .any(|k| map.get(*k).map(is_truthy).unwrap_or(false)),
            Value::Array(_) => false,
            _ => true,
        }
    }

    /// The backend's error message, if the body carries one.
    pub fn error_message(&self) -> Option<String> {
        let map = self.data.as_object()?;
        ERROR_KEYS.iter().find_map(|k| {
            let v = map.get(*k).filter(|v| is_truthy(v))?;
            Some(match v {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                    .collect::<Vec<_>>()
                    .join("; "),
                Value::Object(o) => o
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| v.to_string()),
                other => other.to_string(),
            })
        })
    }

    /// The exact value of the `error` field, used for sentinel matching.
    pub fn error_field(&self) -> Option<&str> {
        self.data.get("error").and_then(Value::as_str)
    }

    /// Describe the failure for diagnostics.
    pub fn failure_reason(&self) -> String {
        self.error_message().unwrap_or_else(|| match &self.data {
            Value::String(s) if !s.is_empty() => format!("HTTP {}: {}", self.status, s),
            _ => format!("HTTP {}", self.status),
        })
    }

    /// Convert into the response body, or [`Error::Remote`] if `has_error()`.
    pub fn into_result(self) -> Result<Value> {
        if self.has_error() {
            return Err(Error::Remote {
                status: self.status,
                message: self.failure_reason(),
                data: self.data,
            });
        }
        Ok(self.data)
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The seam every backend call goes through.
///
/// Implementations return `Ok` for any response the backend produced,
/// including error statuses; `Err` is reserved for transport failures.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn invoke(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: Dispatch + ?Sized> Dispatch for Arc<T> {
    async fn invoke(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).invoke(request).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
