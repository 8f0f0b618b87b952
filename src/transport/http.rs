use super::{ApiRequest, ApiResponse, Dispatch, HttpMethod, RequestBody, TransportError};
use crate::config::ClientConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Proxy;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use uuid::Uuid;

/// reqwest-backed [`Dispatch`] implementation.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    inflight: Option<Arc<Semaphore>>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy URL: {}", e),
                    crate::ErrorContext::new()
                        .with_field_path("proxy_url")
                        .with_source("http_transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.base_url()?,
            token: config.token.clone(),
            inflight: config
                .max_inflight
                .map(|n| Arc::new(Semaphore::new(n.max(1)))),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Permits currently free under the in-flight cap, `None` when uncapped.
    pub fn available_permits(&self) -> Option<usize> {
        self.inflight.as_ref().map(|sem| sem.available_permits())
    }

    fn build(&self, request: ApiRequest, request_id: &str) -> reqwest::RequestBuilder {
        let base = request.base_url.as_deref().unwrap_or(&self.base_url);
        let url = join_url(base, &request.path);

        let mut req = match request.method {
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
            HttpMethod::Get => self.client.get(&url),
        };

        req = match request.body {
            RequestBody::Empty => req,
            RequestBody::Json(body) => req.json(&body),
            RequestBody::Multipart(fields) => {
                let form = fields
                    .into_iter()
                    .fold(reqwest::multipart::Form::new(), |form, (k, v)| form.text(k, v));
                req.multipart(form)
            }
        };

        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req.header("x-request-id", request_id)
    }
}

#[async_trait]
impl Dispatch for HttpTransport {
    async fn invoke(&self, request: ApiRequest) -> Result<ApiResponse> {
        // Held until the body is read.
        let _permit = match &self.inflight {
            Some(sem) => Some(
                sem.clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| TransportError::Other("in-flight semaphore closed".into()))?,
            ),
            None => None,
        };

        let request_id = Uuid::new_v4().to_string();
        let method = request.method;
        let path = request.path.clone();
        let started = Instant::now();

        let response = self
            .build(request, &request_id)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    %method,
                    path = %path,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    request_id = %request_id,
                    error = %e,
                    "backend call failed"
                );
                TransportError::Http(e)
            })?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            warn!(
                %method,
                path = %path,
                status,
                request_id = %request_id,
                error = %e,
                "reading backend response failed"
            );
            TransportError::Http(e)
        })?;

        debug!(
            %method,
            path = %path,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            request_id = %request_id,
            "backend call completed"
        );

        let data = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str::<serde_json::Value>(&text).unwrap_or(serde_json::Value::String(text))
        };
        Ok(ApiResponse::new(status, data))
    }
}

/// Join a base URL and a relative path with exactly one slash.
/// Absolute `http(s)://` paths are returned unchanged.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
