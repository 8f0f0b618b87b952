//! # Order Service
//!
//! One method per backend operation of the fulfillment app's order service.
//! Methods build an [`ApiRequest`], send it through the [`Dispatch`] seam and
//! hand back the backend's [`ApiResponse`] untouched; callers check
//! [`ApiResponse::has_error`] or use [`ApiResponse::into_result`].
//!
//! The exceptions are [`OrderService::get_shipment_items`], which fans out
//! over batches and returns typed records, and
//! [`OrderService::reject_item_notified`], the presentation wrapper around
//! [`OrderService::reject_item`].

mod reject;
mod shipments;
pub mod types;

pub use reject::{GENERIC_FAILURE_MESSAGE, REJECT_SUCCESS_MESSAGE};
pub use shipments::{
    classify_find, EntityFind, NO_RECORD_FOUND, SHIPMENT_ID_BATCH_SIZE, SHIPMENT_ITEM_VIEW_SIZE,
};
pub use types::{
    PerformFindRequest, Quantity, RejectItemPayload, RejectOrderItemParams, RejectedItem,
    ShipmentItem,
};

use crate::cache::{CacheConfig, CacheKey, CacheManager, MemoryCache};
use crate::config::ClientConfig;
use crate::transport::{ApiRequest, ApiResponse, Dispatch, HttpTransport};
use crate::{Error, ErrorContext, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) const SOLR_QUERY_PATH: &str = "solr-query";
pub(crate) const PERFORM_FIND_PATH: &str = "performFind";

/// Entries kept by the default in-memory response cache.
const DEFAULT_CACHE_ENTRIES: usize = 512;

pub struct OrderService<D: Dispatch = HttpTransport> {
    dispatch: Arc<D>,
    base_url: String,
    cache: Option<Arc<CacheManager>>,
    batch_concurrency: Option<usize>,
}

impl OrderService<HttpTransport> {
    /// HTTP-backed service with an in-memory response cache.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let base_url = transport.base_url().to_string();
        let cache = CacheManager::new(
            CacheConfig::new().with_ttl(config.cache_ttl),
            Box::new(MemoryCache::new(DEFAULT_CACHE_ENTRIES)),
        );
        Ok(Self::new(transport, base_url).with_cache(Arc::new(cache)))
    }
}

impl<D: Dispatch> OrderService<D> {
    /// `base_url` is the instance base URL, used where a call must name it
    /// explicitly (pick lists) and for cache keys.
    pub fn new(dispatch: D, base_url: impl Into<String>) -> Self {
        Self::from_shared(Arc::new(dispatch), base_url)
    }

    pub fn from_shared(dispatch: Arc<D>, base_url: impl Into<String>) -> Self {
        Self {
            dispatch,
            base_url: base_url.into(),
            cache: None,
            batch_concurrency: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Bound the number of concurrent requests a batched fetch may issue.
    pub fn with_batch_concurrency(mut self, n: usize) -> Self {
        self.batch_concurrency = Some(n.max(1));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> Option<&CacheManager> {
        self.cache.as_deref()
    }

    /// Send a request, serving cacheable ones from the response cache.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let cache = self.cache.as_deref().filter(|_| request.cacheable);
        let key = cache.map(|_| CacheKey::for_request(&request, &self.base_url));

        if let (Some(cache), Some(key)) = (cache, &key) {
            match cache.get(key).await {
                Ok(Some(hit)) => {
                    debug!(path = %request.path, "served from cache");
                    return Ok(hit);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, path = %request.path, "cache lookup failed"),
            }
        }

        let path = request.path.clone();
        let response = self.dispatch.invoke(request).await?;

        if let (Some(cache), Some(key)) = (cache, &key) {
            if let Err(e) = cache.put(key, &response).await {
                warn!(error = %e, path = %path, "cache store failed");
            }
        }
        Ok(response)
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.send(ApiRequest::post(path).json(body)).await
    }

    pub async fn get_open_orders(&self, query: Value) -> Result<ApiResponse> {
        self.post_json(SOLR_QUERY_PATH, query).await
    }

    pub async fn get_order_details(&self, query: Value) -> Result<ApiResponse> {
        self.post_json(SOLR_QUERY_PATH, query).await
    }

    pub async fn get_packed_orders(&self, query: Value) -> Result<ApiResponse> {
        self.post_json(SOLR_QUERY_PATH, query).await
    }

    pub async fn get_completed_orders(&self, query: Value) -> Result<ApiResponse> {
        self.post_json(SOLR_QUERY_PATH, query).await
    }

    /// Contact details rarely change during a session, so the answer is cached.
    pub async fn get_customer_contact_details(&self, order_id: &str) -> Result<ApiResponse> {
        let order_id = order_id.trim();
        if order_id.is_empty() {
            return Err(Error::validation_with_context(
                "order id must not be empty",
                ErrorContext::new()
                    .with_field_path("order_id")
                    .with_source("get_customer_contact_details"),
            ));
        }
        self.send(ApiRequest::get(format!("orders/{}", order_id)).cached())
            .await
    }

    pub async fn update_shipment(&self, payload: Value) -> Result<ApiResponse> {
        self.post_json("updateShipment", payload).await
    }

    pub async fn quick_ship_entire_ship_group(&self, payload: Value) -> Result<ApiResponse> {
        self.post_json("quickShipEntireShipGroup", payload).await
    }

    /// Forward a caller-built rejection body as-is. See also [`Self::reject_item`].
    pub async fn reject_order_item(&self, payload: Value) -> Result<ApiResponse> {
        self.post_json(reject::REJECT_ORDER_ITEM_PATH, payload).await
    }

    /// Create a pick list. The backend expects form fields, posted to the
    /// instance base URL.
    pub async fn create_picklist(&self, fields: Vec<(String, String)>) -> Result<ApiResponse> {
        self.send(
            ApiRequest::post("createPicklist")
                .multipart(fields)
                .with_base_url(self.base_url.clone()),
        )
        .await
    }

    pub async fn send_pickup_scheduled_notification(&self, payload: Value) -> Result<ApiResponse> {
        self.post_json("service/sendPickupScheduledNotification", payload)
            .await
    }

    pub async fn get_ship_to_store_orders(&self, query: Value) -> Result<ApiResponse> {
        self.post_json(PERFORM_FIND_PATH, query).await
    }

    pub async fn get_order_item_rej_history(&self, query: Value) -> Result<ApiResponse> {
        self.post_json(PERFORM_FIND_PATH, query).await
    }
}
