//! Batched entity lookups over `performFind`.

use super::types::{PerformFindRequest, ShipmentItem};
use super::{OrderService, PERFORM_FIND_PATH};
use crate::batch::{batch_count, BatchFetcher, BatchFetcherConfig, Classification};
use crate::transport::{ApiRequest, ApiResponse, Dispatch};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Error text the backend sends when a find matches nothing.
pub const NO_RECORD_FOUND: &str = "No record found";

pub const SHIPMENT_ID_BATCH_SIZE: usize = 20;
pub const SHIPMENT_ITEM_VIEW_SIZE: u32 = 250;

/// Shape of a batched lookup: which entity, which id field is filtered on,
/// which fields come back.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityFind {
    pub entity_name: String,
    pub id_field: String,
    pub field_list: Vec<String>,
    pub view_size: u32,
    pub batch_size: usize,
}

impl EntityFind {
    pub fn new(entity_name: impl Into<String>, id_field: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            id_field: id_field.into(),
            field_list: Vec::new(),
            view_size: SHIPMENT_ITEM_VIEW_SIZE,
            batch_size: SHIPMENT_ID_BATCH_SIZE,
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_list = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_view_size(mut self, view_size: u32) -> Self {
        self.view_size = view_size;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn shipment_items() -> Self {
        Self::new("ShipmentItem", "shipmentId").with_fields([
            "shipmentId",
            "productId",
            "shipmentItemSeqId",
        ])
    }

    pub fn request_for(&self, ids: &[String]) -> ApiRequest {
        let body = PerformFindRequest::new(self.entity_name.clone())
            .with_input(self.id_field.clone(), Value::from(ids.to_vec()))
            .with_view_size(self.view_size)
            .with_no_condition_find(true)
            .with_fields(self.field_list.iter().cloned());
        // A struct of strings and maps always serializes.
        let body = serde_json::to_value(body).unwrap_or_default();
        ApiRequest::post(PERFORM_FIND_PATH).json(body)
    }
}

/// Classify a `performFind` response.
///
/// The exact [`NO_RECORD_FOUND`] error is an empty result. Any other error,
/// or `docs` that do not decode as `T`, fails the batch.
pub fn classify_find<T: DeserializeOwned>(response: &ApiResponse) -> Classification<T> {
    if response.error_field() == Some(NO_RECORD_FOUND) {
        return Classification::Empty;
    }
    if response.has_error() {
        return Classification::Failed(response.failure_reason());
    }
    match response.data.get("docs") {
        None | Some(Value::Null) => Classification::Records(Vec::new()),
        Some(docs) => match Vec::<T>::deserialize(docs) {
            Ok(records) => Classification::Records(records),
            Err(e) => Classification::Failed(format!("malformed docs: {}", e)),
        },
    }
}

impl<D: Dispatch> OrderService<D> {
    /// Fetch every record of `find.entity_name` whose id field is in `ids`,
    /// one `performFind` per batch of `find.batch_size` ids.
    ///
    /// Records come back in id-batch order. Any batch failing with something
    /// other than [`NO_RECORD_FOUND`] fails the whole call with
    /// [`Error::BatchFailed`].
    pub async fn find_all_by_ids<T: DeserializeOwned>(
        &self,
        find: &EntityFind,
        ids: Vec<String>,
    ) -> Result<Vec<T>> {
        let total = ids.len();
        let mut config = BatchFetcherConfig::new(find.batch_size);
        if let Some(n) = self.batch_concurrency {
            config = config.with_max_concurrency(n);
        }

        let outcome = BatchFetcher::with_config(config)
            .fetch_all(
                ids,
                |batch| find.request_for(batch),
                |request| self.send(request),
                classify_find::<T>,
            )
            .await;

        match outcome {
            Ok(records) => {
                debug!(
                    entity = %find.entity_name,
                    ids = total,
                    batches = batch_count(total, find.batch_size),
                    records = records.len(),
                    "batched find completed"
                );
                Ok(records)
            }
            Err(e) => {
                for failure in e.failed() {
                    warn!(
                        entity = %find.entity_name,
                        batch = failure.index,
                        reason = %failure.reason,
                        "batch failed"
                    );
                }
                Err(Error::from(e))
            }
        }
    }

    /// Items of the given shipments, fetched in batches of
    /// [`SHIPMENT_ID_BATCH_SIZE`].
    pub async fn get_shipment_items(&self, shipment_ids: Vec<String>) -> Result<Vec<ShipmentItem>> {
        self.find_all_by_ids(&EntityFind::shipment_items(), shipment_ids)
            .await
    }
}
