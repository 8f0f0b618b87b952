//! Item rejection.

use super::types::{
    RejectItemPayload, RejectOrderItemParams, PICKUP_REJECTED_FACILITY, STORE_PICKUP,
};
use super::OrderService;
use crate::notify::{LoadingGuard, UiSink};
use crate::transport::{ApiRequest, ApiResponse, Dispatch};
use crate::{Error, ErrorContext, Result};
use serde_json::json;
use tracing::error;

pub(crate) const REJECT_ORDER_ITEM_PATH: &str = "rejectOrderItem";

pub const REJECT_SUCCESS_MESSAGE: &str = "Item has been rejected successfully";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

impl RejectOrderItemParams {
    /// Build the backend parameters for a rejection.
    ///
    /// Store pickup rejections are routed to the [`PICKUP_REJECTED_FACILITY`]
    /// facility; other shipment methods carry no `naFacilityId` at all.
    pub fn from_payload(payload: &RejectItemPayload) -> Result<Self> {
        let item = &payload.item;
        let quantity = item.quantity.to_integer().ok_or_else(|| {
            Error::validation_with_context(
                "quantity is not an integer",
                ErrorContext::new()
                    .with_field_path("item.quantity")
                    .with_details(format!("{:?}", item.quantity))
                    .with_source("reject_item"),
            )
        })?;

        let method = payload.shipment_method_enum_id.as_deref();
        let na_facility_id = match method {
            Some(STORE_PICKUP) => Some(PICKUP_REJECTED_FACILITY.to_string()),
            _ => None,
        };

        Ok(Self {
            order_id: payload.order_id.clone(),
            reject_reason: item.reason.clone(),
            facility_id: item.facility_id.clone(),
            order_item_seq_id: item.order_item_seq_id.clone(),
            shipment_method_type_id: method.map(str::to_string),
            quantity,
            na_facility_id,
        })
    }
}

impl<D: Dispatch> OrderService<D> {
    /// Reject an order item. The response is returned as received; nothing is
    /// dispatched when the quantity has no integer value.
    pub async fn reject_item(&self, payload: &RejectItemPayload) -> Result<ApiResponse> {
        let params = RejectOrderItemParams::from_payload(payload)?;
        let body = json!({ "payload": serde_json::to_value(&params)? });
        self.send(ApiRequest::post(REJECT_ORDER_ITEM_PATH).json(body))
            .await
    }

    /// [`Self::reject_item`] with a loader shown for the duration of the call
    /// and a toast reporting the outcome.
    pub async fn reject_item_notified(
        &self,
        payload: &RejectItemPayload,
        sink: &dyn UiSink,
    ) -> Result<ApiResponse> {
        let _loader = LoadingGuard::present(sink);
        match self.reject_item(payload).await {
            Ok(resp) => {
                if resp.has_error() {
                    sink.toast(GENERIC_FAILURE_MESSAGE);
                } else {
                    sink.toast(REJECT_SUCCESS_MESSAGE);
                }
                Ok(resp)
            }
            Err(e) => {
                error!(error = %e, order_id = %payload.order_id, "item rejection failed");
                sink.toast(GENERIC_FAILURE_MESSAGE);
                Err(e)
            }
        }
    }
}
