//! Order-domain request and record types.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Shipment method whose rejections are parked at [`PICKUP_REJECTED_FACILITY`].
pub const STORE_PICKUP: &str = "STOREPICKUP";
pub const PICKUP_REJECTED_FACILITY: &str = "PICKUP_REJECTED";

/// Item rejection as submitted from a fulfillment screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectItemPayload {
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_method_enum_id: Option<String>,
    pub item: RejectedItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedItem {
    pub reason: String,
    pub facility_id: String,
    pub order_item_seq_id: String,
    pub quantity: Quantity,
}

/// A quantity as it arrives from forms: either a number or its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

impl Quantity {
    /// Integer value: numbers are truncated, text yields its leading integer
    /// (`" 3 units"` is 3). `None` when there is no integer to read.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            Quantity::Number(n) => {
                if !n.is_finite() || n.abs() >= i64::MAX as f64 {
                    return None;
                }
                Some(n.trunc() as i64)
            }
            Quantity::Text(s) => leading_integer(s),
        }
    }
}

impl From<i64> for Quantity {
    fn from(n: i64) -> Self {
        Quantity::Number(n as f64)
    }
}

impl From<&str> for Quantity {
    fn from(s: &str) -> Self {
        Quantity::Text(s.to_string())
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: &str = rest
        .find(|c: char| !c.is_ascii_digit())
        .map_or(rest, |end| &rest[..end]);
    if digits.is_empty() {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Body of the `rejectOrderItem` call, wrapped as `{ "payload": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectOrderItemParams {
    pub order_id: String,
    pub reject_reason: String,
    pub facility_id: String,
    pub order_item_seq_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_method_type_id: Option<String>,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub na_facility_id: Option<String>,
}

/// Body of a `performFind` entity lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformFindRequest {
    pub input_fields: Map<String, Value>,
    pub view_size: u32,
    pub entity_name: String,
    #[serde(serialize_with = "yes_no")]
    pub no_condition_find: bool,
    pub field_list: Vec<String>,
}

impl PerformFindRequest {
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            input_fields: Map::new(),
            view_size: 20,
            entity_name: entity_name.into(),
            no_condition_find: false,
            field_list: Vec::new(),
        }
    }
    pub fn with_input(mut self, field: impl Into<String>, value: Value) -> Self {
        self.input_fields.insert(field.into(), value);
        self
    }
    pub fn with_view_size(mut self, n: u32) -> Self {
        self.view_size = n;
        self
    }
    pub fn with_no_condition_find(mut self, enabled: bool) -> Self {
        self.no_condition_find = enabled;
        self
    }
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_list = fields.into_iter().map(Into::into).collect();
        self
    }
}

fn yes_no<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "Y" } else { "N" })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentItem {
    pub shipment_id: String,
    #[serde(default)]
    pub product_id: Option<String>,
    pub shipment_item_seq_id: String,
}
