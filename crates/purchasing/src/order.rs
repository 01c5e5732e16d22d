use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use backoffice_core::{Entity, Resource, ResourceId};

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    Ordered,
    Received,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl PurchaseOrderStatus {
    /// Goods can only be booked in once the supplier has the order.
    pub fn can_receive(&self) -> bool {
        matches!(self, PurchaseOrderStatus::Approved | PurchaseOrderStatus::Ordered)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    Standard,
    Express,
    Overnight,
    Freight,
    Pickup,
    #[serde(other)]
    Unknown,
}

/// Purchase order line as the purchasing endpoints store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub product_id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price: Decimal,
    #[serde(default)]
    pub amount: Decimal,
}

/// Purchase order. The purchasing endpoints speak snake_case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    #[serde(default)]
    pub id: ResourceId,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<ResourceId>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub status: PurchaseOrderStatus,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "date_or_datetime")]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<PurchaseOrderLine>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub shipping_method: Option<ShippingMethod>,
    #[serde(default)]
    pub shipping_cost: Decimal,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PurchaseOrder {
    /// Order total plus shipping, saturating at `Decimal::MAX`.
    pub fn grand_total(&self) -> Decimal {
        self.total_amount.saturating_add(self.shipping_cost)
    }
}

impl Entity for PurchaseOrder {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Resource for PurchaseOrder {
    const NAME: &'static str = "purchase-orders";
    const LABEL: &'static str = "Purchase order";
    const PATH: &'static str = "/private/purchase-orders";
}

/// Create payload: the whole order in one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePurchaseOrder {
    pub supplier_id: ResourceId,
    pub status: PurchaseOrderStatus,
    pub currency: String,
    pub expected_delivery_date: NaiveDate,
    pub items: Vec<PurchaseOrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    pub shipping_method: ShippingMethod,
    pub shipping_cost: Decimal,
    pub total_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Accepts `2024-05-01` as well as a full timestamp; the backend echoes
/// dates back as midnight UTC timestamps.
fn date_or_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| Some(ts.with_timezone(&Utc).date_naive()))
        .map_err(serde::de::Error::custom)
}
