use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use backoffice_core::{EnvelopeShape, Entity, Resource, ResourceId};

/// Customer order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Orders in these states can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }
}

/// Order line as stored on the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub product_id: Option<ResourceId>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn amount(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub id: ResourceId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub customer_id: Option<ResourceId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Sum of line amounts; compared against the server's `totalAmount` in reports.
    pub fn lines_total(&self) -> Decimal {
        self.items.iter().map(OrderLine::amount).sum()
    }
}

impl Entity for Order {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Resource for Order {
    const NAME: &'static str = "orders";
    const LABEL: &'static str = "Order";
    const PATH: &'static str = "/private/orders";
    const ENVELOPE: EnvelopeShape = EnvelopeShape::keyed(&["data", "items"], &["data", "order"]);
}
