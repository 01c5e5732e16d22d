use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use backoffice_core::{Entity, Resource, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    #[default]
    Pending,
    Approved,
    Completed,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// Money returned to a customer against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundTransaction {
    #[serde(default)]
    pub id: ResourceId,
    #[serde(default)]
    pub order_id: Option<ResourceId>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: RefundStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for RefundTransaction {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Resource for RefundTransaction {
    const NAME: &'static str = "refund-transactions";
    const LABEL: &'static str = "Refund transaction";
    const PATH: &'static str = "/private/refund-transactions";
}
