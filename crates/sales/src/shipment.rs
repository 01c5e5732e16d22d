use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use backoffice_core::{EnvelopeShape, Entity, Resource, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    #[default]
    Pending,
    InTransit,
    Delivered,
    Returned,
    #[serde(other)]
    Unknown,
}

/// Outbound shipment of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    #[serde(default)]
    pub id: ResourceId,
    #[serde(default)]
    pub order_id: Option<ResourceId>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub status: ShipmentStatus,
    #[serde(default)]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Shipment {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Resource for Shipment {
    const NAME: &'static str = "shipments";
    const LABEL: &'static str = "Shipment";
    const PATH: &'static str = "/private/shipments";
    const ENVELOPE: EnvelopeShape = EnvelopeShape::keyed(&["data", "shipments"], &["data"]);
}
