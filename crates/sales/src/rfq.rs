use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use backoffice_core::{EnvelopeShape, Entity, Resource, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RfqStatus {
    #[default]
    Open,
    Quoted,
    Accepted,
    Rejected,
    Closed,
    #[serde(other)]
    Unknown,
}

/// Request for quotation raised by a customer.
///
/// The RFQ endpoints wrap everything one level deeper than the rest:
/// `{ data: { rfqs: [...] } }` for lists and `{ data: { rfq: {...} } }` for details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rfq {
    #[serde(default)]
    pub id: ResourceId,
    #[serde(default)]
    pub rfq_number: Option<String>,
    #[serde(default)]
    pub customer_id: Option<ResourceId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub status: RfqStatus,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Rfq {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Resource for Rfq {
    const NAME: &'static str = "rfqs";
    const LABEL: &'static str = "RFQ";
    const PATH: &'static str = "/private/rfqs";
    const ENVELOPE: EnvelopeShape = EnvelopeShape::keyed(&["data", "rfqs"], &["data", "rfq"]);
}
