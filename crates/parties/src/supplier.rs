use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use backoffice_core::{EnvelopeShape, Entity, Resource, ResourceId};

use crate::customer::PartyStatus;

/// Supplier the back office buys from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    #[serde(default)]
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: PartyStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Supplier {
    /// Only active suppliers can receive new purchase orders.
    pub fn accepts_orders(&self) -> bool {
        self.status == PartyStatus::Active
    }
}

impl Entity for Supplier {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Resource for Supplier {
    const NAME: &'static str = "suppliers";
    const LABEL: &'static str = "Supplier";
    const PATH: &'static str = "/private/suppliers";
    const ENVELOPE: EnvelopeShape = EnvelopeShape::keyed(&["data", "suppliers"], &["data"]);
}
