use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use backoffice_core::{EnvelopeShape, Entity, Resource, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
    #[serde(other)]
    Unknown,
}

/// Physical warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    #[serde(default)]
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub capacity: Option<u64>,
    #[serde(default)]
    pub status: WarehouseStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Warehouse {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Resource for Warehouse {
    const NAME: &'static str = "warehouses";
    const LABEL: &'static str = "Warehouse";
    const PATH: &'static str = "/private/warehouses";
    const ENVELOPE: EnvelopeShape = EnvelopeShape::keyed(&["warehouses"], &["warehouse"]);
}
