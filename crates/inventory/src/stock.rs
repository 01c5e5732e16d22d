use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use backoffice_core::{EnvelopeShape, Entity, Resource, ResourceId};

/// Derived stock level of an inventory line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    InStock,
}

/// Classify a quantity against a reorder threshold.
pub fn stock_level(quantity: i64, reorder_level: i64) -> StockLevel {
    if quantity <= 0 {
        StockLevel::OutOfStock
    } else if quantity <= reorder_level {
        StockLevel::Low
    } else {
        StockLevel::InStock
    }
}

/// One product's stock across the inventory listing (`/private/inventory`).
///
/// This endpoint answers `{ inventory: [...], pagination: {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(default)]
    pub id: ResourceId,
    #[serde(default)]
    pub product_id: Option<ResourceId>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub reorder_level: i64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InventoryItem {
    pub fn level(&self) -> StockLevel {
        stock_level(self.quantity, self.reorder_level)
    }
}

impl Entity for InventoryItem {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Resource for InventoryItem {
    const NAME: &'static str = "inventory";
    const LABEL: &'static str = "Inventory item";
    const PATH: &'static str = "/private/inventory";
    const ENVELOPE: EnvelopeShape = EnvelopeShape::keyed(&["inventory"], &["data"]);
}

/// Stock of one product held in one warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseStock {
    #[serde(default)]
    pub id: ResourceId,
    #[serde(default)]
    pub warehouse_id: Option<ResourceId>,
    #[serde(default)]
    pub product_id: Option<ResourceId>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub reserved: i64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WarehouseStock {
    /// Quantity not held by open orders; never negative.
    pub fn available(&self) -> i64 {
        (self.quantity - self.reserved).max(0)
    }
}

impl Entity for WarehouseStock {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Resource for WarehouseStock {
    const NAME: &'static str = "warehouse-stock";
    const LABEL: &'static str = "Warehouse stock";
    const PATH: &'static str = "/private/warehouse-stock";
    const ENVELOPE: EnvelopeShape = EnvelopeShape::keyed(&["data", "stock"], &["data"]);
}
