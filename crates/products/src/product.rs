use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use backoffice_core::{Entity, Resource, ResourceId};

/// Product status lifecycle as reported by the catalog endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Draft,
    Archived,
    #[serde(other)]
    Unknown,
}

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Attributes this client does not model (images, dimensions, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Check if the product can be put on a purchase or sales order.
    pub fn is_orderable(&self) -> bool {
        self.status == ProductStatus::Active
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

impl Entity for Product {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Resource for Product {
    const NAME: &'static str = "products";
    const LABEL: &'static str = "Product";
    const PATH: &'static str = "/private/products";
}

/// Create/update payload for a product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub price: Decimal,
    pub stock: i64,
    pub status: ProductStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            sku: product.sku.clone(),
            category: product.category.clone(),
            price: product.price,
            stock: product.stock,
            status: product.status,
            description: product.description.clone(),
        }
    }
}
