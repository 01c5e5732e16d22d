use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use backoffice_core::{EnvelopeShape, Entity, Resource, ResourceId};

/// Party status lifecycle (shared by customers and suppliers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    Blocked,
    #[serde(other)]
    Unknown,
}

/// Customer account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: PartyStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Customer {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Resource for Customer {
    const NAME: &'static str = "customers";
    const LABEL: &'static str = "Customer";
    const PATH: &'static str = "/private/customers";
    const ENVELOPE: EnvelopeShape = EnvelopeShape::keyed(&["data", "customers"], &["data"]);
}

/// Shipping/billing address stored under a customer.
///
/// Addresses are not a top-level REST collection (they live at
/// `/private/customers/:id/addresses`), so this is an `Entity` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddress {
    #[serde(default)]
    pub id: ResourceId,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomerAddress {
    /// Single-line form used in dropdowns and purchase-order shipping fields.
    pub fn one_line(&self) -> String {
        let mut parts: Vec<&str> = vec![self.line1.as_str()];
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.is_empty()) {
            parts.push(line2);
        }
        parts.push(self.city.as_str());
        if let Some(code) = self.postal_code.as_deref().filter(|c| !c.is_empty()) {
            parts.push(code);
        }
        if let Some(country) = self.country.as_deref().filter(|c| !c.is_empty()) {
            parts.push(country);
        }
        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Entity for CustomerAddress {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
