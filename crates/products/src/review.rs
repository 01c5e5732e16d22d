use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use backoffice_core::{EnvelopeShape, Entity, Resource, ResourceId};

/// Moderation state of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// Customer review of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default)]
    pub id: ResourceId,
    #[serde(default)]
    pub product_id: Option<ResourceId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Review {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Resource for Review {
    const NAME: &'static str = "reviews";
    const LABEL: &'static str = "Review";
    const PATH: &'static str = "/private/reviews";
    const ENVELOPE: EnvelopeShape = EnvelopeShape::keyed(&["data", "reviews"], &["data"]);
}
