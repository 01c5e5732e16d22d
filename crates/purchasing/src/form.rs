//! Purchase order entry form.

use thiserror::Error;
use tracing::{debug, info};

use backoffice_client::ServiceError;
use backoffice_core::{DomainResult, ListEnvelope, ListParams};
use backoffice_products::Product;
use backoffice_query::{QueryState, ResourceHooks};

use crate::draft::{FieldErrors, PurchaseOrderDraft};
use crate::order::PurchaseOrder;

/// How many products one lookup returns.
pub const PRODUCT_LOOKUP_LIMIT: u32 = 20;

#[derive(Debug, Error)]
pub enum SubmitError {
    /// The draft was rejected before anything was sent.
    #[error("purchase order is incomplete: {0}")]
    Invalid(#[from] FieldErrors),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Draft plus the resources it talks to.
pub struct PurchaseOrderForm {
    draft: PurchaseOrderDraft,
    field_errors: FieldErrors,
    orders: ResourceHooks<PurchaseOrder>,
    products: ResourceHooks<Product>,
}

impl PurchaseOrderForm {
    pub fn new(orders: ResourceHooks<PurchaseOrder>, products: ResourceHooks<Product>) -> Self {
        Self {
            draft: PurchaseOrderDraft::new(),
            field_errors: FieldErrors::default(),
            orders,
            products,
        }
    }

    /// Starts from an existing draft; totals are recomputed on the way in.
    pub fn with_draft(mut self, mut draft: PurchaseOrderDraft) -> DomainResult<Self> {
        draft.recalculate()?;
        self.draft = draft;
        Ok(self)
    }

    pub fn draft(&self) -> &PurchaseOrderDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut PurchaseOrderDraft {
        &mut self.draft
    }

    /// Messages from the last rejected submit. Cleared by the next submit.
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn is_submitting(&self) -> bool {
        self.orders.create_state().is_pending()
    }

    /// Validates and creates the order in one request.
    ///
    /// An invalid draft never reaches the network. On a server error the draft
    /// stays as entered (the mutation has already notified the user); on
    /// success it is cleared.
    pub async fn submit(&mut self) -> Result<PurchaseOrder, SubmitError> {
        let payload = match self.draft.validate() {
            Ok(payload) => payload,
            Err(errors) => {
                debug!(fields = errors.len(), "purchase order draft rejected");
                self.field_errors = errors.clone();
                return Err(SubmitError::Invalid(errors));
            }
        };
        self.field_errors = FieldErrors::default();

        let order = self.orders.create(&payload).await?;
        info!(
            id = %order.id,
            lines = payload.items.len(),
            total = %payload.total_amount,
            "purchase order submitted"
        );
        self.draft.clear();
        Ok(order)
    }

    /// Products matching `search`, for picking a line's product.
    pub async fn product_lookup(&self, search: &str) -> QueryState<ListEnvelope<Product>> {
        let params = ListParams::new(1, PRODUCT_LOOKUP_LIMIT).with_search(search.trim());
        self.products.list(&params).await
    }
}
