//! Purchasing: purchase orders as a REST resource plus the order entry form.
//!
//! `PurchaseOrderDraft` is pure state (no IO): every edit recomputes the line
//! amounts and the order total so the two can never disagree. The form wraps
//! a draft and submits it through the query layer's create mutation.

pub mod draft;
pub mod form;
pub mod order;

pub use draft::{DraftLine, FieldErrors, PurchaseOrderDraft};
pub use form::{PRODUCT_LOOKUP_LIMIT, PurchaseOrderForm, SubmitError};
pub use order::{
    CreatePurchaseOrder, PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus, ShippingMethod,
};
