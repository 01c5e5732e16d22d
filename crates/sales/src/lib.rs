//! Sales-side resources: customer orders, requests for quotation, shipments
//! and refund transactions.

pub mod order;
pub mod refund;
pub mod rfq;
pub mod shipment;

pub use order::{Order, OrderLine, OrderStatus};
pub use refund::{RefundStatus, RefundTransaction};
pub use rfq::{Rfq, RfqStatus};
pub use shipment::{Shipment, ShipmentStatus};
