//! Warehouses and the stock they hold.

pub mod stock;
pub mod warehouse;

pub use stock::{InventoryItem, StockLevel, WarehouseStock};
pub use warehouse::{Warehouse, WarehouseStatus};
