//! Per-resource list screens: which columns to show and which filter to offer.

use backoffice_core::Resource;
use backoffice_inventory::{InventoryItem, Warehouse, WarehouseStock};
use backoffice_parties::{Customer, Supplier};
use backoffice_products::{Product, Review};
use backoffice_purchasing::PurchaseOrder;
use backoffice_sales::{Order, RefundTransaction, Rfq, Shipment};
use backoffice_table::{Align, Column, FilterDropdown, TableRow};

pub trait Screen: Resource + TableRow {
    fn columns() -> Vec<Column<Self>>;

    /// Status filter offered above the table, if the resource has one.
    fn status_filter() -> Option<FilterDropdown> {
        None
    }
}

fn statuses(values: &[&str]) -> Option<FilterDropdown> {
    let dropdown = values.iter().fold(
        FilterDropdown::new("Status").option("", "All"),
        |dropdown, value| dropdown.option(*value, backoffice_table::status_label(value)),
    );
    Some(dropdown)
}

impl Screen for Product {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name").width(28).link(),
            Column::new("sku", "SKU").width(12),
            Column::new("category", "Category").width(14),
            Column::new("price", "Price")
                .width(10)
                .align(Align::Right)
                .render(|p: &Product| format!("{:.2}", p.price)),
            Column::new("stock", "Stock").width(6).align(Align::Right),
            Column::new("status", "Status").width(10).status(),
        ]
    }

    fn status_filter() -> Option<FilterDropdown> {
        statuses(&["active", "inactive", "draft", "archived"])
    }
}

impl Screen for Review {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("customerName", "Customer").width(20),
            Column::new("rating", "Rating")
                .width(6)
                .align(Align::Center)
                .render(|r: &Review| format!("{}/5", r.rating)),
            Column::new("comment", "Comment").width(36),
            Column::new("status", "Status").width(10).status(),
        ]
    }

    fn status_filter() -> Option<FilterDropdown> {
        statuses(&["pending", "approved", "rejected"])
    }
}

impl Screen for Customer {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name").width(24).link(),
            Column::new("email", "Email").width(28),
            Column::new("phone", "Phone").width(16),
            Column::new("status", "Status").width(10).status(),
        ]
    }

    fn status_filter() -> Option<FilterDropdown> {
        statuses(&["active", "inactive", "suspended", "blocked"])
    }
}

impl Screen for Supplier {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name").width(24).link(),
            Column::new("contactPerson", "Contact").width(18),
            Column::new("email", "Email").width(26),
            Column::new("phone", "Phone").width(16),
            Column::new("status", "Status").width(10).status(),
        ]
    }

    fn status_filter() -> Option<FilterDropdown> {
        statuses(&["active", "inactive", "suspended", "blocked"])
    }
}

impl Screen for Warehouse {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name").width(22).link(),
            Column::new("code", "Code").width(8),
            Column::new("location", "Location").width(24),
            Column::new("capacity", "Capacity").width(9).align(Align::Right),
            Column::new("status", "Status").width(12).status(),
        ]
    }

    fn status_filter() -> Option<FilterDropdown> {
        statuses(&["active", "inactive", "maintenance"])
    }
}

impl Screen for InventoryItem {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("productName", "Product").width(26).link(),
            Column::new("sku", "SKU").width(12),
            Column::new("quantity", "Qty").width(6).align(Align::Right),
            Column::new("reorderLevel", "Reorder at").width(10).align(Align::Right),
            Column::new("level", "Level").width(12).status().render(|item: &InventoryItem| {
                serde_json::to_value(item.level())
                    .ok()
                    .and_then(|v| v.as_str().map(backoffice_table::status_label))
                    .unwrap_or_default()
            }),
        ]
    }
}

impl Screen for WarehouseStock {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("productName", "Product").width(26),
            Column::new("warehouseId", "Warehouse").width(14).link(),
            Column::new("quantity", "Qty").width(6).align(Align::Right),
            Column::new("reserved", "Reserved").width(8).align(Align::Right),
            Column::new("available", "Available")
                .width(9)
                .align(Align::Right)
                .render(|s: &WarehouseStock| s.available().to_string()),
        ]
    }
}

impl Screen for Order {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("orderNumber", "Order #").width(12).link(),
            Column::new("customerName", "Customer").width(22),
            Column::new("items", "Lines")
                .width(5)
                .align(Align::Right)
                .render(|o: &Order| o.items.len().to_string()),
            Column::new("totalAmount", "Total")
                .width(10)
                .align(Align::Right)
                .render(|o: &Order| format!("{:.2}", o.total_amount)),
            Column::new("status", "Status").width(11).status(),
        ]
    }

    fn status_filter() -> Option<FilterDropdown> {
        statuses(&["pending", "processing", "shipped", "delivered", "cancelled", "refunded"])
    }
}

impl Screen for Rfq {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("rfqNumber", "RFQ #").width(12).link(),
            Column::new("customerName", "Customer").width(20),
            Column::new("productName", "Product").width(22),
            Column::new("quantity", "Qty").width(6).align(Align::Right),
            Column::new("status", "Status").width(9).status(),
        ]
    }

    fn status_filter() -> Option<FilterDropdown> {
        statuses(&["open", "quoted", "accepted", "rejected", "closed"])
    }
}

impl Screen for Shipment {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("trackingNumber", "Tracking #").width(18).link(),
            Column::new("carrier", "Carrier").width(12),
            Column::new("orderId", "Order").width(14),
            Column::new("status", "Status").width(11).status(),
        ]
    }

    fn status_filter() -> Option<FilterDropdown> {
        statuses(&["pending", "in_transit", "delivered", "returned"])
    }
}

impl Screen for RefundTransaction {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("orderId", "Order").width(14).link(),
            Column::new("amount", "Amount")
                .width(10)
                .align(Align::Right)
                .render(|r: &RefundTransaction| format!("{:.2}", r.amount)),
            Column::new("currency", "Cur").width(4),
            Column::new("reason", "Reason").width(28),
            Column::new("status", "Status").width(10).status(),
        ]
    }

    fn status_filter() -> Option<FilterDropdown> {
        statuses(&["pending", "approved", "completed", "rejected"])
    }
}

impl Screen for PurchaseOrder {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("po_number", "PO #").width(12).link(),
            Column::new("supplier_name", "Supplier").width(22),
            Column::new("expected_delivery_date", "Expected").width(10),
            Column::new("total_amount", "Total")
                .width(10)
                .align(Align::Right)
                .render(|po: &PurchaseOrder| format!("{:.2}", po.grand_total())),
            Column::new("status", "Status").width(10).status(),
        ]
    }

    fn status_filter() -> Option<FilterDropdown> {
        statuses(&["draft", "pending", "approved", "ordered", "received", "cancelled"])
    }
}
