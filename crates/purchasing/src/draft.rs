//! Purchase order entry state.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use backoffice_core::{DomainError, DomainResult, Entity, ResourceId};
use backoffice_products::Product;

use crate::order::{CreatePurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus, ShippingMethod};

/// One line of the draft. `amount` is derived and only written by the draft.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftLine {
    product_id: Option<ResourceId>,
    product_name: String,
    quantity: i64,
    unit_price: Decimal,
    #[serde(skip_deserializing)]
    amount: Decimal,
}

impl DraftLine {
    pub fn product_id(&self) -> Option<&ResourceId> {
        self.product_id.as_ref()
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    fn checked_amount(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

fn too_large() -> DomainError {
    DomainError::validation("line amount is too large")
}

/// Per-field validation messages, keyed by field path (`supplier_id`,
/// `items[1].quantity`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Purchase order being entered.
///
/// Line amounts and `total_amount` are recomputed by every mutating method,
/// so `total_amount == Σ quantity * unit_price` holds between calls. An edit
/// whose amounts would not fit in a `Decimal` is rejected and changes nothing.
/// A draft loaded through serde must be passed through
/// [`recalculate`](Self::recalculate) before its totals are read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseOrderDraft {
    supplier_id: Option<ResourceId>,
    status: Option<PurchaseOrderStatus>,
    currency: String,
    expected_date: Option<NaiveDate>,
    items: Vec<DraftLine>,
    shipping_address: String,
    shipping_method: Option<ShippingMethod>,
    shipping_cost: Decimal,
    notes: String,
    #[serde(skip_deserializing)]
    total_amount: Decimal,
}

impl PurchaseOrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supplier_id(&self) -> Option<&ResourceId> {
        self.supplier_id.as_ref()
    }

    pub fn status(&self) -> Option<PurchaseOrderStatus> {
        self.status
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn expected_date(&self) -> Option<NaiveDate> {
        self.expected_date
    }

    pub fn items(&self) -> &[DraftLine] {
        &self.items
    }

    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    pub fn shipping_method(&self) -> Option<ShippingMethod> {
        self.shipping_method
    }

    pub fn shipping_cost(&self) -> Decimal {
        self.shipping_cost
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Order total plus shipping.
    pub fn grand_total(&self) -> Decimal {
        self.total_amount + self.shipping_cost
    }

    pub fn set_supplier(&mut self, supplier_id: ResourceId) {
        self.supplier_id = (!supplier_id.is_empty()).then_some(supplier_id);
    }

    pub fn set_status(&mut self, status: PurchaseOrderStatus) {
        self.status = Some(status);
    }

    pub fn set_currency(&mut self, currency: impl Into<String>) {
        self.currency = currency.into().trim().to_uppercase();
    }

    pub fn set_expected_date(&mut self, date: NaiveDate) {
        self.expected_date = Some(date);
    }

    pub fn set_shipping_address(&mut self, address: impl Into<String>) {
        self.shipping_address = address.into();
    }

    pub fn set_shipping_method(&mut self, method: ShippingMethod) {
        self.shipping_method = Some(method);
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn set_shipping_cost(&mut self, cost: Decimal) -> DomainResult<()> {
        if cost.is_sign_negative() && !cost.is_zero() {
            return Err(DomainError::validation("shipping cost cannot be negative"));
        }
        if self.total_amount.checked_add(cost).is_none() {
            return Err(DomainError::validation("shipping cost is too large"));
        }
        self.shipping_cost = cost;
        Ok(())
    }

    /// Appends an empty line (no product, zero quantity and price).
    pub fn add_item(&mut self) -> usize {
        self.items.push(DraftLine::default());
        self.items.len() - 1
    }

    pub fn remove_item(&mut self, index: usize) -> DomainResult<DraftLine> {
        self.line_mut(index)?;
        let others = self
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, l)| l.amount);
        let total = self.checked_total(others)?;
        let removed = self.items.remove(index);
        self.total_amount = total;
        Ok(removed)
    }

    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> DomainResult<()> {
        if quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        let mut line = self.line_mut(index)?.clone();
        line.quantity = quantity;
        self.replace_line(index, line)
    }

    pub fn set_unit_price(&mut self, index: usize, unit_price: Decimal) -> DomainResult<()> {
        if unit_price.is_sign_negative() && !unit_price.is_zero() {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        let mut line = self.line_mut(index)?.clone();
        line.unit_price = unit_price;
        self.replace_line(index, line)
    }

    /// Puts `product` on line `index` at its list price. Quantity stays as entered.
    pub fn select_product(&mut self, index: usize, product: &Product) -> DomainResult<()> {
        let mut line = self.line_mut(index)?.clone();
        line.product_id = Some(product.id().clone());
        line.product_name = product.name.clone();
        line.unit_price = product.price;
        self.replace_line(index, line)
    }

    /// Recomputes every line amount and the order total. Fails without
    /// touching the draft when an amount or the grand total overflows.
    pub fn recalculate(&mut self) -> DomainResult<()> {
        let amounts = self
            .items
            .iter()
            .map(DraftLine::checked_amount)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(too_large)?;
        let total = self.checked_total(amounts.iter().copied())?;
        for (line, amount) in self.items.iter_mut().zip(amounts) {
            line.amount = amount;
        }
        self.total_amount = total;
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Checks the whole draft and builds the create payload from it.
    pub fn validate(&self) -> Result<CreatePurchaseOrder, FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.supplier_id.is_none() {
            errors.insert("supplier_id", "Supplier is required");
        }
        if self.status.is_none() {
            errors.insert("status", "Status is required");
        }
        if self.currency.trim().is_empty() {
            errors.insert("currency", "Currency is required");
        }
        if self.expected_date.is_none() {
            errors.insert("expected_delivery_date", "Expected delivery date is required");
        }
        if self.shipping_method.is_none() {
            errors.insert("shipping_method", "Shipping method is required");
        }
        if self.shipping_cost.is_sign_negative() && !self.shipping_cost.is_zero() {
            errors.insert("shipping_cost", "Shipping cost cannot be negative");
        }
        if self.items.is_empty() {
            errors.insert("items", "At least one item is required");
        }
        for (i, line) in self.items.iter().enumerate() {
            if line.product_id.as_ref().is_none_or(ResourceId::is_empty) {
                errors.insert(format!("items[{i}].product_id"), "Product is required");
            }
            if line.quantity <= 0 {
                errors.insert(format!("items[{i}].quantity"), "Quantity must be greater than 0");
            }
            if line.unit_price.is_sign_negative() && !line.unit_price.is_zero() {
                errors.insert(format!("items[{i}].unit_price"), "Unit price cannot be negative");
            }
            if line.checked_amount().is_none() {
                errors.insert(format!("items[{i}].amount"), "Amount is too large");
            }
        }
        let total_amount = self
            .items
            .iter()
            .map(DraftLine::checked_amount)
            .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(amount?))
            .filter(|total| total.checked_add(self.shipping_cost).is_some());
        if total_amount.is_none() && !errors.iter().any(|(field, _)| field.ends_with(".amount")) {
            errors.insert("total_amount", "Order total is too large");
        }

        let (Some(supplier_id), Some(status), Some(expected), Some(method), Some(total_amount)) = (
            self.supplier_id.clone(),
            self.status,
            self.expected_date,
            self.shipping_method,
            total_amount,
        ) else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let items = self
            .items
            .iter()
            .filter_map(|line| {
                Some(PurchaseOrderLine {
                    product_id: line.product_id.clone()?,
                    product_name: (!line.product_name.is_empty()).then(|| line.product_name.clone()),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    amount: line.checked_amount()?,
                })
            })
            .collect::<Vec<_>>();

        Ok(CreatePurchaseOrder {
            supplier_id,
            status,
            currency: self.currency.trim().to_uppercase(),
            expected_delivery_date: expected,
            items,
            shipping_address: non_blank(&self.shipping_address),
            shipping_method: method,
            shipping_cost: self.shipping_cost,
            total_amount,
            notes: non_blank(&self.notes),
        })
    }

    fn replace_line(&mut self, index: usize, mut line: DraftLine) -> DomainResult<()> {
        line.amount = line.checked_amount().ok_or_else(too_large)?;
        let others = self
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, l)| l.amount);
        let total = self.checked_total(others.chain(std::iter::once(line.amount)))?;
        self.items[index] = line;
        self.total_amount = total;
        Ok(())
    }

    /// Sum of `amounts`, checked so that shipping can still be added to it.
    fn checked_total(&self, mut amounts: impl Iterator<Item = Decimal>) -> DomainResult<Decimal> {
        let total = amounts
            .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(amount))
            .ok_or_else(too_large)?;
        total
            .checked_add(self.shipping_cost)
            .ok_or_else(|| DomainError::validation("order total is too large"))?;
        Ok(total)
    }

    fn line_mut(&mut self, index: usize) -> DomainResult<&mut DraftLine> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(DomainError::out_of_range(index, len))
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
