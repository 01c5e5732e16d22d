//! Command implementations. Output goes to the writer handed in by the caller.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, anyhow, bail};
use tracing::debug;

use backoffice_core::ResourceId;
use backoffice_inventory::{InventoryItem, Warehouse, WarehouseStock};
use backoffice_parties::{Customer, Supplier};
use backoffice_products::{Product, Review};
use backoffice_purchasing::{PurchaseOrder, PurchaseOrderDraft, PurchaseOrderForm, SubmitError};
use backoffice_sales::{Order, RefundTransaction, Rfq, Shipment};
use backoffice_table::{SearchBox, Table, render_text};

use crate::cli::{Command, ListArgs, ResourceKind};
use crate::context::Console;
use crate::screens::Screen;

/// Yes/no question before a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Asks on stderr and reads the answer from stdin. Only `y`/`yes` confirm.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let mut stderr = io::stderr();
        write!(stderr, "{prompt} [y/N] ")?;
        stderr.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

/// Runs `$body` with `$R` bound to the resource type behind `$kind`.
macro_rules! with_screen {
    ($kind:expr, $R:ident => $body:expr) => {
        match $kind {
            ResourceKind::Products => {
                type $R = Product;
                $body
            }
            ResourceKind::Reviews => {
                type $R = Review;
                $body
            }
            ResourceKind::Customers => {
                type $R = Customer;
                $body
            }
            ResourceKind::Suppliers => {
                type $R = Supplier;
                $body
            }
            ResourceKind::Warehouses => {
                type $R = Warehouse;
                $body
            }
            ResourceKind::Inventory => {
                type $R = InventoryItem;
                $body
            }
            ResourceKind::WarehouseStock => {
                type $R = WarehouseStock;
                $body
            }
            ResourceKind::Orders => {
                type $R = Order;
                $body
            }
            ResourceKind::Rfqs => {
                type $R = Rfq;
                $body
            }
            ResourceKind::Shipments => {
                type $R = Shipment;
                $body
            }
            ResourceKind::Refunds => {
                type $R = RefundTransaction;
                $body
            }
            ResourceKind::PurchaseOrders => {
                type $R = PurchaseOrder;
                $body
            }
        }
    };
}

pub async fn run(
    command: Command,
    console: &Console,
    out: &mut dyn Write,
    confirm: &mut dyn Confirm,
) -> anyhow::Result<()> {
    match command {
        Command::List(args) => with_screen!(args.resource, R => list::<R>(console, &args, out).await),
        Command::Show { resource, id } => with_screen!(resource, R => show::<R>(console, &id, out).await),
        Command::Delete { resource, id, yes } => {
            with_screen!(resource, R => delete::<R>(console, &id, yes, out, confirm).await)
        }
        Command::PurchaseOrder { file } => purchase_order(console, &file, out).await,
    }
}

async fn list<R: Screen>(console: &Console, args: &ListArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let params = args.params();
    let state = console.hooks::<R>().list(&params).await;
    if let Some(err) = state.error.clone() {
        return Err(err).with_context(|| format!("could not load {}", R::NAME));
    }
    let page = state
        .data()
        .ok_or_else(|| anyhow!("no {} returned", R::NAME))?;

    let mut table = Table::new(R::columns()).rows_per_page(params.limit());
    if let Some(search) = &args.search {
        table = table.with_search(SearchBox {
            value: search.clone(),
            ..SearchBox::new(format!("Search {}", R::NAME))
        });
    }
    if let Some(mut filter) = R::status_filter() {
        filter.selected = args.status.clone().unwrap_or_default();
        table = table.with_filter(filter);
    }
    table.set_page_data(page.items.clone(), page.total, page.page);

    let view = table.view();
    write!(out, "{}", render_text(&view))?;
    if view.rows.is_empty() {
        writeln!(out, "No {} found.", R::NAME.replace('-', " "))?;
    }
    Ok(())
}

async fn show<R: Screen>(console: &Console, id: &ResourceId, out: &mut dyn Write) -> anyhow::Result<()> {
    let state = console.hooks::<R>().detail(id).await;
    if let Some(err) = state.error.clone() {
        return Err(err).with_context(|| format!("could not load {} {id}", R::label_lower()));
    }
    let record = state
        .data()
        .ok_or_else(|| anyhow!("{} {id} not found", R::LABEL))?;
    writeln!(out, "{}", serde_json::to_string_pretty(record)?)?;
    Ok(())
}

async fn delete<R: Screen>(
    console: &Console,
    id: &ResourceId,
    yes: bool,
    out: &mut dyn Write,
    confirm: &mut dyn Confirm,
) -> anyhow::Result<()> {
    if !yes && !confirm.confirm(&format!("Delete {} {id}?", R::label_lower()))? {
        writeln!(out, "Cancelled.")?;
        return Ok(());
    }
    let ack = console
        .hooks::<R>()
        .delete(id)
        .await
        .with_context(|| format!("could not delete {} {id}", R::label_lower()))?;
    debug!(resource = R::NAME, id = %id, ack = %ack.message, "deleted");
    Ok(())
}

async fn purchase_order(console: &Console, path: &Path, out: &mut dyn Write) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let draft: PurchaseOrderDraft = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a purchase order draft", path.display()))?;

    let mut form = PurchaseOrderForm::new(console.hooks(), console.hooks())
        .with_draft(draft)
        .with_context(|| format!("{} cannot be totalled", path.display()))?;
    let draft = form.draft();
    writeln!(
        out,
        "{} item(s), total {:.2}, shipping {:.2}, grand total {:.2}",
        draft.items().len(),
        draft.total_amount(),
        draft.shipping_cost(),
        draft.grand_total()
    )?;

    match form.submit().await {
        Ok(order) => {
            let reference = order.po_number.clone().unwrap_or_else(|| order.id.to_string());
            writeln!(out, "Created purchase order {reference}")?;
            Ok(())
        }
        Err(SubmitError::Invalid(errors)) => {
            for (field, message) in errors.iter() {
                writeln!(out, "  {field}: {message}")?;
            }
            bail!("purchase order has {} invalid field(s)", errors.len())
        }
        Err(err) => Err(err).context("could not submit purchase order"),
    }
}
