//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use backoffice_core::{DEFAULT_PAGE_SIZE, ListParams, ResourceId, SortOrder};
use backoffice_observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "backoffice", version, about = "Back-office console for the store REST API")]
pub struct Cli {
    /// API base URL (overrides BACKOFFICE_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides BACKOFFICE_API_TOKEN).
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds (overrides BACKOFFICE_API_TIMEOUT_SECS).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Log format (overrides BACKOFFICE_LOG_FORMAT).
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Pretty => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show one page of a resource as a table.
    List(ListArgs),

    /// Print one record as JSON.
    Show {
        #[arg(value_enum)]
        resource: ResourceKind,
        id: ResourceId,
    },

    /// Delete one record.
    Delete {
        #[arg(value_enum)]
        resource: ResourceKind,
        id: ResourceId,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Validate and submit a purchase order draft stored as JSON.
    PurchaseOrder { file: PathBuf },
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub resource: ResourceKind,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub limit: u32,

    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub sort_by: Option<String>,

    #[arg(long, value_enum)]
    pub order: Option<SortArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Asc,
    Desc,
}

impl ListArgs {
    pub fn params(&self) -> ListParams {
        let mut params = ListParams::new(self.page.max(1), self.limit.max(1));
        if let Some(search) = &self.search {
            params = params.with_search(search);
        }
        if let Some(status) = &self.status {
            params = params.with_filter("status", status);
        }
        if let Some(category) = &self.category {
            params = params.with_filter("category", category);
        }
        if let Some(sort_by) = &self.sort_by {
            let order = match self.order {
                Some(SortArg::Desc) => SortOrder::Desc,
                _ => SortOrder::Asc,
            };
            params = params.with_sort(sort_by, order);
        }
        params
    }
}

/// Every resource the console knows how to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Products,
    Reviews,
    Customers,
    Suppliers,
    Warehouses,
    Inventory,
    WarehouseStock,
    Orders,
    Rfqs,
    Shipments,
    Refunds,
    PurchaseOrders,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_flags_become_params() {
        let cli = Cli::try_parse_from([
            "backoffice",
            "list",
            "warehouse-stock",
            "--page",
            "2",
            "--search",
            "bolt",
            "--status",
            "active",
            "--sort-by",
            "name",
            "--order",
            "desc",
        ])
        .unwrap();

        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.resource, ResourceKind::WarehouseStock);
        let params = args.params();
        assert_eq!(params.page(), 2);
        assert_eq!(params.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.search(), "bolt");
        assert_eq!(params.filter("status"), Some("active"));
        assert_eq!(params.sort_by(), Some("name"));
        assert_eq!(params.sort_order(), Some(SortOrder::Desc));
    }

    #[test]
    fn delete_takes_yes_flag_and_global_options() {
        let cli = Cli::try_parse_from([
            "backoffice",
            "delete",
            "purchase-orders",
            "po1",
            "--yes",
            "--api-url",
            "http://127.0.0.1:9/api",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:9/api"));
        match cli.command {
            Command::Delete { resource, id, yes } => {
                assert_eq!(resource, ResourceKind::PurchaseOrders);
                assert_eq!(id.as_str(), "po1");
                assert!(yes);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_resource_is_rejected() {
        assert!(Cli::try_parse_from(["backoffice", "list", "invoices"]).is_err());
    }
}
