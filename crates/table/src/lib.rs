//! `backoffice-table`: headless paginated table.
//!
//! The table owns no data fetching and no authoritative page state: callers
//! hand it one page of rows plus the total count, and it reports what the
//! user did as [`TableEvent`]s. [`render_text`] draws a [`TableView`] for the
//! console.

pub mod column;
pub mod pagination;
pub mod render;
pub mod row;
pub mod selection;
pub mod table;

pub use column::{Align, CellRenderer, Column, ColumnKind};
pub use pagination::{PaginationView, pagination_view};
pub use render::render_text;
pub use row::{TableRow, cell_text, status_label};
pub use selection::Selection;
pub use table::{
    CellView, FilterDropdown, HeaderCell, RowView, SearchBox, Table, TableAction, TableEvent,
    TableView,
};
