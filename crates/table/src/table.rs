//! The table model: columns, one page of rows, selection and interaction.

use serde::Serialize;
use serde_json::Value;

use backoffice_core::{DEFAULT_PAGE_SIZE, ResourceId};

use crate::column::{Align, Column, ColumnKind};
use crate::pagination::{PaginationView, pagination_view};
use crate::row::{TableRow, cell_text, status_label};
use crate::selection::Selection;

/// Inline search input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchBox {
    pub placeholder: String,
    pub value: String,
}

impl SearchBox {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            value: String::new(),
        }
    }
}

/// Single-choice filter; an empty value means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterDropdown {
    pub label: String,
    /// `(value, label)` pairs.
    pub options: Vec<(String, String)>,
    pub selected: String,
}

impl FilterDropdown {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push((value.into(), label.into()));
        self
    }
}

/// Something the user did to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAction {
    /// Click on a row outside any interactive cell content.
    ClickRow { row: usize },
    /// Click on the content of a cell.
    ClickCell { row: usize, column: String },
    ToggleRow(ResourceId),
    ToggleAll,
    ChangePage(u32),
    Search(String),
    Filter(String),
}

/// What the caller should react to. Page changes are requests: the table
/// shows the new page only once the caller supplies its rows.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent<R> {
    RowClicked(R),
    LinkClicked { row: R, column: String },
    SelectionChanged(Vec<ResourceId>),
    PageRequested(u32),
    /// Search text changed; the caller should load `page` (always 1).
    SearchChanged { text: String, page: u32 },
    FilterChanged { value: String, page: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub id: String,
    pub label: String,
    pub width: Option<usize>,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub text: String,
    pub kind: ColumnKind,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub id: ResourceId,
    pub selected: bool,
    pub cells: Vec<CellView>,
}

/// Render-ready snapshot of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub selectable: bool,
    pub all_selected: bool,
    pub header: Vec<HeaderCell>,
    pub rows: Vec<RowView>,
    pub pagination: Option<PaginationView>,
    pub search: Option<String>,
    pub filter: Option<(String, String)>,
}

/// Headless paginated table over rows of type `R`.
pub struct Table<R> {
    columns: Vec<Column<R>>,
    rows: Vec<R>,
    total_results: u64,
    current_page: u32,
    rows_per_page: u32,
    selectable: bool,
    search: Option<SearchBox>,
    filter: Option<FilterDropdown>,
    selection: Selection,
}

impl<R: TableRow + Clone> Table<R> {
    pub fn new(columns: Vec<Column<R>>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            total_results: 0,
            current_page: 1,
            rows_per_page: DEFAULT_PAGE_SIZE,
            selectable: false,
            search: None,
            filter: None,
            selection: Selection::new(),
        }
    }

    pub fn rows_per_page(mut self, rows_per_page: u32) -> Self {
        self.rows_per_page = rows_per_page.max(1);
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_search(mut self, search: SearchBox) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_filter(mut self, filter: FilterDropdown) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Supply the rows of `current_page`. Selection is local to the rows on
    /// screen: it resets when a different page arrives and otherwise keeps
    /// only ids present in `rows`.
    pub fn set_page_data(&mut self, rows: Vec<R>, total_results: u64, current_page: u32) {
        let current_page = current_page.max(1);
        if current_page != self.current_page {
            self.selection.clear();
        } else {
            let visible: Vec<ResourceId> = rows.iter().map(TableRow::row_id).collect();
            self.selection.retain_visible(&visible);
        }
        if rows.len() > self.rows_per_page as usize {
            tracing::warn!(
                rows = rows.len(),
                rows_per_page = self.rows_per_page,
                "more rows supplied than fit on a page"
            );
        }
        self.rows = rows;
        self.total_results = total_results;
        self.current_page = current_page;
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        backoffice_core::total_pages(self.total_results, self.rows_per_page)
    }

    pub fn pagination(&self) -> Option<PaginationView> {
        pagination_view(self.total_results, self.current_page, self.rows_per_page)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn search(&self) -> Option<&SearchBox> {
        self.search.as_ref()
    }

    pub fn filter(&self) -> Option<&FilterDropdown> {
        self.filter.as_ref()
    }

    /// Apply a user action and report what the caller should do about it.
    pub fn dispatch(&mut self, action: TableAction) -> Option<TableEvent<R>> {
        match action {
            TableAction::ClickRow { row } => self.rows.get(row).cloned().map(TableEvent::RowClicked),
            TableAction::ClickCell { row, column } => {
                let record = self.rows.get(row)?.clone();
                let is_link = self
                    .columns
                    .iter()
                    .any(|c| c.id == column && c.is_link());
                if is_link {
                    Some(TableEvent::LinkClicked { row: record, column })
                } else {
                    Some(TableEvent::RowClicked(record))
                }
            }
            TableAction::ToggleRow(id) => {
                if !self.selectable || !self.rows.iter().any(|r| r.row_id() == id) {
                    return None;
                }
                self.selection.toggle(&id);
                Some(TableEvent::SelectionChanged(self.selection.ids()))
            }
            TableAction::ToggleAll => {
                if !self.selectable {
                    return None;
                }
                let visible: Vec<ResourceId> = self.rows.iter().map(TableRow::row_id).collect();
                self.selection.toggle_all(&visible);
                Some(TableEvent::SelectionChanged(self.selection.ids()))
            }
            TableAction::ChangePage(page) => {
                let page = page.clamp(1, self.total_pages().max(1));
                (page != self.current_page).then_some(TableEvent::PageRequested(page))
            }
            TableAction::Search(text) => {
                let search = self.search.as_mut()?;
                search.value = text.clone();
                Some(TableEvent::SearchChanged { text, page: 1 })
            }
            TableAction::Filter(value) => {
                let filter = self.filter.as_mut()?;
                filter.selected = value.clone();
                Some(TableEvent::FilterChanged { value, page: 1 })
            }
        }
    }

    /// Render-ready snapshot. An empty page still has its header.
    pub fn view(&self) -> TableView {
        let header = self
            .columns
            .iter()
            .map(|c| HeaderCell {
                id: c.id.clone(),
                label: c.label.clone(),
                width: c.width,
                align: c.align,
            })
            .collect();

        let rows: Vec<RowView> = self
            .rows
            .iter()
            .map(|row| {
                let record = row.record();
                let id = row.row_id();
                RowView {
                    selected: self.selection.is_selected(&id),
                    cells: self.columns.iter().map(|c| self.cell(row, &record, c)).collect(),
                    id,
                }
            })
            .collect();

        let all_selected = self.selection.all_selected(rows.iter().map(|r| &r.id));

        TableView {
            selectable: self.selectable,
            all_selected,
            header,
            rows,
            pagination: self.pagination(),
            search: self.search.as_ref().map(|s| s.value.clone()),
            filter: self.filter.as_ref().map(|f| {
                let shown = f
                    .options
                    .iter()
                    .find(|(value, _)| *value == f.selected)
                    .map(|(_, label)| label.clone())
                    .unwrap_or_else(|| "All".to_string());
                (f.label.clone(), shown)
            }),
        }
    }

    fn cell(&self, row: &R, record: &Value, column: &Column<R>) -> CellView {
        let text = match &column.render {
            Some(render) => render(row),
            None => {
                let raw = cell_text(record, &column.id);
                match column.kind {
                    ColumnKind::Status => status_label(&raw),
                    ColumnKind::Default | ColumnKind::Link => raw,
                }
            }
        };
        CellView {
            text,
            kind: column.kind,
            align: column.align,
        }
    }
}
