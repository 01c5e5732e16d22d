//! Column descriptors.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// How a column's cells behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Default,
    /// Status badge: `in_transit` renders as `In transit`.
    Status,
    /// Clicking the cell is a link click, not a row click.
    Link,
}

/// Custom cell renderer.
pub type CellRenderer<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

pub struct Column<R> {
    /// Field path in the row's JSON record (`name`, `supplier.name`).
    pub id: String,
    pub label: String,
    pub width: Option<usize>,
    pub align: Align,
    pub kind: ColumnKind,
    pub render: Option<CellRenderer<R>>,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            width: self.width,
            align: self.align,
            kind: self.kind,
            render: self.render.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("width", &self.width)
            .field("align", &self.align)
            .field("kind", &self.kind)
            .field("render", &self.render.is_some())
            .finish()
    }
}

impl<R> Column<R> {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            width: None,
            align: Align::Left,
            kind: ColumnKind::Default,
            render: None,
        }
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn status(mut self) -> Self {
        self.kind = ColumnKind::Status;
        self
    }

    pub fn link(mut self) -> Self {
        self.kind = ColumnKind::Link;
        self
    }

    pub fn render(mut self, render: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn is_link(&self) -> bool {
        self.kind == ColumnKind::Link
    }
}
