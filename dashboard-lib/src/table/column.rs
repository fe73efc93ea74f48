//! Column descriptors.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::Cell;
use super::Row;
use crate::error::TableError;

/// Pagination context handed to cell renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub current_page: u32,
    pub page_size: u32,
}

impl RenderContext {
    pub fn new(current_page: u32, page_size: u32) -> Self {
        Self {
            current_page,
            page_size,
        }
    }

    /// One-based position of the row at `index` across all pages.
    pub fn ordinal(&self, index: usize) -> u64 {
        u64::from(self.current_page.saturating_sub(1)) * u64::from(self.page_size)
            + index as u64
            + 1
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// Cell renderer: `(value, row, index, context) -> cell`.
pub type RenderFn = Arc<dyn Fn(Option<&Value>, &Row, usize, RenderContext) -> Cell + Send + Sync>;

/// A table column definition.
#[derive(Clone)]
pub struct ColumnDescriptor {
    /// Field key, unique within a column set.
    pub key: String,
    /// Header text.
    pub label: String,
    /// Whether the header triggers `on_sort`.
    pub sortable: bool,
    /// Custom cell renderer. Without one the raw field value is shown.
    pub render: Option<RenderFn>,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
            render: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Sets a custom cell renderer.
    pub fn render(
        mut self,
        render: impl Fn(Option<&Value>, &Row, usize, RenderContext) -> Cell + Send + Sync + 'static,
    ) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    /// Sets a renderer producing plain text.
    pub fn render_text(
        self,
        render: impl Fn(Option<&Value>, &Row, usize, RenderContext) -> String + Send + Sync + 'static,
    ) -> Self {
        self.render(move |value, row, index, ctx| Cell::Text(render(value, row, index, ctx)))
    }

    /// Renders the cell for `row`.
    pub fn cell(&self, row: &Row, index: usize, ctx: RenderContext) -> Cell {
        let value = row.get(&self.key);
        match &self.render {
            Some(render) => render(value, row, index, ctx),
            None => Cell::raw(value),
        }
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("render", &self.render.is_some())
            .finish()
    }
}

/// Ordered columns with unique keys.
#[derive(Debug, Clone, Default)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSet {
    /// Creates a column set, rejecting duplicate keys.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.key.as_str()) {
                return Err(TableError::DuplicateColumn(column.key.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn get(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
