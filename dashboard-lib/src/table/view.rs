//! Table projection and interaction.

use serde_json::Value;

use super::ActionButton;
use super::ActionDescriptor;
use super::ColumnSet;
use super::RenderContext;
use super::Row;

/// Content of one rendered cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    /// The field is absent; rendered as [`PLACEHOLDER`](super::PLACEHOLDER).
    Placeholder,
    /// The action cell of a row.
    Actions(Vec<ActionButton>),
}

impl Cell {
    /// Cell for a raw field value.
    ///
    /// Absent, null and empty-string values become [`Cell::Placeholder`].
    /// Strings are shown unquoted, other values as JSON.
    pub fn raw(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Cell::Placeholder,
            Some(Value::String(s)) if s.is_empty() => Cell::Placeholder,
            Some(Value::String(s)) => Cell::Text(s.clone()),
            Some(other) => Cell::Text(other.to_string()),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Cell::Text(text.into())
    }
}

/// A rendered header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderCell {
    /// Header of a data column. Sortable headers are interactive.
    Column {
        key: String,
        label: String,
        sortable: bool,
    },
    /// Header of the action column.
    Actions { label: String },
}

/// A rendered body row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedRow {
    Data { index: usize, cells: Vec<Cell> },
    /// The single row shown when there are no records.
    Empty { colspan: usize, message: String },
}

/// Output of [`TableView::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub header: Vec<HeaderCell>,
    pub rows: Vec<RenderedRow>,
}

impl RenderedTable {
    /// Number of logical columns, including the action column.
    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

/// Whether a click reaches the row handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stopped,
}

/// Stateless table over borrowed column and action descriptors.
///
/// # Example
///
/// ```
/// use dashboard_lib::table::{ColumnDescriptor, ColumnSet, RenderedRow, Row, TableView};
/// use serde_json::json;
///
/// let columns = ColumnSet::new(vec![
///     ColumnDescriptor::new("title", "Title").sortable(),
///     ColumnDescriptor::new("stock", "Stock"),
/// ])
/// .unwrap();
///
/// let rows = vec![Row::from_value(json!({"title": "Chair", "stock": 4})).unwrap()];
/// let table = TableView::new(&columns).render(&rows);
///
/// assert_eq!(table.column_count(), 2);
/// assert!(matches!(table.rows[0], RenderedRow::Data { index: 0, .. }));
/// ```
pub struct TableView<'a> {
    columns: &'a ColumnSet,
    actions: &'a [ActionDescriptor],
    context: RenderContext,
    empty_message: String,
    actions_label: String,
    on_sort: Option<Box<dyn Fn(&str) + 'a>>,
    on_row_click: Option<Box<dyn Fn(&Row) + 'a>>,
}

impl<'a> TableView<'a> {
    pub fn new(columns: &'a ColumnSet) -> Self {
        Self {
            columns,
            actions: &[],
            context: RenderContext::default(),
            empty_message: "No data".to_string(),
            actions_label: "Actions".to_string(),
            on_sort: None,
            on_row_click: None,
        }
    }

    pub fn actions(mut self, actions: &'a [ActionDescriptor]) -> Self {
        self.actions = actions;
        self
    }

    pub fn context(mut self, context: RenderContext) -> Self {
        self.context = context;
        self
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn actions_label(mut self, label: impl Into<String>) -> Self {
        self.actions_label = label.into();
        self
    }

    pub fn on_sort(mut self, handler: impl Fn(&str) + 'a) -> Self {
        self.on_sort = Some(Box::new(handler));
        self
    }

    pub fn on_row_click(mut self, handler: impl Fn(&Row) + 'a) -> Self {
        self.on_row_click = Some(Box::new(handler));
        self
    }

    fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Projects `rows` into a grid.
    pub fn render(&self, rows: &[Row]) -> RenderedTable {
        let mut header: Vec<HeaderCell> = self
            .columns
            .iter()
            .map(|col| HeaderCell::Column {
                key: col.key.clone(),
                label: col.label.clone(),
                sortable: col.sortable,
            })
            .collect();
        if self.has_actions() {
            header.push(HeaderCell::Actions {
                label: self.actions_label.clone(),
            });
        }

        if rows.is_empty() {
            return RenderedTable {
                rows: vec![RenderedRow::Empty {
                    colspan: header.len(),
                    message: self.empty_message.clone(),
                }],
                header,
            };
        }

        let body = rows
            .iter()
            .enumerate()
            .map(|(index, row)| self.render_row(row, index))
            .collect();

        RenderedTable { header, rows: body }
    }

    fn render_row(&self, row: &Row, index: usize) -> RenderedRow {
        let mut cells: Vec<Cell> = self
            .columns
            .iter()
            .map(|col| col.cell(row, index, self.context))
            .collect();
        if self.has_actions() {
            cells.push(Cell::Actions(
                self.actions.iter().map(ActionDescriptor::button).collect(),
            ));
        }
        RenderedRow::Data { index, cells }
    }

    /// Activates the header of column `key`.
    ///
    /// Calls `on_sort` only for sortable columns. Returns whether it did.
    pub fn click_header(&self, key: &str) -> bool {
        let sortable = self.columns.get(key).is_some_and(|c| c.sortable);
        match (&self.on_sort, sortable) {
            (Some(on_sort), true) => {
                on_sort(key);
                true
            }
            _ => false,
        }
    }

    /// Activates the row at `index`. Returns whether a handler ran.
    pub fn click_row(&self, rows: &[Row], index: usize) -> bool {
        match (&self.on_row_click, rows.get(index)) {
            (Some(on_row_click), Some(row)) => {
                on_row_click(row);
                true
            }
            _ => false,
        }
    }

    /// Activates action `action` in the row at `index`.
    ///
    /// A click inside the action cell of an existing row never reaches the
    /// row handler, even when `action` names no button. Only a click outside
    /// the rendered rows continues.
    pub fn click_action(&self, rows: &[Row], index: usize, action: usize) -> Propagation {
        let Some(row) = rows.get(index) else {
            return Propagation::Continue;
        };
        match self.actions.get(action) {
            Some(descriptor) => (descriptor.on_click)(row),
            None => log::debug!("No action {} in row {}", action, index),
        }
        Propagation::Stopped
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::table::ColumnDescriptor;

    fn columns() -> ColumnSet {
        ColumnSet::new(vec![
            ColumnDescriptor::new("title", "Title").sortable(),
            ColumnDescriptor::new("stock", "Stock"),
            ColumnDescriptor::new("n", "#")
                .render_text(|_, _, index, ctx| ctx.ordinal(index).to_string()),
        ])
        .unwrap()
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::from_value(json!({"title": "Chair", "stock": 4})).unwrap(),
            Row::from_value(json!({"title": "", "stock": null})).unwrap(),
        ]
    }

    #[test]
    fn test_header_with_and_without_actions() {
        let columns = columns();
        let plain = TableView::new(&columns).render(&rows());
        assert_eq!(plain.column_count(), 3);
        assert_eq!(
            plain.header[0],
            HeaderCell::Column {
                key: "title".into(),
                label: "Title".into(),
                sortable: true
            }
        );

        let actions = [ActionDescriptor::new("Edit", |_| {}).style("primary")];
        assert_eq!(actions[0].button().style, "primary");
        let with_actions = TableView::new(&columns).actions(&actions).render(&rows());
        assert_eq!(with_actions.column_count(), 4);
        assert_eq!(
            with_actions.header[3],
            HeaderCell::Actions {
                label: "Actions".into()
            }
        );
    }

    #[test]
    fn test_body_cells() {
        let columns = columns();
        let table = TableView::new(&columns)
            .context(RenderContext::new(2, 10))
            .render(&rows());
        assert_eq!(
            table.rows,
            vec![
                RenderedRow::Data {
                    index: 0,
                    cells: vec![Cell::text("Chair"), Cell::text("4"), Cell::text("11")],
                },
                RenderedRow::Data {
                    index: 1,
                    cells: vec![Cell::Placeholder, Cell::Placeholder, Cell::text("12")],
                },
            ]
        );
    }

    #[test]
    fn test_empty_state_spans_action_column() {
        let columns = columns();
        let actions = [
            ActionDescriptor::new("Edit", |_| {}),
            ActionDescriptor::new("Delete", |_| {}),
        ];
        let table = TableView::new(&columns)
            .actions(&actions)
            .empty_message("No products")
            .render(&[]);
        assert_eq!(
            table.rows,
            vec![RenderedRow::Empty {
                colspan: 4,
                message: "No products".into()
            }]
        );

        let table = TableView::new(&columns).render(&[]);
        assert_eq!(
            table.rows,
            vec![RenderedRow::Empty {
                colspan: 3,
                message: "No data".into()
            }]
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let columns = columns();
        let actions = [ActionDescriptor::new("Edit", |_| {}).icon("✎")];
        let view = TableView::new(&columns).actions(&actions);
        let rows = rows();
        assert_eq!(view.render(&rows), view.render(&rows));
    }

    #[test]
    fn test_changing_field_changes_only_its_cell() {
        let columns = columns();
        let view = TableView::new(&columns);
        let before = view.render(&rows());

        let mut changed = rows();
        changed[0].set("stock", json!(9));
        let after = view.render(&changed);

        let (RenderedRow::Data { cells: a, .. }, RenderedRow::Data { cells: b, .. }) =
            (&before.rows[0], &after.rows[0])
        else {
            panic!("expected data rows");
        };
        assert_eq!(a[0], b[0]);
        assert_ne!(a[1], b[1]);
        assert_eq!(a[2], b[2]);
        assert_eq!(before.rows[1], after.rows[1]);
        assert_eq!(before.header, after.header);
    }

    #[test]
    fn test_sort_only_on_sortable_columns() {
        let columns = columns();
        let sorted = RefCell::new(Vec::new());
        let view = TableView::new(&columns).on_sort(|key| sorted.borrow_mut().push(key.to_string()));
        assert!(view.click_header("title"));
        assert!(!view.click_header("stock"));
        assert!(!view.click_header("missing"));
        drop(view);
        assert_eq!(sorted.into_inner(), vec!["title".to_string()]);
    }

    #[test]
    fn test_action_click_stops_propagation() {
        let columns = columns();
        let edits = Arc::new(AtomicUsize::new(0));
        let counter = edits.clone();
        let actions = [ActionDescriptor::new("Edit", move |row| {
            assert_eq!(row.get("title"), Some(&json!("Chair")));
            counter.fetch_add(1, Ordering::SeqCst);
        })];
        let row_clicks = RefCell::new(0);
        let view = TableView::new(&columns)
            .actions(&actions)
            .on_row_click(|_| *row_clicks.borrow_mut() += 1);
        let rows = rows();

        assert_eq!(view.click_action(&rows, 0, 0), Propagation::Stopped);
        assert_eq!(view.click_action(&rows, 0, 5), Propagation::Stopped);
        assert_eq!(view.click_action(&rows, 9, 0), Propagation::Continue);
        assert!(view.click_row(&rows, 1));
        assert!(!view.click_row(&rows, 7));
        drop(view);

        assert_eq!(edits.load(Ordering::SeqCst), 1);
        assert_eq!(row_clicks.into_inner(), 1);
    }

    #[test]
    fn test_row_click_without_handler() {
        let columns = columns();
        let view = TableView::new(&columns);
        assert!(!view.click_row(&rows(), 0));
    }
}
