//! Row-level action descriptors.

use std::fmt;
use std::sync::Arc;

use super::Row;

/// A button rendered in every row's action cell.
#[derive(Clone)]
pub struct ActionDescriptor {
    pub label: String,
    pub icon: String,
    /// Style class passed through to the rendered button.
    pub style: String,
    pub on_click: Arc<dyn Fn(&Row) + Send + Sync>,
}

impl ActionDescriptor {
    pub fn new(label: impl Into<String>, on_click: impl Fn(&Row) + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            icon: String::new(),
            style: String::new(),
            on_click: Arc::new(on_click),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// The rendered form of this action.
    pub fn button(&self) -> ActionButton {
        ActionButton {
            label: self.label.clone(),
            icon: self.icon.clone(),
            style: self.style.clone(),
        }
    }
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

/// A rendered action button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: String,
    pub icon: String,
    pub style: String,
}
