//! Table descriptor error types

/// Errors raised when building table descriptors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Two columns share the same key.
    #[error("Duplicate column key '{0}'")]
    DuplicateColumn(String),
}
