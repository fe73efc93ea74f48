//! Session persistence error types

/// Errors that can occur while loading or persisting a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading or writing the session file failed.
    #[error("Session I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted session could not be (de)serialized.
    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
