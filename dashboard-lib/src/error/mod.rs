//! Error types

mod api;
mod session;
mod table;

pub use api::*;
pub use session::*;
pub use table::*;

/// Top-level error returned by the dashboard core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Reading or writing the persisted session failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A table descriptor was rejected.
    #[error(transparent)]
    Table(#[from] TableError),
}

impl Error {
    /// Returns `true` if this error ended the session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Api(api) if api.is_auth_failure())
    }

    /// Returns the HTTP status code if the error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(api) => api.status_code(),
            _ => None,
        }
    }
}
