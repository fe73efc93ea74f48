//! CLI error type.

use std::path::PathBuf;

use dashboard_lib::error::ApiError;
use dashboard_lib::error::Error as DashboardError;
use dashboard_lib::error::SessionError;
use dashboard_lib::error::TableError;
use dashboard_lib::resource::ErrorInfo;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Could not determine the user data directory")]
    NoDataDir,

    #[error("Session expired, sign in again with `dashboard login --token <TOKEN>`")]
    SessionExpired,

    #[error("Column '{0}' is not sortable")]
    NotSortable(String),

    #[error(transparent)]
    Dashboard(#[from] DashboardError),
}

impl CliError {
    /// Whether re-running the same command may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CliError::Dashboard(DashboardError::Api(e)) => ErrorInfo::from(e).is_retryable(),
            _ => false,
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        CliError::Dashboard(err.into())
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        CliError::Dashboard(err.into())
    }
}

impl From<TableError> for CliError {
    fn from(err: TableError) -> Self {
        CliError::Dashboard(err.into())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
