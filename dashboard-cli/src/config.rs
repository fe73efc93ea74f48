//! `config.toml` loading.

use std::path::Path;

use dashboard_lib::error::TableError;
use dashboard_lib::table::ColumnDescriptor;
use dashboard_lib::table::ColumnSet;
use dashboard_lib::table::Row;
use serde::Deserialize;
use serde::Serialize;
use simplelog::LevelFilter;

use crate::error::CliError;
use crate::error::Result;

/// Key of the generated row-number column.
pub const ORDINAL_KEY: &str = "#";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST API.
    pub api_url: String,
    /// Collection path listed by `dashboard list`.
    pub endpoint: String,
    pub page_size: u32,
    /// Payload key holding the records.
    pub items_key: String,
    /// Payload key holding the record count.
    pub total_key: String,
    /// Prepends a `#` column numbering rows across pages.
    pub numbered: bool,
    /// Columns to show. Empty means every field of the first record.
    pub columns: Vec<ColumnConfig>,
    pub log_level: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            endpoint: "/api/v1/products".to_string(),
            page_size: 10,
            items_key: "data".to_string(),
            total_key: "total".to_string(),
            numbered: true,
            columns: Vec::new(),
            log_level: "info".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub sortable: bool,
}

impl ColumnConfig {
    fn descriptor(&self) -> ColumnDescriptor {
        let label = self.label.clone().unwrap_or_else(|| self.key.clone());
        let descriptor = ColumnDescriptor::new(&self.key, label);
        if self.sortable {
            descriptor.sortable()
        } else {
            descriptor
        }
    }
}

impl Config {
    /// Loads the config at `path`, or at the default location when `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => match crate::paths::config_file() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Log level, falling back to `info` for unknown names.
    pub fn level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    /// Builds the configured columns, or one column per field of `sample`.
    pub fn column_set(&self, sample: Option<&Row>) -> std::result::Result<ColumnSet, TableError> {
        let mut columns = Vec::new();
        if self.numbered {
            columns.push(
                ColumnDescriptor::new(ORDINAL_KEY, ORDINAL_KEY)
                    .render_text(|_, _, index, ctx| ctx.ordinal(index).to_string()),
            );
        }

        if self.columns.is_empty() {
            if let Some(row) = sample {
                columns.extend(row.fields().keys().map(|k| ColumnDescriptor::new(k, k)));
            }
        } else {
            columns.extend(self.columns.iter().map(ColumnConfig::descriptor));
        }

        ColumnSet::new(columns)
    }
}
