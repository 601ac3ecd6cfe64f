//! TOML configuration for a data source.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::access::AccessKind;
use crate::dialect::Dialect;
use crate::error::{OrmError, Result};

/// Data source settings.
///
/// ```toml
/// dialect = "sqlite"
/// value_access = "reflect"
/// log_queries = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQL dialect, `mysql` unless set
    pub dialect: Dialect,
    /// Field access strategy, `offset` unless set
    pub value_access: AccessKind,
    /// Install a [`LoggingMiddleware`](crate::LoggingMiddleware) that also logs SQL text
    pub log_queries: bool,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| OrmError::Config(format!("{}: {e}", path.display())))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| OrmError::Config(e.to_string()))
    }
}
