use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OrmError {
    /// The entity has no named fields to map onto columns
    #[error("only structs with named fields can be registered, got `{0}`")]
    NotAStruct(&'static str),

    /// A field tag pair did not split into exactly `key=value`
    #[error("malformed tag content: `{0}`")]
    MalformedTag(String),

    /// A declared field name that the model does not know
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// A result column that maps to no field of the model
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    /// The result set carries more columns than the model has fields
    #[error("too many columns returned: {returned} columns for {fields} fields")]
    TooManyColumns { returned: usize, fields: usize },

    /// A row carried a different number of values than it named columns
    #[error("row has {values} values for {columns} columns")]
    RowWidthMismatch { columns: usize, values: usize },

    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("unsupported selectable: {0}")]
    UnsupportedSelectable(String),

    #[error("unsupported assignable: {0}")]
    UnsupportedAssignable(String),

    #[error("update statement has no columns to set")]
    NoUpdatedColumns,

    #[error("insert statement requires at least one row")]
    InsertZeroRows,

    /// No rows returned when at least one was expected
    #[error("no rows found")]
    NoRowsFound,

    /// A stored value cannot be converted into the field's Rust type
    #[error("cannot convert {found} into `{expected}`")]
    InvalidValue {
        expected: &'static str,
        found: String,
    },

    /// A record was handed to a model describing a different type
    #[error("record does not belong to model `{0}`")]
    ModelMismatch(String),

    /// A middleware replaced the handler payload with a different shape
    #[error("unexpected query payload, expected {0}")]
    UnexpectedPayload(&'static str),

    /// Rolling back after a failed transactional scope failed as well
    #[error("rollback failed ({rollback}) after error: {cause} (panicked: {panicked})")]
    RollbackAfterFailure {
        #[source]
        cause: Box<OrmError>,
        rollback: Box<OrmError>,
        panicked: bool,
    },

    /// Error with transaction
    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("query cancelled")]
    Cancelled,

    #[error("query deadline exceeded")]
    DeadlineExceeded,

    #[error("configuration error: {0}")]
    Config(String),

    /// Error reported by the database driver
    #[error("driver error: {0}")]
    Driver(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl OrmError {
    pub fn driver(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        OrmError::Driver(Arc::new(err))
    }

    pub fn rollback_after_failure(cause: OrmError, rollback: OrmError, panicked: bool) -> Self {
        OrmError::RollbackAfterFailure {
            cause: Box::new(cause),
            rollback: Box::new(rollback),
            panicked,
        }
    }

    pub fn invalid_value<T>(found: impl std::fmt::Debug) -> Self {
        OrmError::InvalidValue {
            expected: std::any::type_name::<T>(),
            found: format!("{found:?}"),
        }
    }
}

#[cfg(feature = "rusqlite")]
impl From<rusqlite::Error> for OrmError {
    fn from(err: rusqlite::Error) -> Self {
        OrmError::driver(err)
    }
}

/// Result type for query construction and execution
pub type Result<T> = std::result::Result<T, OrmError>;
