//! Strategies for moving values in and out of entity fields.
//!
//! Both strategies share column resolution and error handling through the
//! provided methods of [`ValueAccess`]; they differ only in how a single
//! field is read or written.

mod offset;
mod reflect;

pub use offset::OffsetAccess;
pub use reflect::ReflectAccess;

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Record;
use crate::error::{OrmError, Result};
use crate::model::{Field, Model};
use crate::value::Value;

pub trait ValueAccess: Send + Sync + fmt::Debug {
    /// Write one field. `record` has already been checked against the model.
    fn write(&self, record: &mut dyn Record, field: &Field, value: Value) -> Result<()>;

    /// Read one field. `record` has already been checked against the model.
    fn read(&self, record: &dyn Record, field: &Field) -> Result<Value>;

    /// Set the fields named by `columns` from the matching `values`.
    fn set_columns(
        &self,
        record: &mut dyn Record,
        model: &Model,
        columns: &[String],
        values: Vec<Value>,
    ) -> Result<()> {
        check_record(&*record, model)?;
        if columns.len() > model.fields().len() {
            return Err(OrmError::TooManyColumns {
                returned: columns.len(),
                fields: model.fields().len(),
            });
        }
        if columns.len() != values.len() {
            return Err(OrmError::RowWidthMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }
        for (column, value) in columns.iter().zip(values) {
            let field = model
                .field_by_column(column)
                .ok_or_else(|| OrmError::UnknownColumn(column.clone()))?;
            self.write(record, field, value)?;
        }
        Ok(())
    }

    /// Current value of the field with the given declared name.
    fn field(&self, record: &dyn Record, model: &Model, name: &str) -> Result<Value> {
        check_record(record, model)?;
        let field = model
            .field(name)
            .ok_or_else(|| OrmError::UnknownField(name.to_owned()))?;
        self.read(record, field)
    }
}

/// Compares the concrete type behind `record`, which no `Record` impl can
/// misreport, with the model's type.
fn check_record(record: &dyn Record, model: &Model) -> Result<()> {
    let record: &dyn Any = record;
    if record.type_id() == model.type_id() {
        Ok(())
    } else {
        Err(OrmError::ModelMismatch(model.table_name.clone()))
    }
}

/// Which [`ValueAccess`] a data source uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    #[default]
    Offset,
    Reflect,
}
