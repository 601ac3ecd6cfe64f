use crate::access::ValueAccess;
use crate::entity::Record;
use crate::error::Result;
use crate::model::Field;
use crate::value::Value;

/// Goes through the [`Record`] methods generated for each entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflectAccess;

impl ValueAccess for ReflectAccess {
    fn write(&self, record: &mut dyn Record, field: &Field, value: Value) -> Result<()> {
        record.set_field_value(field.index, value)
    }

    fn read(&self, record: &dyn Record, field: &Field) -> Result<Value> {
        record.field_value(field.index)
    }
}
