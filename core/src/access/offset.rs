use crate::access::ValueAccess;
use crate::entity::Record;
use crate::error::Result;
use crate::model::Field;
use crate::value::{SqlType, Value, ValueKind};

/// Reads and writes fields in place, from the struct base pointer plus the
/// field offset recorded in the model.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetAccess;

/// Expand `$func::<Ty>(args)` for the Rust type a `ValueType` stands for.
macro_rules! with_field_type {
    ($ty:expr, $func:ident($($arg:expr),*)) => {
        match ($ty.kind, $ty.nullable) {
            (ValueKind::Bool, false) => $func::<bool>($($arg),*),
            (ValueKind::Bool, true) => $func::<Option<bool>>($($arg),*),
            (ValueKind::Int32, false) => $func::<i32>($($arg),*),
            (ValueKind::Int32, true) => $func::<Option<i32>>($($arg),*),
            (ValueKind::Int64, false) => $func::<i64>($($arg),*),
            (ValueKind::Int64, true) => $func::<Option<i64>>($($arg),*),
            (ValueKind::UInt32, false) => $func::<u32>($($arg),*),
            (ValueKind::UInt32, true) => $func::<Option<u32>>($($arg),*),
            (ValueKind::UInt64, false) => $func::<u64>($($arg),*),
            (ValueKind::UInt64, true) => $func::<Option<u64>>($($arg),*),
            (ValueKind::Float32, false) => $func::<f32>($($arg),*),
            (ValueKind::Float32, true) => $func::<Option<f32>>($($arg),*),
            (ValueKind::Float64, false) => $func::<f64>($($arg),*),
            (ValueKind::Float64, true) => $func::<Option<f64>>($($arg),*),
            (ValueKind::Text, false) => $func::<String>($($arg),*),
            (ValueKind::Text, true) => $func::<Option<String>>($($arg),*),
            (ValueKind::Bytes, false) => $func::<Vec<u8>>($($arg),*),
            (ValueKind::Bytes, true) => $func::<Option<Vec<u8>>>($($arg),*),
        }
    };
}

/// # Safety
///
/// `base + offset` must point at an initialized `T`.
unsafe fn store<T: SqlType>(base: *mut u8, offset: usize, value: Value) -> Result<()> {
    let value = T::from_value(value)?;
    // SAFETY: upheld by the caller
    unsafe { *base.add(offset).cast::<T>() = value };
    Ok(())
}

/// # Safety
///
/// `base + offset` must point at an initialized `T`.
unsafe fn load<T: SqlType>(base: *const u8, offset: usize) -> Result<Value> {
    // SAFETY: upheld by the caller
    let slot = unsafe { &*base.add(offset).cast::<T>() };
    Ok(slot.to_value())
}

impl ValueAccess for OffsetAccess {
    fn write(&self, record: &mut dyn Record, field: &Field, value: Value) -> Result<()> {
        let base = (record as *mut dyn Record).cast::<u8>();
        // SAFETY: the record was checked to be the model's entity type, and
        // `Entity` guarantees offset and type of every field it declares.
        unsafe { with_field_type!(field.ty, store(base, field.offset, value)) }
    }

    fn read(&self, record: &dyn Record, field: &Field) -> Result<Value> {
        let base = (record as *const dyn Record).cast::<u8>();
        // SAFETY: as in `write`
        unsafe { with_field_type!(field.ty, load(base, field.offset)) }
    }
}
