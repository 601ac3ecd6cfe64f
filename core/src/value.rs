//! Bound values and the Rust field types that map onto them.

use crate::error::{OrmError, Result};

/// A literal bound to a positional placeholder, or read back from a row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Storage class of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Text,
    Bytes,
}

/// Storage class plus nullability. Together they pin down the exact Rust
/// type of a field, which the offset accessor relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueType {
    pub kind: ValueKind,
    pub nullable: bool,
}

impl ValueType {
    pub const fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            kind: self.kind,
            nullable: true,
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust type that can live in an entity field.
///
/// Sealed: the offset accessor turns [`SqlType::VALUE_TYPE`] back into a
/// concrete Rust type, so only the types it knows may report one.
///
/// ```compile_fail
/// use quarry_core::{Result, SqlType, Value, ValueKind, ValueType};
///
/// struct Flag(u8);
///
/// impl SqlType for Flag {
///     const VALUE_TYPE: ValueType = ValueType::new(ValueKind::Int64);
///
///     fn from_value(_: Value) -> Result<Self> {
///         Ok(Flag(0))
///     }
///
///     fn to_value(&self) -> Value {
///         Value::Int(i64::from(self.0))
///     }
/// }
/// ```
pub trait SqlType: sealed::Sealed + Sized + Send + 'static {
    const VALUE_TYPE: ValueType;

    fn from_value(value: Value) -> Result<Self>;

    fn to_value(&self) -> Value;
}

/// Marker for the non-optional field types. `Option` is only implemented
/// over these, so `Option<Option<T>>` never gets a `ValueType`.
pub trait NonNullable: SqlType {}

macro_rules! impl_integer {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl SqlType for $ty {
                const VALUE_TYPE: ValueType = ValueType::new(ValueKind::$kind);

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(v).map_err(|_| OrmError::invalid_value::<$ty>(v)),
                        Value::UInt(v) => <$ty>::try_from(v).map_err(|_| OrmError::invalid_value::<$ty>(v)),
                        Value::Bool(v) => Ok(<$ty>::from(v)),
                        other => Err(OrmError::invalid_value::<$ty>(other)),
                    }
                }

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }
            }

            impl sealed::Sealed for $ty {}
            impl NonNullable for $ty {}
        )*
    };
}

impl_integer!(i32 => Int32, i64 => Int64, u32 => UInt32, u64 => UInt64);

impl SqlType for bool {
    const VALUE_TYPE: ValueType = ValueType::new(ValueKind::Bool);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            Value::UInt(v) => Ok(v != 0),
            other => Err(OrmError::invalid_value::<bool>(other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl sealed::Sealed for bool {}
impl NonNullable for bool {}

impl SqlType for f64 {
    const VALUE_TYPE: ValueType = ValueType::new(ValueKind::Float64);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            Value::UInt(v) => Ok(v as f64),
            other => Err(OrmError::invalid_value::<f64>(other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl sealed::Sealed for f64 {}
impl NonNullable for f64 {}

impl SqlType for f32 {
    const VALUE_TYPE: ValueType = ValueType::new(ValueKind::Float32);

    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|v| v as f32)
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl sealed::Sealed for f32 {}
impl NonNullable for f32 {}

impl SqlType for String {
    const VALUE_TYPE: ValueType = ValueType::new(ValueKind::Text);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(v) => Ok(v),
            Value::Bytes(v) => {
                String::from_utf8(v).map_err(|e| OrmError::invalid_value::<String>(e.into_bytes()))
            }
            other => Err(OrmError::invalid_value::<String>(other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl sealed::Sealed for String {}
impl NonNullable for String {}

impl SqlType for Vec<u8> {
    const VALUE_TYPE: ValueType = ValueType::new(ValueKind::Bytes);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::Text(v) => Ok(v.into_bytes()),
            other => Err(OrmError::invalid_value::<Vec<u8>>(other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl sealed::Sealed for Vec<u8> {}
impl NonNullable for Vec<u8> {}

impl<T: NonNullable> sealed::Sealed for Option<T> {}

impl<T: NonNullable> SqlType for Option<T> {
    const VALUE_TYPE: ValueType = T::VALUE_TYPE.nullable();

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, SqlType::to_value)
    }
}

//------------------------------------------------------------------------------
// From<T> for Value
//------------------------------------------------------------------------------

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(feature = "rusqlite")]
impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        use rusqlite::types::{ToSqlOutput, Value as SqliteValue, ValueRef};

        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqliteValue::Null),
            Value::Bool(v) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*v))),
            Value::Int(v) => ToSqlOutput::Owned(SqliteValue::Integer(*v)),
            Value::UInt(v) => {
                let v = i64::try_from(*v)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                ToSqlOutput::Owned(SqliteValue::Integer(v))
            }
            Value::Float(v) => ToSqlOutput::Owned(SqliteValue::Real(*v)),
            Value::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Value::Bytes(v) => ToSqlOutput::Borrowed(ValueRef::Blob(v)),
        })
    }
}

#[cfg(feature = "rusqlite")]
impl rusqlite::types::FromSql for Value {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        use rusqlite::types::ValueRef;

        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Int(i),
            ValueRef::Real(r) => Value::Float(r),
            ValueRef::Text(text) => Value::Text(String::from_utf8_lossy(text).into_owned()),
            ValueRef::Blob(blob) => Value::Bytes(blob.to_vec()),
        })
    }
}
