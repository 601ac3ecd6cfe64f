//! Static metadata an application record type exposes to the registry.
//!
//! `#[derive(Entity)]` writes these impls. A hand-written impl has to uphold
//! the same contract; see [`Entity`].

use std::any::Any;

use crate::error::Result;
use crate::value::{Value, ValueType};

/// One declared field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Declared Rust field name
    pub name: &'static str,
    /// Raw `key=value[,key=value]` annotation, empty when absent
    pub tag: &'static str,
    pub ty: ValueType,
    /// Byte offset of the field inside the struct
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Named fields in declaration order
    Struct(&'static [FieldDef]),
    /// Tuple and unit structs; these cannot be mapped onto columns
    Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDef {
    pub type_name: &'static str,
    /// Explicit table name, bypassing the snake-cased type name
    pub table_name: Option<&'static str>,
    pub shape: Shape,
}

/// Object-safe field access used by the reflection strategy.
pub trait Record: Any + Send {
    /// Read the field at its declaration index.
    fn field_value(&self, index: usize) -> Result<Value>;

    /// Overwrite the field at its declaration index.
    fn set_field_value(&mut self, index: usize, value: Value) -> Result<()>;
}

/// A record type that can be registered as a model.
///
/// # Safety
///
/// When [`EntityDef::shape`] is [`Shape::Struct`], each [`FieldDef`] must
/// describe a field of `Self` located at `offset` whose Rust type is exactly the
/// one `ty` was derived from through [`SqlType::VALUE_TYPE`](crate::SqlType).
/// The offset accessor reads and writes fields through raw pointers based on
/// these values.
pub unsafe trait Entity: Record + Default {
    fn entity_def() -> &'static EntityDef;
}
