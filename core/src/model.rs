//! Table metadata reflected from entity types, memoized per type.

use std::any::TypeId;
use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;

use crate::entity::{Entity, EntityDef, Shape};
use crate::error::{OrmError, Result};
use crate::value::ValueType;

const TAG_COLUMN: &str = "column";

/// A mapped field of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub column: String,
    pub name: &'static str,
    pub ty: ValueType,
    pub index: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub table_name: String,
    type_id: TypeId,
    fields: Vec<Field>,
    by_name: HashMap<&'static str, usize>,
    by_column: HashMap<String, usize>,
}

impl Model {
    fn new(type_id: TypeId, table_name: String, fields: Vec<Field>) -> Self {
        let by_name = fields.iter().map(|f| (f.name, f.index)).collect();
        let mut model = Self {
            table_name,
            type_id,
            fields,
            by_name,
            by_column: HashMap::new(),
        };
        model.index_columns();
        model
    }

    fn index_columns(&mut self) {
        self.by_column = self
            .fields
            .iter()
            .map(|f| (f.column.clone(), f.index))
            .collect();
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look a field up by its declared name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    pub fn field_by_column(&self, column: &str) -> Option<&Field> {
        self.by_column.get(column).map(|&i| &self.fields[i])
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

/// Adjustments applied once, when a model is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOption {
    TableName(String),
    ColumnName { field: String, column: String },
}

impl ModelOption {
    pub fn table_name(name: impl Into<String>) -> Self {
        ModelOption::TableName(name.into())
    }

    pub fn column_name(field: impl Into<String>, column: impl Into<String>) -> Self {
        ModelOption::ColumnName {
            field: field.into(),
            column: column.into(),
        }
    }

    fn apply(&self, model: &mut Model) -> Result<()> {
        match self {
            ModelOption::TableName(name) => model.table_name = name.clone(),
            ModelOption::ColumnName { field, column } => {
                let index = *model
                    .by_name
                    .get(field.as_str())
                    .ok_or_else(|| OrmError::UnknownField(field.clone()))?;
                model.fields[index].column = column.clone();
                model.index_columns();
            }
        }
        Ok(())
    }
}

/// Memoized models keyed by entity type.
///
/// Models are computed outside the lock and published whole, so a racing
/// first lookup only ever does redundant work.
#[derive(Debug, Default)]
pub struct Registry {
    models: RwLock<HashMap<TypeId, Arc<Model>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Entity>(&self) -> Result<Arc<Model>> {
        self.get_def(TypeId::of::<T>(), T::entity_def())
    }

    pub fn register<T: Entity>(&self, options: &[ModelOption]) -> Result<Arc<Model>> {
        self.register_def(TypeId::of::<T>(), T::entity_def(), options)
    }

    pub(crate) fn get_def(&self, type_id: TypeId, def: &'static EntityDef) -> Result<Arc<Model>> {
        let cached = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .cloned();
        match cached {
            Some(model) => Ok(model),
            None => self.register_def(type_id, def, &[]),
        }
    }

    pub(crate) fn register_def(
        &self,
        type_id: TypeId,
        def: &'static EntityDef,
        options: &[ModelOption],
    ) -> Result<Arc<Model>> {
        let mut model = parse_model(type_id, def)?;
        for option in options {
            option.apply(&mut model)?;
        }
        let model = Arc::new(model);
        self.models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_id, Arc::clone(&model));
        Ok(model)
    }
}

fn parse_model(type_id: TypeId, def: &EntityDef) -> Result<Model> {
    let Shape::Struct(defs) = def.shape else {
        return Err(OrmError::NotAStruct(def.type_name));
    };
    let mut fields = Vec::with_capacity(defs.len());
    for (index, fd) in defs.iter().enumerate() {
        let tags = parse_tag(fd.tag)?;
        let column = match tags.get(TAG_COLUMN) {
            Some(column) if !column.is_empty() => (*column).to_owned(),
            _ => underscore_name(fd.name),
        };
        fields.push(Field {
            column,
            name: fd.name,
            ty: fd.ty,
            index,
            offset: fd.offset,
        });
    }
    let table_name = match def.table_name {
        Some(name) => name.to_owned(),
        None => underscore_name(def.type_name),
    };
    Ok(Model::new(type_id, table_name, fields))
}

/// Split `key=value,key=value` into pairs.
pub(crate) fn parse_tag(tag: &str) -> Result<HashMap<&str, &str>> {
    let mut res = HashMap::new();
    if tag.is_empty() {
        return Ok(res);
    }
    for pair in tag.split(',') {
        let mut kv = pair.split('=');
        match (kv.next(), kv.next(), kv.next()) {
            (Some(key), Some(value), None) => {
                res.insert(key.trim(), value.trim());
            }
            _ => return Err(OrmError::MalformedTag(pair.to_owned())),
        }
    }
    Ok(res)
}

/// `FirstName` -> `first_name`. Every uppercase letter after the first
/// character gets an underscore in front.
pub fn underscore_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i != 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
