use std::marker::PhantomData;

use crate::builder::Builder;
use crate::db::Core;
use crate::dialect::Upsert;
use crate::entity::Entity;
use crate::error::{OrmError, Result};
use crate::expr::Assignable;
use crate::middleware::{QueryContext, QueryKind};
use crate::model::Field;
use crate::pipeline::{self, ExecResult};
use crate::session::{Context, Session};
use crate::statement::{Query, QueryBuilder};

/// `INSERT` of one or more records, with optional conflict handling.
pub struct Inserter<T> {
    core: Core,
    values: Vec<T>,
    /// Declared field names to insert, all fields when empty
    columns: Vec<String>,
    upsert: Option<Upsert>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity + Sync> Inserter<T> {
    pub fn new(sess: &dyn Session) -> Self {
        Self {
            core: sess.core().clone(),
            values: Vec::new(),
            columns: Vec::new(),
            upsert: None,
            _marker: PhantomData,
        }
    }

    pub fn values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.values = values.into_iter().collect();
        self
    }

    /// Restrict the insert to the given declared field names.
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn on_duplicate_key(self) -> UpsertBuilder<T> {
        UpsertBuilder {
            inserter: self,
            conflict_columns: Vec::new(),
        }
    }

    pub fn exec(&self, ctx: &Context, sess: &dyn Session) -> ExecResult {
        let qc = QueryContext {
            kind: QueryKind::Insert,
            builder: self,
            model: self.core.registry().get::<T>().ok(),
        };
        pipeline::exec(ctx, sess, &qc)
    }
}

impl<T: Entity + Sync> QueryBuilder for Inserter<T> {
    fn build(&self) -> Result<Query> {
        if self.values.is_empty() {
            return Err(OrmError::InsertZeroRows);
        }
        let model = self.core.registry().get::<T>()?;
        let fields: Vec<&Field> = if self.columns.is_empty() {
            model.fields().iter().collect()
        } else {
            self.columns
                .iter()
                .map(|name| {
                    model
                        .field(name)
                        .ok_or_else(|| OrmError::UnknownField(name.clone()))
                })
                .collect::<Result<_>>()?
        };

        let mut b = Builder::new(&self.core, model.clone());
        b.reserve_args(fields.len() * self.values.len());
        b.push_str("INSERT INTO ");
        b.quote(&model.table_name);
        b.push('(');
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                b.push(',');
            }
            b.quote(&field.column);
        }
        b.push_str(") VALUES");

        let access = self.core.access();
        for (row, record) in self.values.iter().enumerate() {
            if row > 0 {
                b.push(',');
            }
            b.push('(');
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    b.push(',');
                }
                b.push('?');
                b.add_arg(access.field(record, &model, field.name)?);
            }
            b.push(')');
        }

        if let Some(upsert) = &self.upsert {
            self.core.dialect().build_upsert(&mut b, upsert)?;
        }
        Ok(b.finish())
    }
}

/// Conflict clause under construction; [`update`](Self::update) returns to the insert.
pub struct UpsertBuilder<T> {
    inserter: Inserter<T>,
    conflict_columns: Vec<String>,
}

impl<T: Entity + Sync> UpsertBuilder<T> {
    /// Declared field names of the conflict target. Ignored by dialects
    /// that infer it from the key.
    pub fn conflict_columns<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.conflict_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn update(self, assigns: impl IntoIterator<Item = Assignable>) -> Inserter<T> {
        let mut inserter = self.inserter;
        inserter.upsert = Some(Upsert {
            conflict_columns: self.conflict_columns,
            assigns: assigns.into_iter().collect(),
        });
        inserter
    }
}
