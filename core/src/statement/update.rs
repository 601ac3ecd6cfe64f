use std::marker::PhantomData;

use crate::builder::Builder;
use crate::db::Core;
use crate::entity::Entity;
use crate::error::{OrmError, Result};
use crate::expr::{Assignable, Predicate};
use crate::middleware::{QueryContext, QueryKind};
use crate::pipeline::{self, ExecResult};
use crate::session::{Context, Session};
use crate::statement::{Query, QueryBuilder};

/// `UPDATE` statement. Bare columns in the SET list take their value from
/// the record passed to [`update`](Self::update), or `T::default()` when none is.
pub struct Updater<T> {
    core: Core,
    value: Option<T>,
    assigns: Vec<Assignable>,
    wheres: Vec<Predicate>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity + Sync> Updater<T> {
    pub fn new(sess: &dyn Session) -> Self {
        Self {
            core: sess.core().clone(),
            value: None,
            assigns: Vec::new(),
            wheres: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn update(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    pub fn set(mut self, assigns: impl IntoIterator<Item = Assignable>) -> Self {
        self.assigns = assigns.into_iter().collect();
        self
    }

    pub fn r#where(mut self, preds: impl IntoIterator<Item = Predicate>) -> Self {
        self.wheres = preds.into_iter().collect();
        self
    }

    pub fn exec(&self, ctx: &Context, sess: &dyn Session) -> ExecResult {
        let qc = QueryContext {
            kind: QueryKind::Update,
            builder: self,
            model: self.core.registry().get::<T>().ok(),
        };
        pipeline::exec(ctx, sess, &qc)
    }
}

impl<T: Entity + Sync> QueryBuilder for Updater<T> {
    fn build(&self) -> Result<Query> {
        if self.assigns.is_empty() {
            return Err(OrmError::NoUpdatedColumns);
        }
        let model = self.core.registry().get::<T>()?;
        let mut b = Builder::new(&self.core, model.clone());
        b.push_str("UPDATE ");
        b.quote(&model.table_name);
        b.push_str(" SET ");

        let fallback;
        let record = match &self.value {
            Some(value) => value,
            None => {
                fallback = T::default();
                &fallback
            }
        };
        let access = self.core.access();
        for (i, assign) in self.assigns.iter().enumerate() {
            if i > 0 {
                b.push(',');
            }
            match assign {
                Assignable::Column(c) => {
                    b.build_column(c.table.as_ref(), &c.name)?;
                    b.push_str("=?");
                    b.add_arg(access.field(record, &model, &c.name)?);
                }
                Assignable::Assignment(a) => {
                    b.build_column(None, &a.column)?;
                    b.push('=');
                    b.build_expression(&a.value)?;
                }
                Assignable::Raw(r) => b.build_raw(r),
            }
        }

        if !self.wheres.is_empty() {
            b.push_str(" WHERE ");
            b.build_predicates(&self.wheres)?;
        }
        Ok(b.finish())
    }
}
