use std::marker::PhantomData;

use crate::builder::Builder;
use crate::db::Core;
use crate::entity::Entity;
use crate::error::Result;
use crate::expr::Predicate;
use crate::middleware::{QueryContext, QueryKind};
use crate::pipeline::{self, ExecResult};
use crate::session::{Context, Session};
use crate::statement::{Query, QueryBuilder};

/// `DELETE` statement against `T`'s table.
pub struct Deleter<T> {
    core: Core,
    /// Table name overriding the model's
    table: Option<String>,
    wheres: Vec<Predicate>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> Deleter<T> {
    pub fn new(sess: &dyn Session) -> Self {
        Self {
            core: sess.core().clone(),
            table: None,
            wheres: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn r#where(mut self, preds: impl IntoIterator<Item = Predicate>) -> Self {
        self.wheres = preds.into_iter().collect();
        self
    }

    pub fn exec(&self, ctx: &Context, sess: &dyn Session) -> ExecResult {
        let qc = QueryContext {
            kind: QueryKind::Delete,
            builder: self,
            model: self.core.registry().get::<T>().ok(),
        };
        pipeline::exec(ctx, sess, &qc)
    }
}

impl<T: Entity> QueryBuilder for Deleter<T> {
    fn build(&self) -> Result<Query> {
        let model = self.core.registry().get::<T>()?;
        let mut b = Builder::new(&self.core, model);
        b.push_str("DELETE FROM ");
        match &self.table {
            Some(table) => b.quote(table),
            None => b.build_table(None)?,
        }
        if !self.wheres.is_empty() {
            b.push_str(" WHERE ");
            b.build_predicates(&self.wheres)?;
        }
        Ok(b.finish())
    }
}
