use std::marker::PhantomData;

use crate::db::Core;
use crate::entity::Entity;
use crate::error::Result;
use crate::middleware::{QueryContext, QueryKind};
use crate::pipeline::{self, ExecResult};
use crate::session::{Context, Session};
use crate::statement::{Query, QueryBuilder};
use crate::value::Value;

/// Hand-written SQL whose rows materialize into `T`.
pub struct RawQuerier<T> {
    core: Core,
    sql: String,
    args: Vec<Value>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> RawQuerier<T> {
    pub fn new(
        sess: &dyn Session,
        sql: impl Into<String>,
        args: impl IntoIterator<Item = Value>,
    ) -> Self {
        Self {
            core: sess.core().clone(),
            sql: sql.into(),
            args: args.into_iter().collect(),
            _marker: PhantomData,
        }
    }

    pub fn get(&self, ctx: &Context, sess: &dyn Session) -> Result<T> {
        pipeline::get::<T>(ctx, sess, &self.query_context())
    }

    pub fn get_multi(&self, ctx: &Context, sess: &dyn Session) -> Result<Vec<T>> {
        pipeline::get_multi::<T>(ctx, sess, &self.query_context())
    }

    pub fn exec(&self, ctx: &Context, sess: &dyn Session) -> ExecResult {
        pipeline::exec(ctx, sess, &self.query_context())
    }

    fn query_context(&self) -> QueryContext<'_> {
        QueryContext {
            kind: QueryKind::Raw,
            builder: self,
            model: self.core.registry().get::<T>().ok(),
        }
    }
}

impl<T: Entity> QueryBuilder for RawQuerier<T> {
    fn build(&self) -> Result<Query> {
        Ok(Query {
            sql: self.sql.clone(),
            args: self.args.clone(),
        })
    }
}
