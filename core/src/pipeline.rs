//! Statement execution: build, run through the middleware chain, materialize.

use std::sync::Arc;

use crate::entity::Entity;
use crate::error::{OrmError, Result};
use crate::middleware::{Handler, QueryContext, QueryPayload, QueryResult, chain};
use crate::model::Model;
use crate::session::{Context, ExecSummary, Session};
use crate::quarry_trace_query;

/// Outcome of an insert, update, delete or raw exec. The accessors return
/// the execution error when there is one.
#[derive(Debug, Clone)]
pub struct ExecResult {
    res: Result<ExecSummary>,
}

impl ExecResult {
    pub fn err(&self) -> Option<&OrmError> {
        self.res.as_ref().err()
    }

    pub fn rows_affected(&self) -> Result<u64> {
        self.res.clone().map(|s| s.rows_affected)
    }

    pub fn last_insert_id(&self) -> Result<i64> {
        self.res.clone().map(|s| s.last_insert_id)
    }

    pub fn into_result(self) -> Result<ExecSummary> {
        self.res
    }
}

impl From<Result<ExecSummary>> for ExecResult {
    fn from(res: Result<ExecSummary>) -> Self {
        Self { res }
    }
}

pub(crate) fn get<T: Entity>(
    ctx: &Context,
    sess: &dyn Session,
    qc: &QueryContext<'_>,
) -> Result<T> {
    let endpoint: Handler<'_> =
        Box::new(move |ctx: &Context, qc: &QueryContext<'_>| get_handler::<T>(ctx, sess, qc));
    let handler = chain(sess.core().middlewares(), endpoint);
    match handler(ctx, qc)? {
        QueryPayload::Record(record) => record
            .downcast::<T>()
            .map(|record| *record)
            .map_err(|_| OrmError::UnexpectedPayload("a single record")),
        _ => Err(OrmError::UnexpectedPayload("a single record")),
    }
}

fn get_handler<T: Entity>(ctx: &Context, sess: &dyn Session, qc: &QueryContext<'_>) -> QueryResult {
    let query = qc.builder.build()?;
    quarry_trace_query!(qc.kind, &query.sql, query.args.len());
    let mut rows = sess.query(ctx, &query.sql, &query.args)?;
    let Some(values) = rows.next_row()? else {
        return Err(OrmError::NoRowsFound);
    };
    let core = sess.core();
    let model = core.registry().get::<T>()?;
    let mut record = T::default();
    core.access()
        .set_columns(&mut record, &model, rows.columns(), values)?;
    Ok(QueryPayload::Record(Box::new(record)))
}

pub(crate) fn get_multi<T: Entity>(
    ctx: &Context,
    sess: &dyn Session,
    qc: &QueryContext<'_>,
) -> Result<Vec<T>> {
    let endpoint: Handler<'_> = Box::new(move |ctx: &Context, qc: &QueryContext<'_>| {
        get_multi_handler::<T>(ctx, sess, qc)
    });
    let handler = chain(sess.core().middlewares(), endpoint);
    match handler(ctx, qc)? {
        QueryPayload::Records(records) => records
            .downcast::<Vec<T>>()
            .map(|records| *records)
            .map_err(|_| OrmError::UnexpectedPayload("a list of records")),
        _ => Err(OrmError::UnexpectedPayload("a list of records")),
    }
}

fn get_multi_handler<T: Entity>(
    ctx: &Context,
    sess: &dyn Session,
    qc: &QueryContext<'_>,
) -> QueryResult {
    let query = qc.builder.build()?;
    quarry_trace_query!(qc.kind, &query.sql, query.args.len());
    let core = sess.core();
    // the cursor is dropped on every return below
    let mut rows = sess.query(ctx, &query.sql, &query.args)?;
    let mut cached: Option<Arc<Model>> = None;
    let mut records = Vec::new();
    while let Some(values) = rows.next_row()? {
        ctx.check()?;
        let model = match cached.clone() {
            Some(m) => m,
            None => {
                let m = core.registry().get::<T>()?;
                cached = Some(Arc::clone(&m));
                m
            }
        };
        let mut record = T::default();
        core.access()
            .set_columns(&mut record, &model, rows.columns(), values)?;
        records.push(record);
    }
    Ok(QueryPayload::Records(Box::new(records)))
}

pub(crate) fn exec(ctx: &Context, sess: &dyn Session, qc: &QueryContext<'_>) -> ExecResult {
    let endpoint: Handler<'_> = Box::new(move |ctx: &Context, qc: &QueryContext<'_>| {
        let query = qc.builder.build()?;
        quarry_trace_query!(qc.kind, &query.sql, query.args.len());
        let summary = sess.exec(ctx, &query.sql, &query.args)?;
        Ok(QueryPayload::Exec(summary))
    });
    let handler = chain(sess.core().middlewares(), endpoint);
    let res = handler(ctx, qc).and_then(|payload| match payload {
        QueryPayload::Exec(summary) => Ok(summary),
        _ => Err(OrmError::UnexpectedPayload("an exec summary")),
    });
    ExecResult::from(res)
}
