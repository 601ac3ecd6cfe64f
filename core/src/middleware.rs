//! Middleware wrapping every statement execution.
//!
//! A middleware turns the next [`Handler`] into a new one. The chain is
//! composed per call in reverse registration order, so the first registered
//! middleware is the outermost.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::model::Model;
use crate::session::{Context, ExecSummary};
use crate::statement::QueryBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
    Raw,
}

impl QueryKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            QueryKind::Select => "SELECT",
            QueryKind::Insert => "INSERT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
            QueryKind::Raw => "RAW",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a handler sees about the call it handles.
pub struct QueryContext<'a> {
    pub kind: QueryKind,
    pub builder: &'a dyn QueryBuilder,
    /// Model of the statement's entity, when it could be resolved
    pub model: Option<Arc<Model>>,
}

impl fmt::Debug for QueryContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("kind", &self.kind)
            .field("table", &self.model.as_ref().map(|m| m.table_name.as_str()))
            .finish_non_exhaustive()
    }
}

/// What a handler produces.
pub enum QueryPayload {
    /// One record, boxed as the statement's entity type
    Record(Box<dyn Any + Send>),
    /// A `Vec` of the statement's entity type
    Records(Box<dyn Any + Send>),
    Exec(ExecSummary),
}

impl fmt::Debug for QueryPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryPayload::Record(_) => f.write_str("Record(..)"),
            QueryPayload::Records(_) => f.write_str("Records(..)"),
            QueryPayload::Exec(summary) => f.debug_tuple("Exec").field(summary).finish(),
        }
    }
}

pub type QueryResult = Result<QueryPayload>;

pub type Handler<'a> = Box<dyn Fn(&Context, &QueryContext<'_>) -> QueryResult + 'a>;

pub trait Middleware: Send + Sync {
    fn wrap<'a>(&'a self, next: Handler<'a>) -> Handler<'a>;
}

/// Compose `endpoint` with `middlewares`, first entry outermost.
pub fn chain<'a>(middlewares: &'a [Arc<dyn Middleware>], endpoint: Handler<'a>) -> Handler<'a> {
    middlewares
        .iter()
        .rev()
        .fold(endpoint, |next, m| m.wrap(next))
}

/// Logs every statement through `tracing`.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    log_sql: bool,
}

#[cfg(feature = "tracing")]
impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also compile the statement and log its text.
    pub fn with_sql(self) -> Self {
        Self { log_sql: true }
    }
}

#[cfg(feature = "tracing")]
impl Middleware for LoggingMiddleware {
    fn wrap<'a>(&'a self, next: Handler<'a>) -> Handler<'a> {
        Box::new(move |ctx: &Context, qc: &QueryContext<'_>| -> QueryResult {
            let table = qc.model.as_ref().map_or("", |m| m.table_name.as_str());
            if self.log_sql
                && let Ok(query) = qc.builder.build()
            {
                tracing::debug!(target: "quarry", kind = %qc.kind, table, sql = %query.sql, args = query.args.len(), "quarry.statement");
            }
            let start = std::time::Instant::now();
            let result = next(ctx, qc);
            let elapsed_us = start.elapsed().as_micros() as u64;
            match &result {
                Ok(_) => tracing::info!(target: "quarry", kind = %qc.kind, table, elapsed_us, "quarry.statement.done"),
                Err(err) => {
                    tracing::warn!(target: "quarry", kind = %qc.kind, table, elapsed_us, error = %err, "quarry.statement.failed")
                }
            }
            result
        })
    }
}
