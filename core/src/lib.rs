//! Core of quarry: model registry, expression algebra, SQL compiler,
//! dialects, statements and the execution pipeline.

pub mod access;
mod builder;
pub mod config;
pub mod db;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod expr;
pub mod middleware;
pub mod model;
mod pipeline;
pub mod session;
pub mod statement;
pub mod table;
mod tracing;
pub mod value;

#[cfg(test)]
mod testing;

pub use access::{AccessKind, OffsetAccess, ReflectAccess, ValueAccess};
pub use config::Config;
pub use db::{Core, DB, DBBuilder, Tx};
pub use dialect::Dialect;
pub use entity::{Entity, EntityDef, FieldDef, Record, Shape};
pub use error::{OrmError, Result};
pub use expr::{
    Aggregate, Assignable, Assignment, Column, Expr, IntoExpr, MathExpr, Predicate, RawExpr,
    SubqueryExpr, all, any, assign, avg, c, count, exists, max, min, not, raw, some, sum,
};
#[cfg(feature = "tracing")]
pub use middleware::LoggingMiddleware;
pub use middleware::{Handler, Middleware, QueryContext, QueryKind, QueryPayload, QueryResult};
pub use model::{Field, Model, ModelOption, Registry};
pub use pipeline::ExecResult;
pub use session::{BufferedRows, Context, Driver, DriverTx, ExecSummary, Rows, Session};
pub use statement::{
    Deleter, Inserter, Query, QueryBuilder, RawQuerier, Selector, Updater, UpsertBuilder,
};
pub use table::{Join, JoinBuilder, JoinKind, Subquery, Table, TableRef};
pub use value::{NonNullable, SqlType, Value, ValueKind, ValueType};
