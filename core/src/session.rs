//! The boundary to the database: drivers run SQL, sessions pair a driver
//! with the configuration statements need.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::db::Core;
use crate::error::{OrmError, Result};
use crate::value::Value;

/// Cancellation token and optional deadline for one call.
///
/// Clones share the cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(self.deadline.map_or(deadline, |d| d.min(deadline))),
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `Err` once the call is cancelled or past its deadline.
    pub fn check(&self) -> Result<()> {
        if self.cancelled.load(Ordering::Acquire) {
            return Err(OrmError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(OrmError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecSummary {
    pub rows_affected: u64,
    pub last_insert_id: i64,
}

/// A row cursor. Dropping it releases whatever the driver holds for it.
pub trait Rows {
    /// Column names of the result set, in order.
    fn columns(&self) -> &[String];

    fn next_row(&mut self) -> Result<Option<Vec<Value>>>;
}

/// Rows fetched up front.
#[derive(Debug, Clone, Default)]
pub struct BufferedRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
}

impl BufferedRows {
    pub fn new(columns: Vec<String>, rows: impl IntoIterator<Item = Vec<Value>>) -> Self {
        Self {
            columns,
            rows: rows.into_iter().collect(),
        }
    }
}

impl Rows for BufferedRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }
}

/// A database connection.
pub trait Driver: Send {
    /// Short name used in transaction events, such as `"rusqlite"`.
    fn name(&self) -> &'static str;

    fn query(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>>;

    fn exec(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<ExecSummary>;

    fn begin(&self, ctx: &Context) -> Result<Box<dyn DriverTx + '_>>;
}

/// An open driver transaction.
pub trait DriverTx {
    fn query(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>>;

    fn exec(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<ExecSummary>;

    fn commit(self: Box<Self>) -> Result<()>;

    fn rollback(self: Box<Self>) -> Result<()>;
}

/// What statements execute against. [`DB`](crate::DB) and [`Tx`](crate::Tx)
/// are interchangeable here.
pub trait Session {
    fn core(&self) -> &Core;

    fn query(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>>;

    fn exec(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<ExecSummary>;
}
