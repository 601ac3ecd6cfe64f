//! SQLite through `rusqlite`.
//!
//! The connection sits behind a mutex. A transaction holds the lock until it
//! finishes, so statements inside a transaction must go through the [`Tx`],
//! never through the [`DB`] that opened it.
//!
//! [`Tx`]: crate::Tx
//! [`DB`]: crate::DB

use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, params_from_iter};

use quarry_core::{
    BufferedRows, Context, Driver, DriverTx, ExecSummary, Result, Rows, Value,
};

pub struct RusqliteDriver {
    conn: Mutex<Connection>,
}

impl RusqliteDriver {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RusqliteDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusqliteDriver").finish_non_exhaustive()
    }
}

/// Runs the statement and buffers every row.
fn query(conn: &Connection, ctx: &Context, sql: &str, args: &[Value]) -> Result<BufferedRows> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params_from_iter(args))?;
    let mut buffered = Vec::new();
    while let Some(row) = rows.next()? {
        ctx.check()?;
        let values = (0..columns.len())
            .map(|i| row.get::<_, Value>(i))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        buffered.push(values);
    }
    Ok(BufferedRows::new(columns, buffered))
}

fn exec(conn: &Connection, sql: &str, args: &[Value]) -> Result<ExecSummary> {
    let rows_affected = conn.execute(sql, params_from_iter(args))?;
    Ok(ExecSummary {
        rows_affected: rows_affected as u64,
        last_insert_id: conn.last_insert_rowid(),
    })
}

impl Driver for RusqliteDriver {
    fn name(&self) -> &'static str {
        "rusqlite"
    }

    fn query(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>> {
        Ok(Box::new(query(&self.lock(), ctx, sql, args)?))
    }

    fn exec(&self, _: &Context, sql: &str, args: &[Value]) -> Result<ExecSummary> {
        exec(&self.lock(), sql, args)
    }

    fn begin(&self, _: &Context) -> Result<Box<dyn DriverTx + '_>> {
        let conn = self.lock();
        conn.execute_batch("BEGIN")?;
        Ok(Box::new(RusqliteTx { conn }))
    }
}

/// A `BEGIN`..`COMMIT` block holding the connection lock.
pub struct RusqliteTx<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl DriverTx for RusqliteTx<'_> {
    fn query(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>> {
        Ok(Box::new(query(&self.conn, ctx, sql, args)?))
    }

    fn exec(&self, _: &Context, sql: &str, args: &[Value]) -> Result<ExecSummary> {
        exec(&self.conn, sql, args)
    }

    fn commit(self: Box<Self>) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}
