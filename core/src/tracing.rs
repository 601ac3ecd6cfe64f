//! Events for statements and transactions, under the `quarry` target.
//!
//! With the `tracing` feature off the macros expand to nothing, so call sites
//! need no `#[cfg]` of their own.

/// Debug event for a compiled statement about to reach the session.
///
/// ```ignore
/// quarry_trace_query!(qc.kind, &query.sql, query.args.len());
/// ```
#[macro_export]
macro_rules! quarry_trace_query {
    ($kind:expr, $sql:expr, $arg_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "quarry",
            kind = %$kind,
            sql = %$sql,
            args = $arg_count,
            "statement"
        );
    };
}

/// Transaction lifecycle event tagged with the driver that runs it.
///
/// The two-argument form logs `begin`, `commit` and `rollback` at info. With an
/// error it logs at error level, for rollbacks that failed.
///
/// ```ignore
/// quarry_trace_tx!(self.driver.name(), "begin");
/// quarry_trace_tx!(driver, "rollback", err);
/// ```
#[macro_export]
macro_rules! quarry_trace_tx {
    ($driver:expr, $event:literal) => {
        #[cfg(feature = "tracing")]
        tracing::info!(target: "quarry", driver = $driver, event = $event, "transaction");
        #[cfg(not(feature = "tracing"))]
        let _ = &$driver;
    };
    ($driver:expr, $event:literal, $err:expr) => {
        #[cfg(feature = "tracing")]
        tracing::error!(
            target: "quarry",
            driver = $driver,
            event = $event,
            error = %$err,
            "transaction failed"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (&$driver, &$err);
    };
}
