//! Data source and transactions.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::access::{AccessKind, OffsetAccess, ReflectAccess, ValueAccess};
use crate::config::Config;
use crate::dialect::Dialect;
use crate::error::{OrmError, Result};
use crate::middleware::Middleware;
use crate::model::Registry;
use crate::quarry_trace_tx;
use crate::session::{Context, Driver, DriverTx, ExecSummary, Rows, Session};
use crate::value::Value;

/// Everything statements need besides the connection. Cheap to clone.
#[derive(Clone)]
pub struct Core {
    registry: Arc<Registry>,
    dialect: Dialect,
    access: Arc<dyn ValueAccess>,
    middlewares: Arc<[Arc<dyn Middleware>]>,
}

impl Core {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn access(&self) -> &dyn ValueAccess {
        &*self.access
    }

    pub fn middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.middlewares
    }
}

impl fmt::Debug for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("dialect", &self.dialect)
            .field("access", &self.access)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

/// A database handle: a driver plus the configuration statements compile with.
pub struct DB {
    core: Core,
    driver: Box<dyn Driver>,
}

impl DB {
    /// MySQL dialect, offset access, no middleware.
    pub fn open(driver: impl Driver + 'static) -> Self {
        Self::builder(driver).build()
    }

    pub fn builder(driver: impl Driver + 'static) -> DBBuilder {
        DBBuilder {
            driver: Box::new(driver),
            registry: None,
            dialect: Dialect::default(),
            access: AccessKind::default(),
            middlewares: Vec::new(),
        }
    }

    pub fn from_config(driver: impl Driver + 'static, config: &Config) -> Self {
        let builder = Self::builder(driver)
            .dialect(config.dialect)
            .access(config.value_access);
        #[cfg(feature = "tracing")]
        let builder = if config.log_queries {
            builder.middleware(crate::middleware::LoggingMiddleware::new().with_sql())
        } else {
            builder
        };
        builder.build()
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn begin_tx(&self, ctx: &Context) -> Result<Tx<'_>> {
        ctx.check()?;
        let tx = self.driver.begin(ctx)?;
        let driver = self.driver.name();
        quarry_trace_tx!(driver, "begin");
        Ok(Tx {
            core: &self.core,
            driver,
            tx: Some(tx),
        })
    }

    /// Run `f` inside a transaction.
    ///
    /// Commits when `f` returns `Ok` and rolls back when it returns `Err`. If
    /// `f` panics the transaction is rolled back and the panic resumes.
    pub fn do_tx<R>(&self, ctx: &Context, f: impl FnOnce(&Tx<'_>) -> Result<R>) -> Result<R> {
        let tx = self.begin_tx(ctx)?;
        match panic::catch_unwind(AssertUnwindSafe(|| f(&tx))) {
            Ok(Ok(value)) => {
                tx.commit()?;
                Ok(value)
            }
            Ok(Err(cause)) => match tx.rollback() {
                Ok(()) => Err(cause),
                Err(rollback) => Err(OrmError::rollback_after_failure(cause, rollback, false)),
            },
            Err(payload) => {
                let driver = tx.driver;
                if let Err(rollback) = tx.rollback() {
                    let err = OrmError::rollback_after_failure(
                        OrmError::Transaction("transaction callback panicked".into()),
                        rollback,
                        true,
                    );
                    quarry_trace_tx!(driver, "rollback", err);
                }
                panic::resume_unwind(payload)
            }
        }
    }
}

impl fmt::Debug for DB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DB").field("core", &self.core).finish_non_exhaustive()
    }
}

impl Session for DB {
    fn core(&self) -> &Core {
        &self.core
    }

    fn query(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>> {
        ctx.check()?;
        self.driver.query(ctx, sql, args)
    }

    fn exec(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<ExecSummary> {
        ctx.check()?;
        self.driver.exec(ctx, sql, args)
    }
}

pub struct DBBuilder {
    driver: Box<dyn Driver>,
    registry: Option<Arc<Registry>>,
    dialect: Dialect,
    access: AccessKind,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl DBBuilder {
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Share a registry between data sources.
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn access(mut self, access: AccessKind) -> Self {
        self.access = access;
        self
    }

    pub fn reflect_access(self) -> Self {
        self.access(AccessKind::Reflect)
    }

    pub fn offset_access(self) -> Self {
        self.access(AccessKind::Offset)
    }

    /// Append a middleware. The first one added runs outermost.
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> DB {
        let access: Arc<dyn ValueAccess> = match self.access {
            AccessKind::Offset => Arc::new(OffsetAccess),
            AccessKind::Reflect => Arc::new(ReflectAccess),
        };
        DB {
            core: Core {
                registry: self.registry.unwrap_or_default(),
                dialect: self.dialect,
                access,
                middlewares: self.middlewares.into(),
            },
            driver: self.driver,
        }
    }
}

/// An open transaction. Dropping it without [`commit`](Tx::commit) rolls back.
pub struct Tx<'db> {
    core: &'db Core,
    driver: &'static str,
    tx: Option<Box<dyn DriverTx + 'db>>,
}

impl Tx<'_> {
    fn open(&self) -> Result<&dyn DriverTx> {
        self.tx
            .as_deref()
            .ok_or_else(|| OrmError::Transaction("transaction already finished".into()))
    }

    pub fn commit(mut self) -> Result<()> {
        let Some(tx) = self.tx.take() else {
            return Err(OrmError::Transaction("transaction already finished".into()));
        };
        quarry_trace_tx!(self.driver, "commit");
        tx.commit()
    }

    pub fn rollback(mut self) -> Result<()> {
        let Some(tx) = self.tx.take() else {
            return Err(OrmError::Transaction("transaction already finished".into()));
        };
        quarry_trace_tx!(self.driver, "rollback");
        tx.rollback()
    }
}

impl Drop for Tx<'_> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            quarry_trace_tx!(self.driver, "rollback");
            if let Err(err) = tx.rollback() {
                quarry_trace_tx!(self.driver, "rollback", err);
            }
        }
    }
}

impl Session for Tx<'_> {
    fn core(&self) -> &Core {
        self.core
    }

    fn query(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>> {
        ctx.check()?;
        self.open()?.query(ctx, sql, args)
    }

    fn exec(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<ExecSummary> {
        ctx.check()?;
        self.open()?.exec(ctx, sql, args)
    }
}
