//! # quarry
//!
//! A model-driven SQL query builder. Record types derive [`Entity`]; statements
//! compile expression trees into dialect-specific SQL and run through a
//! middleware pipeline against any [`Session`].
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::prelude::*;
//! use quarry::rusqlite::RusqliteDriver;
//!
//! #[derive(Entity, Debug, Default)]
//! struct User {
//!     id: i64,
//!     name: String,
//!     email: Option<String>,
//! }
//!
//! # fn main() -> quarry::Result<()> {
//! let driver = RusqliteDriver::open_in_memory()?;
//! let db = DB::builder(driver).dialect(Dialect::SQLite).build();
//! let ctx = Context::background();
//!
//! RawQuerier::<User>::new(&db, "CREATE TABLE user (id INTEGER PRIMARY KEY, name TEXT, email TEXT)", [])
//!     .exec(&ctx, &db)
//!     .into_result()?;
//! Inserter::new(&db)
//!     .values([User { id: 1, name: "John Doe".into(), email: None }])
//!     .exec(&ctx, &db)
//!     .into_result()?;
//!
//! let users: Vec<User> = Selector::new(&db)
//!     .r#where([c("name").eq("John Doe")])
//!     .get_multi(&ctx, &db)?;
//! assert_eq!(users.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Driver Support
//!
//! | Database | Driver     | Feature Flag |
//! |----------|------------|--------------|
//! | SQLite   | rusqlite   | `rusqlite`   |
//!
//! Any other connection plugs in through the [`Driver`] trait.

/// The core crate: registry, expressions, compiler, statements and sessions.
pub mod core {
    pub use quarry_core::*;
}

#[cfg(feature = "rusqlite")]
pub mod rusqlite;

pub use quarry_core::{
    AccessKind, BufferedRows, Config, Context, Core, DB, DBBuilder, Deleter, Dialect, Driver,
    DriverTx, ExecResult, ExecSummary, Handler, Inserter, Middleware, Model, ModelOption,
    OrmError, Query, QueryBuilder, QueryContext, QueryKind, QueryPayload, QueryResult,
    RawQuerier, Registry, Result, Rows, Selector, Session, SqlType, Table, TableRef, Tx,
    Updater, Value, expr,
};
#[cfg(feature = "tracing")]
pub use quarry_core::LoggingMiddleware;

pub use quarry_core::Entity;
pub use quarry_macros::Entity;

pub mod prelude {
    pub use crate::Entity;
    pub use quarry_core::expr::{
        all, any, assign, avg, c, count, exists, max, min, not, raw, some, sum,
    };
    pub use quarry_core::{
        Context, DB, Deleter, Dialect, Inserter, ModelOption, OrmError, RawQuerier, Selector,
        Session, Table, Updater, Value,
    };
}
