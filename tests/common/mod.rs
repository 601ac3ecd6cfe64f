//! Shared entities and helpers for integration tests.

#![allow(dead_code)]

use quarry::core::{BufferedRows, Context, Driver, DriverTx, ExecSummary, Result, Rows, Value};
use quarry::prelude::*;

#[derive(Entity, Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub email: Option<String>,
}

#[derive(Entity, Debug, Clone, Default, PartialEq)]
#[orm(table = "posts")]
pub struct Post {
    pub id: i64,
    #[orm("column=author_id")]
    pub user_id: i64,
    pub title: String,
    pub score: f64,
    pub published: bool,
    pub body: Option<Vec<u8>>,
}

#[derive(Entity, Debug, Default)]
pub struct Pair(pub i64, pub i64);

pub fn user(id: i64, name: &str, age: i32) -> User {
    User {
        id,
        name: name.into(),
        age,
        email: None,
    }
}

/// A driver that answers every query with no rows. For compile-only tests.
#[derive(Debug, Default)]
pub struct NullDriver;

impl Driver for NullDriver {
    fn name(&self) -> &'static str {
        "null"
    }

    fn query(&self, _: &Context, _: &str, _: &[Value]) -> Result<Box<dyn Rows + '_>> {
        Ok(Box::new(BufferedRows::default()))
    }

    fn exec(&self, _: &Context, _: &str, _: &[Value]) -> Result<ExecSummary> {
        Ok(ExecSummary::default())
    }

    fn begin(&self, _: &Context) -> Result<Box<dyn DriverTx + '_>> {
        Err(OrmError::Transaction("not supported".into()))
    }
}

pub fn mysql() -> DB {
    DB::open(NullDriver)
}

pub fn sqlite() -> DB {
    DB::builder(NullDriver).dialect(Dialect::SQLite).build()
}

#[cfg(feature = "rusqlite")]
pub fn setup_db(access: quarry::AccessKind) -> DB {
    let driver = quarry::rusqlite::RusqliteDriver::open_in_memory().unwrap();
    let db = DB::builder(driver)
        .dialect(Dialect::SQLite)
        .access(access)
        .build();
    let ctx = Context::background();
    for ddl in [
        "CREATE TABLE user (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER NOT NULL, email TEXT)",
        "CREATE TABLE posts (id INTEGER PRIMARY KEY, author_id INTEGER NOT NULL, title TEXT NOT NULL, score REAL NOT NULL, published INTEGER NOT NULL, body BLOB)",
    ] {
        RawQuerier::<User>::new(&db, ddl, [])
            .exec(&ctx, &db)
            .into_result()
            .unwrap();
    }
    db
}
