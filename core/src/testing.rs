//! Fixtures for unit tests: hand-written entities and an in-memory driver.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::db::DB;
use crate::dialect::Dialect;
use crate::entity::{Entity, EntityDef, FieldDef, Record, Shape};
use crate::error::{OrmError, Result};
use crate::session::{Context, Driver, DriverTx, ExecSummary, Rows};
use crate::value::{SqlType, Value};

/// Declares a struct with the `Entity` and `Record` impls the derive would
/// generate.
macro_rules! test_entity {
    (@table) => { None };
    (@table $table:literal) => { Some($table) };
    (@tag) => { "" };
    (@tag $tag:literal) => { $tag };
    (
        $name:ident $([table = $table:literal])? {
            $($field:ident: $ty:ty $([$tag:literal])?),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $(pub $field: $ty),*
        }

        unsafe impl Entity for $name {
            fn entity_def() -> &'static EntityDef {
                static DEF: EntityDef = EntityDef {
                    type_name: stringify!($name),
                    table_name: test_entity!(@table $($table)?),
                    shape: Shape::Struct(&[$(FieldDef {
                        name: stringify!($field),
                        tag: test_entity!(@tag $($tag)?),
                        ty: <$ty as SqlType>::VALUE_TYPE,
                        offset: std::mem::offset_of!($name, $field),
                    }),*]),
                };
                &DEF
            }
        }

        impl Record for $name {
            #[allow(unused_assignments)]
            fn field_value(&self, index: usize) -> Result<Value> {
                let mut i = 0;
                $(
                    if i == index {
                        return Ok(SqlType::to_value(&self.$field));
                    }
                    i += 1;
                )*
                Err(OrmError::UnknownField(index.to_string()))
            }

            #[allow(unused_assignments)]
            fn set_field_value(&mut self, index: usize, value: Value) -> Result<()> {
                let mut i = 0;
                $(
                    if i == index {
                        self.$field = <$ty as SqlType>::from_value(value)?;
                        return Ok(());
                    }
                    i += 1;
                )*
                Err(OrmError::UnknownField(index.to_string()))
            }
        }
    };
}

test_entity!(TestModel {
    id: i64,
    first_name: String,
    age: i32,
    last_name: Option<String>,
});

test_entity!(WithTableName [table = "custom_table"] {
    id: i64,
    name: String ["column=display_name"],
});

test_entity!(Order {
    id: i64,
    using_col1: String,
    using_col2: String,
});

test_entity!(Shipment {
    id: i64,
    name: String ["column=ship_name"],
});

test_entity!(Carrier {
    id: i64,
    name: String ["column=carrier_name"],
    code: String,
});

test_entity!(OrderDetail {
    id: i64,
    order_id: i64,
    item_id: i64,
    using_col1: String,
    using_col2: String,
});

#[derive(Debug, Default)]
pub struct TupleModel(pub i64);

unsafe impl Entity for TupleModel {
    fn entity_def() -> &'static EntityDef {
        static DEF: EntityDef = EntityDef {
            type_name: "TupleModel",
            table_name: None,
            shape: Shape::Opaque,
        };
        &DEF
    }
}

impl Record for TupleModel {
    fn field_value(&self, index: usize) -> Result<Value> {
        Err(OrmError::UnknownField(index.to_string()))
    }

    fn set_field_value(&mut self, index: usize, _: Value) -> Result<()> {
        Err(OrmError::UnknownField(index.to_string()))
    }
}

/// A canned result set. Counts itself as open from the moment a driver hands
/// it out until it is dropped.
#[derive(Debug)]
pub struct MockRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    fail_after: Option<usize>,
    served: usize,
    open: Option<Arc<AtomicUsize>>,
}

impl MockRows {
    pub fn new(columns: Vec<String>, rows: impl IntoIterator<Item = Vec<Value>>) -> Self {
        Self {
            columns,
            rows: rows.into_iter().collect(),
            fail_after: None,
            served: 0,
            open: None,
        }
    }

    /// Fail with a driver error once `n` rows have been served.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    fn opened(mut self, counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        self.open = Some(Arc::clone(counter));
        self
    }
}

impl Rows for MockRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>> {
        if self.fail_after == Some(self.served) {
            return Err(OrmError::driver(std::io::Error::other("cursor failed")));
        }
        self.served += 1;
        Ok(self.rows.pop_front())
    }
}

impl Drop for MockRows {
    fn drop(&mut self) {
        if let Some(open) = self.open.take() {
            open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

pub fn test_model_rows(rows: &[(i64, &str)]) -> MockRows {
    MockRows::new(
        vec![
            "id".into(),
            "first_name".into(),
            "age".into(),
            "last_name".into(),
        ],
        rows.iter().map(|&(id, name)| {
            vec![
                Value::Int(id),
                Value::Text(name.into()),
                Value::Int(20),
                Value::Null,
            ]
        }),
    )
}

#[derive(Debug, Default)]
struct MockState {
    queued: VecDeque<MockRows>,
    last_statement: Option<(String, Vec<Value>)>,
    exec_summary: ExecSummary,
    committed: bool,
    rolled_back: bool,
    fail_rollback: bool,
}

/// In-memory driver. Clones share state, so a test can keep a handle after
/// moving one into a `DB`.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
    open: Arc<AtomicUsize>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next query.
    pub fn push_rows(&self, rows: MockRows) {
        self.state.lock().unwrap().queued.push_back(rows);
    }

    pub fn set_exec_summary(&self, summary: ExecSummary) {
        self.state.lock().unwrap().exec_summary = summary;
    }

    pub fn fail_rollback(&self) {
        self.state.lock().unwrap().fail_rollback = true;
    }

    pub fn open_cursors(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn last_statement(&self) -> Option<(String, Vec<Value>)> {
        self.state.lock().unwrap().last_statement.clone()
    }

    pub fn committed(&self) -> bool {
        self.state.lock().unwrap().committed
    }

    pub fn rolled_back(&self) -> bool {
        self.state.lock().unwrap().rolled_back
    }

    fn record(&self, sql: &str, args: &[Value]) -> std::sync::MutexGuard<'_, MockState> {
        let mut state = self.state.lock().unwrap();
        state.last_statement = Some((sql.to_owned(), args.to_vec()));
        state
    }
}

impl Driver for MockDriver {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn query(&self, _: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>> {
        let rows = self
            .record(sql, args)
            .queued
            .pop_front()
            .unwrap_or_else(|| MockRows::new(Vec::new(), []));
        Ok(Box::new(rows.opened(&self.open)))
    }

    fn exec(&self, _: &Context, sql: &str, args: &[Value]) -> Result<ExecSummary> {
        Ok(self.record(sql, args).exec_summary)
    }

    fn begin(&self, _: &Context) -> Result<Box<dyn DriverTx + '_>> {
        Ok(Box::new(MockTx { driver: self }))
    }
}

struct MockTx<'a> {
    driver: &'a MockDriver,
}

impl DriverTx for MockTx<'_> {
    fn query(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>> {
        self.driver.query(ctx, sql, args)
    }

    fn exec(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<ExecSummary> {
        self.driver.exec(ctx, sql, args)
    }

    fn commit(self: Box<Self>) -> Result<()> {
        self.driver.state.lock().unwrap().committed = true;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<()> {
        let mut state = self.driver.state.lock().unwrap();
        state.rolled_back = true;
        if state.fail_rollback {
            return Err(OrmError::Transaction("rollback failed".into()));
        }
        Ok(())
    }
}

pub fn mock_db_on(driver: MockDriver) -> DB {
    DB::open(driver)
}

pub fn mock_db() -> DB {
    mock_db_on(MockDriver::new())
}

pub fn mock_db_with(dialect: Dialect) -> DB {
    DB::builder(MockDriver::new()).dialect(dialect).build()
}
