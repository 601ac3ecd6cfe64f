//! Table sources: entity tables, joins and subqueries.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::entity::{Entity, EntityDef};
use crate::expr::{Column, Expr, Predicate};
use crate::statement::QueryBuilder;

/// Anything a statement can read from.
#[derive(Debug, Clone)]
pub enum TableRef {
    Table(Table),
    Join(Box<Join>),
    Subquery(Box<Subquery>),
}

impl TableRef {
    /// Qualifier emitted before column names.
    pub fn alias(&self) -> Option<&str> {
        match self {
            TableRef::Table(t) => t.alias.as_deref(),
            TableRef::Join(_) => None,
            TableRef::Subquery(s) => Some(&s.alias),
        }
    }
}

impl From<Table> for TableRef {
    fn from(t: Table) -> Self {
        TableRef::Table(t)
    }
}

impl From<Join> for TableRef {
    fn from(j: Join) -> Self {
        TableRef::Join(Box::new(j))
    }
}

impl From<Subquery> for TableRef {
    fn from(s: Subquery) -> Self {
        TableRef::Subquery(Box::new(s))
    }
}

macro_rules! join_methods {
    () => {
        pub fn join(self, right: impl Into<TableRef>) -> JoinBuilder {
            JoinBuilder::new(self.into(), JoinKind::Inner, right.into())
        }

        pub fn left_join(self, right: impl Into<TableRef>) -> JoinBuilder {
            JoinBuilder::new(self.into(), JoinKind::Left, right.into())
        }

        pub fn right_join(self, right: impl Into<TableRef>) -> JoinBuilder {
            JoinBuilder::new(self.into(), JoinKind::Right, right.into())
        }
    };
}

/// The table of an entity type, optionally aliased.
#[derive(Debug, Clone)]
pub struct Table {
    pub(crate) type_id: TypeId,
    pub(crate) def: &'static EntityDef,
    pub(crate) alias: Option<String>,
}

impl Table {
    pub fn of<T: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            def: T::entity_def(),
            alias: None,
        }
    }

    pub fn alias(self, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self
        }
    }

    /// Column of this table, qualified by its alias.
    pub fn c(&self, name: impl Into<String>) -> Column {
        Column::of(TableRef::Table(self.clone()), name)
    }

    join_methods!();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Join {
    pub(crate) left: TableRef,
    pub(crate) kind: JoinKind,
    pub(crate) right: TableRef,
    pub(crate) on: SmallVec<[Predicate; 2]>,
    pub(crate) using: SmallVec<[String; 2]>,
}

impl Join {
    /// Column resolved against the left relation first, then the right.
    pub fn c(&self, name: impl Into<String>) -> Column {
        Column::of(TableRef::Join(Box::new(self.clone())), name)
    }

    join_methods!();
}

/// A join still missing its condition.
#[derive(Debug, Clone)]
pub struct JoinBuilder {
    left: TableRef,
    kind: JoinKind,
    right: TableRef,
}

impl JoinBuilder {
    fn new(left: TableRef, kind: JoinKind, right: TableRef) -> Self {
        Self { left, kind, right }
    }

    pub fn on(self, preds: impl IntoIterator<Item = Predicate>) -> Join {
        Join {
            left: self.left,
            kind: self.kind,
            right: self.right,
            on: preds.into_iter().collect(),
            using: SmallVec::new(),
        }
    }

    /// Join on same-named columns, given by declared field name.
    pub fn using<S: Into<String>>(self, columns: impl IntoIterator<Item = S>) -> Join {
        Join {
            left: self.left,
            kind: self.kind,
            right: self.right,
            on: SmallVec::new(),
            using: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// A compiled-on-demand nested statement with the columns it projects.
#[derive(Clone)]
pub struct Subquery {
    pub(crate) statement: Arc<dyn QueryBuilder>,
    /// Source the subquery reads from, for resolving unprojected fields
    pub(crate) table: TableRef,
    pub(crate) columns: Vec<Expr>,
    pub(crate) alias: String,
}

impl Subquery {
    pub fn new(
        statement: Arc<dyn QueryBuilder>,
        table: TableRef,
        columns: Vec<Expr>,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            statement,
            table,
            columns,
            alias: alias.into(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn c(&self, name: impl Into<String>) -> Column {
        Column::of(TableRef::Subquery(Box::new(self.clone())), name)
    }

    join_methods!();
}

impl fmt::Debug for Subquery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subquery")
            .field("alias", &self.alias)
            .field("table", &self.table)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}
