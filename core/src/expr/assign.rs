use crate::expr::{Column, Expr, IntoExpr, RawExpr};

/// `column = expression` inside a SET or upsert clause.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub(crate) column: String,
    pub(crate) value: Expr,
}

pub fn assign(column: impl Into<String>, value: impl IntoExpr) -> Assignment {
    Assignment {
        column: column.into(),
        value: value.into_expr(),
    }
}

/// What may appear in a SET or upsert clause.
///
/// A bare column means "take the value from the record" in an update and
/// "take the value being inserted" in an upsert.
#[derive(Debug, Clone)]
pub enum Assignable {
    Column(Column),
    Assignment(Assignment),
    Raw(RawExpr),
}

impl From<Column> for Assignable {
    fn from(c: Column) -> Self {
        Assignable::Column(c)
    }
}

impl From<Assignment> for Assignable {
    fn from(a: Assignment) -> Self {
        Assignable::Assignment(a)
    }
}

impl From<RawExpr> for Assignable {
    fn from(r: RawExpr) -> Self {
        Assignable::Raw(r)
    }
}
