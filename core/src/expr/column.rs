use crate::expr::{Binary, Expr, IntoExpr, MathExpr, Op, Predicate};
use crate::table::{Subquery, TableRef};
use crate::value::Value;

/// A field reference, named by its declared Rust field name.
///
/// Without a table the name resolves against the statement's own model.
#[derive(Debug, Clone)]
pub struct Column {
    pub(crate) table: Option<TableRef>,
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
}

/// Column of the statement's own model.
pub fn c(name: impl Into<String>) -> Column {
    Column::new(name)
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
            alias: None,
        }
    }

    pub(crate) fn of(table: TableRef, name: impl Into<String>) -> Self {
        Self {
            table: Some(table),
            name: name.into(),
            alias: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> Option<&TableRef> {
        self.table.as_ref()
    }

    /// Project the column under another name.
    pub fn alias(self, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self
        }
    }

    comparison_methods!(Column);

    pub fn in_values<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Predicate {
        let values = values.into_iter().map(Into::into).collect();
        self.compare(Op::In, Expr::List(values))
    }

    pub fn in_query(self, subquery: Subquery) -> Predicate {
        self.compare(Op::In, subquery)
    }

    pub fn add(self, value: impl IntoExpr) -> MathExpr {
        MathExpr(Binary::new(Some(Expr::Column(self)), Op::Add, Some(value.into_expr())))
    }

    pub fn multiply(self, value: impl IntoExpr) -> MathExpr {
        MathExpr(Binary::new(
            Some(Expr::Column(self)),
            Op::Multiply,
            Some(value.into_expr()),
        ))
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::new(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::new(name)
    }
}
