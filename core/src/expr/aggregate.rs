use crate::expr::Column;
use crate::table::TableRef;

/// `FUNC(column)`, optionally projected under an alias.
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub(crate) func: &'static str,
    pub(crate) table: Option<TableRef>,
    pub(crate) arg: String,
    pub(crate) alias: Option<String>,
}

impl Aggregate {
    fn new(func: &'static str, column: impl Into<Column>) -> Self {
        let column = column.into();
        Self {
            func,
            table: column.table,
            arg: column.name,
            alias: None,
        }
    }

    pub fn alias(self, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self
        }
    }

    comparison_methods!(Aggregate);
}

pub fn avg(column: impl Into<Column>) -> Aggregate {
    Aggregate::new("AVG", column)
}

pub fn sum(column: impl Into<Column>) -> Aggregate {
    Aggregate::new("SUM", column)
}

pub fn count(column: impl Into<Column>) -> Aggregate {
    Aggregate::new("COUNT", column)
}

pub fn max(column: impl Into<Column>) -> Aggregate {
    Aggregate::new("MAX", column)
}

pub fn min(column: impl Into<Column>) -> Aggregate {
    Aggregate::new("MIN", column)
}
