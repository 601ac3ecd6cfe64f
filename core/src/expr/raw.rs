use crate::expr::{Binary, Expr, Predicate};
use crate::value::Value;

/// An opaque SQL fragment, emitted verbatim with its own bound arguments.
#[derive(Debug, Clone)]
pub struct RawExpr {
    pub(crate) sql: String,
    pub(crate) args: Vec<Value>,
}

pub fn raw(sql: impl Into<String>, args: impl IntoIterator<Item = Value>) -> RawExpr {
    RawExpr {
        sql: sql.into(),
        args: args.into_iter().collect(),
    }
}

impl RawExpr {
    pub fn as_predicate(self) -> Predicate {
        Predicate(Binary {
            left: Some(Box::new(Expr::Raw(self))),
            op: None,
            right: None,
        })
    }
}
