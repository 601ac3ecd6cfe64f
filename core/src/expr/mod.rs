//! The expression algebra.
//!
//! Every node is an immutable value. Builders consume their receiver and
//! return a new node; clone a node to reuse it in several places.

/// `eq`/`lt`/`gt` for a node that becomes the left operand as `Expr::$variant`.
macro_rules! comparison_methods {
    ($variant:ident) => {
        pub fn eq(self, value: impl $crate::expr::IntoExpr) -> $crate::expr::Predicate {
            self.compare($crate::expr::Op::Eq, value)
        }

        pub fn lt(self, value: impl $crate::expr::IntoExpr) -> $crate::expr::Predicate {
            self.compare($crate::expr::Op::Lt, value)
        }

        pub fn gt(self, value: impl $crate::expr::IntoExpr) -> $crate::expr::Predicate {
            self.compare($crate::expr::Op::Gt, value)
        }

        fn compare(
            self,
            op: $crate::expr::Op,
            value: impl $crate::expr::IntoExpr,
        ) -> $crate::expr::Predicate {
            $crate::expr::Predicate($crate::expr::Binary::new(
                Some($crate::expr::Expr::$variant(self)),
                op,
                Some($crate::expr::IntoExpr::into_expr(value)),
            ))
        }
    };
}

mod aggregate;
mod assign;
mod column;
mod predicate;
mod raw;

pub use aggregate::{Aggregate, avg, count, max, min, sum};
pub use assign::{Assignable, Assignment, assign};
pub use column::{Column, c};
pub use predicate::{MathExpr, Predicate, Quantifier, SubqueryExpr, all, any, exists, not, some};
pub use raw::{RawExpr, raw};

use std::fmt;

use crate::table::{Subquery, TableRef};
use crate::value::Value;

/// Binary operators. `NOT` and `EXISTS` are used without a left operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lt,
    Gt,
    In,
    Exists,
    And,
    Or,
    Not,
    Add,
    Multiply,
}

impl Op {
    pub const fn token(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::In => "IN",
            Op::Exists => "EXISTS",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Not => "NOT",
            Op::Add => "+",
            Op::Multiply => "*",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Shared shape of predicates and arithmetic.
#[derive(Debug, Clone)]
pub struct Binary {
    pub(crate) left: Option<Box<Expr>>,
    pub(crate) op: Option<Op>,
    pub(crate) right: Option<Box<Expr>>,
}

impl Binary {
    pub(crate) fn new(left: Option<Expr>, op: Op, right: Option<Expr>) -> Self {
        Self {
            left: left.map(Box::new),
            op: Some(op),
            right: right.map(Box::new),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Column(Column),
    Value(Value),
    /// A fixed value set; only valid as an operand, e.g. the right side of `IN`
    List(Vec<Value>),
    Raw(RawExpr),
    Aggregate(Aggregate),
    Predicate(Predicate),
    Math(MathExpr),
    Subquery(Subquery),
    Quantified(SubqueryExpr),
}

impl Expr {
    /// Alias the expression is projected under.
    pub fn selected_alias(&self) -> Option<&str> {
        match self {
            Expr::Column(c) => c.alias.as_deref(),
            Expr::Aggregate(a) => a.alias.as_deref(),
            Expr::Subquery(s) => Some(s.alias()),
            _ => None,
        }
    }

    /// Declared field name the expression reads.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Expr::Column(c) => Some(&c.name),
            Expr::Aggregate(a) => Some(&a.arg),
            _ => None,
        }
    }

    /// Table the field name resolves against.
    pub fn target(&self) -> Option<&TableRef> {
        match self {
            Expr::Column(c) => c.table.as_ref(),
            Expr::Aggregate(a) => a.table.as_ref(),
            _ => None,
        }
    }
}

/// Conversion into an expression. Expression nodes pass through, anything
/// else becomes a bound literal.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

pub fn expr_of(value: impl IntoExpr) -> Expr {
    value.into_expr()
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

macro_rules! impl_node {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::$variant(self)
                }
            }

            impl From<$ty> for Expr {
                fn from(node: $ty) -> Self {
                    Expr::$variant(node)
                }
            }
        )*
    };
}

impl_node!(
    Column => Column,
    Value => Value,
    RawExpr => Raw,
    Aggregate => Aggregate,
    Predicate => Predicate,
    MathExpr => Math,
    Subquery => Subquery,
    SubqueryExpr => Quantified,
);

macro_rules! impl_literal {
    ($($ty:ty),*) => {
        $(impl IntoExpr for $ty {
            fn into_expr(self) -> Expr {
                Expr::Value(Value::from(self))
            }
        })*
    };
}

impl_literal!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String, &str, Vec<u8>);

impl<T: Into<Value>> IntoExpr for Option<T> {
    fn into_expr(self) -> Expr {
        Expr::Value(Value::from(self))
    }
}
