use crate::expr::{Binary, Expr, IntoExpr, Op};
use crate::table::Subquery;

/// A boolean-valued binary node, used in WHERE, HAVING and ON clauses.
#[derive(Debug, Clone)]
pub struct Predicate(pub(crate) Binary);

impl Predicate {
    pub fn and(self, right: Predicate) -> Predicate {
        Predicate(Binary::new(
            Some(Expr::Predicate(self)),
            Op::And,
            Some(Expr::Predicate(right)),
        ))
    }

    pub fn or(self, right: Predicate) -> Predicate {
        Predicate(Binary::new(
            Some(Expr::Predicate(self)),
            Op::Or,
            Some(Expr::Predicate(right)),
        ))
    }

    /// Fold a list into one predicate with left-associative `AND`.
    pub(crate) fn all_of(preds: &[Predicate]) -> Option<Predicate> {
        let (first, rest) = preds.split_first()?;
        Some(
            rest.iter()
                .fold(first.clone(), |acc, p| acc.and(p.clone())),
        )
    }
}

pub fn not(p: Predicate) -> Predicate {
    Predicate(Binary::new(None, Op::Not, Some(Expr::Predicate(p))))
}

pub fn exists(subquery: Subquery) -> Predicate {
    Predicate(Binary::new(None, Op::Exists, Some(Expr::Subquery(subquery))))
}

/// Arithmetic over columns and values.
#[derive(Debug, Clone)]
pub struct MathExpr(pub(crate) Binary);

impl MathExpr {
    comparison_methods!(Math);

    pub fn add(self, value: impl IntoExpr) -> MathExpr {
        MathExpr(Binary::new(Some(Expr::Math(self)), Op::Add, Some(value.into_expr())))
    }

    pub fn multiply(self, value: impl IntoExpr) -> MathExpr {
        MathExpr(Binary::new(
            Some(Expr::Math(self)),
            Op::Multiply,
            Some(value.into_expr()),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Any,
    All,
    Some,
}

impl Quantifier {
    pub const fn keyword(self) -> &'static str {
        match self {
            Quantifier::Any => "ANY",
            Quantifier::All => "ALL",
            Quantifier::Some => "SOME",
        }
    }
}

/// `ANY (subquery)` and friends, for the right side of a comparison.
#[derive(Debug, Clone)]
pub struct SubqueryExpr {
    pub(crate) quantifier: Quantifier,
    pub(crate) subquery: Subquery,
}

pub fn any(subquery: Subquery) -> SubqueryExpr {
    SubqueryExpr {
        quantifier: Quantifier::Any,
        subquery,
    }
}

pub fn all(subquery: Subquery) -> SubqueryExpr {
    SubqueryExpr {
        quantifier: Quantifier::All,
        subquery,
    }
}

pub fn some(subquery: Subquery) -> SubqueryExpr {
    SubqueryExpr {
        quantifier: Quantifier::Some,
        subquery,
    }
}
