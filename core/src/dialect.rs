//! Per-database syntax: identifier quoting and the upsert clause.

use serde::{Deserialize, Serialize};

use crate::builder::Builder;
use crate::error::{OrmError, Result};
use crate::expr::Assignable;

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `ON DUPLICATE KEY UPDATE`
    #[default]
    MySQL,
    /// `ON CONFLICT (..) DO UPDATE SET`
    SQLite,
}

/// Conflict handling for an insert.
#[derive(Debug, Clone, Default)]
pub struct Upsert {
    /// Declared field names forming the conflict target
    pub(crate) conflict_columns: Vec<String>,
    pub(crate) assigns: Vec<Assignable>,
}

impl Dialect {
    pub const fn quoter(&self) -> char {
        match self {
            Dialect::MySQL | Dialect::SQLite => '`',
        }
    }

    pub(crate) fn build_upsert(&self, b: &mut Builder<'_>, upsert: &Upsert) -> Result<()> {
        match self {
            Dialect::MySQL => {
                b.push_str(" ON DUPLICATE KEY UPDATE ");
                build_assigns(b, &upsert.assigns, |b, column| {
                    b.quote(column);
                    b.push_str("=VALUES(");
                    b.quote(column);
                    b.push(')');
                })
            }
            Dialect::SQLite => {
                b.push_str(" ON CONFLICT");
                if !upsert.conflict_columns.is_empty() {
                    b.push('(');
                    for (i, field) in upsert.conflict_columns.iter().enumerate() {
                        if i > 0 {
                            b.push(',');
                        }
                        b.build_column(None, field)?;
                    }
                    b.push(')');
                }
                b.push_str(" DO UPDATE SET ");
                build_assigns(b, &upsert.assigns, |b, column| {
                    b.quote(column);
                    b.push_str("=excluded.");
                    b.quote(column);
                })
            }
        }
    }
}

/// Shared assignment loop; `self_ref` renders a bare column reference.
fn build_assigns(
    b: &mut Builder<'_>,
    assigns: &[Assignable],
    self_ref: impl Fn(&mut Builder<'_>, &str),
) -> Result<()> {
    for (i, assign) in assigns.iter().enumerate() {
        if i > 0 {
            b.push(',');
        }
        match assign {
            Assignable::Column(c) => {
                let column = b.col_name(c.table.as_ref(), &c.name)?;
                self_ref(b, &column);
            }
            Assignable::Assignment(a) => {
                b.build_column(None, &a.column)?;
                b.push('=');
                b.build_expression(&a.value)?;
            }
            Assignable::Raw(r) => {
                return Err(OrmError::UnsupportedAssignable(format!("{r:?}")));
            }
        }
    }
    Ok(())
}
