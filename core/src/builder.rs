//! The recursive SQL compiler shared by every statement.
//!
//! A [`Builder`] owns the text buffer and the argument list of one `build()`
//! call. Arguments are pushed in the same order the placeholders are written.

use std::sync::Arc;

use compact_str::CompactString;

use crate::db::Core;
use crate::error::{OrmError, Result};
use crate::expr::{Aggregate, Binary, Column, Expr, Predicate, RawExpr};
use crate::model::Model;
use crate::statement::Query;
use crate::table::{Join, Subquery, TableRef};
use crate::value::Value;

const DEFAULT_ARGS_CAPACITY: usize = 8;

pub(crate) struct Builder<'a> {
    core: &'a Core,
    quoter: char,
    sb: CompactString,
    args: Vec<Value>,
    /// Model of the statement's own entity
    model: Arc<Model>,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(core: &'a Core, model: Arc<Model>) -> Self {
        Self {
            core,
            quoter: core.dialect().quoter(),
            sb: CompactString::default(),
            args: Vec::new(),
            model,
        }
    }

    /// Size the argument list up front, for statements that know their count.
    pub(crate) fn reserve_args(&mut self, additional: usize) {
        self.args.reserve_exact(additional);
    }

    pub(crate) fn push(&mut self, ch: char) {
        self.sb.push(ch);
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        self.sb.push_str(s);
    }

    pub(crate) fn quote(&mut self, name: &str) {
        self.sb.push(self.quoter);
        self.sb.push_str(name);
        self.sb.push(self.quoter);
    }

    pub(crate) fn add_arg(&mut self, value: Value) {
        if self.args.capacity() == 0 {
            self.args.reserve(DEFAULT_ARGS_CAPACITY);
        }
        self.args.push(value);
    }

    fn add_args(&mut self, values: impl IntoIterator<Item = Value>) {
        for value in values {
            self.add_arg(value);
        }
    }

    /// Terminate the statement and hand back text and arguments.
    pub(crate) fn finish(mut self) -> Query {
        self.sb.push(';');
        Query {
            sql: self.sb.into_string(),
            args: self.args,
        }
    }

    /// Resolve a declared field name to its column name.
    pub(crate) fn col_name(&self, table: Option<&TableRef>, field: &str) -> Result<String> {
        match table {
            None => column_of(&self.model, field),
            Some(TableRef::Table(t)) => {
                let model = self.core.registry().get_def(t.type_id, t.def)?;
                column_of(&model, field)
            }
            Some(TableRef::Join(j)) => self.join_col_name(j, field),
            Some(TableRef::Subquery(s)) => {
                if s.columns.is_empty() {
                    return self.col_name(Some(&s.table), field);
                }
                for col in &s.columns {
                    if col.selected_alias() == Some(field) {
                        return Ok(field.to_owned());
                    }
                    if col.field_name() == Some(field) {
                        return self.col_name(col.target().or(Some(&s.table)), field);
                    }
                }
                Err(OrmError::UnknownField(field.to_owned()))
            }
        }
    }

    /// Identical names prefer the left relation. Only `UnknownField` from the
    /// left side falls through to the right side.
    fn join_col_name(&self, j: &Join, field: &str) -> Result<String> {
        match self.col_name(Some(&j.left), field) {
            Err(OrmError::UnknownField(_)) => self.col_name(Some(&j.right), field),
            res => res,
        }
    }

    /// `` `alias`.`column` `` or just `` `column` ``.
    pub(crate) fn build_column(&mut self, table: Option<&TableRef>, field: &str) -> Result<()> {
        if let Some(alias) = table.and_then(TableRef::alias)
            && !alias.is_empty()
        {
            self.quote(alias);
            self.push('.');
        }
        let column = self.col_name(table, field)?;
        self.quote(&column);
        Ok(())
    }

    pub(crate) fn build_as(&mut self, alias: Option<&str>) {
        if let Some(alias) = alias
            && !alias.is_empty()
        {
            self.push_str(" AS ");
            self.quote(alias);
        }
    }

    pub(crate) fn build_raw(&mut self, raw: &RawExpr) {
        self.push_str(&raw.sql);
        self.add_args(raw.args.iter().cloned());
    }

    /// Compile a WHERE, HAVING or ON list as one `AND`-folded predicate.
    pub(crate) fn build_predicates(&mut self, preds: &[Predicate]) -> Result<()> {
        match Predicate::all_of(preds) {
            Some(p) => self.build_binary(&p.0),
            None => Ok(()),
        }
    }

    pub(crate) fn build_expression(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Column(c) => self.build_column(c.table.as_ref(), &c.name),
            Expr::Value(v) => {
                self.push('?');
                self.add_arg(v.clone());
                Ok(())
            }
            Expr::Raw(r) => {
                self.build_raw(r);
                Ok(())
            }
            Expr::Aggregate(a) => self.build_aggregate(a, false),
            Expr::Predicate(p) => self.build_binary(&p.0),
            Expr::Math(m) => self.build_binary(&m.0),
            Expr::Subquery(s) => self.build_subquery(s, false),
            Expr::Quantified(q) => {
                self.push_str(q.quantifier.keyword());
                self.push(' ');
                self.build_subquery(&q.subquery, false)
            }
            Expr::List(_) => Err(OrmError::UnsupportedExpression(format!("{expr:?}"))),
        }
    }

    fn build_binary(&mut self, b: &Binary) -> Result<()> {
        let has_left = b.left.is_some();
        if let Some(left) = &b.left {
            self.build_sub_expr(left)?;
        }
        if let Some(op) = b.op {
            if has_left {
                self.push(' ');
            }
            self.push_str(op.token());
            if let Some(right) = &b.right {
                self.push(' ');
                self.build_sub_expr(right)?;
            }
        }
        Ok(())
    }

    /// Nested binary nodes are always parenthesized.
    fn build_sub_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Predicate(p) => self.build_wrapped(&p.0),
            Expr::Math(m) => self.build_wrapped(&m.0),
            Expr::List(values) => {
                self.push('(');
                if values.is_empty() {
                    self.push_str("NULL");
                }
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.push(',');
                    }
                    self.push('?');
                    self.add_arg(value.clone());
                }
                self.push(')');
                Ok(())
            }
            _ => self.build_expression(expr),
        }
    }

    fn build_wrapped(&mut self, b: &Binary) -> Result<()> {
        self.push('(');
        self.build_binary(b)?;
        self.push(')');
        Ok(())
    }

    pub(crate) fn build_aggregate(&mut self, a: &Aggregate, use_alias: bool) -> Result<()> {
        self.push_str(a.func);
        self.push('(');
        self.build_column(a.table.as_ref(), &a.arg)?;
        self.push(')');
        if use_alias {
            self.build_as(a.alias.as_deref());
        }
        Ok(())
    }

    pub(crate) fn build_subquery(&mut self, s: &Subquery, use_alias: bool) -> Result<()> {
        let inner = s.statement.build()?;
        self.push('(');
        self.push_str(inner.sql.strip_suffix(';').unwrap_or(&inner.sql));
        self.add_args(inner.args);
        self.push(')');
        if use_alias {
            self.build_as(Some(&s.alias));
        }
        Ok(())
    }

    /// A statement's FROM source. `None` is the statement's own table.
    pub(crate) fn build_table(&mut self, table: Option<&TableRef>) -> Result<()> {
        match table {
            None => {
                let name = self.model.table_name.clone();
                self.quote(&name);
            }
            Some(TableRef::Table(t)) => {
                let model = self.core.registry().get_def(t.type_id, t.def)?;
                self.quote(&model.table_name);
                self.build_as(t.alias.as_deref());
            }
            Some(TableRef::Join(j)) => self.build_join(j)?,
            Some(TableRef::Subquery(s)) => self.build_subquery(s, true)?,
        }
        Ok(())
    }

    fn build_join(&mut self, j: &Join) -> Result<()> {
        self.push('(');
        self.build_table(Some(&j.left))?;
        self.push(' ');
        self.push_str(j.kind.keyword());
        self.push(' ');
        self.build_table(Some(&j.right))?;
        if !j.using.is_empty() {
            self.push_str(" USING (");
            for (i, field) in j.using.iter().enumerate() {
                if i > 0 {
                    self.push(',');
                }
                let column = self.join_col_name(j, field)?;
                self.quote(&column);
            }
            self.push(')');
        }
        if !j.on.is_empty() {
            self.push_str(" ON ");
            self.build_predicates(&j.on)?;
        }
        self.push(')');
        Ok(())
    }

    /// One entry of a projection list.
    pub(crate) fn build_selectable(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Column(c) => {
                self.build_column(c.table.as_ref(), &c.name)?;
                self.build_as(c.alias.as_deref());
                Ok(())
            }
            Expr::Aggregate(a) => self.build_aggregate(a, true),
            Expr::Raw(r) => {
                self.build_raw(r);
                Ok(())
            }
            Expr::Subquery(s) => self.build_subquery(s, true),
            other => Err(OrmError::UnsupportedSelectable(format!("{other:?}"))),
        }
    }

    /// Column list without aliases, as used by GROUP BY.
    pub(crate) fn build_columns(&mut self, columns: &[Column]) -> Result<()> {
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                self.push(',');
            }
            self.build_column(col.table.as_ref(), &col.name)?;
        }
        Ok(())
    }
}

fn column_of(model: &Model, field: &str) -> Result<String> {
    model
        .field(field)
        .map(|f| f.column.clone())
        .ok_or_else(|| OrmError::UnknownField(field.to_owned()))
}
