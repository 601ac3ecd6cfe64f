use std::marker::PhantomData;
use std::sync::Arc;

use crate::builder::Builder;
use crate::db::Core;
use crate::entity::Entity;
use crate::error::Result;
use crate::expr::{Column, Expr, Predicate};
use crate::middleware::{QueryContext, QueryKind};
use crate::pipeline;
use crate::session::{Context, Session};
use crate::statement::{Query, QueryBuilder};
use crate::table::{Subquery, Table, TableRef};
use crate::value::Value;

/// `SELECT` statement producing records of `T`.
pub struct Selector<T> {
    core: Core,
    table: Option<TableRef>,
    columns: Vec<Expr>,
    wheres: Vec<Predicate>,
    group_by: Vec<Column>,
    having: Vec<Predicate>,
    limit: Option<u64>,
    offset: Option<u64>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Selector<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            table: self.table.clone(),
            columns: self.columns.clone(),
            wheres: self.wheres.clone(),
            group_by: self.group_by.clone(),
            having: self.having.clone(),
            limit: self.limit,
            offset: self.offset,
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> Selector<T> {
    pub fn new(sess: &dyn Session) -> Self {
        Self {
            core: sess.core().clone(),
            table: None,
            columns: Vec::new(),
            wheres: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            limit: None,
            offset: None,
            _marker: PhantomData,
        }
    }

    /// Read from a table, join or subquery instead of `T`'s own table.
    pub fn from(mut self, table: impl Into<TableRef>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Projection list. Columns, aggregates, raw fragments and subqueries
    /// are accepted; anything else fails at build time.
    pub fn select<E: Into<Expr>>(mut self, columns: impl IntoIterator<Item = E>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn r#where(mut self, preds: impl IntoIterator<Item = Predicate>) -> Self {
        self.wheres = preds.into_iter().collect();
        self
    }

    pub fn group_by(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.group_by = columns.into_iter().collect();
        self
    }

    pub fn having(mut self, preds: impl IntoIterator<Item = Predicate>) -> Self {
        self.having = preds.into_iter().collect();
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Wrap this statement as a named subquery source.
    pub fn as_subquery(&self, alias: impl Into<String>) -> Subquery {
        let table = self
            .table
            .clone()
            .unwrap_or_else(|| TableRef::Table(Table::of::<T>()));
        Subquery::new(
            Arc::new(self.clone()),
            table,
            self.columns.clone(),
            alias,
        )
    }

    pub fn get(&self, ctx: &Context, sess: &dyn Session) -> Result<T> {
        pipeline::get::<T>(ctx, sess, &self.query_context())
    }

    pub fn get_multi(&self, ctx: &Context, sess: &dyn Session) -> Result<Vec<T>> {
        pipeline::get_multi::<T>(ctx, sess, &self.query_context())
    }

    fn query_context(&self) -> QueryContext<'_> {
        QueryContext {
            kind: QueryKind::Select,
            builder: self,
            // resolution errors surface again from build()
            model: self.core.registry().get::<T>().ok(),
        }
    }
}

impl<T: Entity> QueryBuilder for Selector<T> {
    fn build(&self) -> Result<Query> {
        let model = self.core.registry().get::<T>()?;
        let mut b = Builder::new(&self.core, model);
        b.push_str("SELECT ");
        if self.columns.is_empty() {
            b.push('*');
        }
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                b.push(',');
            }
            b.build_selectable(col)?;
        }
        b.push_str(" FROM ");
        b.build_table(self.table.as_ref())?;

        if !self.wheres.is_empty() {
            b.push_str(" WHERE ");
            b.build_predicates(&self.wheres)?;
        }
        if !self.group_by.is_empty() {
            b.push_str(" GROUP BY ");
            b.build_columns(&self.group_by)?;
        }
        if !self.having.is_empty() {
            b.push_str(" HAVING ");
            b.build_predicates(&self.having)?;
        }
        if let Some(limit) = self.limit {
            b.push_str(" LIMIT ?");
            b.add_arg(Value::from(limit));
        }
        if let Some(offset) = self.offset {
            b.push_str(" OFFSET ?");
            b.add_arg(Value::from(offset));
        }
        Ok(b.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrmError;
    use crate::expr::{avg, c, exists, not, raw, any};
    use crate::testing::{Carrier, Order, OrderDetail, Shipment, TestModel, mock_db};

    fn build(s: Selector<TestModel>) -> Query {
        s.build().unwrap()
    }

    #[test]
    fn test_select_all() {
        let db = mock_db();
        let q = build(Selector::new(&db));
        assert_eq!(q.sql, "SELECT * FROM `test_model`;");
        assert!(q.args.is_empty());
    }

    #[test]
    fn test_select_columns_and_aliases() {
        let db = mock_db();
        let q = build(Selector::new(&db).select([
            Expr::from(c("id")),
            c("first_name").alias("name").into(),
            avg("age").alias("avg_age").into(),
            raw("COUNT(*)", []).into(),
        ]));
        assert_eq!(
            q.sql,
            "SELECT `id`,`first_name` AS `name`,AVG(`age`) AS `avg_age`,COUNT(*) FROM `test_model`;"
        );
    }

    #[test]
    fn test_select_rejects_predicate() {
        let db = mock_db();
        let err = Selector::<TestModel>::new(&db)
            .select([c("id").eq(1)])
            .build()
            .unwrap_err();
        assert!(matches!(err, OrmError::UnsupportedSelectable(_)));
    }

    #[test]
    fn test_where_parenthesizes_nested() {
        let db = mock_db();
        let q = build(
            Selector::new(&db).r#where([c("age").gt(2).and(c("age").lt(7))]),
        );
        assert_eq!(
            q.sql,
            "SELECT * FROM `test_model` WHERE (`age` > ?) AND (`age` < ?);"
        );
        assert_eq!(q.args, vec![Value::Int(2), Value::Int(7)]);
    }

    #[test]
    fn test_where_list_folds_left() {
        let db = mock_db();
        let q = build(Selector::new(&db).r#where([
            c("id").eq(1),
            c("age").gt(18),
            not(c("first_name").eq("Tom")),
        ]));
        assert_eq!(
            q.sql,
            "SELECT * FROM `test_model` WHERE ((`id` = ?) AND (`age` > ?)) AND (NOT (`first_name` = ?));"
        );
        assert_eq!(
            q.args,
            vec![Value::Int(1), Value::Int(18), Value::Text("Tom".into())]
        );
    }

    #[test]
    fn test_or_and_math() {
        let db = mock_db();
        let q = build(Selector::new(&db).r#where([c("age")
            .add(1)
            .multiply(2)
            .gt(10)
            .or(c("id").in_values([1, 2, 3]))]));
        assert_eq!(
            q.sql,
            "SELECT * FROM `test_model` WHERE (((`age` + ?) * ?) > ?) OR (`id` IN (?,?,?));"
        );
        assert_eq!(q.args.len(), 6);
    }

    #[test]
    fn test_in_empty_set() {
        let db = mock_db();
        let q = build(Selector::new(&db).r#where([c("id").in_values(Vec::<i64>::new())]));
        assert_eq!(q.sql, "SELECT * FROM `test_model` WHERE `id` IN (NULL);");
        assert!(q.args.is_empty());
    }

    #[test]
    fn test_raw_predicate() {
        let db = mock_db();
        let q = build(Selector::new(&db).r#where([
            raw("`age` < ?", [Value::Int(18)]).as_predicate(),
            c("id").eq(3),
        ]));
        assert_eq!(
            q.sql,
            "SELECT * FROM `test_model` WHERE (`age` < ?) AND (`id` = ?);"
        );
        assert_eq!(q.args, vec![Value::Int(18), Value::Int(3)]);
    }

    #[test]
    fn test_unknown_field() {
        let db = mock_db();
        let err = Selector::<TestModel>::new(&db)
            .r#where([c("invalid").eq(1)])
            .build()
            .unwrap_err();
        assert!(matches!(err, OrmError::UnknownField(f) if f == "invalid"));
    }

    #[test]
    fn test_group_by_having_limit_offset() {
        let db = mock_db();
        let q = build(
            Selector::new(&db)
                .select([c("age")])
                .group_by([c("age"), c("last_name")])
                .having([avg("id").lt(10)])
                .limit(5)
                .offset(10),
        );
        assert_eq!(
            q.sql,
            "SELECT `age` FROM `test_model` GROUP BY `age`,`last_name` HAVING AVG(`id`) < ? LIMIT ? OFFSET ?;"
        );
        assert_eq!(
            q.args,
            vec![Value::Int(10), Value::UInt(5), Value::UInt(10)]
        );
    }

    #[test]
    fn test_join_on() {
        let db = mock_db();
        let t1 = Table::of::<Order>().alias("t1");
        let t2 = Table::of::<OrderDetail>().alias("t2");
        let join = t1.clone().join(t2.clone()).on([t1.c("id").eq(t2.c("order_id"))]);
        let q = build(Selector::new(&db).from(join));
        assert_eq!(
            q.sql,
            "SELECT * FROM (`order` AS `t1` JOIN `order_detail` AS `t2` ON `t1`.`id` = `t2`.`order_id`);"
        );
    }

    #[test]
    fn test_join_using_and_nested() {
        let db = mock_db();
        let t1 = Table::of::<Order>().alias("t1");
        let t2 = Table::of::<OrderDetail>().alias("t2");
        let t3 = Table::of::<TestModel>().alias("t3");
        let join = t1
            .join(t2)
            .using(["using_col1", "using_col2"])
            .left_join(t3.clone())
            .on([t3.c("id").gt(1)]);
        let q = build(Selector::new(&db).from(join));
        assert_eq!(
            q.sql,
            "SELECT * FROM ((`order` AS `t1` JOIN `order_detail` AS `t2` USING (`using_col1`,`using_col2`)) LEFT JOIN `test_model` AS `t3` ON `t3`.`id` > ?);"
        );
        assert_eq!(q.args, vec![Value::Int(1)]);
    }

    #[test]
    fn test_join_column_prefers_left() {
        let db = mock_db();
        let t1 = Table::of::<Order>();
        let t2 = Table::of::<OrderDetail>();
        let t3 = Table::of::<TestModel>();
        let join = t1.join(t2).using(["using_col1"]).join(t3).using(["id"]);

        // using_col1 exists on both order and order_detail
        let s = Selector::<TestModel>::new(&db).from(join.clone());
        let b = Builder::new(&s.core, s.core.registry().get::<TestModel>().unwrap());
        assert_eq!(
            b.col_name(Some(&TableRef::from(join.clone())), "using_col1").unwrap(),
            "using_col1"
        );
        // only order_detail has item_id; the left lookup falls through
        assert_eq!(
            b.col_name(Some(&TableRef::from(join.clone())), "item_id").unwrap(),
            "item_id"
        );
        // only the right-most table has first_name
        assert_eq!(
            b.col_name(Some(&TableRef::from(join.clone())), "first_name").unwrap(),
            "first_name"
        );
        assert!(matches!(
            b.col_name(Some(&TableRef::from(join)), "nope"),
            Err(OrmError::UnknownField(_))
        ));
    }

    #[test]
    fn test_join_shared_field_takes_left_column() {
        let db = mock_db();
        let join = Table::of::<Shipment>()
            .join(Table::of::<Carrier>())
            .using(["id"]);
        let q = Selector::<Shipment>::new(&db)
            .from(join.clone())
            .select([join.c("name"), join.c("code")])
            .build()
            .unwrap();
        assert_eq!(
            q.sql,
            "SELECT `ship_name`,`code` FROM (`shipment` JOIN `carrier` USING (`id`));"
        );

        let join = Table::of::<Carrier>()
            .join(Table::of::<Shipment>())
            .using(["id"]);
        let q = Selector::<Carrier>::new(&db)
            .from(join.clone())
            .select([join.c("name")])
            .build()
            .unwrap();
        assert_eq!(
            q.sql,
            "SELECT `carrier_name` FROM (`carrier` JOIN `shipment` USING (`id`));"
        );
    }

    #[test]
    fn test_subquery_as_source() {
        let db = mock_db();
        let sub = Selector::<OrderDetail>::new(&db)
            .select([c("order_id"), c("item_id").alias("item")])
            .r#where([c("item_id").gt(3)])
            .as_subquery("sub");
        let q = Selector::<Order>::new(&db)
            .select([sub.c("order_id"), sub.c("item")])
            .from(sub.clone())
            .r#where([sub.c("order_id").lt(100)])
            .build()
            .unwrap();
        assert_eq!(
            q.sql,
            "SELECT `sub`.`order_id`,`sub`.`item` FROM (SELECT `order_id`,`item_id` AS `item` FROM `order_detail` WHERE `item_id` > ?) AS `sub` WHERE `sub`.`order_id` < ?;"
        );
        assert_eq!(q.args, vec![Value::Int(3), Value::Int(100)]);

        let err = Selector::<Order>::new(&db)
            .select([sub.c("using_col1")])
            .from(sub)
            .build()
            .unwrap_err();
        assert!(matches!(err, OrmError::UnknownField(_)));
    }

    #[test]
    fn test_subquery_without_columns_delegates_to_table() {
        let db = mock_db();
        let sub = Selector::<OrderDetail>::new(&db).as_subquery("sub");
        let q = Selector::<Order>::new(&db)
            .select([sub.c("item_id")])
            .from(sub)
            .build()
            .unwrap();
        assert_eq!(
            q.sql,
            "SELECT `sub`.`item_id` FROM (SELECT * FROM `order_detail`) AS `sub`;"
        );
    }

    #[test]
    fn test_subquery_predicates() {
        let db = mock_db();
        let sub = Selector::<OrderDetail>::new(&db)
            .select([c("order_id")])
            .r#where([c("item_id").eq(9)])
            .as_subquery("sub");
        let q = Selector::<Order>::new(&db)
            .r#where([
                c("id").in_query(sub.clone()),
                exists(sub.clone()),
                c("id").eq(any(sub)),
            ])
            .build()
            .unwrap();
        assert_eq!(
            q.sql,
            "SELECT * FROM `order` WHERE ((`id` IN (SELECT `order_id` FROM `order_detail` WHERE `item_id` = ?)) AND (EXISTS (SELECT `order_id` FROM `order_detail` WHERE `item_id` = ?))) AND (`id` = ANY (SELECT `order_id` FROM `order_detail` WHERE `item_id` = ?));"
        );
        assert_eq!(q.args, vec![Value::Int(9); 3]);
    }
}
