//! UPDATE statements.

use super::from::{FromItem, Table};
use super::insert::{owned_columns, render_column_names};
use super::with::{render_with_clause, With};
use super::render_returning;
use crate::error::{Result, SqlError};
use crate::expr::{Column, Expr};
use crate::render::{Render, SqlWriter};

/// `UPDATE table AS "alias" SET c = v, ...[ FROM ...][ WHERE ...]`
#[derive(Debug, Clone)]
pub struct Update {
    table: Table,
    columns: Vec<Column>,
    values: Vec<Expr>,
    from: Vec<FromItem>,
    where_clause: Option<Expr>,
    returning: Vec<Expr>,
    with: Vec<With>,
}

impl Update {
    /// Creates `UPDATE table SET columns[i] = values[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Invalid`] when a column does not belong to the
    /// table (`"columns"`) or the lists differ in length (`"values"`).
    pub fn new(table: &Table, columns: Vec<Expr>, values: Vec<Expr>) -> Result<Self> {
        let columns = owned_columns("columns", table.id(), columns)?;
        if values.len() != columns.len() {
            return Err(SqlError::invalid("values", values));
        }
        Ok(Self {
            table: table.clone(),
            columns,
            values,
            from: Vec::new(),
            where_clause: None,
            returning: Vec::new(),
            with: Vec::new(),
        })
    }

    /// Adds an item to the FROM list.
    #[must_use]
    pub fn from(mut self, item: impl Into<FromItem>) -> Self {
        self.from.push(item.into());
        self
    }

    /// Sets the WHERE condition.
    #[must_use]
    pub fn where_clause(mut self, cond: impl Into<Expr>) -> Self {
        self.where_clause = Some(cond.into());
        self
    }

    /// Sets the RETURNING list.
    #[must_use]
    pub fn returning(mut self, columns: Vec<Expr>) -> Self {
        self.returning = columns;
        self
    }

    /// Attaches common table expressions.
    #[must_use]
    pub fn with(mut self, with: Vec<With>) -> Self {
        self.with = with;
        self
    }
}

impl Render for Update {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        let _scope = w.aliases().enter();

        let mut from = w.fork();
        if !self.from.is_empty() {
            from.push(" FROM ");
            from.push_list(&self.from, ", ")?;
        }

        let mut set = w.fork();
        for (i, (column, value)) in self.columns.iter().zip(&self.values).enumerate() {
            if i > 0 {
                set.push(", ");
            }
            render_column_names(std::slice::from_ref(column), &mut set);
            set.push(" = ");
            value.render(&mut set)?;
        }

        let mut filter = w.fork();
        if let Some(cond) = &self.where_clause {
            filter.push(" WHERE ");
            cond.render(&mut filter)?;
        }

        let mut returning = w.fork();
        render_returning(&self.returning, &mut returning)?;

        render_with_clause(&self.with, w)?;
        w.push("UPDATE ");
        self.table.render(w)?;
        w.push(" AS ");
        w.push_ident(&w.aliases().get(self.table.id()));
        w.push(" SET ");
        w.append(set);
        w.append(from);
        w.append(filter);
        w.append(returning);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::value::SqlValue;
    use crate::expr::literal;
    use crate::flavor::Flavor;
    use crate::render::RenderContext;

    fn build(query: &Update) -> (String, Vec<SqlValue>) {
        query.to_sql_with(&RenderContext::new(Flavor::default())).unwrap()
    }

    fn text(value: &str) -> SqlValue {
        SqlValue::Text(value.to_string())
    }

    #[test]
    fn test_update() {
        let t = Table::new("t");
        let update = Update::new(&t, vec![t.c("c")], vec!["foo".into()]).unwrap();
        let (sql, params) = build(&update);
        assert_eq!(sql, r#"UPDATE "t" AS "a" SET "c" = %s"#);
        assert_eq!(params, vec![text("foo")]);

        let (sql, params) = build(&update.where_clause(t.c("b").eq(literal(true))));
        assert_eq!(sql, r#"UPDATE "t" AS "a" SET "c" = %s WHERE ("a"."b" = %s)"#);
        assert_eq!(params, vec![text("foo"), SqlValue::Bool(true)]);
    }

    #[test]
    fn test_update_from() {
        let t1 = Table::new("t1");
        let t2 = Table::new("t2");
        let update = Update::new(&t1, vec![t1.c("c")], vec!["foo".into()])
            .unwrap()
            .from(&t2)
            .where_clause(t1.c("c").eq(t2.c("c")));
        let (sql, params) = build(&update);
        assert_eq!(
            sql,
            r#"UPDATE "t1" AS "b" SET "c" = %s FROM "t2" AS "a" WHERE ("b"."c" = "a"."c")"#
        );
        assert_eq!(params, vec![text("foo")]);
    }

    #[test]
    fn test_update_subselect() {
        let t1 = Table::new("t1").schema("default");
        let t2 = Table::new("t2").schema("default");
        let sub = t2.select(vec![t2.c("c")]).where_clause(t2.c("i").eq(t1.c("i")));
        let update = Update::new(&t1, vec![t1.c("c1")], vec![sub.into()]).unwrap();
        let (sql, params) = build(&update);
        assert_eq!(
            sql,
            r#"UPDATE "default"."t1" AS "b" SET "c1" = (SELECT "a"."c" FROM "default"."t2" AS "a" WHERE ("a"."i" = "b"."i"))"#
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_update_returning_select() {
        let t1 = Table::new("t1");
        let t2 = Table::new("t2");
        let sub = t2
            .select(vec![t2.c("c")])
            .where_clause(t2.c("c1").eq(t1.c("c")) & t2.c("c2").eq("bar"));
        let update = Update::new(&t1, vec![t1.c("c")], vec!["foo".into()])
            .unwrap()
            .returning(vec![sub.into()]);
        let (sql, params) = build(&update);
        assert_eq!(
            sql,
            r#"UPDATE "t1" AS "b" SET "c" = %s RETURNING (SELECT "a"."c" FROM "t2" AS "a" WHERE (("a"."c1" = "b"."c") AND ("a"."c2" = %s)))"#
        );
        assert_eq!(params, vec![text("foo"), text("bar")]);
    }

    #[test]
    fn test_update_with() {
        let t = Table::new("t");
        let t1 = Table::new("t1");
        let w = With::new(Vec::<String>::new(), t1.select(vec![t1.c("c1")]));
        let sub = w.select(vec![w.c("c3")]).where_clause(w.c("c4").eq(2));
        let update = Update::new(&t, vec![t.c("c2")], vec![sub.into()])
            .unwrap()
            .with(vec![w]);
        let (sql, params) = build(&update);
        assert_eq!(
            sql,
            r#"WITH "a" AS (SELECT "b"."c1" FROM "t1" AS "b") UPDATE "t" AS "c" SET "c2" = (SELECT "a"."c3" FROM "a" AS "a" WHERE ("a"."c4" = %s))"#
        );
        assert_eq!(params, vec![SqlValue::Int(2)]);
    }

    #[test]
    fn test_update_validation() {
        let t = Table::new("t");
        let err = Update::new(&t, vec![t.c("a"), t.c("b")], vec![1.into()]).unwrap_err();
        assert!(matches!(err, SqlError::Invalid { field: "values", .. }));

        let other = Table::new("o");
        let err = Update::new(&t, vec![other.c("a")], vec![1.into()]).unwrap_err();
        assert!(matches!(err, SqlError::Invalid { field: "columns", .. }));
    }
}
