//! From-items: tables, subqueries, CTE references, functions, joins and
//! `LATERAL`.
//!
//! In a FROM list every item except a join receives an alias from the
//! enclosing statement's scope and renders as `item AS "alias"`.

use std::str::FromStr;

use super::combining::CombiningQuery;
use super::select::Select;
use super::values::Values;
use super::with::With;
use crate::error::{Result, SqlError};
use crate::expr::{Column, Expr, Function};
use crate::render::{NodeId, Render, SqlWriter};

/// A table, optionally qualified by schema and database.
#[derive(Debug, Clone)]
pub struct Table {
    id: NodeId,
    name: String,
    schema: Option<String>,
    database: Option<String>,
}

impl Table {
    /// Creates a table reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            schema: None,
            database: None,
        }
    }

    /// Qualifies the table with a schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Qualifies the table with a database.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// The identity used for aliasing.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Renders the qualified name without alias: `"db"."schema"."t"`.
impl Render for Table {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        for part in [&self.database, &self.schema].into_iter().flatten() {
            w.push_ident(part);
            w.push(".");
        }
        w.push_ident(&self.name);
        Ok(())
    }
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    /// `INNER JOIN`
    #[default]
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `LEFT OUTER JOIN`
    LeftOuter,
    /// `RIGHT JOIN`
    Right,
    /// `RIGHT OUTER JOIN`
    RightOuter,
    /// `FULL JOIN`
    Full,
    /// `FULL OUTER JOIN`
    FullOuter,
    /// `CROSS JOIN`
    Cross,
}

impl JoinType {
    /// Returns the SQL keyword(s), without `JOIN`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::LeftOuter => "LEFT OUTER",
            Self::Right => "RIGHT",
            Self::RightOuter => "RIGHT OUTER",
            Self::Full => "FULL",
            Self::FullOuter => "FULL OUTER",
            Self::Cross => "CROSS",
        }
    }
}

impl FromStr for JoinType {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INNER" => Ok(Self::Inner),
            "LEFT" => Ok(Self::Left),
            "LEFT OUTER" => Ok(Self::LeftOuter),
            "RIGHT" => Ok(Self::Right),
            "RIGHT OUTER" => Ok(Self::RightOuter),
            "FULL" => Ok(Self::Full),
            "FULL OUTER" => Ok(Self::FullOuter),
            "CROSS" => Ok(Self::Cross),
            _ => Err(SqlError::invalid("join type", s)),
        }
    }
}

/// `left KIND JOIN right[ ON condition]`
///
/// A join has no alias of its own; its operands keep theirs.
#[derive(Debug, Clone)]
pub struct Join {
    left: FromItem,
    right: FromItem,
    kind: JoinType,
    condition: Option<Expr>,
}

impl Join {
    /// Joins two from-items.
    #[must_use]
    pub fn new(left: impl Into<FromItem>, right: impl Into<FromItem>, kind: JoinType) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            kind,
            condition: None,
        }
    }

    /// Sets the `ON` condition.
    #[must_use]
    pub fn on(mut self, condition: impl Into<Expr>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// The join kind.
    #[must_use]
    pub const fn kind(&self) -> JoinType {
        self.kind
    }
}

impl Render for Join {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        self.left.render(w)?;
        w.push(" ");
        w.push(self.kind.as_str());
        w.push(" JOIN ");
        self.right.render(w)?;
        if let Some(condition) = &self.condition {
            w.push(" ON ");
            condition.render(w)?;
        }
        Ok(())
    }
}

/// `LATERAL item`; shares the alias and the columns of the wrapped item.
#[derive(Debug, Clone)]
pub struct Lateral {
    id: NodeId,
    inner: FromItem,
}

impl Lateral {
    /// The identity of the wrapped item.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }
}

/// Anything that can appear in a FROM list.
#[derive(Debug, Clone)]
pub enum FromItem {
    /// A table.
    Table(Table),
    /// A sub-SELECT.
    Select(Box<Select>),
    /// A set combination.
    Combining(Box<CombiningQuery>),
    /// A `VALUES` list.
    Values(Box<Values>),
    /// A reference to a common table expression.
    With(Box<With>),
    /// A set-returning function.
    Function(Function),
    /// A `LATERAL` item.
    Lateral(Box<Lateral>),
    /// A join.
    Join(Box<Join>),
}

impl FromItem {
    /// The identity used for aliasing; joins have none.
    #[must_use]
    pub fn id(&self) -> Option<NodeId> {
        match self {
            Self::Table(t) => Some(t.id()),
            Self::Select(s) => Some(s.id()),
            Self::Combining(q) => Some(q.id()),
            Self::Values(v) => Some(v.id()),
            Self::With(x) => Some(x.id()),
            Self::Function(f) => Some(f.id()),
            Self::Lateral(l) => Some(l.id()),
            Self::Join(_) => None,
        }
    }

    /// Returns a column of this item.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::NoAlias`] for a join, which has no columns of its
    /// own.
    pub fn column(&self, name: impl Into<String>) -> Result<Column> {
        self.id()
            .map(|id| Column::new(id, name))
            .ok_or(SqlError::NoAlias("join"))
    }

    fn function(&self) -> Option<&Function> {
        match self {
            Self::Function(f) => Some(f),
            Self::Lateral(l) => l.inner.function(),
            _ => None,
        }
    }

    pub(super) fn render_body(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        match self {
            Self::Table(t) => t.render(w),
            Self::Select(s) => parenthesized(&**s, w),
            Self::Combining(q) => parenthesized(&**q, w),
            Self::Values(v) => parenthesized(&**v, w),
            Self::With(x) => {
                let alias = w.aliases().get(x.id());
                w.push_ident(&alias);
                Ok(())
            }
            Self::Function(f) => f.render(w),
            Self::Lateral(l) => {
                w.push("LATERAL ");
                l.inner.render_body(w)
            }
            Self::Join(j) => j.render(w),
        }
    }
}

fn parenthesized(node: &impl Render, w: &mut SqlWriter<'_>) -> Result<()> {
    w.push("(");
    node.render(w)?;
    w.push(")");
    Ok(())
}

/// Renders the FROM-list form: `body AS "alias"`.
///
/// The alias is allocated before the body so that an outer item always
/// sorts before the items nested inside it.
impl Render for FromItem {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        let Some(id) = self.id() else {
            return self.render_body(w);
        };
        let alias = w.aliases().get(id);
        self.render_body(w)?;
        if alias.is_empty() {
            return Ok(());
        }
        w.push(if w.flavor().no_as() { " " } else { " AS " });
        w.push_ident(&alias);
        if let Some(function) = self.function() {
            if !function.columns_definitions().is_empty() {
                w.push(" (");
                function.render_columns_definitions(w);
                w.push(")");
            }
        }
        Ok(())
    }
}

macro_rules! from_item_conversions {
    ($($ty:ident => $variant:ident($wrap:expr)),+ $(,)?) => {
        $(
            impl From<$ty> for FromItem {
                fn from(item: $ty) -> Self {
                    Self::$variant($wrap(item))
                }
            }

            impl From<&$ty> for FromItem {
                fn from(item: &$ty) -> Self {
                    Self::$variant($wrap(item.clone()))
                }
            }
        )+
    };
}

from_item_conversions! {
    Table => Table(std::convert::identity),
    Select => Select(Box::new),
    CombiningQuery => Combining(Box::new),
    Values => Values(Box::new),
    With => With(Box::new),
    Function => Function(std::convert::identity),
    Lateral => Lateral(Box::new),
    Join => Join(Box::new),
}

/// Statement and join constructors shared by every from-item.
macro_rules! relation_methods {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $ty {
                /// `SELECT columns FROM self`
                #[must_use]
                pub fn select(&self, columns: Vec<Expr>) -> Select {
                    Select::new(columns).from(self)
                }

                /// Joins `right` with the given kind.
                #[must_use]
                pub fn join_with(&self, right: impl Into<FromItem>, kind: JoinType) -> Join {
                    Join::new(self, right, kind)
                }

                /// `INNER JOIN`
                #[must_use]
                pub fn join(&self, right: impl Into<FromItem>) -> Join {
                    self.join_with(right, JoinType::Inner)
                }

                /// `LEFT JOIN`
                #[must_use]
                pub fn left_join(&self, right: impl Into<FromItem>) -> Join {
                    self.join_with(right, JoinType::Left)
                }

                /// `LEFT OUTER JOIN`
                #[must_use]
                pub fn left_outer_join(&self, right: impl Into<FromItem>) -> Join {
                    self.join_with(right, JoinType::LeftOuter)
                }

                /// `RIGHT JOIN`
                #[must_use]
                pub fn right_join(&self, right: impl Into<FromItem>) -> Join {
                    self.join_with(right, JoinType::Right)
                }

                /// `RIGHT OUTER JOIN`
                #[must_use]
                pub fn right_outer_join(&self, right: impl Into<FromItem>) -> Join {
                    self.join_with(right, JoinType::RightOuter)
                }

                /// `FULL JOIN`
                #[must_use]
                pub fn full_join(&self, right: impl Into<FromItem>) -> Join {
                    self.join_with(right, JoinType::Full)
                }

                /// `FULL OUTER JOIN`
                #[must_use]
                pub fn full_outer_join(&self, right: impl Into<FromItem>) -> Join {
                    self.join_with(right, JoinType::FullOuter)
                }

                /// `CROSS JOIN`
                #[must_use]
                pub fn cross_join(&self, right: impl Into<FromItem>) -> Join {
                    self.join_with(right, JoinType::Cross)
                }
            }
        )+
    };
}

relation_methods!(Table, Select, CombiningQuery, Values, With, Function, Lateral, Join);

/// Column accessors and `LATERAL` for from-items that carry an alias.
macro_rules! aliased_methods {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $ty {
                /// Returns the column `name` of this item as an expression.
                #[must_use]
                pub fn c(&self, name: impl Into<String>) -> Expr {
                    Expr::Column(self.column(name))
                }

                /// Returns the column `name` of this item.
                #[must_use]
                pub fn column(&self, name: impl Into<String>) -> Column {
                    Column::new(self.id(), name)
                }

                /// Wraps the item in `LATERAL`.
                #[must_use]
                pub fn lateral(&self) -> Lateral {
                    Lateral {
                        id: self.id(),
                        inner: FromItem::from(self),
                    }
                }
            }
        )+
    };
}

aliased_methods!(Table, Select, CombiningQuery, Values, With, Function);

impl Lateral {
    /// Returns the column `name` of the wrapped item as an expression.
    #[must_use]
    pub fn c(&self, name: impl Into<String>) -> Expr {
        Expr::Column(self.column(name))
    }

    /// Returns the column `name` of the wrapped item.
    #[must_use]
    pub fn column(&self, name: impl Into<String>) -> Column {
        Column::new(self.id, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::value::SqlValue;
    use crate::expr::functions;
    use crate::flavor::Flavor;
    use crate::render::RenderContext;

    fn build(select: &Select) -> (String, Vec<SqlValue>) {
        select
            .to_sql_with(&RenderContext::new(Flavor::default()))
            .unwrap()
    }

    #[test]
    fn test_table_qualified_name() {
        let t = Table::new("t").schema("s").database("d");
        let (sql, _) = t
            .to_sql_with(&RenderContext::new(Flavor::default()))
            .unwrap();
        assert_eq!(sql, r#""d"."s"."t""#);

        let (sql, _) = build(&t.select(vec![]));
        assert_eq!(sql, r#"SELECT * FROM "d"."s"."t" AS "a""#);
    }

    #[test]
    fn test_join() {
        let t1 = Table::new("t1");
        let t2 = Table::new("t2");
        let (sql, _) = build(&t1.join(&t2).select(vec![]));
        assert_eq!(sql, r#"SELECT * FROM "t1" AS "a" INNER JOIN "t2" AS "b""#);
    }

    #[test]
    fn test_join_condition() {
        let t1 = Table::new("t1");
        let t2 = Table::new("t2");
        let join = t1.left_join(&t2).on(t1.c("c").eq(t2.c("c")));
        let (sql, _) = build(&join.select(vec![t1.c("c")]));
        assert_eq!(
            sql,
            r#"SELECT "a"."c" FROM "t1" AS "a" LEFT JOIN "t2" AS "b" ON ("a"."c" = "b"."c")"#
        );
    }

    #[test]
    fn test_join_of_join() {
        let t1 = Table::new("t1");
        let t2 = Table::new("t2");
        let t3 = Table::new("t3");
        let join = t1.join(&t2).full_outer_join(&t3);
        let (sql, _) = build(&join.select(vec![]));
        assert_eq!(
            sql,
            r#"SELECT * FROM "t1" AS "a" INNER JOIN "t2" AS "b" FULL OUTER JOIN "t3" AS "c""#
        );
    }

    #[test]
    fn test_join_type_from_str() {
        assert_eq!("left outer".parse::<JoinType>().unwrap(), JoinType::LeftOuter);
        assert_eq!("CROSS".parse::<JoinType>().unwrap(), JoinType::Cross);
        let err = "OUTER".parse::<JoinType>().unwrap_err();
        assert!(matches!(err, SqlError::Invalid { field: "join type", .. }));
    }

    #[test]
    fn test_join_has_no_columns() {
        let t1 = Table::new("t1");
        let t2 = Table::new("t2");
        let item = FromItem::from(t1.join(&t2));
        assert!(item.id().is_none());
        assert!(matches!(item.column("c"), Err(SqlError::NoAlias("join"))));
        assert!(FromItem::from(&t1).column("c").is_ok());
    }

    #[test]
    fn test_lateral_subquery() {
        let t1 = Table::new("t1");
        let t2 = Table::new("t2");
        let lateral = t2
            .select(vec![])
            .where_clause(t2.c("id").eq(t1.c("t2")))
            .lateral();
        let (sql, _) = build(&t1.select(vec![]).from(&lateral));
        assert_eq!(
            sql,
            r#"SELECT * FROM "t1" AS "a", LATERAL (SELECT * FROM "t2" AS "c" WHERE ("c"."id" = "a"."t2")) AS "b""#
        );
    }

    #[test]
    fn test_lateral_shares_alias() {
        let t = Table::new("t");
        let sub = t.select(vec![t.c("c")]);
        let lateral = sub.lateral();
        assert_eq!(lateral.id(), sub.id());
        assert!(lateral.column("c").belongs_to(sub.id()));
    }

    #[test]
    fn test_function_from_item() {
        let (sql, _) = build(&functions::now().select(vec![]));
        assert_eq!(sql, r#"SELECT * FROM NOW() AS "a""#);
    }

    #[test]
    fn test_function_columns_definitions() {
        let f = Function::call("GENERATE_SERIES", vec![Expr::from(1), Expr::from(3)])
            .with_columns_definitions(vec![(String::from("n"), String::from("INTEGER"))]);
        let (sql, params) = build(&f.select(vec![f.c("n")]));
        assert_eq!(
            sql,
            r#"SELECT "a"."n" FROM GENERATE_SERIES(%s, %s) AS "a" ("n" INTEGER)"#
        );
        assert_eq!(params, vec![SqlValue::Int(1), SqlValue::Int(3)]);
    }

    #[test]
    fn test_no_as_flavor() {
        let t = Table::new("t");
        let flavor = Flavor::builder().no_as(true).build();
        let (sql, _) = t
            .select(vec![t.c("c").as_("foo")])
            .to_sql_with(&RenderContext::new(flavor))
            .unwrap();
        assert_eq!(sql, r#"SELECT "a"."c" "foo" FROM "t" "a""#);
    }
}
