//! # oxide-sql-query
//!
//! Composable SQL query objects rendered to parameterized SQL.
//!
//! Queries are trees of plain values: tables, statements, expressions.
//! Rendering walks a tree once and produces the SQL text together with the
//! ordered bind parameters, ready for a driver's parameterized execute:
//!
//! ```rust
//! use oxide_sql_query::{Render, Table};
//!
//! let user = Table::new("user");
//! let (sql, params) = user
//!     .select(vec![user.c("id"), user.c("name")])
//!     .where_clause(user.c("name").eq("'; DROP TABLE user; --"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     r#"SELECT "a"."id", "a"."name" FROM "user" AS "a" WHERE ("a"."name" = %s)"#
//! );
//! assert_eq!(params.len(), 1);
//! ```
//!
//! ## Dialects
//!
//! A [`Flavor`] decides how a tree is written: placeholder style,
//! pagination (`LIMIT`, `FETCH` or a `ROWNUM` rewrite), and the features
//! the target database lacks. [`Render::build`] uses the ambient flavor of
//! the current task or thread; [`Render::to_sql_with`] takes an explicit
//! [`RenderContext`].
//!
//! ```rust
//! use oxide_sql_query::{Flavor, Render, RenderContext, Table};
//!
//! let t = Table::new("t");
//! let page = t.select(vec![]).limit(Some(10)).offset(Some(20));
//! let (sql, _) = page
//!     .to_sql_with(&RenderContext::new(Flavor::sqlite()))
//!     .unwrap();
//!
//! assert_eq!(sql, r#"SELECT * FROM "t" AS "a" LIMIT ? OFFSET ?"#);
//! ```
//!
//! ## Aliases
//!
//! Every from-item of a statement receives a short alias (`"a"`, `"b"`,
//! ...) from the statement's alias scope. Nested statements share the
//! scope of the statement that contains them, so correlated subqueries
//! refer to outer tables by their alias. See [`alias`].

pub mod alias;
pub mod builder;
pub mod error;
pub mod expr;
pub mod flavor;
pub mod render;

pub use builder::{
    CombiningQuery, Conflict, Delete, FromItem, Insert, Join, JoinType, Merge, Query, Select,
    SqlValue, Table, ToSqlValue, Update, Values, When, With,
};
pub use error::{Result, SqlError};
pub use expr::{literal, Column, Expr, NULL};
pub use flavor::{Flavor, FlavorConfig, LimitStyle, ParamStyle};
pub use render::{format2numeric, NodeId, Render, RenderContext, SqlWriter};
