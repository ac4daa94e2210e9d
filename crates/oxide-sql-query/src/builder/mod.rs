//! Statements and from-items.
//!
//! Every statement is a plain value built by chaining methods. Rendering
//! goes through [`Render`], which yields the SQL text and its bind
//! parameters in one pass:
//!
//! ```rust
//! use oxide_sql_query::{Render, Table};
//!
//! let t = Table::new("t");
//! let (sql, params) = t
//!     .select(vec![])
//!     .where_clause(t.c("c").eq("foo"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(sql, r#"SELECT * FROM "t" AS "a" WHERE ("a"."c" = %s)"#);
//! assert_eq!(params.len(), 1);
//! ```
//!
//! Setters that take structural arguments (columns of the target table,
//! value lists, conflict clauses) validate them immediately and return a
//! [`Result`](crate::error::Result).

mod combining;
mod delete;
mod from;
mod insert;
mod merge;
mod select;
mod update;
pub mod value;
mod values;
mod with;

pub use combining::{CombiningQuery, SetOp};
pub use delete::Delete;
pub use from::{FromItem, Join, JoinType, Lateral, Table};
pub use insert::{excluded, Conflict, Insert};
pub use merge::{Merge, When};
pub use select::{For, LockKind, Select};
pub use update::Update;
pub use value::{SqlValue, ToSqlValue};
pub use values::Values;
pub use with::With;

use crate::error::Result;
use crate::expr::Expr;
use crate::flavor::LimitStyle;
use crate::render::{Render, SqlWriter};

/// Any statement.
#[derive(Debug, Clone)]
pub enum Query {
    /// `SELECT`
    Select(Box<Select>),
    /// `INSERT`
    Insert(Box<Insert>),
    /// `UPDATE`
    Update(Box<Update>),
    /// `DELETE`
    Delete(Box<Delete>),
    /// `MERGE`
    Merge(Box<Merge>),
    /// `UNION` / `INTERSECT` / `EXCEPT`
    Combining(Box<CombiningQuery>),
    /// `VALUES`
    Values(Box<Values>),
}

impl Render for Query {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        match self {
            Self::Select(q) => q.render(w),
            Self::Insert(q) => q.render(w),
            Self::Update(q) => q.render(w),
            Self::Delete(q) => q.render(w),
            Self::Merge(q) => q.render(w),
            Self::Combining(q) => q.render(w),
            Self::Values(q) => q.render(w),
        }
    }
}

macro_rules! query_conversions {
    ($($ty:ident => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Query {
                fn from(query: $ty) -> Self {
                    Self::$variant(Box::new(query))
                }
            }

            impl From<&$ty> for Query {
                fn from(query: &$ty) -> Self {
                    Self::$variant(Box::new(query.clone()))
                }
            }

            /// Used as an expression, a statement renders as a parenthesized
            /// subquery.
            impl From<$ty> for Expr {
                fn from(query: $ty) -> Self {
                    Self::Query(Box::new(query.into()))
                }
            }

            impl From<&$ty> for Expr {
                fn from(query: &$ty) -> Self {
                    Self::Query(Box::new(query.into()))
                }
            }
        )+
    };
}

query_conversions! {
    Select => Select,
    Insert => Insert,
    Update => Update,
    Delete => Delete,
    Merge => Merge,
    CombiningQuery => Combining,
    Values => Values,
}

impl From<Query> for Expr {
    fn from(query: Query) -> Self {
        Self::Query(Box::new(query))
    }
}

/// Writes a select list, `AS` decorations included.
fn render_columns(columns: &[Expr], w: &mut SqlWriter<'_>) -> Result<()> {
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            w.push(", ");
        }
        column.render_column(w)?;
    }
    Ok(())
}

fn render_order_by(keys: &[Expr], w: &mut SqlWriter<'_>) -> Result<()> {
    if !keys.is_empty() {
        w.push(" ORDER BY ");
        w.push_list(keys, ", ")?;
    }
    Ok(())
}

fn render_returning(columns: &[Expr], w: &mut SqlWriter<'_>) -> Result<()> {
    if !columns.is_empty() {
        w.push(" RETURNING ");
        render_columns(columns, w)?;
    }
    Ok(())
}

/// Writes the pagination clause of the flavor.
///
/// A zero offset is omitted. With `LIMIT`/`OFFSET` pagination an offset
/// without limit borrows the flavor's `max_limit`, written inline.
fn render_limit_offset(limit: Option<i64>, offset: Option<i64>, w: &mut SqlWriter<'_>) {
    let offset = offset.filter(|&n| n != 0);
    match w.flavor().limit_style() {
        LimitStyle::Limit => {
            if let Some(limit) = limit {
                w.push(" LIMIT ");
                w.push_param(SqlValue::Int(limit));
            } else if offset.is_some() {
                if let Some(max) = w.flavor().max_limit().filter(|&m| m != 0) {
                    w.push(&format!(" LIMIT {max}"));
                }
            }
            if let Some(offset) = offset {
                w.push(" OFFSET ");
                w.push_param(SqlValue::Int(offset));
            }
        }
        LimitStyle::Fetch | LimitStyle::Rownum => {
            if let Some(offset) = offset {
                w.push(" OFFSET (");
                w.push_param(SqlValue::Int(offset));
                w.push(") ROWS");
            }
            if let Some(limit) = limit {
                w.push(" FETCH FIRST (");
                w.push_param(SqlValue::Int(limit));
                w.push(") ROWS ONLY");
            }
        }
    }
}
