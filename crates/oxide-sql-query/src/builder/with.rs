//! Common table expressions.
//!
//! A [`With`] is both a from-item (referenced by its alias, like a table)
//! and a member of the `WITH` clause of the statement it is attached to.
//! Both uses share the alias scope of that statement.

use super::Query;
use crate::error::{Result, SqlError};
use crate::render::{NodeId, Render, SqlWriter};

/// A named auxiliary query.
#[derive(Debug, Clone)]
pub struct With {
    id: NodeId,
    columns: Vec<String>,
    query: Option<Box<Query>>,
    recursive: bool,
}

impl With {
    /// Creates `"alias"[ (columns)] AS (query)`.
    #[must_use]
    pub fn new<I, S>(columns: I, query: impl Into<Query>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: NodeId::next(),
            columns: columns.into_iter().map(Into::into).collect(),
            query: Some(Box::new(query.into())),
            recursive: false,
        }
    }

    /// Creates a recursive expression whose query refers to itself.
    ///
    /// `build` receives a handle to the expression being defined, usable
    /// as a from-item and for its columns.
    ///
    /// ```rust
    /// use oxide_sql_query::builder::{Values, With};
    /// use oxide_sql_query::expr::literal;
    /// use oxide_sql_query::Render;
    ///
    /// let upto = With::recursive(["n"], |n| {
    ///     Values::new(vec![vec![1.into()]]).union_all(
    ///         n.select(vec![n.c("n") + literal(1)])
    ///             .where_clause(n.c("n").lt(literal(100))),
    ///     )
    /// });
    /// let (sql, params) = upto.select(vec![]).with(vec![upto]).build().unwrap();
    ///
    /// assert!(sql.starts_with(r#"WITH RECURSIVE "a" ("n") AS (VALUES (%s) UNION ALL"#));
    /// assert_eq!(params.len(), 3);
    /// ```
    #[must_use]
    pub fn recursive<I, S, F, Q>(columns: I, build: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce(&Self) -> Q,
        Q: Into<Query>,
    {
        let mut with = Self {
            id: NodeId::next(),
            columns: columns.into_iter().map(Into::into).collect(),
            query: None,
            recursive: true,
        };
        with.query = Some(Box::new(build(&with).into()));
        with
    }

    /// Replaces the backing query.
    pub fn set_query(&mut self, query: impl Into<Query>) {
        self.query = Some(Box::new(query.into()));
    }

    /// The identity used for aliasing.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The explicit column names.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Whether the expression is recursive.
    #[must_use]
    pub const fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Writes `"alias"[ ("c1", ...)] AS (query)`.
    fn render_statement(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        let Some(query) = &self.query else {
            return Err(SqlError::invalid("query", self.id.get()));
        };
        let alias = w.aliases().get(self.id);
        w.push_ident(&alias);
        if !self.columns.is_empty() {
            w.push(" (");
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                w.push_ident(column);
            }
            w.push(")");
        }
        w.push(" AS (");
        query.render(w)?;
        w.push(")");
        Ok(())
    }
}

/// Writes `WITH[ RECURSIVE] ... ` (trailing space included) when `with`
/// is not empty.
pub(super) fn render_with_clause(with: &[With], w: &mut SqlWriter<'_>) -> Result<()> {
    if with.is_empty() {
        return Ok(());
    }
    w.push("WITH ");
    if with.iter().any(With::is_recursive) {
        w.push("RECURSIVE ");
    }
    for (i, cte) in with.iter().enumerate() {
        if i > 0 {
            w.push(", ");
        }
        cte.render_statement(w)?;
    }
    w.push(" ");
    Ok(())
}
