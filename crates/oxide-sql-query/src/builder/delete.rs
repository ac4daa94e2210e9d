//! DELETE statements.
//!
//! The target table is never aliased: its columns render unqualified
//! throughout the statement, subqueries included.

use super::from::Table;
use super::with::{render_with_clause, With};
use super::render_returning;
use crate::error::Result;
use crate::expr::Expr;
use crate::render::{Render, SqlWriter};

/// `DELETE FROM[ ONLY] table[ WHERE ...][ RETURNING ...]`
#[derive(Debug, Clone)]
pub struct Delete {
    table: Table,
    only: bool,
    where_clause: Option<Expr>,
    returning: Vec<Expr>,
    with: Vec<With>,
}

impl Delete {
    /// Creates `DELETE FROM table`.
    #[must_use]
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            only: false,
            where_clause: None,
            returning: Vec::new(),
            with: Vec::new(),
        }
    }

    /// Excludes inheriting tables (`ONLY`).
    #[must_use]
    pub const fn only(mut self) -> Self {
        self.only = true;
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

impl Render for Delete {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        let _scope = w.aliases().enter_excluding([self.table.id()]);

        let mut filter = w.fork();
        if let Some(cond) = &self.where_clause {
            filter.push(" WHERE ");
            cond.render(&mut filter)?;
        }

        let mut returning = w.fork();
        render_returning(&self.returning, &mut returning)?;

        render_with_clause(&self.with, w)?;
        w.push(if self.only { "DELETE FROM ONLY " } else { "DELETE FROM " });
        self.table.render(w)?;
        w.append(filter);
        w.append(returning);
        Ok(())
    }
}
