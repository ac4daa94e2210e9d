//! SELECT statements.

use std::collections::HashSet;
use std::str::FromStr;

use tracing::trace;

use super::from::{FromItem, Table};
use super::with::{render_with_clause, With};
use super::{render_columns, render_limit_offset, render_order_by};
use crate::error::{Result, SqlError};
use crate::expr::{Column, Expr, Window};
use crate::flavor::LimitStyle;
use crate::render::{NodeId, Render, SqlWriter};

/// Lock strength of a locking clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    /// `FOR UPDATE`
    Update,
    /// `FOR SHARE`
    Share,
}

impl FromStr for LockKind {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "UPDATE" => Ok(Self::Update),
            "SHARE" => Ok(Self::Share),
            _ => Err(SqlError::invalid("lock", s)),
        }
    }
}

/// `FOR UPDATE|SHARE[ OF "t1", "t2"][ NOWAIT]`
#[derive(Debug, Clone)]
pub struct For {
    kind: LockKind,
    tables: Vec<Table>,
    nowait: bool,
}

impl For {
    /// Creates a locking clause.
    #[must_use]
    pub const fn new(kind: LockKind) -> Self {
        Self {
            kind,
            tables: Vec::new(),
            nowait: false,
        }
    }

    /// Restricts the lock to some tables.
    #[must_use]
    pub fn of(mut self, tables: &[&Table]) -> Self {
        self.tables = tables.iter().map(|&t| t.clone()).collect();
        self
    }

    /// Adds `NOWAIT`.
    #[must_use]
    pub const fn nowait(mut self) -> Self {
        self.nowait = true;
        self
    }
}

impl Render for For {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push(match self.kind {
            LockKind::Update => "FOR UPDATE",
            LockKind::Share => "FOR SHARE",
        });
        if !self.tables.is_empty() {
            w.push(" OF ");
            w.push_list(&self.tables, ", ")?;
        }
        if self.nowait {
            w.push(" NOWAIT");
        }
        Ok(())
    }
}

/// A SELECT statement.
///
/// Built by chaining; every method consumes and returns the statement.
#[derive(Debug, Clone)]
pub struct Select {
    id: NodeId,
    columns: Vec<Expr>,
    from: Vec<FromItem>,
    where_clause: Option<Expr>,
    group_by: Vec<Expr>,
    having: Option<Expr>,
    order_by: Vec<Expr>,
    limit: Option<i64>,
    offset: Option<i64>,
    distinct: bool,
    distinct_on: Vec<Expr>,
    windows: Vec<Window>,
    locks: Vec<For>,
    with: Vec<With>,
}

impl Select {
    /// Creates `SELECT columns`; an empty list selects `*`.
    #[must_use]
    pub fn new(columns: Vec<Expr>) -> Self {
        Self {
            id: NodeId::next(),
            columns,
            from: Vec::new(),
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            distinct: false,
            distinct_on: Vec::new(),
            windows: Vec::new(),
            locks: Vec::new(),
            with: Vec::new(),
        }
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

    /// Sets the GROUP BY expressions.
    #[must_use]
    pub fn group_by(mut self, exprs: Vec<Expr>) -> Self {
        self.group_by = exprs;
        self
    }

    /// Sets the HAVING condition.
    #[must_use]
    pub fn having(mut self, cond: impl Into<Expr>) -> Self {
        self.having = Some(cond.into());
        self
    }

    /// Sets the ORDER BY keys.
    #[must_use]
    pub fn order_by(mut self, keys: Vec<Expr>) -> Self {
        self.order_by = keys;
        self
    }

    /// Sets or clears the LIMIT.
    #[must_use]
    pub const fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    /// Sets or clears the OFFSET.
    #[must_use]
    pub const fn offset(mut self, offset: Option<i64>) -> Self {
        self.offset = offset;
        self
    }

    /// Adds `DISTINCT`.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds `DISTINCT ON (exprs)`.
    #[must_use]
    pub fn distinct_on(mut self, exprs: Vec<Expr>) -> Self {
        self.distinct = true;
        self.distinct_on = exprs;
        self
    }

    /// Registers a named window.
    #[must_use]
    pub fn window(mut self, window: &Window) -> Self {
        self.windows.push(window.clone());
        self
    }

    /// Adds a locking clause.
    #[must_use]
    pub fn lock(mut self, lock: For) -> Self {
        self.locks.push(lock);
        self
    }

    /// Attaches common table expressions.
    #[must_use]
    pub fn with(mut self, with: Vec<With>) -> Self {
        self.with = with;
        self
    }

    /// The identity used for aliasing.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The selected columns.
    #[must_use]
    pub fn columns(&self) -> &[Expr] {
        &self.columns
    }

    /// The LIMIT.
    #[must_use]
    pub const fn get_limit(&self) -> Option<i64> {
        self.limit
    }

    /// The OFFSET.
    #[must_use]
    pub const fn get_offset(&self) -> Option<i64> {
        self.offset
    }

    /// Explicit windows first, then those referenced by the columns, each
    /// once.
    fn all_windows(&self) -> Vec<&Window> {
        let mut seen = HashSet::new();
        let referenced = self.columns.iter().filter_map(|column| {
            let expr = match column {
                Expr::As { expr, .. } => expr,
                other => other,
            };
            match expr {
                Expr::Aggregate(a) => a.window(),
                Expr::WindowFunction(f) => Some(f.window()),
                _ => None,
            }
        });
        self.windows
            .iter()
            .chain(referenced)
            .filter(|window| seen.insert(window.id()))
            .collect()
    }

    /// Rewrites LIMIT/OFFSET into nested `ROWNUM` filters.
    ///
    /// The rewrite works on a copy: the statement itself is left untouched.
    fn rownum_rewrite(&self) -> Self {
        let aliases: Vec<&str> = self.columns.iter().filter_map(Expr::output_name).collect();
        let all_named = !self.columns.is_empty() && aliases.len() == self.columns.len();
        let project = |owner: NodeId| -> Vec<Expr> {
            if all_named {
                aliases
                    .iter()
                    .map(|name| Expr::Column(Column::new(owner, *name)))
                    .collect()
            } else {
                vec![Expr::Column(Column::new(owner, "*"))]
            }
        };

        let mut inner = self.clone();
        inner.limit = None;
        inner.offset = None;
        let locks = std::mem::take(&mut inner.locks);

        let mut limited = Self::new(project(inner.id)).from(inner);
        if let Some(limit) = self.limit {
            let max_row = limit.saturating_add(self.offset.unwrap_or(0));
            limited = limited.where_clause(Expr::Rownum.le(max_row));
        }

        let mut query = match self.offset {
            Some(offset) => {
                let rnum = Expr::Rownum.as_("rnum");
                limited.columns.push(rnum.clone());
                Self::new(project(limited.id))
                    .from(limited)
                    .where_clause(rnum.gt(offset))
            }
            None => limited,
        };
        query.locks = locks;
        trace!(select = self.id.get(), "rewrote pagination with ROWNUM");
        query
    }
}

impl Render for Select {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        if w.flavor().limit_style() == LimitStyle::Rownum
            && (self.limit.is_some() || self.offset.is_some())
        {
            return self.rownum_rewrite().render(w);
        }

        let _scope = w.aliases().enter();

        // Clauses are rendered in alias-allocation order and assembled in
        // text order below.
        let mut from = w.fork();
        if !self.from.is_empty() {
            from.push(" FROM ");
            from.push_list(&self.from, ", ")?;
        }

        let mut window = w.fork();
        for (i, def) in self.all_windows().into_iter().enumerate() {
            window.push(if i == 0 { " WINDOW " } else { ", " });
            let alias = w.aliases().get(def.id());
            window.push_ident(&alias);
            window.push(" AS (");
            def.render(&mut window)?;
            window.push(")");
        }

        let mut distinct = w.fork();
        if self.distinct {
            distinct.push("DISTINCT ");
            if !self.distinct_on.is_empty() {
                distinct.push("ON (");
                distinct.push_list(&self.distinct_on, ", ")?;
                distinct.push(") ");
            }
        }

        let mut columns = w.fork();
        if self.columns.is_empty() {
            columns.push("*");
        } else {
            render_columns(&self.columns, &mut columns)?;
        }

        let mut filter = w.fork();
        if let Some(cond) = &self.where_clause {
            filter.push(" WHERE ");
            cond.render(&mut filter)?;
        }

        let mut group_by = w.fork();
        if !self.group_by.is_empty() {
            group_by.push(" GROUP BY ");
            group_by.push_list(&self.group_by, ", ")?;
        }

        let mut having = w.fork();
        if let Some(cond) = &self.having {
            having.push(" HAVING ");
            cond.render(&mut having)?;
        }

        let mut locks = w.fork();
        for lock in &self.locks {
            locks.push(" ");
            lock.render(&mut locks)?;
        }

        render_with_clause(&self.with, w)?;
        w.push("SELECT ");
        w.append(distinct);
        w.append(columns);
        w.append(from);
        w.append(filter);
        w.append(group_by);
        w.append(having);
        w.append(window);
        render_order_by(&self.order_by, w)?;
        render_limit_offset(self.limit, self.offset, w);
        w.append(locks);
        Ok(())
    }
}
