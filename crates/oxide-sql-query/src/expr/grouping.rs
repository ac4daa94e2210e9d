//! `GROUPING SETS`, `ROLLUP` and `CUBE`.

use super::Expr;
use crate::error::Result;
use crate::render::{Render, SqlWriter};

/// `GROUPING SETS ((a, b), (c))`
#[derive(Debug, Clone)]
pub struct Grouping {
    sets: Vec<Vec<Expr>>,
}

impl Grouping {
    /// Creates a `GROUPING SETS` from column sets.
    #[must_use]
    pub const fn new(sets: Vec<Vec<Expr>>) -> Self {
        Self { sets }
    }
}

impl Render for Grouping {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push("GROUPING SETS (");
        for (i, set) in self.sets.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push("(");
            w.push_list(set, ", ")?;
            w.push(")");
        }
        w.push(")");
        Ok(())
    }
}

/// `ROLLUP` or `CUBE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollupKind {
    /// `ROLLUP`
    Rollup,
    /// `CUBE`
    Cube,
}

/// `ROLLUP (a, (b, c))`; a composite element is an [`Expr::List`].
#[derive(Debug, Clone)]
pub struct Rollup {
    kind: RollupKind,
    items: Vec<Expr>,
}

impl Rollup {
    /// `ROLLUP (items...)`
    #[must_use]
    pub const fn rollup(items: Vec<Expr>) -> Self {
        Self {
            kind: RollupKind::Rollup,
            items,
        }
    }

    /// `CUBE (items...)`
    #[must_use]
    pub const fn cube(items: Vec<Expr>) -> Self {
        Self {
            kind: RollupKind::Cube,
            items,
        }
    }
}

impl Render for Rollup {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push(match self.kind {
            RollupKind::Rollup => "ROLLUP (",
            RollupKind::Cube => "CUBE (",
        });
        w.push_list(&self.items, ", ")?;
        w.push(")");
        Ok(())
    }
}
