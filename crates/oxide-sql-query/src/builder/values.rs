//! `VALUES` lists.

use crate::error::Result;
use crate::expr::Expr;
use crate::render::{NodeId, Render, SqlWriter};

/// `VALUES (a, b), (c, d)`, usable as a statement, a from-item, or a set
/// operand.
#[derive(Debug, Clone)]
pub struct Values {
    id: NodeId,
    rows: Vec<Vec<Expr>>,
}

impl Values {
    /// Creates a list of rows.
    #[must_use]
    pub fn new(rows: Vec<Vec<Expr>>) -> Self {
        Self {
            id: NodeId::next(),
            rows,
        }
    }

    /// The identity used for aliasing.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Expr>] {
        &self.rows
    }

    /// Writes the rows without the `VALUES` keyword.
    pub(crate) fn render_rows(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push("(");
            w.push_list(row, ", ")?;
            w.push(")");
        }
        Ok(())
    }
}

impl Render for Values {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push("VALUES ");
        self.render_rows(w)
    }
}
