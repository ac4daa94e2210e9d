//! MERGE statements.

use super::from::{FromItem, Table};
use super::insert::render_column_names;
use super::values::Values;
use super::with::{render_with_clause, With};
use crate::error::{Result, SqlError};
use crate::expr::{Column, Expr};
use crate::render::{NodeId, Render, SqlWriter};

fn columns_of(exprs: Vec<Expr>) -> Result<Vec<Column>> {
    exprs
        .into_iter()
        .map(|expr| match expr {
            Expr::Column(column) => Ok(column),
            other => Err(SqlError::invalid("columns", other)),
        })
        .collect()
}

#[derive(Debug, Clone)]
enum Action {
    Nothing,
    Update {
        columns: Vec<Column>,
        values: Vec<Expr>,
    },
    Delete,
    Insert {
        columns: Vec<Column>,
        values: Option<Values>,
    },
}

/// `WHEN [NOT ]MATCHED[ AND cond] THEN action`
#[derive(Debug, Clone)]
pub struct When {
    matched: bool,
    condition: Option<Expr>,
    action: Action,
}

impl When {
    /// `WHEN MATCHED THEN DO NOTHING`
    #[must_use]
    pub const fn matched() -> Self {
        Self {
            matched: true,
            condition: None,
            action: Action::Nothing,
        }
    }

    /// `WHEN NOT MATCHED THEN DO NOTHING`
    #[must_use]
    pub const fn not_matched() -> Self {
        Self {
            matched: false,
            condition: None,
            action: Action::Nothing,
        }
    }

    /// `WHEN MATCHED THEN UPDATE SET c = v, ...`
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Invalid`] for non-column targets (`"columns"`) or
    /// mismatched lengths (`"values"`).
    pub fn matched_update(columns: Vec<Expr>, values: Vec<Expr>) -> Result<Self> {
        let columns = columns_of(columns)?;
        if values.len() != columns.len() {
            return Err(SqlError::invalid("values", values));
        }
        Ok(Self {
            matched: true,
            condition: None,
            action: Action::Update { columns, values },
        })
    }

    /// `WHEN MATCHED THEN DELETE`
    #[must_use]
    pub const fn matched_delete() -> Self {
        Self {
            matched: true,
            condition: None,
            action: Action::Delete,
        }
    }

    /// `WHEN NOT MATCHED THEN INSERT (columns) {VALUES (row)|DEFAULT VALUES}`
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Invalid`] for non-column targets (`"columns"`) or
    /// a row whose length differs from the column count (`"values"`).
    pub fn not_matched_insert(columns: Vec<Expr>, row: Option<Vec<Expr>>) -> Result<Self> {
        let columns = columns_of(columns)?;
        if let Some(row) = &row {
            if row.len() != columns.len() {
                return Err(SqlError::invalid("values", row));
            }
        }
        Ok(Self {
            matched: false,
            condition: None,
            action: Action::Insert {
                columns,
                values: row.map(|row| Values::new(vec![row])),
            },
        })
    }

    /// Adds an extra condition.
    #[must_use]
    pub fn and(mut self, cond: impl Into<Expr>) -> Self {
        self.condition = Some(cond.into());
        self
    }
}

impl Render for When {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push(if self.matched { "WHEN MATCHED" } else { "WHEN NOT MATCHED" });
        if let Some(cond) = &self.condition {
            w.push(" AND ");
            cond.render(w)?;
        }
        w.push(" THEN ");
        match &self.action {
            Action::Nothing => w.push("DO NOTHING"),
            Action::Delete => w.push("DELETE"),
            Action::Update { columns, values } => {
                w.push("UPDATE SET ");
                for (i, (column, value)) in columns.iter().zip(values).enumerate() {
                    if i > 0 {
                        w.push(", ");
                    }
                    render_column_names(std::slice::from_ref(column), w);
                    w.push(" = ");
                    value.render(w)?;
                }
            }
            Action::Insert { columns, values } => {
                w.push("INSERT (");
                render_column_names(columns, w);
                w.push(")");
                match values {
                    Some(values) => {
                        w.push(" ");
                        values.render(w)?;
                    }
                    None => w.push(" DEFAULT VALUES"),
                }
            }
        }
        Ok(())
    }
}

/// `MERGE INTO target AS "a" USING source AS "b" ON cond WHEN ...`
#[derive(Debug, Clone)]
pub struct Merge {
    target: Table,
    source: FromItem,
    source_id: NodeId,
    condition: Expr,
    whens: Vec<When>,
    with: Vec<With>,
}

impl Merge {
    /// Merges `source` into `target` on `condition`.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Invalid`] (`"source"`) unless the source is a
    /// table, a query or a `VALUES` list.
    pub fn new(
        target: &Table,
        source: impl Into<FromItem>,
        condition: impl Into<Expr>,
    ) -> Result<Self> {
        let source = source.into();
        let source_id = match &source {
            FromItem::Table(t) => t.id(),
            FromItem::Select(s) => s.id(),
            FromItem::Combining(q) => q.id(),
            FromItem::Values(v) => v.id(),
            other => return Err(SqlError::invalid("source", other)),
        };
        Ok(Self {
            target: target.clone(),
            source,
            source_id,
            condition: condition.into(),
            whens: Vec::new(),
            with: Vec::new(),
        })
    }

    /// Appends a `WHEN` clause.
    #[must_use]
    pub fn when(mut self, when: When) -> Self {
        self.whens.push(when);
        self
    }

    /// Attaches common table expressions.
    #[must_use]
    pub fn with(mut self, with: Vec<With>) -> Self {
        self.with = with;
        self
    }
}

impl Render for Merge {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        let _scope = w.aliases().enter();

        let mut source = w.fork();
        self.source.render_body(&mut source)?;

        let mut condition = w.fork();
        self.condition.render(&mut condition)?;

        let mut whens = w.fork();
        for when in &self.whens {
            whens.push(" ");
            when.render(&mut whens)?;
        }

        render_with_clause(&self.with, w)?;
        w.push("MERGE INTO ");
        self.target.render(w)?;
        w.push(" AS ");
        w.push_ident(&w.aliases().get(self.target.id()));
        w.push(" USING ");
        w.append(source);
        w.push(" AS ");
        w.push_ident(&w.aliases().get(self.source_id));
        w.push(" ON ");
        w.append(condition);
        w.append(whens);
        Ok(())
    }
}
