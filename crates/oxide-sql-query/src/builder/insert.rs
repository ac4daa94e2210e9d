//! INSERT statements and `ON CONFLICT` clauses.

use super::from::Table;
use super::select::Select;
use super::values::Values;
use super::with::{render_with_clause, With};
use super::render_returning;
use crate::error::{Result, SqlError};
use crate::expr::{Column, Expr};
use crate::render::{NodeId, Render, SqlWriter};

/// A column of the row proposed for insertion: `"EXCLUDED"."name"`.
#[must_use]
pub fn excluded(name: impl Into<String>) -> Expr {
    Expr::Column(Column::excluded(name))
}

/// Extracts the columns of `exprs`, all of which must belong to `table`.
pub(super) fn owned_columns(
    field: &'static str,
    table: NodeId,
    exprs: Vec<Expr>,
) -> Result<Vec<Column>> {
    exprs
        .into_iter()
        .map(|expr| match expr {
            Expr::Column(column) if column.belongs_to(table) => Ok(column),
            other => Err(SqlError::invalid(field, other)),
        })
        .collect()
}

/// Writes `"c1", "c2"` without table alias.
pub(super) fn render_column_names(columns: &[Column], w: &mut SqlWriter<'_>) {
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            w.push(", ");
        }
        w.push_ident(column.name());
    }
}

#[derive(Debug, Clone)]
enum Source {
    Default,
    Values(Values),
    Select(Box<Select>),
}

/// `INSERT INTO table[ (columns)] {VALUES ...|SELECT ...|DEFAULT VALUES}`
///
/// The target table is aliased only when `RETURNING` or `ON CONFLICT` is
/// present.
#[derive(Debug, Clone)]
pub struct Insert {
    table: Table,
    columns: Vec<Column>,
    source: Source,
    on_conflict: Option<Conflict>,
    returning: Vec<Expr>,
    with: Vec<With>,
}

impl Insert {
    /// Creates `INSERT INTO table DEFAULT VALUES`.
    #[must_use]
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            columns: Vec::new(),
            source: Source::Default,
            on_conflict: None,
            returning: Vec::new(),
            with: Vec::new(),
        }
    }

    /// Sets the target columns.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Invalid`] (`"columns"`) if an expression is not a
    /// column of the target table.
    pub fn columns(mut self, columns: Vec<Expr>) -> Result<Self> {
        self.columns = owned_columns("columns", self.table.id(), columns)?;
        Ok(self)
    }

    /// Inserts literal rows.
    #[must_use]
    pub fn values(mut self, rows: Vec<Vec<Expr>>) -> Self {
        self.source = Source::Values(Values::new(rows));
        self
    }

    /// Inserts the rows of a query.
    #[must_use]
    pub fn query(mut self, select: Select) -> Self {
        self.source = Source::Select(Box::new(select));
        self
    }

    /// Adds an `ON CONFLICT` clause.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Invalid`] (`"on_conflict"`) if the clause targets
    /// another table.
    pub fn on_conflict(mut self, conflict: Conflict) -> Result<Self> {
        if conflict.table != self.table.id() {
            return Err(SqlError::invalid("on_conflict", conflict.table.get()));
        }
        self.on_conflict = Some(conflict);
        Ok(self)
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

    /// The target table.
    #[must_use]
    pub const fn table(&self) -> &Table {
        &self.table
    }
}

impl Render for Insert {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        let _scope = w.aliases().enter();

        let mut source = w.fork();
        match &self.source {
            Source::Default => source.push(" DEFAULT VALUES"),
            Source::Values(values) => {
                source.push(" ");
                values.render(&mut source)?;
            }
            Source::Select(select) => {
                source.push(" ");
                select.render(&mut source)?;
            }
        }

        let mut conflict = w.fork();
        if let Some(clause) = &self.on_conflict {
            conflict.push(" ");
            clause.render(&mut conflict)?;
        }

        let mut returning = w.fork();
        render_returning(&self.returning, &mut returning)?;

        let mut table = w.fork();
        self.table.render(&mut table)?;
        if !conflict.is_empty() || !returning.is_empty() {
            table.push(" AS ");
            table.push_ident(&w.aliases().get(self.table.id()));
        }

        render_with_clause(&self.with, w)?;
        w.push("INSERT INTO ");
        w.append(table);
        if !self.columns.is_empty() {
            w.push(" (");
            render_column_names(&self.columns, w);
            w.push(")");
        }
        w.append(source);
        w.append(conflict);
        w.append(returning);
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum ConflictValues {
    Row(Values),
    Select(Box<Select>),
}

#[derive(Debug, Clone)]
struct DoUpdate {
    columns: Vec<Column>,
    values: ConflictValues,
    filter: Option<Expr>,
}

/// `ON CONFLICT[ (indexed)[ WHERE cond]] DO {NOTHING|UPDATE SET ...}`
///
/// Without an update the clause does nothing.
#[derive(Debug, Clone)]
pub struct Conflict {
    table: NodeId,
    indexed_columns: Vec<Column>,
    index_where: Option<Expr>,
    update: Option<DoUpdate>,
}

impl Conflict {
    /// Creates `ON CONFLICT DO NOTHING` for `table`.
    #[must_use]
    pub const fn new(table: &Table) -> Self {
        Self {
            table: table.id(),
            indexed_columns: Vec::new(),
            index_where: None,
            update: None,
        }
    }

    /// Sets the conflict target columns.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Invalid`] (`"indexed_columns"`) for expressions
    /// that are not columns of the table.
    pub fn indexed_columns(mut self, columns: Vec<Expr>) -> Result<Self> {
        self.indexed_columns = owned_columns("indexed_columns", self.table, columns)?;
        Ok(self)
    }

    /// Restricts the conflict target to a partial index.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Invalid`] (`"index_where"`) when no indexed
    /// column is set.
    pub fn index_where(mut self, cond: impl Into<Expr>) -> Result<Self> {
        let cond = cond.into();
        if self.indexed_columns.is_empty() {
            return Err(SqlError::invalid("index_where", cond));
        }
        self.index_where = Some(cond);
        Ok(self)
    }

    /// `DO UPDATE SET columns = (values)`
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Invalid`] for columns of another table
    /// (`"columns"`) or a value count that differs from the column count
    /// (`"values"`).
    pub fn update(mut self, columns: Vec<Expr>, values: Vec<Expr>) -> Result<Self> {
        let columns = owned_columns("columns", self.table, columns)?;
        if columns.is_empty() || values.len() != columns.len() {
            return Err(SqlError::invalid("values", values));
        }
        self.update = Some(DoUpdate {
            columns,
            values: ConflictValues::Row(Values::new(vec![values])),
            filter: None,
        });
        Ok(self)
    }

    /// `DO UPDATE SET columns = (SELECT ...)`
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Invalid`] (`"columns"`) for an empty list or
    /// columns of another table.
    pub fn update_from(mut self, columns: Vec<Expr>, select: Select) -> Result<Self> {
        let columns = owned_columns("columns", self.table, columns)?;
        if columns.is_empty() {
            return Err(SqlError::invalid("columns", columns));
        }
        self.update = Some(DoUpdate {
            columns,
            values: ConflictValues::Select(Box::new(select)),
            filter: None,
        });
        Ok(self)
    }

    /// Filters the rows to update.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Invalid`] (`"where"`) unless an update was set.
    pub fn where_clause(mut self, cond: impl Into<Expr>) -> Result<Self> {
        let cond = cond.into();
        match &mut self.update {
            Some(update) => update.filter = Some(cond),
            None => return Err(SqlError::invalid("where", cond)),
        }
        Ok(self)
    }
}

impl Render for Conflict {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push("ON CONFLICT");
        if !self.indexed_columns.is_empty() {
            w.push(" (");
            render_column_names(&self.indexed_columns, w);
            w.push(")");
            if let Some(cond) = &self.index_where {
                w.push(" WHERE ");
                cond.render(w)?;
            }
        }
        let Some(update) = &self.update else {
            w.push(" DO NOTHING");
            return Ok(());
        };
        w.push(" DO UPDATE SET ");
        // A single column takes no row constructor.
        if update.columns.len() == 1 {
            render_column_names(&update.columns, w);
        } else {
            w.push("(");
            render_column_names(&update.columns, w);
            w.push(")");
        }
        w.push(" = ");
        match &update.values {
            ConflictValues::Row(values) => values.render_rows(w)?,
            ConflictValues::Select(select) => {
                w.push("(");
                select.render(w)?;
                w.push(")");
            }
        }
        if let Some(cond) = &update.filter {
            w.push(" WHERE ");
            cond.render(w)?;
        }
        Ok(())
    }
}
