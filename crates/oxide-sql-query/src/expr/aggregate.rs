//! Aggregate functions.
//!
//! `NAME([DISTINCT ]expr[ ORDER BY ...])[ WITHIN GROUP (ORDER BY ...)]`
//! `[ FILTER (WHERE cond)][ OVER ...]`
//!
//! Flavors without the `FILTER` clause get the condition folded into the
//! argument instead: `AVG(CASE WHEN cond THEN expr END)`.

use super::conditionals::Case;
use super::window::Window;
use super::{literal, Expr};
use crate::builder::value::SqlValue;
use crate::error::Result;
use crate::render::{Render, SqlWriter};

/// An aggregate call.
#[derive(Debug, Clone)]
pub struct Aggregate {
    name: &'static str,
    expr: Box<Expr>,
    distinct: bool,
    order_by: Vec<Expr>,
    within: Vec<Expr>,
    filter: Option<Box<Expr>>,
    window: Option<Window>,
}

impl Aggregate {
    /// Creates `name(expr)`.
    #[must_use]
    pub fn new(name: &'static str, expr: impl Into<Expr>) -> Self {
        Self {
            name,
            expr: Box::new(expr.into()),
            distinct: false,
            order_by: Vec::new(),
            within: Vec::new(),
            filter: None,
            window: None,
        }
    }

    /// Adds `DISTINCT`.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Sets the ordering of the aggregated rows.
    #[must_use]
    pub fn order_by(mut self, keys: Vec<Expr>) -> Self {
        self.order_by = keys;
        self
    }

    /// Sets the `WITHIN GROUP (ORDER BY ...)` keys.
    #[must_use]
    pub fn within(mut self, keys: Vec<Expr>) -> Self {
        self.within = keys;
        self
    }

    /// Restricts the aggregated rows.
    #[must_use]
    pub fn filter(mut self, cond: impl Into<Expr>) -> Self {
        self.filter = Some(Box::new(cond.into()));
        self
    }

    /// Evaluates the aggregate over a window.
    #[must_use]
    pub fn over(mut self, window: &Window) -> Self {
        self.window = Some(window.clone());
        self
    }

    /// The SQL name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The window, if any.
    #[must_use]
    pub const fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    fn is_count_all(&self) -> bool {
        self.name == "COUNT"
            && matches!(&*self.expr, Expr::Literal(SqlValue::Text(s)) if s == "*")
    }

    fn render_argument(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        match &self.filter {
            Some(cond) if !w.flavor().filter() => {
                let result = if self.is_count_all() {
                    literal(1)
                } else {
                    (*self.expr).clone()
                };
                Expr::Case(Case::new().when((**cond).clone(), result)).render(w)
            }
            _ => self.expr.render(w),
        }
    }
}

impl Render for Aggregate {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push(self.name);
        w.push("(");
        if self.distinct {
            w.push("DISTINCT ");
        }
        self.render_argument(w)?;
        if !self.order_by.is_empty() {
            w.push(" ORDER BY ");
            w.push_list(&self.order_by, ", ")?;
        }
        w.push(")");

        if !self.within.is_empty() {
            w.push(" WITHIN GROUP (ORDER BY ");
            w.push_list(&self.within, ", ")?;
            w.push(")");
        }
        if let Some(cond) = &self.filter {
            if w.flavor().filter() {
                w.push(" FILTER (WHERE ");
                cond.render(w)?;
                w.push(")");
            }
        }
        if let Some(window) = &self.window {
            window.render_over(w)?;
        }
        Ok(())
    }
}

macro_rules! aggregates {
    ($($(#[$doc:meta])* $fn:ident => $sql:literal;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $fn(expr: impl Into<Expr>) -> Aggregate {
                Aggregate::new($sql, expr)
            }
        )+
    };
}

aggregates! {
    /// `AVG(x)`
    avg => "AVG";
    /// `BIT_AND(x)`
    bit_and => "BIT_AND";
    /// `BIT_OR(x)`
    bit_or => "BIT_OR";
    /// `BOOL_AND(x)`
    bool_and => "BOOL_AND";
    /// `BOOL_OR(x)`
    bool_or => "BOOL_OR";
    /// `COUNT(x)`
    count => "COUNT";
    /// `EVERY(x)`
    every => "EVERY";
    /// `MAX(x)`
    max => "MAX";
    /// `MIN(x)`
    min => "MIN";
    /// `STDDEV(x)`
    stddev => "STDDEV";
    /// `SUM(x)`
    sum => "SUM";
    /// `VARIANCE(x)`
    variance => "VARIANCE";
}

/// `COUNT('*')`, the star bound as a literal.
#[must_use]
pub fn count_all() -> Aggregate {
    Aggregate::new("COUNT", literal("*"))
}
