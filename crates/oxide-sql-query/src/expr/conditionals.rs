//! `CASE` and the conditional functions.

use super::Expr;
use crate::error::Result;
use crate::render::{Render, SqlWriter};

/// `CASE WHEN cond THEN result [...] [ELSE other ]END`
#[derive(Debug, Clone, Default)]
pub struct Case {
    whens: Vec<(Expr, Expr)>,
    otherwise: Option<Box<Expr>>,
}

impl Case {
    /// Creates an empty `CASE`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `WHEN cond THEN result` branch.
    #[must_use]
    pub fn when(mut self, cond: impl Into<Expr>, result: impl Into<Expr>) -> Self {
        self.whens.push((cond.into(), result.into()));
        self
    }

    /// Sets the `ELSE` branch.
    #[must_use]
    pub fn otherwise(mut self, result: impl Into<Expr>) -> Self {
        self.otherwise = Some(Box::new(result.into()));
        self
    }
}

impl Render for Case {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push("CASE ");
        for (cond, result) in &self.whens {
            w.push("WHEN ");
            cond.render(w)?;
            w.push(" THEN ");
            result.render(w)?;
            w.push(" ");
        }
        if let Some(otherwise) = &self.otherwise {
            w.push("ELSE ");
            otherwise.render(w)?;
            w.push(" ");
        }
        w.push("END");
        Ok(())
    }
}

/// Kinds of [`Conditional`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalKind {
    /// `COALESCE`
    Coalesce,
    /// `NULLIF`
    NullIf,
    /// `GREATEST`
    Greatest,
    /// `LEAST`
    Least,
}

impl ConditionalKind {
    /// Returns the SQL name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Coalesce => "COALESCE",
            Self::NullIf => "NULLIF",
            Self::Greatest => "GREATEST",
            Self::Least => "LEAST",
        }
    }
}

/// `NAME(a, b, ...)` for the conditional functions.
#[derive(Debug, Clone)]
pub struct Conditional {
    kind: ConditionalKind,
    args: Vec<Expr>,
}

impl Conditional {
    /// The conditional kind.
    #[must_use]
    pub const fn kind(&self) -> ConditionalKind {
        self.kind
    }
}

impl Render for Conditional {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push(self.kind.as_str());
        w.push("(");
        w.push_list(&self.args, ", ")?;
        w.push(")");
        Ok(())
    }
}

/// `COALESCE(args...)`
#[must_use]
pub fn coalesce(args: Vec<Expr>) -> Expr {
    Expr::Conditional(Conditional {
        kind: ConditionalKind::Coalesce,
        args,
    })
}

/// `NULLIF(a, b)`
#[must_use]
pub fn nullif(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    Expr::Conditional(Conditional {
        kind: ConditionalKind::NullIf,
        args: vec![a.into(), b.into()],
    })
}

/// `GREATEST(args...)`
#[must_use]
pub fn greatest(args: Vec<Expr>) -> Expr {
    Expr::Conditional(Conditional {
        kind: ConditionalKind::Greatest,
        args,
    })
}

/// `LEAST(args...)`
#[must_use]
pub fn least(args: Vec<Expr>) -> Expr {
    Expr::Conditional(Conditional {
        kind: ConditionalKind::Least,
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::value::SqlValue;
    use crate::builder::Table;
    use crate::flavor::Flavor;
    use crate::render::RenderContext;

    fn render(expr: &Expr) -> (String, Vec<SqlValue>) {
        expr.to_sql_with(&RenderContext::new(Flavor::default())).unwrap()
    }

    #[test]
    fn test_case() {
        let t = Table::new("t");
        let case = Case::new()
            .when(t.c("c1"), "foo")
            .when(t.c("c2"), "bar")
            .otherwise(t.c("c3"));
        let (sql, params) = render(&Expr::from(case));
        assert_eq!(
            sql,
            r#"CASE WHEN "c1" THEN %s WHEN "c2" THEN %s ELSE "c3" END"#
        );
        assert_eq!(
            params,
            vec![
                SqlValue::Text(String::from("foo")),
                SqlValue::Text(String::from("bar"))
            ]
        );
    }

    #[test]
    fn test_case_without_else() {
        let t = Table::new("t");
        let case = Case::new().when(t.c("c1").eq(1), t.c("c2"));
        let (sql, params) = render(&Expr::from(case));
        assert_eq!(sql, r#"CASE WHEN ("c1" = %s) THEN "c2" END"#);
        assert_eq!(params, vec![SqlValue::Int(1)]);
    }

    #[test]
    fn test_coalesce() {
        let t = Table::new("t");
        let (sql, params) = render(&coalesce(vec![t.c("c1"), t.c("c2"), Expr::from("foo")]));
        assert_eq!(sql, r#"COALESCE("c1", "c2", %s)"#);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_nullif() {
        let t = Table::new("t");
        let (sql, _) = render(&nullif(t.c("c1"), "foo"));
        assert_eq!(sql, r#"NULLIF("c1", %s)"#);
    }

    #[test]
    fn test_greatest_least() {
        let t = Table::new("t");
        assert_eq!(
            render(&greatest(vec![t.c("c1"), t.c("c2")])).0,
            r#"GREATEST("c1", "c2")"#
        );
        assert_eq!(
            render(&least(vec![t.c("c1"), t.c("c2")])).0,
            r#"LEAST("c1", "c2")"#
        );
    }
}
