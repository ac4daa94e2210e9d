//! Sort keys: `ASC`, `DESC`, `NULLS FIRST`, `NULLS LAST`.

use super::conditionals::Case;
use super::Expr;
use crate::error::Result;
use crate::render::{Render, SqlWriter};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
}

/// `expr ASC|DESC`
#[derive(Debug, Clone)]
pub struct Order {
    expr: Box<Expr>,
    direction: Direction,
}

impl Order {
    /// `expr ASC`
    #[must_use]
    pub fn asc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: Box::new(expr.into()),
            direction: Direction::Asc,
        }
    }

    /// `expr DESC`
    #[must_use]
    pub fn desc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: Box::new(expr.into()),
            direction: Direction::Desc,
        }
    }

    /// The sorted expression.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// The direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }
}

impl Render for Order {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        self.expr.render(w)?;
        w.push(match self.direction {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        });
        Ok(())
    }
}

/// Where NULLs sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    /// `NULLS FIRST`
    First,
    /// `NULLS LAST`
    Last,
}

/// `expr NULLS FIRST|LAST`
///
/// Flavors without native null ordering get a leading sort key instead:
/// `CASE WHEN (x IS NULL) THEN 0 ELSE 1 END ASC, x` for `NULLS FIRST`.
#[derive(Debug, Clone)]
pub struct NullOrder {
    expr: Box<Expr>,
    nulls: Nulls,
}

impl NullOrder {
    /// `expr NULLS FIRST`
    #[must_use]
    pub fn first(expr: impl Into<Expr>) -> Self {
        Self {
            expr: Box::new(expr.into()),
            nulls: Nulls::First,
        }
    }

    /// `expr NULLS LAST`
    #[must_use]
    pub fn last(expr: impl Into<Expr>) -> Self {
        Self {
            expr: Box::new(expr.into()),
            nulls: Nulls::Last,
        }
    }

    fn emulation_key(&self) -> Expr {
        let (when_null, otherwise) = match self.nulls {
            Nulls::First => (0, 1),
            Nulls::Last => (1, 0),
        };
        let tested = match &*self.expr {
            Expr::Order(order) => order.expr().clone(),
            other => other.clone(),
        };
        let case = Case::new()
            .when(tested.eq(super::NULL), when_null)
            .otherwise(otherwise);
        Expr::Case(case).asc()
    }
}

impl Render for NullOrder {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        if !w.flavor().null_ordering() {
            self.emulation_key().render(w)?;
            w.push(", ");
            return self.expr.render(w);
        }
        self.expr.render(w)?;
        w.push(match self.nulls {
            Nulls::First => " NULLS FIRST",
            Nulls::Last => " NULLS LAST",
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::value::SqlValue;
    use crate::builder::Table;
    use crate::expr::literal;
    use crate::flavor::Flavor;
    use crate::render::RenderContext;

    fn render_with(expr: &Expr, flavor: Flavor) -> (String, Vec<SqlValue>) {
        expr.to_sql_with(&RenderContext::new(flavor)).unwrap()
    }

    #[test]
    fn test_asc_desc() {
        let t = Table::new("t");
        assert_eq!(render_with(&t.c("c").asc(), Flavor::default()).0, r#""c" ASC"#);
        assert_eq!(render_with(&t.c("c").desc(), Flavor::default()).0, r#""c" DESC"#);
    }

    #[test]
    fn test_nulls_native() {
        let t = Table::new("t");
        assert_eq!(
            render_with(&t.c("c").nulls_first(), Flavor::default()).0,
            r#""c" NULLS FIRST"#
        );
        assert_eq!(
            render_with(&t.c("c").desc().nulls_last(), Flavor::default()).0,
            r#""c" DESC NULLS LAST"#
        );
    }

    #[test]
    fn test_nulls_emulated() {
        let t = Table::new("t");
        let flavor = Flavor::builder().null_ordering(false).build();

        let (sql, params) = render_with(&t.c("c").nulls_first(), flavor.clone());
        assert_eq!(
            sql,
            r#"CASE WHEN ("c" IS NULL) THEN %s ELSE %s END ASC, "c""#
        );
        assert_eq!(params, vec![SqlValue::Int(0), SqlValue::Int(1)]);

        let (sql, params) = render_with(&t.c("c").desc().nulls_last(), flavor);
        assert_eq!(
            sql,
            r#"CASE WHEN ("c" IS NULL) THEN %s ELSE %s END ASC, "c" DESC"#
        );
        assert_eq!(params, vec![SqlValue::Int(1), SqlValue::Int(0)]);
    }

    #[test]
    fn test_nulls_emulated_params_follow_text() {
        let flavor = Flavor::builder().null_ordering(false).build();
        let (_, params) = render_with(&literal(2).nulls_last(), flavor);
        assert_eq!(
            params,
            vec![
                SqlValue::Int(2),
                SqlValue::Int(1),
                SqlValue::Int(0),
                SqlValue::Int(2)
            ]
        );
    }
}
