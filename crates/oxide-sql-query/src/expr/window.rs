//! Window definitions and window functions.
//!
//! A [`Window`] is referenced by the calls that use it. When the enclosing
//! SELECT names the window (`WINDOW "b" AS (...)`), calls render
//! `OVER "b"`; otherwise they inline the definition as `OVER (...)`.

use std::str::FromStr;

use super::functions::Function;
use super::Expr;
use crate::builder::value::SqlValue;
use crate::error::{Result, SqlError};
use crate::render::{NodeId, Render, SqlWriter};

/// Frame unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// `RANGE`
    Range,
    /// `ROWS`
    Rows,
    /// `GROUPS`
    Groups,
}

impl Frame {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Range => "RANGE",
            Self::Rows => "ROWS",
            Self::Groups => "GROUPS",
        }
    }
}

impl FromStr for Frame {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RANGE" => Ok(Self::Range),
            "ROWS" => Ok(Self::Rows),
            "GROUPS" => Ok(Self::Groups),
            _ => Err(SqlError::invalid("frame", s)),
        }
    }
}

/// Frame exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameExclude {
    /// `EXCLUDE CURRENT ROW`
    CurrentRow,
    /// `EXCLUDE GROUP`
    Group,
    /// `EXCLUDE TIES`
    Ties,
}

impl FrameExclude {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentRow => "CURRENT ROW",
            Self::Group => "GROUP",
            Self::Ties => "TIES",
        }
    }
}

impl FromStr for FrameExclude {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CURRENT ROW" => Ok(Self::CurrentRow),
            "GROUP" => Ok(Self::Group),
            "TIES" => Ok(Self::Ties),
            _ => Err(SqlError::invalid("exclude", s)),
        }
    }
}

/// A window definition.
///
/// Frame bounds: `None` is `UNBOUNDED`, `0` is `CURRENT ROW`, a negative
/// offset is `n PRECEDING` and a positive one `n FOLLOWING`. The start
/// defaults to unbounded and the end to the current row.
#[derive(Debug, Clone)]
pub struct Window {
    id: NodeId,
    partition: Vec<Expr>,
    order_by: Vec<Expr>,
    frame: Option<Frame>,
    start: Option<i64>,
    end: Option<i64>,
    exclude: Option<FrameExclude>,
}

impl Window {
    /// Creates a window partitioned by `partition`.
    #[must_use]
    pub fn new(partition: Vec<Expr>) -> Self {
        Self {
            id: NodeId::next(),
            partition,
            order_by: Vec::new(),
            frame: None,
            start: None,
            end: Some(0),
            exclude: None,
        }
    }

    /// Sets the `ORDER BY` keys.
    #[must_use]
    pub fn order_by(mut self, keys: Vec<Expr>) -> Self {
        self.order_by = keys;
        self
    }

    /// Sets the frame unit; bounds only render with a frame.
    #[must_use]
    pub const fn frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Sets the frame start.
    #[must_use]
    pub const fn start(mut self, start: Option<i64>) -> Self {
        self.start = start;
        self
    }

    /// Sets the frame end.
    #[must_use]
    pub const fn end(mut self, end: Option<i64>) -> Self {
        self.end = end;
        self
    }

    /// Sets the frame exclusion.
    #[must_use]
    pub const fn exclude(mut self, exclude: FrameExclude) -> Self {
        self.exclude = Some(exclude);
        self
    }

    /// The identity used for aliasing.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    fn render_bound(bound: Option<i64>, unbounded: &str, w: &mut SqlWriter<'_>) {
        match bound {
            None => {
                w.push("UNBOUNDED ");
                w.push(unbounded);
            }
            Some(0) => w.push("CURRENT ROW"),
            Some(offset) => {
                w.push_param(SqlValue::Int(offset.saturating_abs()));
                w.push(if offset < 0 { " PRECEDING" } else { " FOLLOWING" });
            }
        }
    }

    /// Writes `OVER "alias"` when the window is named in the current scope
    /// and `OVER (...)` otherwise.
    pub(crate) fn render_over(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        if w.aliases().contains(self.id) {
            w.push(" OVER ");
            let alias = w.aliases().get(self.id);
            w.push_ident(&alias);
            return Ok(());
        }
        w.push(" OVER (");
        self.render(w)?;
        w.push(")");
        Ok(())
    }
}

/// Renders the window body, without parentheses.
impl Render for Window {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        if !self.partition.is_empty() {
            w.push("PARTITION BY ");
            w.push_list(&self.partition, ", ")?;
        }
        if !self.order_by.is_empty() {
            w.push(" ORDER BY ");
            w.push_list(&self.order_by, ", ")?;
        }
        if let Some(frame) = self.frame {
            w.push(" ");
            w.push(frame.as_str());
            w.push(" BETWEEN ");
            Self::render_bound(self.start, "PRECEDING", w);
            w.push(" AND ");
            Self::render_bound(self.end, "FOLLOWING", w);
        }
        if let Some(exclude) = self.exclude {
            w.push(" EXCLUDE ");
            w.push(exclude.as_str());
        }
        Ok(())
    }
}

/// A window function call: `NAME(args)[ FILTER (WHERE f)] OVER ...`.
#[derive(Debug, Clone)]
pub struct WindowFunction {
    function: Function,
    filter: Option<Box<Expr>>,
    window: Window,
}

impl WindowFunction {
    /// Calls `function` over `window`.
    #[must_use]
    pub fn new(function: Function, window: &Window) -> Self {
        Self {
            function,
            filter: None,
            window: window.clone(),
        }
    }

    /// Adds `FILTER (WHERE cond)`.
    #[must_use]
    pub fn filter(mut self, cond: impl Into<Expr>) -> Self {
        self.filter = Some(Box::new(cond.into()));
        self
    }

    /// The window the call is evaluated over.
    #[must_use]
    pub const fn window(&self) -> &Window {
        &self.window
    }
}

impl Render for WindowFunction {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        self.function.render(w)?;
        if let Some(filter) = &self.filter {
            w.push(" FILTER (WHERE ");
            filter.render(w)?;
            w.push(")");
        }
        self.window.render_over(w)
    }
}

macro_rules! window_functions {
    ($($(#[$doc:meta])* $fn:ident => $sql:literal;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $fn(args: Vec<Expr>, window: &Window) -> WindowFunction {
                WindowFunction::new(Function::call($sql, args), window)
            }
        )+
    };
}

window_functions! {
    /// `ROW_NUMBER()`
    row_number => "ROW_NUMBER";
    /// `RANK()`
    rank => "RANK";
    /// `DENSE_RANK()`
    dense_rank => "DENSE_RANK";
    /// `PERCENT_RANK()`
    percent_rank => "PERCENT_RANK";
    /// `CUME_DIST()`
    cume_dist => "CUME_DIST";
    /// `NTILE(buckets)`
    ntile => "NTILE";
    /// `LAG(value[, offset[, default]])`
    lag => "LAG";
    /// `LEAD(value[, offset[, default]])`
    lead => "LEAD";
    /// `FIRST_VALUE(value)`
    first_value => "FIRST_VALUE";
    /// `LAST_VALUE(value)`
    last_value => "LAST_VALUE";
    /// `NTH_VALUE(value, n)`
    nth_value => "NTH_VALUE";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Table;
    use crate::flavor::Flavor;
    use crate::render::RenderContext;

    fn render_window(window: &Window) -> (String, Vec<SqlValue>) {
        window
            .to_sql_with(&RenderContext::new(Flavor::default()))
            .unwrap()
    }

    fn render(expr: impl Into<Expr>) -> (String, Vec<SqlValue>) {
        expr.into()
            .to_sql_with(&RenderContext::new(Flavor::default()))
            .unwrap()
    }

    #[test]
    fn test_window_partition() {
        let t = Table::new("t");
        let window = Window::new(vec![t.c("c1"), t.c("c2")]);
        assert_eq!(render_window(&window).0, r#"PARTITION BY "c1", "c2""#);
    }

    #[test]
    fn test_window_order_without_partition() {
        let t = Table::new("t");
        let window = Window::new(vec![]).order_by(vec![t.c("c")]);
        assert_eq!(render_window(&window).0, r#" ORDER BY "c""#);
    }

    #[test]
    fn test_window_frame_bounds() {
        let t = Table::new("t");
        let base = Window::new(vec![t.c("c")]).frame(Frame::Rows);

        let (sql, params) = render_window(&base);
        assert_eq!(
            sql,
            r#"PARTITION BY "c" ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW"#
        );
        assert!(params.is_empty());

        let (sql, params) = render_window(&base.clone().start(Some(-1)).end(Some(2)));
        assert_eq!(
            sql,
            r#"PARTITION BY "c" ROWS BETWEEN %s PRECEDING AND %s FOLLOWING"#
        );
        assert_eq!(params, vec![SqlValue::Int(1), SqlValue::Int(2)]);

        let (sql, _) = render_window(&base.clone().start(Some(0)).end(None));
        assert_eq!(
            sql,
            r#"PARTITION BY "c" ROWS BETWEEN CURRENT ROW AND UNBOUNDED FOLLOWING"#
        );
    }

    #[test]
    fn test_window_frame_groups_and_exclude() {
        let t = Table::new("t");
        let window = Window::new(vec![t.c("c")])
            .frame(Frame::Groups)
            .exclude(FrameExclude::Ties);
        assert_eq!(
            render_window(&window).0,
            r#"PARTITION BY "c" GROUPS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW EXCLUDE TIES"#
        );
    }

    #[test]
    fn test_frame_from_str() {
        assert_eq!("RANGE".parse::<Frame>().unwrap(), Frame::Range);
        assert!(matches!(
            "FOO".parse::<Frame>().unwrap_err(),
            SqlError::Invalid { field: "frame", .. }
        ));
        assert_eq!(
            "CURRENT ROW".parse::<FrameExclude>().unwrap(),
            FrameExclude::CurrentRow
        );
        assert!(matches!(
            "ROW".parse::<FrameExclude>().unwrap_err(),
            SqlError::Invalid { field: "exclude", .. }
        ));
    }

    #[test]
    fn test_window_function_inline() {
        let t = Table::new("t");
        let window = Window::new(vec![t.c("c1")]);
        assert_eq!(
            render(rank(vec![], &window)).0,
            r#"RANK() OVER (PARTITION BY "c1")"#
        );
        assert_eq!(render(row_number(vec![], &Window::new(vec![]))).0, "ROW_NUMBER() OVER ()");
    }

    #[test]
    fn test_window_function_filter() {
        let t = Table::new("t");
        let window = Window::new(vec![t.c("c1")]);
        let (sql, params) = render(rank(vec![], &window).filter(t.c("c1").gt(0)));
        assert_eq!(
            sql,
            r#"RANK() FILTER (WHERE ("c1" > %s)) OVER (PARTITION BY "c1")"#
        );
        assert_eq!(params, vec![SqlValue::Int(0)]);
    }

    #[test]
    fn test_window_function_args() {
        let t = Table::new("t");
        let window = Window::new(vec![]).order_by(vec![t.c("c2")]);
        let (sql, params) = render(lag(vec![t.c("c1"), Expr::from(1)], &window));
        assert_eq!(sql, r#"LAG("c1", %s) OVER ( ORDER BY "c2")"#);
        assert_eq!(params, vec![SqlValue::Int(1)]);
    }
}
