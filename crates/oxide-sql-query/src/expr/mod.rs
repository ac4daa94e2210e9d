//! Expression trees.
//!
//! An [`Expr`] is anything that can appear where SQL expects a value:
//! columns, bind parameters, operators, function calls, aggregates,
//! subqueries. Trees are built with plain method calls and the standard
//! operator traits:
//!
//! ```rust
//! use oxide_sql_query::{Render, Table};
//!
//! let t = Table::new("t");
//! let cond = t.c("c1").eq(1) & !t.c("c2").like("foo%");
//! let (sql, params) = cond.build().unwrap();
//!
//! assert_eq!(
//!     sql,
//!     r#"(("c1" = %s) AND ("c2" NOT LIKE %s ESCAPE %s))"#
//! );
//! assert_eq!(params.len(), 3);
//! ```
//!
//! Rendered on its own, an expression has no alias scope and therefore
//! writes its columns unqualified. Inside a statement the same columns are
//! prefixed with their table alias.

pub mod aggregate;
pub mod conditionals;
pub mod functions;
pub mod grouping;
pub mod operators;
pub mod order;
pub mod window;

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub use aggregate::Aggregate;
pub use conditionals::{Case, Conditional};
pub use functions::{Function, FunctionSyntax};
pub use grouping::{Grouping, Rollup};
pub use operators::{Between, Binary, BinaryOp, Is, Like, Nary, NaryOp, Unary, UnaryOp};
pub use order::{NullOrder, Order};
pub use window::{Frame, FrameExclude, Window, WindowFunction};

use crate::builder::value::{SqlValue, ToSqlValue};
use crate::builder::Query;
use crate::error::{Result, SqlError};
use crate::render::{NodeId, Render, SqlWriter};

/// The SQL `NULL`, as a bind parameter.
///
/// Compared with `=` or `!=` it renders `IS NULL` / `IS NOT NULL`.
pub const NULL: Expr = Expr::Param(SqlValue::Null);

/// An extension point for expressions the crate does not model.
///
/// The default rendering fails with [`SqlError::NotImplemented`].
pub trait CustomExpr: fmt::Debug + Send + Sync {
    /// Name used in error messages.
    fn name(&self) -> &str;

    /// Writes the expression.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::NotImplemented`] unless overridden.
    fn render(&self, _w: &mut SqlWriter<'_>) -> Result<()> {
        Err(SqlError::NotImplemented(self.name().to_string()))
    }
}

/// Who a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnOwner {
    /// A table, subquery, CTE or other from-item.
    Item(NodeId),
    /// The `EXCLUDED` pseudo-table of `ON CONFLICT DO UPDATE`.
    Excluded,
}

/// A named column of a from-item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    owner: ColumnOwner,
    name: String,
}

impl Column {
    /// Creates a column owned by the from-item `owner`.
    #[must_use]
    pub fn new(owner: NodeId, name: impl Into<String>) -> Self {
        Self {
            owner: ColumnOwner::Item(owner),
            name: name.into(),
        }
    }

    /// Creates a column of the `EXCLUDED` pseudo-table.
    #[must_use]
    pub fn excluded(name: impl Into<String>) -> Self {
        Self {
            owner: ColumnOwner::Excluded,
            name: name.into(),
        }
    }

    /// The column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owner of the column.
    #[must_use]
    pub const fn owner(&self) -> ColumnOwner {
        self.owner
    }

    /// Returns true if the column belongs to `id`.
    #[must_use]
    pub fn belongs_to(&self, id: NodeId) -> bool {
        self.owner == ColumnOwner::Item(id)
    }
}

impl Render for Column {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        let alias = match self.owner {
            ColumnOwner::Item(id) => w.aliases().get(id),
            ColumnOwner::Excluded => String::from("EXCLUDED"),
        };
        if !alias.is_empty() {
            w.push_ident(&alias);
            w.push(".");
        }
        if self.name == "*" {
            w.push("*");
        } else {
            w.push_ident(&self.name);
        }
        Ok(())
    }
}

/// A SQL expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A value bound as a parameter.
    Param(SqlValue),
    /// A value that renders as a parameter, except booleans under the
    /// `no_boolean` flavor which render as `(1 = 1)` / `(1 != 1)`.
    Literal(SqlValue),
    /// A column reference.
    Column(Column),
    /// An output name. Renders as the quoted name; column lists render the
    /// full `expr AS "name"` form.
    As {
        /// The named expression.
        expr: Box<Expr>,
        /// The output name.
        name: String,
    },
    /// `CAST(expr AS type)`
    Cast {
        /// The converted expression.
        expr: Box<Expr>,
        /// Target type, written verbatim.
        type_name: String,
    },
    /// `expr COLLATE "collation"`
    Collate {
        /// The collated expression.
        expr: Box<Expr>,
        /// Collation name.
        collation: String,
    },
    /// A prefix operator.
    Unary(Unary),
    /// An infix operator.
    Binary(Binary),
    /// `AND` / `OR` over any number of operands.
    Nary(Nary),
    /// `BETWEEN`
    Between(Between),
    /// `IS [NOT] TRUE|FALSE|UNKNOWN`
    Is(Is),
    /// `LIKE` / `ILIKE`
    Like(Like),
    /// `CASE WHEN ... END`
    Case(Case),
    /// `COALESCE`, `NULLIF`, `GREATEST`, `LEAST`
    Conditional(Conditional),
    /// `ASC` / `DESC`
    Order(Order),
    /// `NULLS FIRST` / `NULLS LAST`
    NullOrder(NullOrder),
    /// `GROUPING SETS`
    Grouping(Grouping),
    /// `ROLLUP` / `CUBE`
    Rollup(Rollup),
    /// A scalar function call.
    Function(Function),
    /// An aggregate call.
    Aggregate(Aggregate),
    /// A window function call.
    WindowFunction(WindowFunction),
    /// A parenthesized subquery.
    Query(Box<Query>),
    /// A parenthesized list of expressions.
    List(Vec<Expr>),
    /// The Oracle `ROWNUM` pseudo-column.
    Rownum,
    /// A user-provided expression.
    Custom(Arc<dyn CustomExpr>),
}

/// Wraps a value so that it renders as a literal (see [`Expr::Literal`]).
#[must_use]
pub fn literal(value: impl ToSqlValue) -> Expr {
    Expr::Literal(value.to_sql_value())
}

impl Expr {
    /// Creates a binary operation.
    #[must_use]
    pub fn binary(op: BinaryOp, left: impl Into<Self>, right: impl Into<Self>) -> Self {
        Self::Binary(Binary {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        })
    }

    /// Creates a unary operation.
    #[must_use]
    pub fn unary(op: UnaryOp, operand: impl Into<Self>) -> Self {
        Self::Unary(Unary {
            op,
            operand: Box::new(operand.into()),
        })
    }

    /// Returns true for the `NULL` parameter.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Param(SqlValue::Null))
    }

    /// `(self = rhs)`
    #[must_use]
    pub fn eq(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::Eq, self, rhs)
    }

    /// `(self != rhs)`
    #[must_use]
    pub fn ne(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::Ne, self, rhs)
    }

    /// `(self < rhs)`
    #[must_use]
    pub fn lt(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::Lt, self, rhs)
    }

    /// `(self <= rhs)`
    #[must_use]
    pub fn le(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::Le, self, rhs)
    }

    /// `(self > rhs)`
    #[must_use]
    pub fn gt(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::Gt, self, rhs)
    }

    /// `(self >= rhs)`
    #[must_use]
    pub fn ge(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::Ge, self, rhs)
    }

    /// `(self IN rhs)`; `rhs` is a subquery or a `Vec<Expr>`.
    #[must_use]
    pub fn in_(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::In, self, rhs)
    }

    /// `(self NOT IN rhs)`
    #[must_use]
    pub fn not_in(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::NotIn, self, rhs)
    }

    /// `(self BETWEEN low AND high)`
    #[must_use]
    pub fn between(self, low: impl Into<Self>, high: impl Into<Self>) -> Self {
        Self::Between(Between::new(self, low, high))
    }

    /// `(self NOT BETWEEN low AND high)`
    #[must_use]
    pub fn not_between(self, low: impl Into<Self>, high: impl Into<Self>) -> Self {
        Self::Between(Between::new(self, low, high).negated())
    }

    /// `(self IS DISTINCT FROM rhs)`
    #[must_use]
    pub fn is_distinct_from(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::IsDistinct, self, rhs)
    }

    /// `(self IS NOT DISTINCT FROM rhs)`
    #[must_use]
    pub fn is_not_distinct_from(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::IsNotDistinct, self, rhs)
    }

    /// `(self IS TRUE|FALSE|UNKNOWN)`; `None` is `UNKNOWN`.
    #[must_use]
    pub fn is(self, value: Option<bool>) -> Self {
        Self::Is(Is {
            operand: Box::new(self),
            value,
            negated: false,
        })
    }

    /// `(self IS NOT TRUE|FALSE|UNKNOWN)`
    #[must_use]
    pub fn is_not(self, value: Option<bool>) -> Self {
        Self::Is(Is {
            operand: Box::new(self),
            value,
            negated: true,
        })
    }

    /// `(self LIKE pattern ESCAPE '\')`
    #[must_use]
    pub fn like(self, pattern: impl Into<Self>) -> Self {
        Self::Like(Like::new(self, pattern))
    }

    /// `(self NOT LIKE pattern ESCAPE '\')`
    #[must_use]
    pub fn not_like(self, pattern: impl Into<Self>) -> Self {
        Self::Like(Like::new(self, pattern).negated())
    }

    /// Case-insensitive `LIKE`.
    #[must_use]
    pub fn ilike(self, pattern: impl Into<Self>) -> Self {
        Self::Like(Like::new(self, pattern).case_insensitive())
    }

    /// Case-insensitive `NOT LIKE`.
    #[must_use]
    pub fn not_ilike(self, pattern: impl Into<Self>) -> Self {
        Self::Like(Like::new(self, pattern).case_insensitive().negated())
    }

    /// `(self || rhs)`
    #[must_use]
    pub fn concat(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::Concat, self, rhs)
    }

    /// `(self ^ rhs)`
    #[must_use]
    pub fn pow(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::Pow, self, rhs)
    }

    /// `(self & rhs)`
    #[must_use]
    pub fn bit_and(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::BitAnd, self, rhs)
    }

    /// `(self | rhs)`
    #[must_use]
    pub fn bit_or(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::BitOr, self, rhs)
    }

    /// `(self # rhs)`
    #[must_use]
    pub fn bit_xor(self, rhs: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::BitXor, self, rhs)
    }

    /// `(~ self)`
    #[must_use]
    pub fn bit_not(self) -> Self {
        Self::unary(UnaryOp::BitNot, self)
    }

    /// `(@ self)`
    #[must_use]
    pub fn abs(self) -> Self {
        Self::unary(UnaryOp::Abs, self)
    }

    /// Names the expression.
    #[must_use]
    pub fn as_(self, name: impl Into<String>) -> Self {
        Self::As {
            expr: Box::new(self),
            name: name.into(),
        }
    }

    /// `CAST(self AS type_name)`
    #[must_use]
    pub fn cast(self, type_name: impl Into<String>) -> Self {
        Self::Cast {
            expr: Box::new(self),
            type_name: type_name.into(),
        }
    }

    /// `self COLLATE "collation"`
    #[must_use]
    pub fn collate(self, collation: impl Into<String>) -> Self {
        Self::Collate {
            expr: Box::new(self),
            collation: collation.into(),
        }
    }

    /// `self ASC`
    #[must_use]
    pub fn asc(self) -> Self {
        Self::Order(Order::asc(self))
    }

    /// `self DESC`
    #[must_use]
    pub fn desc(self) -> Self {
        Self::Order(Order::desc(self))
    }

    /// `self NULLS FIRST`
    #[must_use]
    pub fn nulls_first(self) -> Self {
        Self::NullOrder(NullOrder::first(self))
    }

    /// `self NULLS LAST`
    #[must_use]
    pub fn nulls_last(self) -> Self {
        Self::NullOrder(NullOrder::last(self))
    }

    /// Returns the output name when the expression is an `As`.
    #[must_use]
    pub fn output_name(&self) -> Option<&str> {
        match self {
            Self::As { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Renders the full `expr AS "name"` form used by column lists.
    ///
    /// # Errors
    ///
    /// Propagates rendering errors.
    pub fn render_column(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        match self {
            Self::As { expr, name } => {
                expr.render(w)?;
                w.push(if w.flavor().no_as() { " " } else { " AS " });
                w.push_ident(name);
                Ok(())
            }
            other => other.render(w),
        }
    }
}

fn render_literal(value: &SqlValue, w: &mut SqlWriter<'_>) {
    match value {
        SqlValue::Bool(b) if w.flavor().no_boolean() => {
            w.push(if *b { "(1 = 1)" } else { "(1 != 1)" });
        }
        other => w.push_param(other.clone()),
    }
}

impl Render for Expr {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        match self {
            Self::Param(value) => {
                w.push_param(value.clone());
                Ok(())
            }
            Self::Literal(value) => {
                render_literal(value, w);
                Ok(())
            }
            Self::Column(column) => column.render(w),
            Self::As { name, .. } => {
                w.push_ident(name);
                Ok(())
            }
            Self::Cast { expr, type_name } => {
                w.push("CAST(");
                expr.render(w)?;
                w.push(" AS ");
                w.push(type_name);
                w.push(")");
                Ok(())
            }
            Self::Collate { expr, collation } => {
                expr.render(w)?;
                w.push(" COLLATE ");
                w.push_ident(collation);
                Ok(())
            }
            Self::Unary(e) => e.render(w),
            Self::Binary(e) => e.render(w),
            Self::Nary(e) => e.render(w),
            Self::Between(e) => e.render(w),
            Self::Is(e) => e.render(w),
            Self::Like(e) => e.render(w),
            Self::Case(e) => e.render(w),
            Self::Conditional(e) => e.render(w),
            Self::Order(e) => e.render(w),
            Self::NullOrder(e) => e.render(w),
            Self::Grouping(e) => e.render(w),
            Self::Rollup(e) => e.render(w),
            Self::Function(e) => e.render(w),
            Self::Aggregate(e) => e.render(w),
            Self::WindowFunction(e) => e.render(w),
            Self::Query(q) => {
                w.push("(");
                q.render(w)?;
                w.push(")");
                Ok(())
            }
            Self::List(items) => {
                w.push("(");
                w.push_list(items, ", ")?;
                w.push(")");
                Ok(())
            }
            Self::Rownum => {
                w.push("ROWNUM");
                Ok(())
            }
            Self::Custom(custom) => custom.render(w),
        }
    }
}

macro_rules! impl_expr_from_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(value: $ty) -> Self {
                    Self::Param(value.to_sql_value())
                }
            }
        )+
    };
}

impl_expr_from_value!(
    SqlValue,
    bool,
    i64,
    i32,
    i16,
    i8,
    u32,
    u16,
    u8,
    f64,
    f32,
    String,
    &str,
    &String,
    Vec<u8>,
    &[u8],
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
);

impl<T: ToSqlValue> From<Option<T>> for Expr {
    fn from(value: Option<T>) -> Self {
        Self::Param(value.to_sql_value())
    }
}

impl From<Vec<Self>> for Expr {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<Column> for Expr {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

impl From<&Column> for Expr {
    fn from(column: &Column) -> Self {
        Self::Column(column.clone())
    }
}

macro_rules! impl_expr_from_node {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Expr {
                fn from(node: $variant) -> Self {
                    Self::$variant(node)
                }
            }
        )+
    };
}

impl_expr_from_node!(
    Unary,
    Binary,
    Nary,
    Between,
    Is,
    Like,
    Case,
    Conditional,
    Order,
    NullOrder,
    Grouping,
    Rollup,
    Function,
    Aggregate,
    WindowFunction,
);

impl From<Arc<dyn CustomExpr>> for Expr {
    fn from(custom: Arc<dyn CustomExpr>) -> Self {
        Self::Custom(custom)
    }
}
