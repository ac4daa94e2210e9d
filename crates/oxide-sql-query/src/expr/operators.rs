//! Operators: unary, binary, n-ary, BETWEEN, IS and LIKE.
//!
//! Every operator renders parenthesized, `(left OP right)`, so composed
//! trees never depend on SQL precedence rules.

use std::ops;

use super::{functions, Expr};
use crate::builder::value::SqlValue;
use crate::error::{Result, SqlError};
use crate::flavor::{Flavor, ParamStyle};
use crate::render::{Render, SqlWriter};

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `NOT`
    Not,
    /// `-`
    Neg,
    /// `+`
    Pos,
    /// `|/`
    SquareRoot,
    /// `||/`
    CubeRoot,
    /// `!!`
    Factorial,
    /// `@`
    Abs,
    /// `~`
    BitNot,
    /// `EXISTS`
    Exists,
    /// `ANY` (also spelled `SOME`)
    Any,
    /// `ALL`
    All,
}

impl UnaryOp {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Not => "NOT",
            Self::Neg => "-",
            Self::Pos => "+",
            Self::SquareRoot => "|/",
            Self::CubeRoot => "||/",
            Self::Factorial => "!!",
            Self::Abs => "@",
            Self::BitNot => "~",
            Self::Exists => "EXISTS",
            Self::Any => "ANY",
            Self::All => "ALL",
        }
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `^`
    Pow,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `#`
    BitXor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `||`
    Concat,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `IS DISTINCT FROM`
    IsDistinct,
    /// `IS NOT DISTINCT FROM`
    IsNotDistinct,
}

impl BinaryOp {
    /// Returns the SQL representation under `flavor`.
    ///
    /// `%` is doubled under the `format` parameter style.
    #[must_use]
    pub const fn sql(&self, flavor: &Flavor) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => match flavor.param_style() {
                ParamStyle::Format => "%%",
                ParamStyle::Qmark => "%",
            },
            Self::Pow => "^",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "#",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Concat => "||",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::IsDistinct => "IS DISTINCT FROM",
            Self::IsNotDistinct => "IS NOT DISTINCT FROM",
        }
    }

    /// Returns the logical inverse, for operators that have one.
    #[must_use]
    pub const fn inverse(&self) -> Option<Self> {
        match self {
            Self::Lt => Some(Self::Ge),
            Self::Ge => Some(Self::Lt),
            Self::Gt => Some(Self::Le),
            Self::Le => Some(Self::Gt),
            Self::Eq => Some(Self::Ne),
            Self::Ne => Some(Self::Eq),
            Self::In => Some(Self::NotIn),
            Self::NotIn => Some(Self::In),
            Self::IsDistinct => Some(Self::IsNotDistinct),
            Self::IsNotDistinct => Some(Self::IsDistinct),
            _ => None,
        }
    }
}

/// `AND` / `OR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaryOp {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl NaryOp {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// `(OP operand)`
#[derive(Debug, Clone)]
pub struct Unary {
    pub(crate) op: UnaryOp,
    pub(crate) operand: Box<Expr>,
}

impl Unary {
    /// The operator.
    #[must_use]
    pub const fn op(&self) -> UnaryOp {
        self.op
    }

    /// The operand.
    #[must_use]
    pub fn operand(&self) -> &Expr {
        &self.operand
    }
}

impl Render for Unary {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push("(");
        w.push(self.op.as_str());
        w.push(" ");
        self.operand.render(w)?;
        w.push(")");
        Ok(())
    }
}

/// `(left OP right)`
#[derive(Debug, Clone)]
pub struct Binary {
    pub(crate) op: BinaryOp,
    pub(crate) left: Box<Expr>,
    pub(crate) right: Box<Expr>,
}

impl Binary {
    /// The operator.
    #[must_use]
    pub const fn op(&self) -> BinaryOp {
        self.op
    }

    /// The left operand.
    #[must_use]
    pub fn left(&self) -> &Expr {
        &self.left
    }

    /// The right operand.
    #[must_use]
    pub fn right(&self) -> &Expr {
        &self.right
    }
}

impl Render for Binary {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        // `x = NULL` is never true; compare with IS [NOT] NULL instead.
        if matches!(self.op, BinaryOp::Eq | BinaryOp::Ne) {
            let operand = if self.left.is_null() {
                Some(&self.right)
            } else if self.right.is_null() {
                Some(&self.left)
            } else {
                None
            };
            if let Some(operand) = operand {
                w.push("(");
                operand.render(w)?;
                w.push(if self.op == BinaryOp::Eq {
                    " IS NULL)"
                } else {
                    " IS NOT NULL)"
                });
                return Ok(());
            }
        }

        w.push("(");
        self.left.render(w)?;
        w.push(" ");
        w.push(self.op.sql(w.flavor()));
        w.push(" ");
        self.right.render(w)?;
        w.push(")");
        Ok(())
    }
}

/// `(a AND b AND ...)`
#[derive(Debug, Clone)]
pub struct Nary {
    pub(crate) op: NaryOp,
    pub(crate) operands: Vec<Expr>,
}

impl Nary {
    /// Creates an n-ary node.
    #[must_use]
    pub const fn new(op: NaryOp, operands: Vec<Expr>) -> Self {
        Self { op, operands }
    }

    /// The operator.
    #[must_use]
    pub const fn op(&self) -> NaryOp {
        self.op
    }

    /// The operands.
    #[must_use]
    pub fn operands(&self) -> &[Expr] {
        &self.operands
    }
}

impl Render for Nary {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        let sep = format!(" {} ", self.op.as_str());
        w.push("(");
        w.push_list(&self.operands, &sep)?;
        w.push(")");
        Ok(())
    }
}

/// `(x [NOT ]BETWEEN[ SYMMETRIC] low AND high)`
#[derive(Debug, Clone)]
pub struct Between {
    pub(crate) operand: Box<Expr>,
    pub(crate) low: Box<Expr>,
    pub(crate) high: Box<Expr>,
    pub(crate) negated: bool,
    pub(crate) symmetric: bool,
}

impl Between {
    /// Creates `operand BETWEEN low AND high`.
    #[must_use]
    pub fn new(operand: impl Into<Expr>, low: impl Into<Expr>, high: impl Into<Expr>) -> Self {
        Self {
            operand: Box::new(operand.into()),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
            negated: false,
            symmetric: false,
        }
    }

    /// Adds `SYMMETRIC`.
    #[must_use]
    pub const fn symmetric(mut self) -> Self {
        self.symmetric = true;
        self
    }

    /// Turns the test into `NOT BETWEEN`.
    #[must_use]
    pub const fn negated(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

impl Render for Between {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push("(");
        self.operand.render(w)?;
        w.push(if self.negated {
            " NOT BETWEEN"
        } else {
            " BETWEEN"
        });
        if self.symmetric {
            w.push(" SYMMETRIC");
        }
        w.push(" ");
        self.low.render(w)?;
        w.push(" AND ");
        self.high.render(w)?;
        w.push(")");
        Ok(())
    }
}

/// `(x IS[ NOT] UNKNOWN|TRUE|FALSE)`
#[derive(Debug, Clone)]
pub struct Is {
    pub(crate) operand: Box<Expr>,
    pub(crate) value: Option<bool>,
    pub(crate) negated: bool,
}

impl Render for Is {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push("(");
        self.operand.render(w)?;
        w.push(if self.negated { " IS NOT " } else { " IS " });
        w.push(match self.value {
            None => "UNKNOWN",
            Some(true) => "TRUE",
            Some(false) => "FALSE",
        });
        w.push(")");
        Ok(())
    }
}

/// `(left [NOT ]LIKE right ESCAPE e)` and its case-insensitive variant.
#[derive(Debug, Clone)]
pub struct Like {
    pub(crate) left: Box<Expr>,
    pub(crate) right: Box<Expr>,
    pub(crate) negated: bool,
    pub(crate) case_insensitive: bool,
    pub(crate) escape: String,
}

impl Like {
    /// Creates `left LIKE right` with the default `\` escape.
    #[must_use]
    pub fn new(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self {
            left: Box::new(left.into()),
            right: Box::new(right.into()),
            negated: false,
            case_insensitive: false,
            escape: String::from("\\"),
        }
    }

    /// Makes the match case-insensitive (`ILIKE`).
    #[must_use]
    pub const fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Turns the test into `NOT LIKE`.
    #[must_use]
    pub const fn negated(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Sets the escape character. An empty escape removes the clause unless
    /// the flavor asks for `ESCAPE ''`.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Invalid`] if `escape` is longer than one
    /// character.
    pub fn escape(mut self, escape: &str) -> Result<Self> {
        if escape.chars().count() > 1 {
            return Err(SqlError::invalid("escape", escape));
        }
        self.escape = String::from(escape);
        Ok(self)
    }

    fn render_operand(&self, operand: &Expr, upper: bool, w: &mut SqlWriter<'_>) -> Result<()> {
        if upper {
            Expr::Function(functions::upper(operand.clone())).render(w)
        } else {
            operand.render(w)
        }
    }
}

impl Render for Like {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        let native = w.flavor().ilike();
        let upper = self.case_insensitive && !native;
        let op = match (self.negated, self.case_insensitive && native) {
            (false, false) => "LIKE",
            (true, false) => "NOT LIKE",
            (false, true) => "ILIKE",
            (true, true) => "NOT ILIKE",
        };

        w.push("(");
        self.render_operand(&self.left, upper, w)?;
        w.push(" ");
        w.push(op);
        w.push(" ");
        self.render_operand(&self.right, upper, w)?;
        if !self.escape.is_empty() || w.flavor().escape_empty() {
            w.push(" ESCAPE ");
            w.push_param(SqlValue::Text(self.escape.clone()));
        }
        w.push(")");
        Ok(())
    }
}

/// Negates `expr`, using the inverse operator when one exists.
pub(crate) fn invert(expr: Expr) -> Expr {
    match expr {
        Expr::Binary(mut b) => match b.op.inverse() {
            Some(op) => {
                b.op = op;
                Expr::Binary(b)
            }
            None => not(Expr::Binary(b)),
        },
        Expr::Between(b) => Expr::Between(b.negated()),
        Expr::Is(mut i) => {
            i.negated = !i.negated;
            Expr::Is(i)
        }
        Expr::Like(l) => Expr::Like(l.negated()),
        other => not(other),
    }
}

/// `(NOT x)`, without looking for an inverse operator.
#[must_use]
pub fn not(expr: impl Into<Expr>) -> Expr {
    Expr::unary(UnaryOp::Not, expr)
}

/// `(EXISTS (subquery))`
#[must_use]
pub fn exists(query: impl Into<Expr>) -> Expr {
    Expr::unary(UnaryOp::Exists, query)
}

/// `(ANY (subquery))`
#[must_use]
pub fn any(query: impl Into<Expr>) -> Expr {
    Expr::unary(UnaryOp::Any, query)
}

/// Alias of [`any`].
#[must_use]
pub fn some(query: impl Into<Expr>) -> Expr {
    any(query)
}

/// `(ALL (subquery))`
#[must_use]
pub fn all(query: impl Into<Expr>) -> Expr {
    Expr::unary(UnaryOp::All, query)
}

fn splice(op: NaryOp, left: Expr, right: Expr) -> Expr {
    match right {
        Expr::Nary(n) if n.op == op => {
            let mut operands = Vec::with_capacity(n.operands.len() + 1);
            operands.push(left);
            operands.extend(n.operands);
            Expr::Nary(Nary::new(op, operands))
        }
        other => Expr::Nary(Nary::new(op, vec![left, other])),
    }
}

impl Expr {
    /// `(self AND rhs)`; an `AND` on the right is spliced in.
    #[must_use]
    pub fn and(self, rhs: impl Into<Self>) -> Self {
        splice(NaryOp::And, self, rhs.into())
    }

    /// `(self OR rhs)`; an `OR` on the right is spliced in.
    #[must_use]
    pub fn or(self, rhs: impl Into<Self>) -> Self {
        splice(NaryOp::Or, self, rhs.into())
    }
}

macro_rules! binary_operator_traits {
    ($($trait:ident, $method:ident => $op:ident;)+) => {
        $(
            impl<T: Into<Expr>> ops::$trait<T> for Expr {
                type Output = Self;

                fn $method(self, rhs: T) -> Self {
                    Self::binary(BinaryOp::$op, self, rhs)
                }
            }
        )+
    };
}

binary_operator_traits! {
    Add, add => Add;
    Sub, sub => Sub;
    Mul, mul => Mul;
    Div, div => Div;
    Rem, rem => Mod;
    Shl, shl => Shl;
    Shr, shr => Shr;
}

impl<T: Into<Self>> ops::BitAnd<T> for Expr {
    type Output = Self;

    fn bitand(self, rhs: T) -> Self {
        self.and(rhs)
    }
}

impl<T: Into<Self>> ops::BitOr<T> for Expr {
    type Output = Self;

    fn bitor(self, rhs: T) -> Self {
        self.or(rhs)
    }
}

impl ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self {
        Self::unary(UnaryOp::Neg, self)
    }
}

impl ops::Not for Expr {
    type Output = Self;

    fn not(self) -> Self {
        invert(self)
    }
}
