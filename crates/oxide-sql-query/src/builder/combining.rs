//! Set combinations: `UNION`, `INTERSECT` and `EXCEPT`.

use std::ops::{BitAnd, BitOr, Sub};

use super::select::Select;
use super::values::Values;
use super::with::{render_with_clause, With};
use super::{render_limit_offset, render_order_by, Query};
use crate::error::Result;
use crate::expr::Expr;
use crate::render::{NodeId, Render, SqlWriter};

/// Set operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    /// `UNION`
    Union,
    /// `INTERSECT`
    Intersect,
    /// `EXCEPT`
    Except,
}

impl SetOp {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }
}

/// `q1 OP [ALL ]q2 [OP [ALL ]q3 ...]` with its own ordering and pagination.
///
/// A combination of a single query renders exactly as that query.
#[derive(Debug, Clone)]
pub struct CombiningQuery {
    id: NodeId,
    op: SetOp,
    all: bool,
    queries: Vec<Query>,
    order_by: Vec<Expr>,
    limit: Option<i64>,
    offset: Option<i64>,
    with: Vec<With>,
}

impl CombiningQuery {
    /// Combines `queries` with `op`.
    #[must_use]
    pub fn new(op: SetOp, queries: Vec<Query>) -> Self {
        Self {
            id: NodeId::next(),
            op,
            all: false,
            queries,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            with: Vec::new(),
        }
    }

    /// Keeps duplicates (`OP ALL`).
    #[must_use]
    pub const fn all(mut self) -> Self {
        self.all = true;
        self
    }

    /// Sets the ORDER BY keys of the combined result.
    #[must_use]
    pub fn order_by(mut self, keys: Vec<Expr>) -> Self {
        self.order_by = keys;
        self
    }

    /// Sets or clears the LIMIT.
    #[must_use]
    pub const fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    /// Sets or clears the OFFSET.
    #[must_use]
    pub const fn offset(mut self, offset: Option<i64>) -> Self {
        self.offset = offset;
        self
    }

    /// Attaches common table expressions.
    #[must_use]
    pub fn with(mut self, with: Vec<With>) -> Self {
        self.with = with;
        self
    }

    /// The identity used for aliasing.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The operator.
    #[must_use]
    pub const fn op(&self) -> SetOp {
        self.op
    }

    /// The operands.
    #[must_use]
    pub fn queries(&self) -> &[Query] {
        &self.queries
    }
}

impl Render for CombiningQuery {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        let _scope = w.aliases().enter();
        render_with_clause(&self.with, w)?;
        let separator = format!(" {} {}", self.op.as_str(), if self.all { "ALL " } else { "" });
        w.push_list(&self.queries, &separator)?;
        render_order_by(&self.order_by, w)?;
        render_limit_offset(self.limit, self.offset, w);
        Ok(())
    }
}

/// Set-operator constructors for the queries that can be combined.
macro_rules! combinable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $ty {
                /// `self UNION other`
                #[must_use]
                pub fn union(self, other: impl Into<Query>) -> CombiningQuery {
                    CombiningQuery::new(SetOp::Union, vec![self.into(), other.into()])
                }

                /// `self UNION ALL other`
                #[must_use]
                pub fn union_all(self, other: impl Into<Query>) -> CombiningQuery {
                    self.union(other).all()
                }

                /// `self INTERSECT other`
                #[must_use]
                pub fn intersect(self, other: impl Into<Query>) -> CombiningQuery {
                    CombiningQuery::new(SetOp::Intersect, vec![self.into(), other.into()])
                }

                /// `self EXCEPT other`
                #[must_use]
                pub fn except(self, other: impl Into<Query>) -> CombiningQuery {
                    CombiningQuery::new(SetOp::Except, vec![self.into(), other.into()])
                }
            }

            impl<Q: Into<Query>> BitOr<Q> for $ty {
                type Output = CombiningQuery;

                fn bitor(self, rhs: Q) -> CombiningQuery {
                    self.union(rhs)
                }
            }

            impl<Q: Into<Query>> BitAnd<Q> for $ty {
                type Output = CombiningQuery;

                fn bitand(self, rhs: Q) -> CombiningQuery {
                    self.intersect(rhs)
                }
            }

            impl<Q: Into<Query>> Sub<Q> for $ty {
                type Output = CombiningQuery;

                fn sub(self, rhs: Q) -> CombiningQuery {
                    self.except(rhs)
                }
            }
        )+
    };
}

combinable!(Select, CombiningQuery, Values);
