//! The rendering protocol.
//!
//! Every node writes its SQL text and its bind parameters into one
//! [`SqlWriter`] during a single tree walk. A placeholder is only ever
//! emitted together with the value bound to it, so the text and the
//! parameter list cannot drift apart.
//!
//! ```rust
//! use oxide_sql_query::{Render, Table};
//!
//! let t = Table::new("t");
//! let (sql, params) = t
//!     .select(vec![])
//!     .where_clause(t.c("c").eq("foo"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(sql, r#"SELECT * FROM "t" AS "a" WHERE ("a"."c" = %s)"#);
//! assert_eq!(params.len(), 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use tracing::debug;

use crate::alias::AliasManager;
use crate::builder::value::SqlValue;
use crate::error::{Result, SqlError};
use crate::flavor::Flavor;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

static FORMAT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("%[s%]").expect("Invalid placeholder regex"));

/// Identity of an aliasable node (table, subquery, CTE, window, function).
///
/// Two structurally equal tables are still two aliasing targets, so aliases
/// are keyed by identity rather than by value. Clones share the identity of
/// the node they were cloned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocates a fresh process-wide identity.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identity value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Everything a render pass consults: the flavor and one alias table.
///
/// A context is not shared between concurrent renders; build one per
/// statement (see [`RenderContext::current`]).
#[derive(Debug)]
pub struct RenderContext {
    flavor: Arc<Flavor>,
    aliases: AliasManager,
}

impl RenderContext {
    /// Creates a context for the given flavor with an empty alias table.
    #[must_use]
    pub fn new(flavor: impl Into<Arc<Flavor>>) -> Self {
        Self {
            flavor: flavor.into(),
            aliases: AliasManager::new(),
        }
    }

    /// Creates a context from the ambient flavor of the current task or
    /// thread.
    #[must_use]
    pub fn current() -> Self {
        Self::new(Flavor::get())
    }

    /// Returns the flavor used by this context.
    #[must_use]
    pub fn flavor(&self) -> &Flavor {
        &self.flavor
    }

    /// Returns the alias table used by this context.
    #[must_use]
    pub const fn aliases(&self) -> &AliasManager {
        &self.aliases
    }
}

/// Accumulates SQL text and bind parameters for one render pass.
#[derive(Debug)]
pub struct SqlWriter<'a> {
    ctx: &'a RenderContext,
    sql: String,
    params: Vec<SqlValue>,
}

impl<'a> SqlWriter<'a> {
    /// Creates an empty writer bound to a context.
    #[must_use]
    pub const fn new(ctx: &'a RenderContext) -> Self {
        Self {
            ctx,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Returns the render context.
    #[must_use]
    pub const fn ctx(&self) -> &'a RenderContext {
        self.ctx
    }

    /// Returns the flavor of the render context.
    #[must_use]
    pub fn flavor(&self) -> &'a Flavor {
        self.ctx.flavor()
    }

    /// Returns the alias table of the render context.
    #[must_use]
    pub const fn aliases(&self) -> &'a AliasManager {
        self.ctx.aliases()
    }

    /// Appends raw SQL text.
    pub fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Appends a placeholder and binds `value` to it.
    pub fn push_param(&mut self, value: SqlValue) {
        self.sql.push_str(self.ctx.flavor().param());
        self.params.push(value);
    }

    /// Appends a double-quoted identifier.
    pub fn push_ident(&mut self, name: &str) {
        self.sql.push('"');
        self.sql.push_str(&name.replace('"', "\"\""));
        self.sql.push('"');
    }

    /// Renders `items` separated by `sep`.
    ///
    /// # Errors
    ///
    /// Propagates the first rendering error.
    pub fn push_list<T: Render>(&mut self, items: &[T], sep: &str) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            item.render(self)?;
        }
        Ok(())
    }

    /// Starts an empty fragment sharing this writer's context.
    ///
    /// Statements render clauses into fragments in alias-allocation order
    /// and [`append`](Self::append) them in SQL text order.
    #[must_use]
    pub const fn fork(&self) -> Self {
        Self::new(self.ctx)
    }

    /// Appends a fragment's text and parameters.
    pub fn append(&mut self, other: Self) {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }

    /// Returns true if no text has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Returns the text written so far.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the parameters bound so far.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Consumes the writer, returning the SQL text and its parameters.
    #[must_use]
    pub fn finish(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}

/// A node that can render itself into a [`SqlWriter`].
pub trait Render {
    /// Writes this node's SQL text and parameters.
    ///
    /// # Errors
    ///
    /// Fails with [`SqlError::NotImplemented`] for nodes without a
    /// rendering, or with [`SqlError::Invalid`] for incomplete nodes.
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()>;

    /// Renders with an explicit context.
    ///
    /// # Errors
    ///
    /// Propagates rendering errors.
    fn to_sql_with(&self, ctx: &RenderContext) -> Result<(String, Vec<SqlValue>)> {
        let mut w = SqlWriter::new(ctx);
        self.render(&mut w)?;
        Ok(w.finish())
    }

    /// Renders with the ambient flavor and a fresh alias table.
    ///
    /// # Errors
    ///
    /// Propagates rendering errors.
    fn build(&self) -> Result<(String, Vec<SqlValue>)> {
        let ctx = RenderContext::current();
        let (sql, params) = self.to_sql_with(&ctx)?;
        debug!(sql = %sql, params = params.len(), "built statement");
        Ok((sql, params))
    }

    /// Returns only the SQL text of [`build`](Self::build).
    ///
    /// # Errors
    ///
    /// Propagates rendering errors.
    fn text(&self) -> Result<String> {
        self.build().map(|(sql, _)| sql)
    }

    /// Returns only the parameters of [`build`](Self::build).
    ///
    /// # Errors
    ///
    /// Propagates rendering errors.
    fn params(&self) -> Result<Vec<SqlValue>> {
        self.build().map(|(_, params)| params)
    }
}

/// Quotes an identifier, doubling embedded quotes.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Converts a `%s`-style statement to numbered `:0, :1, ...` markers.
///
/// The `%%` escape collapses to a single `%`. The parameters are returned
/// unchanged.
///
/// # Errors
///
/// Returns [`SqlError::ParamCount`] when the number of `%s` markers differs
/// from the number of parameters.
pub fn format2numeric(sql: &str, params: Vec<SqlValue>) -> Result<(String, Vec<SqlValue>)> {
    let placeholders = FORMAT_MARKER
        .find_iter(sql)
        .filter(|m| m.as_str() == "%s")
        .count();
    if placeholders != params.len() {
        return Err(SqlError::ParamCount {
            placeholders,
            params: params.len(),
        });
    }

    let mut index = 0_usize;
    let numbered = FORMAT_MARKER.replace_all(sql, |caps: &Captures<'_>| {
        if &caps[0] == "%%" {
            String::from("%")
        } else {
            let marker = format!(":{index}");
            index += 1;
            marker
        }
    });
    Ok((numbered.into_owned(), params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ids_are_unique() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn test_writer_binds_values_with_placeholders() {
        let ctx = RenderContext::new(Flavor::default());
        let mut w = SqlWriter::new(&ctx);
        w.push("x = ");
        w.push_param(SqlValue::Int(1));
        w.push(" AND ");
        w.push_ident("we\"ird");
        let (sql, params) = w.finish();
        assert_eq!(sql, r#"x = %s AND "we""ird""#);
        assert_eq!(params, vec![SqlValue::Int(1)]);
    }

    #[test]
    fn test_fork_and_append() {
        let ctx = RenderContext::new(Flavor::default());
        let mut w = SqlWriter::new(&ctx);
        let mut tail = w.fork();
        tail.push(" tail ");
        tail.push_param(SqlValue::Int(2));
        w.push("head ");
        w.push_param(SqlValue::Int(1));
        w.append(tail);
        let (sql, params) = w.finish();
        assert_eq!(sql, "head %s tail %s");
        assert_eq!(params, vec![SqlValue::Int(1), SqlValue::Int(2)]);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("t"), r#""t""#);
        assert_eq!(quote_identifier(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn test_format2numeric() {
        let params = vec![SqlValue::Text(String::from("foo"))];
        let (sql, out) =
            format2numeric("SELECT * FROM t WHERE col = %s", params.clone()).unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE col = :0");
        assert_eq!(out, params);

        let params = vec![
            SqlValue::Text(String::from("foo")),
            SqlValue::Text(String::from("bar")),
        ];
        let (sql, _) =
            format2numeric("SELECT * FROM t WHERE a = %s AND b = %s", params).unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = :0 AND b = :1");
    }

    #[test]
    fn test_format2numeric_unescapes_percent() {
        let (sql, _) = format2numeric("SELECT (a %% %s)", vec![SqlValue::Int(2)]).unwrap();
        assert_eq!(sql, "SELECT (a % :0)");
    }

    #[test]
    fn test_format2numeric_count_mismatch() {
        let err = format2numeric("SELECT %s, %s", vec![SqlValue::Int(1)]).unwrap_err();
        assert!(matches!(
            err,
            SqlError::ParamCount {
                placeholders: 2,
                params: 1
            }
        ));
    }
}
