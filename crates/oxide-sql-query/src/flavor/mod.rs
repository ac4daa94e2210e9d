//! SQL flavor support.
//!
//! Databases disagree on pagination, parameter markers, boolean literals,
//! NULL ordering and a handful of other details. A [`Flavor`] bundles those
//! choices; rendering consults it instead of hard-coding one dialect.
//!
//! The active flavor is ambient: each tokio task running inside
//! [`Flavor::scope`] has its own, and every other thread has its own, so
//! concurrent renders never observe each other's settings.

mod config;
mod presets;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

pub use config::FlavorConfig;

use crate::error::{Result, SqlError};
use crate::expr::{Expr, Function};

tokio::task_local! {
    static TASK_FLAVOR: RefCell<Arc<Flavor>>;
}

thread_local! {
    static THREAD_FLAVOR: RefCell<Option<Arc<Flavor>>> = const { RefCell::new(None) };
}

/// How LIMIT and OFFSET are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitStyle {
    /// `LIMIT n OFFSET m`.
    #[default]
    Limit,
    /// `OFFSET (m) ROWS FETCH FIRST (n) ROWS ONLY`.
    Fetch,
    /// Nested selects filtering on `ROWNUM`.
    Rownum,
}

impl LimitStyle {
    /// Returns the configuration name of the style.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Limit => "limit",
            Self::Fetch => "fetch",
            Self::Rownum => "rownum",
        }
    }
}

impl FromStr for LimitStyle {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "limit" => Ok(Self::Limit),
            "fetch" => Ok(Self::Fetch),
            "rownum" => Ok(Self::Rownum),
            other => Err(SqlError::invalid("limit_style", other)),
        }
    }
}

/// Parameter marker style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamStyle {
    /// `%s` markers.
    #[default]
    Format,
    /// `?` markers.
    Qmark,
}

impl ParamStyle {
    /// Returns the configuration name of the style.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Qmark => "qmark",
        }
    }

    /// Returns the placeholder token.
    #[must_use]
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Format => "%s",
            Self::Qmark => "?",
        }
    }
}

impl FromStr for ParamStyle {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "format" => Ok(Self::Format),
            "qmark" => Ok(Self::Qmark),
            other => Err(SqlError::invalid("param_style", other)),
        }
    }
}

/// Replacement renderer for a named function.
///
/// The closure receives the original function node and returns the node to
/// render in its place.
#[derive(Clone)]
pub struct FunctionOverride(Arc<dyn Fn(&Function) -> Expr + Send + Sync>);

impl FunctionOverride {
    /// Wraps a substitution closure.
    pub fn new(f: impl Fn(&Function) -> Expr + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Produces the substitute node for `function`.
    #[must_use]
    pub fn apply(&self, function: &Function) -> Expr {
        (self.0)(function)
    }
}

impl fmt::Debug for FunctionOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FunctionOverride(..)")
    }
}

/// Dialect configuration consulted while rendering.
#[derive(Debug, Clone)]
pub struct Flavor {
    limit_style: LimitStyle,
    max_limit: Option<i64>,
    param_style: ParamStyle,
    ilike: bool,
    no_as: bool,
    no_boolean: bool,
    null_ordering: bool,
    filter: bool,
    escape_empty: bool,
    function_overrides: HashMap<String, FunctionOverride>,
}

impl Default for Flavor {
    fn default() -> Self {
        Self {
            limit_style: LimitStyle::Limit,
            max_limit: None,
            param_style: ParamStyle::Format,
            ilike: false,
            no_as: false,
            no_boolean: false,
            null_ordering: true,
            filter: false,
            escape_empty: false,
            function_overrides: HashMap::new(),
        }
    }
}

impl Flavor {
    /// Starts building a flavor from the defaults.
    #[must_use]
    pub fn builder() -> FlavorBuilder {
        FlavorBuilder::default()
    }

    /// Parses and validates a JSON [`FlavorConfig`] document.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Config`] for malformed JSON and
    /// [`SqlError::Invalid`] for unsupported values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FlavorConfig = serde_json::from_str(json)?;
        Self::try_from(config)
    }

    /// Pagination style.
    #[must_use]
    pub const fn limit_style(&self) -> LimitStyle {
        self.limit_style
    }

    /// Limit substituted when only an offset is given.
    #[must_use]
    pub const fn max_limit(&self) -> Option<i64> {
        self.max_limit
    }

    /// Parameter marker style.
    #[must_use]
    pub const fn param_style(&self) -> ParamStyle {
        self.param_style
    }

    /// The placeholder token.
    #[must_use]
    pub const fn param(&self) -> &'static str {
        self.param_style.marker()
    }

    /// Native `ILIKE` support.
    #[must_use]
    pub const fn ilike(&self) -> bool {
        self.ilike
    }

    /// The `AS` keyword is omitted before aliases.
    #[must_use]
    pub const fn no_as(&self) -> bool {
        self.no_as
    }

    /// Boolean literals are not supported.
    #[must_use]
    pub const fn no_boolean(&self) -> bool {
        self.no_boolean
    }

    /// `NULLS FIRST` / `NULLS LAST` are supported.
    #[must_use]
    pub const fn null_ordering(&self) -> bool {
        self.null_ordering
    }

    /// Aggregate `FILTER (WHERE ...)` is supported.
    #[must_use]
    pub const fn filter(&self) -> bool {
        self.filter
    }

    /// An empty `ESCAPE ''` clause is emitted for LIKE.
    #[must_use]
    pub const fn escape_empty(&self) -> bool {
        self.escape_empty
    }

    /// Looks up the override registered for a function name.
    #[must_use]
    pub fn function_override(&self, name: &str) -> Option<&FunctionOverride> {
        if self.function_overrides.is_empty() {
            return None;
        }
        self.function_overrides.get(&name.to_uppercase())
    }

    /// Returns the flavor of the current task or thread, installing the
    /// default flavor on first use.
    #[must_use]
    pub fn get() -> Arc<Self> {
        if let Ok(flavor) = TASK_FLAVOR.try_with(|slot| Arc::clone(&slot.borrow())) {
            return flavor;
        }
        THREAD_FLAVOR.with(|slot| {
            Arc::clone(
                slot.borrow_mut()
                    .get_or_insert_with(|| Arc::new(Self::default())),
            )
        })
    }

    /// Installs `flavor` for the current task (inside [`Flavor::scope`]) or
    /// thread (otherwise).
    pub fn set(flavor: impl Into<Arc<Self>>) {
        let flavor = flavor.into();
        debug!(
            limit_style = flavor.limit_style.as_str(),
            param_style = flavor.param_style.as_str(),
            "installing flavor"
        );
        if TASK_FLAVOR
            .try_with(|slot| *slot.borrow_mut() = Arc::clone(&flavor))
            .is_ok()
        {
            return;
        }
        THREAD_FLAVOR.with(|slot| *slot.borrow_mut() = Some(flavor));
    }

    /// Runs `fut` with its own flavor slot initialised to `flavor`.
    pub async fn scope<F: Future>(flavor: impl Into<Arc<Self>>, fut: F) -> F::Output {
        let flavor = flavor.into();
        debug!(
            limit_style = flavor.limit_style.as_str(),
            param_style = flavor.param_style.as_str(),
            "entering flavor scope"
        );
        TASK_FLAVOR.scope(RefCell::new(flavor), fut).await
    }
}

/// Programmatic construction of a [`Flavor`].
#[derive(Debug, Clone, Default)]
pub struct FlavorBuilder {
    flavor: Flavor,
}

impl FlavorBuilder {
    /// Sets the pagination style.
    #[must_use]
    pub fn limit_style(mut self, style: LimitStyle) -> Self {
        self.flavor.limit_style = style;
        self
    }

    /// Sets the limit used when only an offset is given.
    #[must_use]
    pub fn max_limit(mut self, max_limit: i64) -> Self {
        self.flavor.max_limit = Some(max_limit);
        self
    }

    /// Sets the parameter marker style.
    #[must_use]
    pub fn param_style(mut self, style: ParamStyle) -> Self {
        self.flavor.param_style = style;
        self
    }

    /// Declares native `ILIKE` support.
    #[must_use]
    pub fn ilike(mut self, value: bool) -> Self {
        self.flavor.ilike = value;
        self
    }

    /// Omits the `AS` keyword before aliases.
    #[must_use]
    pub fn no_as(mut self, value: bool) -> Self {
        self.flavor.no_as = value;
        self
    }

    /// Rewrites boolean literals as tautologies.
    #[must_use]
    pub fn no_boolean(mut self, value: bool) -> Self {
        self.flavor.no_boolean = value;
        self
    }

    /// Declares `NULLS FIRST` / `NULLS LAST` support.
    #[must_use]
    pub fn null_ordering(mut self, value: bool) -> Self {
        self.flavor.null_ordering = value;
        self
    }

    /// Declares aggregate `FILTER` support.
    #[must_use]
    pub fn filter(mut self, value: bool) -> Self {
        self.flavor.filter = value;
        self
    }

    /// Emits `ESCAPE ''` for an empty LIKE escape.
    #[must_use]
    pub fn escape_empty(mut self, value: bool) -> Self {
        self.flavor.escape_empty = value;
        self
    }

    /// Registers a replacement for every function named `name`
    /// (case-insensitive).
    #[must_use]
    pub fn function_override(
        mut self,
        name: &str,
        f: impl Fn(&Function) -> Expr + Send + Sync + 'static,
    ) -> Self {
        self.flavor
            .function_overrides
            .insert(name.to_uppercase(), FunctionOverride::new(f));
        self
    }

    /// Finishes the flavor.
    #[must_use]
    pub fn build(self) -> Flavor {
        self.flavor
    }
}
