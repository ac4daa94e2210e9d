//! Scalar functions.
//!
//! Every function is a [`Function`] node carrying its SQL name, its
//! arguments and a [`FunctionSyntax`] that decides how the call is spelled.
//! The named constructors below (`abs`, `substring`, `trim`, ...) build the
//! standard catalog; [`Function::call`] builds anything else.
//!
//! A flavor may replace a function by name (see
//! [`FlavorBuilder::function_override`](crate::flavor::FlavorBuilder::function_override)).
//! The substitute is rendered in place of the call, with the same
//! arguments and parameters.

use std::fmt;
use std::str::FromStr;

use super::Expr;
use crate::error::{Result, SqlError};
use crate::render::{NodeId, Render, SqlWriter};

/// Position argument of `TRIM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimPosition {
    /// `LEADING`
    Leading,
    /// `TRAILING`
    Trailing,
    /// `BOTH`
    #[default]
    Both,
}

impl TrimPosition {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Leading => "LEADING",
            Self::Trailing => "TRAILING",
            Self::Both => "BOTH",
        }
    }
}

impl FromStr for TrimPosition {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LEADING" => Ok(Self::Leading),
            "TRAILING" => Ok(Self::Trailing),
            "BOTH" => Ok(Self::Both),
            _ => Err(SqlError::invalid("position", s)),
        }
    }
}

impl fmt::Display for TrimPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a function call is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionSyntax {
    /// `NAME(a, b, ...)`
    Call,
    /// `NAME(a KW1 b KW2 c)`: keyword `i` precedes argument `i`; empty
    /// keywords are skipped.
    Keywords(&'static [&'static str]),
    /// `NAME`, without parentheses.
    NotCallable,
    /// `TRIM(position chars FROM string)`, arguments `[string, chars]`.
    Trim(TrimPosition),
    /// `field AT TIME ZONE zone`, arguments `[field, zone]`.
    AtTimeZone,
}

/// A scalar function call.
///
/// A function is also a from-item (`SELECT * FROM NOW() AS "a"`), so it
/// carries an identity for aliasing and optional column definitions.
#[derive(Debug, Clone)]
pub struct Function {
    id: NodeId,
    name: String,
    syntax: FunctionSyntax,
    args: Vec<Expr>,
    columns_definitions: Vec<(String, String)>,
}

impl Function {
    /// Creates a function with an explicit syntax.
    #[must_use]
    pub fn new(name: impl Into<String>, syntax: FunctionSyntax, args: Vec<Expr>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            syntax,
            args,
            columns_definitions: Vec::new(),
        }
    }

    /// Creates a plain `NAME(args...)` call.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(name, FunctionSyntax::Call, args)
    }

    /// Sets the column definitions used when the function is a from-item:
    /// `AS "a" ("c1" int, "c2" text)`.
    #[must_use]
    pub fn with_columns_definitions(mut self, definitions: Vec<(String, String)>) -> Self {
        self.columns_definitions = definitions;
        self
    }

    /// The identity used for aliasing.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The SQL name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The call syntax.
    #[must_use]
    pub const fn syntax(&self) -> FunctionSyntax {
        self.syntax
    }

    /// The arguments.
    #[must_use]
    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    /// The from-item column definitions.
    #[must_use]
    pub fn columns_definitions(&self) -> &[(String, String)] {
        &self.columns_definitions
    }

    pub(crate) fn render_columns_definitions(&self, w: &mut SqlWriter<'_>) {
        for (i, (name, definition)) in self.columns_definitions.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_ident(name);
            w.push(" ");
            w.push(definition);
        }
    }

    fn arg(&self, index: usize) -> Result<&Expr> {
        self.args
            .get(index)
            .ok_or_else(|| SqlError::invalid("args", format!("{} expects {} arguments", self.name, index + 1)))
    }

    fn render_default(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        match self.syntax {
            FunctionSyntax::Call => {
                w.push(&self.name);
                w.push("(");
                w.push_list(&self.args, ", ")?;
                w.push(")");
            }
            FunctionSyntax::Keywords(keywords) => {
                w.push(&self.name);
                w.push("(");
                let mut first = true;
                for (keyword, arg) in keywords.iter().zip(&self.args) {
                    if !keyword.is_empty() {
                        if !first {
                            w.push(" ");
                        }
                        w.push(keyword);
                        first = false;
                    }
                    if !first {
                        w.push(" ");
                    }
                    arg.render(w)?;
                    first = false;
                }
                w.push(")");
            }
            FunctionSyntax::NotCallable => w.push(&self.name),
            FunctionSyntax::Trim(position) => {
                w.push(&self.name);
                w.push("(");
                w.push(position.as_str());
                w.push(" ");
                self.arg(1)?.render(w)?;
                w.push(" FROM ");
                self.arg(0)?.render(w)?;
                w.push(")");
            }
            FunctionSyntax::AtTimeZone => {
                self.arg(0)?.render(w)?;
                w.push(" AT TIME ZONE ");
                self.arg(1)?.render(w)?;
            }
        }
        Ok(())
    }
}

impl Render for Function {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        if let Some(substitute) = w.flavor().function_override(&self.name) {
            return match substitute.apply(self) {
                Expr::Function(f) if f.name.eq_ignore_ascii_case(&self.name) => f.render_default(w),
                other => other.render(w),
            };
        }
        self.render_default(w)
    }
}

macro_rules! nullary_functions {
    ($($(#[$doc:meta])* $fn:ident => $sql:literal;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $fn() -> Function {
                Function::call($sql, Vec::new())
            }
        )+
    };
}

macro_rules! unary_functions {
    ($($(#[$doc:meta])* $fn:ident => $sql:literal;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $fn(arg: impl Into<Expr>) -> Function {
                Function::call($sql, vec![arg.into()])
            }
        )+
    };
}

macro_rules! binary_functions {
    ($($(#[$doc:meta])* $fn:ident => $sql:literal;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $fn(a: impl Into<Expr>, b: impl Into<Expr>) -> Function {
                Function::call($sql, vec![a.into(), b.into()])
            }
        )+
    };
}

macro_rules! variadic_functions {
    ($($(#[$doc:meta])* $fn:ident => $sql:literal;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $fn(args: Vec<Expr>) -> Function {
                Function::call($sql, args)
            }
        )+
    };
}

macro_rules! not_callable_functions {
    ($($(#[$doc:meta])* $fn:ident => $sql:literal;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $fn() -> Function {
                Function::new($sql, FunctionSyntax::NotCallable, Vec::new())
            }
        )+
    };
}

// Mathematical

unary_functions! {
    /// `ABS(x)`
    abs => "ABS";
    /// `CBRT(x)`
    cbrt => "CBRT";
    /// `CEIL(x)`
    ceil => "CEIL";
    /// `DEGREES(x)`
    degrees => "DEGREES";
    /// `EXP(x)`
    exp => "EXP";
    /// `FLOOR(x)`
    floor => "FLOOR";
    /// `LN(x)`
    ln => "LN";
    /// `RADIANS(x)`
    radians => "RADIANS";
    /// `SETSEED(x)`
    setseed => "SETSEED";
    /// `SIGN(x)`
    sign => "SIGN";
    /// `SQRT(x)`
    sqrt => "SQRT";
}

binary_functions! {
    /// `DIV(y, x)`
    div => "DIV";
    /// `MOD(y, x)`
    modulo => "MOD";
    /// `POWER(a, b)`
    power => "POWER";
}

nullary_functions! {
    /// `PI()`
    pi => "PI";
    /// `RANDOM()`
    random => "RANDOM";
}

variadic_functions! {
    /// `LOG([b, ]x)`
    log => "LOG";
    /// `ROUND(x[, s])`
    round => "ROUND";
    /// `TRUNC(x[, s])`
    trunc => "TRUNC";
    /// `WIDTH_BUCKET(op, b1, b2, count)`
    width_bucket => "WIDTH_BUCKET";
}

// Trigonometric

unary_functions! {
    /// `ACOS(x)`
    acos => "ACOS";
    /// `ASIN(x)`
    asin => "ASIN";
    /// `ATAN(x)`
    atan => "ATAN";
    /// `COS(x)`
    cos => "COS";
    /// `COT(x)`
    cot => "COT";
    /// `SIN(x)`
    sin => "SIN";
    /// `TAN(x)`
    tan => "TAN";
}

binary_functions! {
    /// `ATAN2(y, x)`
    atan2 => "ATAN2";
}

// String

unary_functions! {
    /// `BIT_LENGTH(s)`
    bit_length => "BIT_LENGTH";
    /// `CHAR_LENGTH(s)`
    char_length => "CHAR_LENGTH";
    /// `LOWER(s)`
    lower => "LOWER";
    /// `OCTET_LENGTH(s)`
    octet_length => "OCTET_LENGTH";
    /// `UPPER(s)`
    upper => "UPPER";
}

/// `OVERLAY(string PLACING replacement FROM start[ FOR count])`
#[must_use]
pub fn overlay(args: Vec<Expr>) -> Function {
    Function::new(
        "OVERLAY",
        FunctionSyntax::Keywords(&["", "PLACING", "FROM", "FOR"]),
        args,
    )
}

/// `POSITION(substring IN string)`
#[must_use]
pub fn position(substring: impl Into<Expr>, string: impl Into<Expr>) -> Function {
    Function::new(
        "POSITION",
        FunctionSyntax::Keywords(&["", "IN"]),
        vec![substring.into(), string.into()],
    )
}

/// `SUBSTRING(string[ FROM start][ FOR count])`
#[must_use]
pub fn substring(args: Vec<Expr>) -> Function {
    Function::new(
        "SUBSTRING",
        FunctionSyntax::Keywords(&["", "FROM", "FOR"]),
        args,
    )
}

/// `TRIM(BOTH ' ' FROM string)`
#[must_use]
pub fn trim(string: impl Into<Expr>) -> Function {
    trim_with(string, TrimPosition::Both, " ")
}

/// `TRIM(position chars FROM string)`
#[must_use]
pub fn trim_with(
    string: impl Into<Expr>,
    position: TrimPosition,
    chars: impl Into<Expr>,
) -> Function {
    Function::new(
        "TRIM",
        FunctionSyntax::Trim(position),
        vec![string.into(), chars.into()],
    )
}

// Formatting

binary_functions! {
    /// `TO_CHAR(value, format)`
    to_char => "TO_CHAR";
    /// `TO_DATE(text, format)`
    to_date => "TO_DATE";
    /// `TO_NUMBER(text, format)`
    to_number => "TO_NUMBER";
}

variadic_functions! {
    /// `TO_TIMESTAMP(text, format)` or `TO_TIMESTAMP(epoch)`
    to_timestamp => "TO_TIMESTAMP";
}

// Date/Time

variadic_functions! {
    /// `AGE(timestamp[, timestamp])`
    age => "AGE";
}

nullary_functions! {
    /// `CLOCK_TIMESTAMP()`
    clock_timestamp => "CLOCK_TIMESTAMP";
    /// `NOW()`
    now => "NOW";
    /// `STATEMENT_TIMESTAMP()`
    statement_timestamp => "STATEMENT_TIMESTAMP";
    /// `TIMEOFDAY()`
    timeofday => "TIMEOFDAY";
    /// `TRANSACTION_TIMESTAMP()`
    transaction_timestamp => "TRANSACTION_TIMESTAMP";
}

not_callable_functions! {
    /// `CURRENT_DATE`
    current_date => "CURRENT_DATE";
    /// `CURRENT_TIME`
    current_time => "CURRENT_TIME";
    /// `CURRENT_TIMESTAMP`
    current_timestamp => "CURRENT_TIMESTAMP";
    /// `LOCALTIME`
    localtime => "LOCALTIME";
    /// `LOCALTIMESTAMP`
    localtimestamp => "LOCALTIMESTAMP";
}

binary_functions! {
    /// `DATE_PART(field, source)`
    date_part => "DATE_PART";
    /// `DATE_TRUNC(field, source)`
    date_trunc => "DATE_TRUNC";
}

unary_functions! {
    /// `ISFINITE(x)`
    isfinite => "ISFINITE";
    /// `JUSTIFY_DAYS(interval)`
    justify_days => "JUSTIFY_DAYS";
    /// `JUSTIFY_HOURS(interval)`
    justify_hours => "JUSTIFY_HOURS";
    /// `JUSTIFY_INTERVAL(interval)`
    justify_interval => "JUSTIFY_INTERVAL";
}

/// `EXTRACT(field FROM source)`
#[must_use]
pub fn extract(field: impl Into<Expr>, source: impl Into<Expr>) -> Function {
    Function::new(
        "EXTRACT",
        FunctionSyntax::Keywords(&["", "FROM"]),
        vec![field.into(), source.into()],
    )
}

/// `field AT TIME ZONE zone`
#[must_use]
pub fn at_time_zone(field: impl Into<Expr>, zone: impl Into<Expr>) -> Function {
    Function::new(
        "AT TIME ZONE",
        FunctionSyntax::AtTimeZone,
        vec![field.into(), zone.into()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::value::SqlValue;
    use crate::builder::Table;
    use crate::flavor::Flavor;
    use crate::render::RenderContext;

    fn render_with(expr: impl Into<Expr>, flavor: Flavor) -> (String, Vec<SqlValue>) {
        expr.into()
            .to_sql_with(&RenderContext::new(flavor))
            .unwrap()
    }

    fn render(expr: impl Into<Expr>) -> (String, Vec<SqlValue>) {
        render_with(expr, Flavor::default())
    }

    #[test]
    fn test_call() {
        let t = Table::new("t");
        let (sql, params) = render(abs(t.c("c1")));
        assert_eq!(sql, r#"ABS("c1")"#);
        assert!(params.is_empty());

        let (sql, params) = render(power(t.c("c1"), 2));
        assert_eq!(sql, r#"POWER("c1", %s)"#);
        assert_eq!(params, vec![SqlValue::Int(2)]);
    }

    #[test]
    fn test_nullary_call() {
        assert_eq!(render(now()).0, "NOW()");
        assert_eq!(render(pi()).0, "PI()");
    }

    #[test]
    fn test_subquery_argument() {
        let t = Table::new("t");
        let query = t.select(vec![t.c("c1")]).where_clause(t.c("c2").eq(1));
        let (sql, params) = render(abs(query));
        assert_eq!(
            sql,
            r#"ABS((SELECT "a"."c1" FROM "t" AS "a" WHERE ("a"."c2" = %s)))"#
        );
        assert_eq!(params, vec![SqlValue::Int(1)]);
    }

    #[test]
    fn test_keyword_syntax() {
        let t = Table::new("t");
        let (sql, params) = render(overlay(vec![t.c("c1"), Expr::from("test"), Expr::from(3)]));
        assert_eq!(sql, r#"OVERLAY("c1" PLACING %s FROM %s)"#);
        assert_eq!(params.len(), 2);

        let (sql, _) = render(overlay(vec![
            t.c("c1"),
            Expr::from("test"),
            Expr::from(3),
            Expr::from(7),
        ]));
        assert_eq!(sql, r#"OVERLAY("c1" PLACING %s FROM %s FOR %s)"#);

        assert_eq!(
            render(position("foo", t.c("c1"))).0,
            r#"POSITION(%s IN "c1")"#
        );
        assert_eq!(
            render(substring(vec![t.c("c1"), Expr::from(3)])).0,
            r#"SUBSTRING("c1" FROM %s)"#
        );
        assert_eq!(
            render(extract("YEAR", t.c("c1"))).0,
            r#"EXTRACT(%s FROM "c1")"#
        );
    }

    #[test]
    fn test_not_callable() {
        assert_eq!(render(current_date()).0, "CURRENT_DATE");
        assert_eq!(render(localtimestamp()).0, "LOCALTIMESTAMP");
    }

    #[test]
    fn test_trim() {
        let (sql, params) = render(trim(" test "));
        assert_eq!(sql, "TRIM(BOTH %s FROM %s)");
        assert_eq!(
            params,
            vec![
                SqlValue::Text(String::from(" ")),
                SqlValue::Text(String::from(" test "))
            ]
        );

        let t = Table::new("t");
        let (sql, _) = render(trim_with(t.c("c1"), TrimPosition::Leading, "x"));
        assert_eq!(sql, r#"TRIM(LEADING %s FROM "c1")"#);
    }

    #[test]
    fn test_trim_position_from_str() {
        assert_eq!("leading".parse::<TrimPosition>().unwrap(), TrimPosition::Leading);
        assert_eq!("BOTH".parse::<TrimPosition>().unwrap(), TrimPosition::Both);
        let err = "middle".parse::<TrimPosition>().unwrap_err();
        assert!(matches!(err, SqlError::Invalid { field: "position", .. }));
    }

    #[test]
    fn test_at_time_zone() {
        let t = Table::new("t");
        let (sql, params) = render(at_time_zone(t.c("c1"), "UTC"));
        assert_eq!(sql, r#""c1" AT TIME ZONE %s"#);
        assert_eq!(params, vec![SqlValue::Text(String::from("UTC"))]);
    }

    #[test]
    fn test_override_with_other_function() {
        let t = Table::new("t");
        let flavor = Flavor::builder()
            .function_override("ABS", |f| {
                Function::call("MY_ABS", f.args().to_vec()).into()
            })
            .build();
        let (sql, _) = render_with(abs(t.c("c1")), flavor);
        assert_eq!(sql, r#"MY_ABS("c1")"#);
    }

    #[test]
    fn test_override_at_time_zone() {
        let t = Table::new("t");
        let flavor = Flavor::builder()
            .function_override("AT TIME ZONE", |f| {
                Function::call("MY_TIMEZONE", f.args().to_vec()).into()
            })
            .build();
        let (sql, params) = render_with(at_time_zone(t.c("c1"), "UTC"), flavor);
        assert_eq!(sql, r#"MY_TIMEZONE("c1", %s)"#);
        assert_eq!(params, vec![SqlValue::Text(String::from("UTC"))]);
    }

    #[test]
    fn test_override_returning_same_function_uses_default() {
        let t = Table::new("t");
        let flavor = Flavor::builder()
            .function_override("abs", |f| Expr::Function(f.clone()))
            .build();
        let (sql, _) = render_with(abs(t.c("c1")), flavor);
        assert_eq!(sql, r#"ABS("c1")"#);
    }

    #[test]
    fn test_missing_argument_is_invalid() {
        let f = Function::new("TRIM", FunctionSyntax::Trim(TrimPosition::Both), vec![]);
        let err = Expr::from(f)
            .to_sql_with(&RenderContext::new(Flavor::default()))
            .unwrap_err();
        assert!(matches!(err, SqlError::Invalid { field: "args", .. }));
    }
}
