//! Serializable flavor configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Flavor, LimitStyle, ParamStyle};
use crate::error::{Result, SqlError};

/// A flavor as it appears in a configuration document.
///
/// ```rust
/// use oxide_sql_query::flavor::{Flavor, LimitStyle};
///
/// let flavor = Flavor::from_json(r#"{"limit_style": "fetch", "param_style": "qmark"}"#).unwrap();
/// assert_eq!(flavor.limit_style(), LimitStyle::Fetch);
/// assert_eq!(flavor.param(), "?");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlavorConfig {
    /// `"limit"`, `"fetch"` or `"rownum"`.
    pub limit_style: String,
    /// Integer limit used when only an offset is given.
    pub max_limit: Value,
    /// `"format"` or `"qmark"`.
    pub param_style: String,
    /// Native `ILIKE` support.
    pub ilike: bool,
    /// Omit `AS` before aliases.
    pub no_as: bool,
    /// No boolean literals.
    pub no_boolean: bool,
    /// `NULLS FIRST` / `NULLS LAST` support.
    pub null_ordering: bool,
    /// Aggregate `FILTER` support.
    pub filter: bool,
    /// Emit `ESCAPE ''` for an empty escape.
    pub escape_empty: bool,
}

impl Default for FlavorConfig {
    fn default() -> Self {
        Self {
            limit_style: String::from(LimitStyle::Limit.as_str()),
            max_limit: Value::Null,
            param_style: String::from(ParamStyle::Format.as_str()),
            ilike: false,
            no_as: false,
            no_boolean: false,
            null_ordering: true,
            filter: false,
            escape_empty: false,
        }
    }
}

impl TryFrom<FlavorConfig> for Flavor {
    type Error = SqlError;

    fn try_from(config: FlavorConfig) -> Result<Self> {
        let max_limit = match &config.max_limit {
            Value::Null => None,
            Value::Number(n) => Some(
                n.as_i64()
                    .ok_or_else(|| SqlError::invalid("max_limit", &config.max_limit))?,
            ),
            other => return Err(SqlError::invalid("max_limit", other)),
        };

        Ok(Self {
            limit_style: config.limit_style.parse()?,
            max_limit,
            param_style: config.param_style.parse()?,
            ilike: config.ilike,
            no_as: config.no_as,
            no_boolean: config.no_boolean,
            null_ordering: config.null_ordering,
            filter: config.filter,
            escape_empty: config.escape_empty,
            ..Self::default()
        })
    }
}

impl From<&Flavor> for FlavorConfig {
    fn from(flavor: &Flavor) -> Self {
        Self {
            limit_style: String::from(flavor.limit_style.as_str()),
            max_limit: flavor.max_limit.map_or(Value::Null, Value::from),
            param_style: String::from(flavor.param_style.as_str()),
            ilike: flavor.ilike,
            no_as: flavor.no_as,
            no_boolean: flavor.no_boolean,
            null_ordering: flavor.null_ordering,
            filter: flavor.filter,
            escape_empty: flavor.escape_empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let flavor = Flavor::from_json("{}").unwrap();
        assert_eq!(flavor.limit_style(), LimitStyle::Limit);
        assert_eq!(flavor.param(), "%s");
        assert!(flavor.null_ordering());
        assert_eq!(flavor.max_limit(), None);
    }

    #[test]
    fn test_full_document() {
        let flavor = Flavor::from_json(
            r#"{
                "limit_style": "rownum",
                "max_limit": 100,
                "param_style": "qmark",
                "no_as": true,
                "null_ordering": false,
                "escape_empty": true
            }"#,
        )
        .unwrap();
        assert_eq!(flavor.limit_style(), LimitStyle::Rownum);
        assert_eq!(flavor.max_limit(), Some(100));
        assert!(flavor.no_as());
        assert!(!flavor.null_ordering());
        assert!(flavor.escape_empty());
    }

    #[test]
    fn test_invalid_limit_style() {
        let err = Flavor::from_json(r#"{"limit_style": "foo"}"#).unwrap_err();
        assert!(matches!(err, SqlError::Invalid { field: "limit_style", .. }));
    }

    #[test]
    fn test_invalid_param_style() {
        let err = Flavor::from_json(r#"{"param_style": "numeric"}"#).unwrap_err();
        assert!(matches!(err, SqlError::Invalid { field: "param_style", .. }));
    }

    #[test]
    fn test_non_integer_max_limit() {
        let err = Flavor::from_json(r#"{"max_limit": "foo"}"#).unwrap_err();
        assert!(matches!(err, SqlError::Invalid { field: "max_limit", .. }));
        let err = Flavor::from_json(r#"{"max_limit": 1.5}"#).unwrap_err();
        assert!(matches!(err, SqlError::Invalid { field: "max_limit", .. }));
    }

    #[test]
    fn test_unknown_field_is_a_config_error() {
        let err = Flavor::from_json(r#"{"paramstyle": "qmark"}"#).unwrap_err();
        assert!(matches!(err, SqlError::Config(_)));
    }

    #[test]
    fn test_config_from_flavor() {
        let config = FlavorConfig::from(&Flavor::sqlite());
        assert_eq!(config.param_style, "qmark");
        assert_eq!(config.max_limit, Value::from(-1));
        let back = Flavor::try_from(config).unwrap();
        assert_eq!(back.max_limit(), Some(-1));
    }
}
