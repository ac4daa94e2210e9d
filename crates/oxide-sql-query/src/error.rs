//! Error types for query construction and rendering.

/// Errors raised while building or rendering a query.
///
/// Construction errors are returned by the constructor or setter that
/// received the bad argument; rendering never reports them late.
#[derive(Debug, thiserror::Error)]
pub enum SqlError {
    /// A structural argument was rejected.
    #[error("invalid {field}: {value}")]
    Invalid {
        /// The argument or field that was rejected.
        field: &'static str,
        /// A rendering of the rejected value.
        value: String,
    },

    /// The node has no rendering of its own.
    #[error("rendering is not implemented for {0}")]
    NotImplemented(String),

    /// The from-item has no alias of its own (plain joins).
    #[error("{0} has no alias")]
    NoAlias(&'static str),

    /// An alias was forced onto an item that already has one.
    #[error("an alias is already assigned: {alias}")]
    AliasAssigned {
        /// The alias already in place.
        alias: String,
    },

    /// Placeholder and parameter counts disagree.
    #[error("statement has {placeholders} placeholders but {params} parameters")]
    ParamCount {
        /// Number of `%s` placeholders found in the statement.
        placeholders: usize,
        /// Number of parameters supplied.
        params: usize,
    },

    /// Malformed configuration document.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl SqlError {
    /// Creates an [`SqlError::Invalid`] from anything debuggable.
    pub fn invalid(field: &'static str, value: impl std::fmt::Debug) -> Self {
        Self::Invalid {
            field,
            value: format!("{value:?}"),
        }
    }
}

/// Result type for query construction and rendering.
pub type Result<T> = std::result::Result<T, SqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_names_field_and_value() {
        let err = SqlError::invalid("limit_style", "foo");
        assert_eq!(err.to_string(), "invalid limit_style: \"foo\"");
    }

    #[test]
    fn test_param_count_message() {
        let err = SqlError::ParamCount {
            placeholders: 2,
            params: 1,
        };
        assert_eq!(
            err.to_string(),
            "statement has 2 placeholders but 1 parameters"
        );
    }
}
