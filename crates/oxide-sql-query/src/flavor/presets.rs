//! Ready-made flavors for common databases.

use super::{Flavor, LimitStyle, ParamStyle};

impl Flavor {
    /// PostgreSQL: native `ILIKE` and aggregate `FILTER`.
    #[must_use]
    pub fn postgresql() -> Self {
        Self::builder().ilike(true).filter(true).build()
    }

    /// SQLite: `?` markers, and `LIMIT -1` when only an offset is given.
    #[must_use]
    pub fn sqlite() -> Self {
        Self::builder()
            .param_style(ParamStyle::Qmark)
            .max_limit(-1)
            .build()
    }

    /// Oracle: `ROWNUM` pagination, no `AS` before aliases, no boolean
    /// literals and no NULL ordering.
    #[must_use]
    pub fn oracle() -> Self {
        Self::builder()
            .limit_style(LimitStyle::Rownum)
            .no_as(true)
            .no_boolean(true)
            .null_ordering(false)
            .build()
    }

    /// SQL Server: `OFFSET ... FETCH` pagination and `?` markers.
    #[must_use]
    pub fn mssql() -> Self {
        Self::builder()
            .limit_style(LimitStyle::Fetch)
            .param_style(ParamStyle::Qmark)
            .no_boolean(true)
            .null_ordering(false)
            .build()
    }
}
