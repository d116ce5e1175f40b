//! Small helpers shared by the handler modules.

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use vigil_postgres::query::Pagination;

/// Optional pagination query parameters.
///
/// Missing values fall back to the repository defaults; out-of-range
/// values are clamped rather than rejected.
#[must_use]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Maximum number of records to return.
    pub limit: Option<i64>,
    /// Number of records to skip.
    pub offset: Option<i64>,
}

impl From<PaginationQuery> for Pagination {
    fn from(query: PaginationQuery) -> Self {
        let defaults = Pagination::default();
        Pagination::new(
            query.limit.unwrap_or(defaults.limit),
            query.offset.unwrap_or(defaults.offset),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_params_missing() {
        let pagination = Pagination::from(PaginationQuery::default());
        assert_eq!(pagination, Pagination::default());
    }

    #[test]
    fn explicit_values_are_clamped() {
        let query = PaginationQuery {
            limit: Some(100_000),
            offset: Some(-1),
        };

        let pagination = Pagination::from(query);
        assert_eq!(pagination.limit, 1000);
        assert_eq!(pagination.offset, 0);
    }
}
