use serde::Deserialize;
use utoipa::IntoParams;

/// Pagination query parameters. Both must be present and positive to open a
/// window; anything else means the caller wants the full, unpaginated list
/// (the legacy `-1, -1` contract).
#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn window(&self) -> (i64, i64) {
        match (self.page, self.limit) {
            (Some(page), Some(limit)) if page > 0 && limit > 0 => ((page - 1) * limit, limit),
            _ => (-1, -1),
        }
    }
}

/// Offset-based pagination used by the `/v2` configuration endpoints.
/// Defaults to the first ten rows; `-1, -1` requests the full list.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StartLimitQuery {
    pub start: Option<i64>,
    pub limit: Option<i64>,
}

impl StartLimitQuery {
    pub fn window(&self) -> (i64, i64) {
        (self.start.unwrap_or(0), self.limit.unwrap_or(10))
    }
}

/// SQL tail for a `(start, limit)` window; empty when unbounded.
pub fn limit_clause(start: i64, limit: i64) -> String {
    if start == -1 && limit == -1 {
        String::new()
    } else {
        format!(" LIMIT {limit} OFFSET {start}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_params_mean_unbounded() {
        let q = PageQuery {
            page: None,
            limit: None,
        };
        assert_eq!(q.window(), (-1, -1));
        assert_eq!(limit_clause(-1, -1), "");
    }

    #[test]
    fn window_is_zero_based_offset() {
        let q = PageQuery {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(q.window(), (20, 10));
        assert_eq!(limit_clause(20, 10), " LIMIT 10 OFFSET 20");
    }

    #[test]
    fn non_positive_page_falls_back_to_unbounded() {
        let q = PageQuery {
            page: Some(0),
            limit: Some(10),
        };
        assert_eq!(q.window(), (-1, -1));
    }
}
