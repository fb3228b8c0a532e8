/// Project and task services
///
/// The services are the only place authorization decisions and cache
/// coherence live. Each is an explicit object constructed once at process
/// start with injected store and cache handles, then shared by reference
/// with every request handler.
///
/// # Modules
///
/// - `projects`: Project visibility, lifecycle, and cascading delete
/// - `tasks`: Task permissions, assignee/member consistency, statistics

pub mod projects;
pub mod tasks;

use serde::{Deserialize, Serialize};

/// Default page number when absent or unparseable
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size when absent or unparseable
pub const DEFAULT_LIMIT: i64 = 10;

/// Upper bound on the page size
///
/// The limit was historically unbounded; the cap is a deliberate guard
/// against a single request materializing an entire collection.
pub const MAX_LIMIT: i64 = 100;

/// Error type raised by the services
///
/// `NotFound` covers both a truly absent resource and an actor who lacks
/// even visibility of it; `Forbidden` means the resource is visible but the
/// actor lacks the specific permission. Store errors propagate unchanged;
/// cache errors never surface at all.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Resource absent, or actor lacks visibility of it
    #[error("{0}")]
    NotFound(String),

    /// Resource visible but the actor lacks the specific permission
    #[error("{0}")]
    Forbidden(String),

    /// Underlying store failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Validated pagination parameters
///
/// Page and limit default to 1 and 10 when absent or non-numeric; the
/// limit is capped at [`MAX_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: i64,

    /// Page size
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Parses raw query-string values, falling back to defaults for absent
    /// or non-numeric input
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE);

        let limit = limit
            .and_then(|l| l.parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);

        Self { page, limit }
    }

    /// Row offset for this page
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Pagination metadata returned alongside a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Total matching rows
    pub total: i64,

    /// 1-based page number served
    pub page: i64,

    /// Total number of pages (ceiling of total / limit)
    pub pages: i64,
}

impl Pagination {
    /// Computes pagination metadata for a page request
    pub fn new(total: i64, request: &PageRequest) -> Self {
        Self {
            total,
            page: request.page,
            pages: (total + request.limit - 1) / request.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        assert_eq!(PageRequest::from_raw(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::from_raw(Some("abc"), Some("xyz")),
            PageRequest {
                page: 1,
                limit: 10
            }
        );
        assert_eq!(
            PageRequest::from_raw(Some("0"), Some("-3")),
            PageRequest {
                page: 1,
                limit: 10
            }
        );
    }

    #[test]
    fn test_page_request_parses_and_caps() {
        let req = PageRequest::from_raw(Some("2"), Some("5"));
        assert_eq!(req.page, 2);
        assert_eq!(req.limit, 5);
        assert_eq!(req.offset(), 5);

        let capped = PageRequest::from_raw(Some("1"), Some("5000"));
        assert_eq!(capped.limit, MAX_LIMIT);
    }

    #[test]
    fn test_pagination_pages_is_ceiling() {
        let req = PageRequest { page: 2, limit: 5 };

        assert_eq!(Pagination::new(12, &req).pages, 3);
        assert_eq!(Pagination::new(10, &req).pages, 2);
        assert_eq!(Pagination::new(0, &req).pages, 0);
        assert_eq!(Pagination::new(1, &req).pages, 1);
    }

    #[test]
    fn test_pagination_for_second_page_of_twelve() {
        // 12 tasks, page=2, limit=5 -> 5 rows, {total: 12, page: 2, pages: 3}
        let req = PageRequest::from_raw(Some("2"), Some("5"));
        let pagination = Pagination::new(12, &req);

        assert_eq!(
            pagination,
            Pagination {
                total: 12,
                page: 2,
                pages: 3
            }
        );
    }
}
