/// Success envelope types
///
/// Every success body carries `"success": true` plus one of four shapes:
///
/// - `{success, data}` for single resources
/// - `{success, count, data}` for unpaginated collections
/// - `{success, count, pagination, data}` for paginated collections
/// - `{success, data: {}, message}` for acknowledgements (deletes, logout)

use serde::Serialize;
use serde_json::json;
use taskboard_shared::services::Pagination;

/// Single-resource envelope
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    /// Always true
    pub success: bool,

    /// Response payload
    pub data: T,
}

impl<T> DataResponse<T> {
    /// Wraps a payload
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Collection envelope with a count
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    /// Always true
    pub success: bool,

    /// Number of items in `data`
    pub count: usize,

    /// Response payload
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    /// Wraps a collection; the count is the page's item count
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Paginated collection envelope
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    /// Always true
    pub success: bool,

    /// Number of items in `data` (this page, not the total)
    pub count: usize,

    /// Pagination metadata
    pub pagination: Pagination,

    /// Response payload
    pub data: Vec<T>,
}

impl<T> PageResponse<T> {
    /// Wraps one page of a collection
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            count: data.len(),
            pagination,
            data,
        }
    }
}

/// Acknowledgement envelope with an empty data object
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Always true
    pub success: bool,

    /// Empty object, kept for wire compatibility
    pub data: serde_json::Value,

    /// Human-readable confirmation
    pub message: String,
}

impl MessageResponse {
    /// Wraps a confirmation message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: json!({}),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_shared::services::{PageRequest, Pagination};

    #[test]
    fn test_data_envelope() {
        let json = serde_json::to_value(DataResponse::new(json!({"id": 1}))).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["id"], 1);
    }

    #[test]
    fn test_list_envelope_counts_items() {
        let json = serde_json::to_value(ListResponse::new(vec![1, 2, 3])).unwrap();
        assert_eq!(json["count"], 3);
        assert_eq!(json["data"], json!([1, 2, 3]));
    }

    #[test]
    fn test_page_envelope() {
        let pagination = Pagination::new(12, &PageRequest { page: 2, limit: 5 });
        let json = serde_json::to_value(PageResponse::new(vec![1, 2, 3, 4, 5], pagination)).unwrap();

        assert_eq!(json["count"], 5);
        assert_eq!(json["pagination"]["total"], 12);
        assert_eq!(json["pagination"]["page"], 2);
        assert_eq!(json["pagination"]["pages"], 3);
    }

    #[test]
    fn test_message_envelope() {
        let json = serde_json::to_value(MessageResponse::new("Task deleted successfully")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], json!({}));
        assert_eq!(json["message"], "Task deleted successfully");
    }
}
