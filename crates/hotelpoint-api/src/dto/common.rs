//! Common DTOs used across the API

use chrono::NaiveDate;
use hotelpoint_core::traits::Pagination;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: i64,

    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 1000))]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    50
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl From<&PaginationParams> for Pagination {
    fn from(params: &PaginationParams) -> Self {
        Pagination::new(params.page, params.per_page)
    }
}

/// Inclusive date range query (`?from_date=2030-06-01&to_date=2030-06-30`)
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_date_range"))]
pub struct DateRangeQuery {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

fn validate_date_range(query: &DateRangeQuery) -> Result<(), ValidationError> {
    if query.from_date > query.to_date {
        let mut err = ValidationError::new("date_range");
        err.message = Some("from_date cannot be after to_date".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_conversion() {
        let params = PaginationParams {
            page: 3,
            per_page: 20,
        };
        let pagination = Pagination::from(&params);
        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.limit(), 20);

        let params = PaginationParams {
            page: 0,
            per_page: 20,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_date_range_validation() {
        let range: DateRangeQuery =
            serde_json::from_str(r#"{"from_date":"2030-06-10","to_date":"2030-06-01"}"#).unwrap();
        assert!(range.validate().is_err());

        let range: DateRangeQuery =
            serde_json::from_str(r#"{"from_date":"2030-06-01","to_date":"2030-06-01"}"#).unwrap();
        assert!(range.validate().is_ok());
    }

    #[test]
    fn test_api_response() {
        let resp = ApiResponse::success("test");
        assert_eq!(resp.data, "test");
        assert!(resp.message.is_none());

        let resp = ApiResponse::with_message("data", "done");
        assert_eq!(resp.message, Some("done".to_string()));
    }
}
