//! Error handling utilities for API responses.
//!
//! Provides structured error responses and conversion between service-layer
//! errors and HTTP responses. Includes:
//! - The standard `{detail, code}` error body
//! - ServiceError to HTTP status code mapping
//! - Pagination support for list endpoints
//!
//! # Error Handling Flow
//! 1. Service layer returns domain-specific `ServiceError`
//! 2. `ApiError::from` converts it to the appropriate HTTP response
//! 3. Handlers bubble everything with `?`

use crate::errors::ServiceError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Error body for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub detail: String,
    /// Machine-readable error code
    pub code: String,
}

/// HTTP error response carrying the standard body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                detail: detail.into(),
                code: code.into(),
            },
        }
    }

    pub fn not_authenticated() -> Self {
        ServiceError::NotAuthenticated.into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Converts ServiceError to the appropriate HTTP response
impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        let (status, code, detail) = match error {
            ServiceError::Validation { message } => {
                (StatusCode::BAD_REQUEST, "validation_error", message)
            }
            ServiceError::NotFound { entity, identifier } => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} '{}' not found", entity, identifier),
            ),
            ServiceError::AccountNotActive => (
                StatusCode::BAD_REQUEST,
                "ACCOUNT_NOT_ACTIVE",
                ServiceError::AccountNotActive.to_string(),
            ),
            ServiceError::EmailNotVerified => (
                StatusCode::BAD_REQUEST,
                "EMAIL_NOT_VERIFIED",
                ServiceError::EmailNotVerified.to_string(),
            ),
            ServiceError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                ServiceError::InvalidToken.to_string(),
            ),
            ServiceError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                "not_authenticated",
                ServiceError::NotAuthenticated.to_string(),
            ),
            ServiceError::PermissionDenied { message } => {
                (StatusCode::FORBIDDEN, "permission_denied", message)
            }
            ServiceError::Database { source } => {
                tracing::error!("Database error: {}", source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
            ServiceError::ExternalService { message } => {
                (StatusCode::BAD_GATEWAY, "external_service_error", message)
            }
        };

        ApiError::new(status, detail, code)
    }
}

/// Pagination parameters for requests
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PaginationFilter {
    /// Page number (1-indexed)
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    /// Number of items per page
    #[validate(range(min = 1, max = 100))]
    pub per_page: Option<u32>,
}

impl PaginationFilter {
    /// Get page number with default
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    /// Get per_page with default
    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(20)
    }

    /// Calculate offset for database queries
    pub fn offset(&self) -> u64 {
        ((self.page() - 1) * self.per_page()) as u64
    }

    /// Get limit for database queries
    pub fn limit(&self) -> u64 {
        self.per_page() as u64
    }
}

impl Default for PaginationFilter {
    fn default() -> Self {
        Self {
            page: Some(1),
            per_page: Some(20),
        }
    }
}

/// Pagination metadata for list responses
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub current_page: u32,
    /// Number of items per page
    pub per_page: u32,
    /// Total number of items across all pages
    pub total_items: u64,
    /// Total number of pages
    pub total_pages: u32,
    /// Whether there is a next page
    pub has_next: bool,
    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from page parameters and total count
    pub fn new(current_page: u32, per_page: u32, total_items: u64) -> Self {
        let total_pages = if total_items == 0 {
            1
        } else {
            ((total_items - 1) / per_page as u64 + 1) as u32
        };

        Self {
            current_page,
            per_page,
            total_items,
            total_pages,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
        }
    }

    pub fn from_filter(filter: &PaginationFilter, total_items: u64) -> Self {
        Self::new(filter.page(), filter.per_page(), total_items)
    }
}

/// Paginated response wrapper containing items and pagination metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// List of items for current page
    pub items: Vec<T>,
    /// Metadata about current page, total items, etc.
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, pagination: PaginationMeta) -> Self {
        Self { items, pagination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_meta_calculation() {
        // Test normal pagination
        let meta = PaginationMeta::new(2, 10, 25);
        assert_eq!(meta.current_page, 2);
        assert_eq!(meta.per_page, 10);
        assert_eq!(meta.total_items, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        // Test first page
        let meta = PaginationMeta::new(1, 10, 25);
        assert!(!meta.has_prev);
        assert!(meta.has_next);

        // Test last page
        let meta = PaginationMeta::new(3, 10, 25);
        assert!(meta.has_prev);
        assert!(!meta.has_next);

        // Test empty result set
        let meta = PaginationMeta::new(1, 10, 0);
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_pagination_filter() {
        let filter = PaginationFilter {
            page: Some(2),
            per_page: Some(50),
        };
        assert_eq!(filter.page(), 2);
        assert_eq!(filter.per_page(), 50);
        assert_eq!(filter.offset(), 50);
        assert_eq!(filter.limit(), 50);
    }

    #[test]
    fn test_error_body_shape() {
        let error: ApiError = ServiceError::AccountNotActive.into();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.body.code, "ACCOUNT_NOT_ACTIVE");

        let json = serde_json::to_value(&error.body).unwrap();
        assert!(json.get("detail").is_some());
        assert_eq!(json["code"], "ACCOUNT_NOT_ACTIVE");
    }

    #[test]
    fn test_invalid_token_maps_to_401() {
        let error: ApiError = ServiceError::InvalidToken.into();
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error.body.code, "invalid_token");
    }
}
