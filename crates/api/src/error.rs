//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CheckoutError, OrderServiceError};
use domain::{CatalogError, DomainError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),
    /// Cart, discount and catalog errors.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Checkout errors.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(err) => domain_status(err),
            ApiError::Checkout(err) => checkout_status(err),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, %status, "request failed");
        }

        let mut body = serde_json::json!({ "error": self.to_string() });
        if let ApiError::Checkout(CheckoutError::OutOfStock(report)) = &self {
            body["unavailable"] = serde_json::to_value(report).unwrap_or_default();
        }
        (status, axum::Json(body)).into_response()
    }
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::DiscountConflict(_) | DomainError::DuplicateCartItem { .. } => {
            StatusCode::CONFLICT
        }
        DomainError::UnknownVariant { .. } | DomainError::Pricing(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DomainError::Catalog(e) => catalog_status(e),
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        e if e.is_validation() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn checkout_status(err: &CheckoutError) -> StatusCode {
    match err {
        CheckoutError::CartNotFound(_) => StatusCode::NOT_FOUND,
        CheckoutError::EmptyCart(_) | CheckoutError::InvalidItem(_) => StatusCode::BAD_REQUEST,
        CheckoutError::OutOfStock(_) => StatusCode::CONFLICT,
        CheckoutError::Pricing(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CheckoutError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        CheckoutError::Catalog(e) => catalog_status(e),
        CheckoutError::Order(OrderServiceError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
        CheckoutError::Order(_) => StatusCode::BAD_GATEWAY,
        CheckoutError::Domain(e) => domain_status(e),
    }
}

fn catalog_status(err: &CatalogError) -> StatusCode {
    match err {
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        CatalogError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
mod tests {
    use common::{CatalogId, UserId, VariantId};

    use super::*;

    #[test]
    fn test_domain_status_mapping() {
        assert_eq!(
            domain_status(&DomainError::not_found("cart", "u-1")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            domain_status(&DomainError::EmptyUpdate),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            domain_status(&DomainError::DuplicateCartItem {
                catalog_id: CatalogId::new("c"),
                variant_id: VariantId::new("v"),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            domain_status(&DomainError::Catalog(CatalogError::Timeout {
                url: "http://catalog".to_string()
            })),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_checkout_status_mapping() {
        assert_eq!(
            checkout_status(&CheckoutError::OutOfStock(Default::default())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            checkout_status(&CheckoutError::CartNotFound(UserId::new("u"))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            checkout_status(&CheckoutError::Order(OrderServiceError::Status {
                url: "http://order".to_string(),
                status: 500
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            checkout_status(&CheckoutError::Timeout {
                operation: "order submission".to_string(),
                timeout_ms: 10
            }),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
