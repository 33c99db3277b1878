//! Checkout error types.

use common::UserId;
use domain::{CatalogError, DomainError, PricingError};
use thiserror::Error;

use crate::report::StockReport;
use crate::services::OrderServiceError;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The user has no cart.
    #[error("Cart not found for user {0}")]
    CartNotFound(UserId),

    /// There is nothing to check out.
    #[error("Cart of user {0} is empty")]
    EmptyCart(UserId),

    /// A requested item is malformed.
    #[error("Invalid checkout item: {0}")]
    InvalidItem(String),

    /// One or more items cannot be fulfilled. No order was submitted.
    #[error("{0}")]
    OutOfStock(StockReport),

    /// Catalog lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Order submission failed.
    #[error("Order service error: {0}")]
    Order(#[from] OrderServiceError),

    /// A collaborator call exceeded its deadline.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Live pricing produced an invalid price.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Domain error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl CheckoutError {
    /// Returns true for errors caused by the request itself.
    pub fn is_validation(&self) -> bool {
        match self {
            CheckoutError::EmptyCart(_) | CheckoutError::InvalidItem(_) => true,
            CheckoutError::Domain(e) => e.is_validation(),
            _ => false,
        }
    }

    /// Returns true if a referenced entity does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            CheckoutError::CartNotFound(_) => true,
            CheckoutError::Catalog(e) => e.is_not_found(),
            CheckoutError::Domain(e) => e.is_not_found(),
            _ => false,
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
