//! Domain error types.

use common::{CatalogId, VariantId};
use store::StoreError;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::discount::DiscountConflict;
use crate::pricing::PricingError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the document store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A price could not be computed.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// The catalog service failed or did not know the item.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The requested discount window overlaps an active discount.
    #[error("Discount conflict: {0}")]
    DiscountConflict(DiscountConflict),

    #[error("Invalid discount: {0}")]
    InvalidDiscount(String),

    #[error("Invalid sale: {0}")]
    InvalidSale(String),

    /// The variant is already in the cart.
    #[error("Variant {variant_id} of catalog {catalog_id} is already in the cart")]
    DuplicateCartItem {
        catalog_id: CatalogId,
        variant_id: VariantId,
    },

    /// The catalog item does not list the variant.
    #[error("Catalog {catalog_id} has no variant {variant_id}")]
    UnknownVariant {
        catalog_id: CatalogId,
        variant_id: VariantId,
    },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// An update carried no fields.
    #[error("Update contains no fields")]
    EmptyUpdate,

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true for errors caused by the request itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::DiscountConflict(_)
                | DomainError::InvalidDiscount(_)
                | DomainError::InvalidSale(_)
                | DomainError::DuplicateCartItem { .. }
                | DomainError::UnknownVariant { .. }
                | DomainError::InvalidQuantity(_)
                | DomainError::EmptyUpdate
        )
    }

    /// Returns true if a referenced entity does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            DomainError::NotFound { .. } => true,
            DomainError::Store(StoreError::NotFound { .. }) => true,
            DomainError::Catalog(e) => e.is_not_found(),
            _ => false,
        }
    }
}
