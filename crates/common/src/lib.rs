//! Shared types for the cart, discount and checkout crates.

pub mod envelope;
pub mod money;
pub mod types;

pub use envelope::Envelope;
pub use money::{DEFAULT_CURRENCY, Money};
pub use types::{
    BrandId, CartId, CartItemId, CatalogId, CustomerId, DiscountId, SaleId, UserId, VariantId,
};
