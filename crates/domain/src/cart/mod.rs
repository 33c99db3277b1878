//! Carts: one per user, holding priced snapshots of catalog variants.

mod model;
mod service;

pub use model::{
    AddToCart, Address, Cart, CartInfo, CartItem, CartItemInfo, CatalogSnapshot, SetCartAddress,
    UpdateItemQty,
};
pub use service::CartService;

/// Collection holding cart documents.
pub const CART_COLLECTION: &str = "cart";
