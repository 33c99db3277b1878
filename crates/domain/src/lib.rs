//! Domain layer for the storefront pricing pipeline.
//!
//! This crate provides:
//! - The pricing engine for flat and percent discounts
//! - Discounts and sales, with a validator keeping active windows disjoint
//! - The catalog collaborator (trait, in-memory and HTTP implementations)
//! - Customers and their one-per-user carts

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod discount;
pub mod error;
pub mod pricing;

pub use cart::{
    AddToCart, Address, Cart, CartInfo, CartItem, CartItemInfo, CartService, CatalogSnapshot,
    SetCartAddress, UpdateItemQty,
};
pub use catalog::{
    CatalogError, CatalogInfo, CatalogService, CatalogVariant, HttpCatalogClient,
    InMemoryCatalogService, InventoryInfo, InventoryStatus, VariantInfo,
};
pub use customer::{Customer, CustomerService};
pub use discount::{
    CreateDiscount, CreateSale, Discount, DiscountConflict, DiscountInfo, DiscountKind,
    DiscountService, DiscountValidator, DiscountWindow, Sale,
};
pub use error::DomainError;
pub use pricing::{
    DiscountedPrice, PricingError, UnitPrice, compute_discounted_price, price_variant,
};
