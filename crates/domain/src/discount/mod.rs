//! Discounts, sales and the window validator that keeps them disjoint.

mod model;
mod service;
mod validator;

pub use model::{
    CreateDiscount, CreateSale, Discount, DiscountInfo, DiscountKind, DiscountWindow, Sale,
};
pub use service::DiscountService;
pub use validator::{DiscountConflict, DiscountValidator, find_conflict};

/// Collection holding discount documents.
pub const DISCOUNT_COLLECTION: &str = "discount";

/// Collection holding sale documents.
pub const SALE_COLLECTION: &str = "sale";
