//! HTTP route handlers.

pub mod carts;
pub mod checkout;
pub mod customers;
pub mod discounts;
pub mod health;
pub mod metrics;
