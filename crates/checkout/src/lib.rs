//! Checkout for the storefront pricing pipeline.
//!
//! Both checkout paths share one pipeline:
//! 1. Re-fetch live variant, price, discount and stock data per item
//! 2. Collect every stock failure; fail with the whole report if any
//! 3. Re-price with the live discount and group items by brand
//! 4. Submit one order per brand in a single call
//!
//! [`CheckoutAssembler`] feeds it from a persisted cart and clears the cart
//! afterwards; [`ExpressCheckout`] feeds it from the request.

pub mod assembler;
pub mod error;
pub mod express;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod services;

pub use assembler::CheckoutAssembler;
pub use error::{CheckoutError, Result};
pub use express::ExpressCheckout;
pub use model::{
    CheckoutConfig, CheckoutLine, ExpressItemOrder, ExpressOrder, OrderContext, OrderItem,
    OrderOpts, OrderSource, PlacedOrder,
};
pub use pipeline::OrderPipeline;
pub use report::{StockFailure, StockFailureReason, StockReport};
pub use services::{HttpOrderClient, InMemoryOrderService, OrderService, OrderServiceError};
