//! The order collaborator: trait, in-memory and HTTP implementations.

pub mod order;
pub mod order_http;

pub use order::{InMemoryOrderService, OrderService, OrderServiceError};
pub use order_http::HttpOrderClient;
