//! Order service trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{OrderOpts, PlacedOrder};

/// Errors returned by order submission.
#[derive(Debug, Clone, Error)]
pub enum OrderServiceError {
    #[error("Order request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Order request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The service answered with `success = false`.
    #[error("Order request to {url} was unsuccessful: {message}")]
    Unsuccessful { url: String, message: String },

    #[error("Could not decode order response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Order request to {url} timed out")]
    Timeout { url: String },
}

/// Trait for submitting orders to the external order service.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Submits every order in one request. Either all are placed or the call fails.
    async fn submit_orders(
        &self,
        orders: Vec<OrderOpts>,
    ) -> Result<Vec<PlacedOrder>, OrderServiceError>;
}

#[async_trait]
impl<T: OrderService + ?Sized> OrderService for Arc<T> {
    async fn submit_orders(
        &self,
        orders: Vec<OrderOpts>,
    ) -> Result<Vec<PlacedOrder>, OrderServiceError> {
        (**self).submit_orders(orders).await
    }
}

#[derive(Debug, Default)]
struct InMemoryOrderState {
    batches: Vec<Vec<OrderOpts>>,
    next_id: u32,
    fail_on_submit: bool,
}

/// In-memory order service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderService {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderService {
    /// Creates a new in-memory order service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to reject submissions.
    pub fn set_fail_on_submit(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_submit = fail;
    }

    /// Returns every order submitted so far, in submission order.
    pub fn submitted_orders(&self) -> Vec<OrderOpts> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .batches
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    /// Returns the number of submission calls that succeeded.
    pub fn batch_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .batches
            .len()
    }
}

#[async_trait]
impl OrderService for InMemoryOrderService {
    async fn submit_orders(
        &self,
        orders: Vec<OrderOpts>,
    ) -> Result<Vec<PlacedOrder>, OrderServiceError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_submit {
            return Err(OrderServiceError::Unsuccessful {
                url: "memory://order".to_string(),
                message: "order service rejected the batch".to_string(),
            });
        }

        let mut placed = Vec::with_capacity(orders.len());
        for order in &orders {
            state.next_id += 1;
            placed.push(PlacedOrder {
                id: format!("ORD-{:04}", state.next_id),
                brand_id: order.brand_id.clone(),
                status: Some("placed".to_string()),
            });
        }
        state.batches.push(orders);
        Ok(placed)
    }
}
