//! Checkout of a user's persisted cart.

use std::time::Instant;

use common::{CartItemId, UserId};
use domain::{CartService, CatalogService};
use store::DocumentStore;

use crate::error::{CheckoutError, Result};
use crate::model::{CheckoutConfig, CheckoutLine, OrderContext, OrderSource, PlacedOrder};
use crate::pipeline::OrderPipeline;
use crate::services::OrderService;

/// Turns a cart into one order per brand.
///
/// The cart's stored prices are only a snapshot: every item is re-fetched
/// and re-priced before anything is submitted. On success the ordered items
/// are removed from the cart; a failed removal is logged and does not undo
/// the placed orders.
pub struct CheckoutAssembler<S, C, O> {
    carts: CartService<S, C>,
    pipeline: OrderPipeline<C, O>,
}

impl<S, C, O> CheckoutAssembler<S, C, O>
where
    S: DocumentStore,
    C: CatalogService + Clone,
    O: OrderService,
{
    pub fn new(store: S, catalog: C, orders: O, config: CheckoutConfig) -> Self {
        Self {
            carts: CartService::new(store, catalog.clone()),
            pipeline: OrderPipeline::new(catalog, orders, config),
        }
    }

    /// Checks out the user's cart.
    #[tracing::instrument(skip(self))]
    pub async fn checkout(&self, user_id: &UserId) -> Result<Vec<PlacedOrder>> {
        metrics::counter!("checkout_attempts_total", "source" => "cart").increment(1);
        let start = Instant::now();

        let cart = self.carts.get_cart(user_id).await.map_err(|e| {
            if e.is_not_found() {
                CheckoutError::CartNotFound(user_id.clone())
            } else {
                e.into()
            }
        })?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart(user_id.clone()));
        }

        let lines: Vec<CheckoutLine> = cart.items.iter().map(CheckoutLine::from).collect();
        let item_ids: Vec<CartItemId> = cart.items.iter().map(|item| item.id.clone()).collect();
        let context = OrderContext {
            user_id: user_id.clone(),
            shipping_address: cart.shipping_address.clone(),
            billing_address: cart.billing_address.clone(),
            source: OrderSource::Cart,
        };
        let placed = self.pipeline.place_orders(&context, &lines).await?;

        // only the lines that were ordered; items added meanwhile stay
        if let Err(e) = self.carts.remove_items(user_id, &item_ids).await {
            tracing::error!(cart_id = %cart.id, error = %e, "failed to clear ordered items from cart");
        }

        metrics::histogram!("checkout_duration_seconds", "source" => "cart")
            .record(start.elapsed().as_secs_f64());
        Ok(placed)
    }
}
