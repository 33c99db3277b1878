//! Cart-less "buy now" checkout.

use std::time::Instant;

use domain::CatalogService;

use crate::error::{CheckoutError, Result};
use crate::model::{
    CheckoutConfig, CheckoutLine, ExpressItemOrder, ExpressOrder, OrderContext, OrderSource,
    PlacedOrder,
};
use crate::pipeline::OrderPipeline;
use crate::services::OrderService;

/// Checks out caller-supplied items without touching any cart.
pub struct ExpressCheckout<C, O> {
    pipeline: OrderPipeline<C, O>,
}

impl<C: CatalogService, O: OrderService> ExpressCheckout<C, O> {
    pub fn new(catalog: C, orders: O, config: CheckoutConfig) -> Self {
        Self {
            pipeline: OrderPipeline::new(catalog, orders, config),
        }
    }

    /// Orders several items, one order per brand.
    #[tracing::instrument(skip(self, order), fields(user_id = %order.user_id, items = order.items.len()))]
    pub async fn checkout(&self, order: ExpressOrder) -> Result<Vec<PlacedOrder>> {
        if order.items.is_empty() {
            return Err(CheckoutError::InvalidItem("no items to order".to_string()));
        }

        let context = OrderContext {
            user_id: order.user_id,
            shipping_address: order.shipping_address,
            billing_address: order.billing_address,
            source: OrderSource::Express,
        };
        self.run(&context, &order.items).await
    }

    /// Orders a single item.
    #[tracing::instrument(skip(self, order), fields(user_id = %order.user_id, catalog_id = %order.item.catalog_id))]
    pub async fn checkout_item(&self, order: ExpressItemOrder) -> Result<Vec<PlacedOrder>> {
        let context = OrderContext {
            user_id: order.user_id,
            shipping_address: order.shipping_address,
            billing_address: order.billing_address,
            source: OrderSource::Express,
        };
        self.run(&context, std::slice::from_ref(&order.item)).await
    }

    async fn run(
        &self,
        context: &OrderContext,
        lines: &[CheckoutLine],
    ) -> Result<Vec<PlacedOrder>> {
        metrics::counter!("checkout_attempts_total", "source" => "express").increment(1);
        let start = Instant::now();

        let placed = self.pipeline.place_orders(context, lines).await?;

        metrics::histogram!("checkout_duration_seconds", "source" => "express")
            .record(start.elapsed().as_secs_f64());
        Ok(placed)
    }
}
