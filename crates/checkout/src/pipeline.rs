//! Re-validation, pricing, grouping and submission shared by both checkout paths.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::Utc;
use common::BrandId;
use domain::{CatalogService, CatalogSnapshot, price_variant};

use crate::error::{CheckoutError, Result};
use crate::model::{CheckoutConfig, CheckoutLine, OrderContext, OrderItem, OrderOpts, PlacedOrder};
use crate::report::{StockFailure, StockReport};
use crate::services::OrderService;

/// Turns checkout lines into per-brand orders.
///
/// Lines are checked one at a time against live catalog data. Stock
/// failures are collected for every line before deciding, and nothing is
/// submitted unless all lines pass. Submission is the last call, so a
/// dropped checkout future never leaves a partial set of orders behind.
#[derive(Clone)]
pub struct OrderPipeline<C, O> {
    catalog: C,
    orders: O,
    config: CheckoutConfig,
}

impl<C: CatalogService, O: OrderService> OrderPipeline<C, O> {
    pub fn new(catalog: C, orders: O, config: CheckoutConfig) -> Self {
        Self {
            catalog,
            orders,
            config,
        }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Re-validates, prices, groups and submits `lines`.
    pub async fn place_orders(
        &self,
        context: &OrderContext,
        lines: &[CheckoutLine],
    ) -> Result<Vec<PlacedOrder>> {
        let items = self.revalidate(lines).await?;
        let orders = build_orders(context, group_by_brand(items));

        let order_count = orders.len();
        let placed = self
            .deadline("order submission", self.orders.submit_orders(orders))
            .await?;

        tracing::info!(
            user_id = %context.user_id,
            source = %context.source,
            order_count,
            "orders submitted"
        );
        metrics::counter!("checkout_orders_submitted_total", "source" => context.source.as_str())
            .increment(order_count as u64);
        Ok(placed)
    }

    /// Fetches live data for every line and prices the ones in stock.
    ///
    /// Fails with the full [`StockReport`] if any line lacks stock.
    pub async fn revalidate(&self, lines: &[CheckoutLine]) -> Result<Vec<OrderItem>> {
        let now = Utc::now();
        let mut report = StockReport::new();
        let mut items = Vec::with_capacity(lines.len());

        if let Some(line) = lines.iter().find(|l| l.quantity == 0) {
            return Err(CheckoutError::InvalidItem(format!(
                "{}/{} has quantity 0",
                line.catalog_id, line.variant_id
            )));
        }

        for line in lines {
            let live = self
                .deadline(
                    "catalog variant lookup",
                    self.catalog.get_variant(&line.catalog_id, &line.variant_id),
                )
                .await?;

            if let Some(failure) = StockFailure::check(
                &line.catalog_id,
                &line.variant_id,
                &live.inventory_info,
                line.quantity,
            ) {
                tracing::warn!(%failure, "checkout item unavailable");
                report.push(failure);
                continue;
            }

            let variant = live.variant(&line.variant_id).ok_or_else(|| {
                CheckoutError::from(domain::CatalogError::VariantNotFound {
                    catalog_id: line.catalog_id.clone(),
                    variant_id: line.variant_id.clone(),
                })
            })?;
            let catalog = &live.catalog;
            let price = price_variant(
                &catalog.retail_price,
                &line.variant_id,
                catalog.discount_info.as_ref(),
                now,
            )?;

            let discounted = price.is_discounted();
            items.push(OrderItem {
                catalog_id: line.catalog_id.clone(),
                variant_id: line.variant_id.clone(),
                catalog_info: CatalogSnapshot::new(catalog, variant),
                base_price: catalog.base_price.clone(),
                retail_price: price.retail_price,
                discount_id: price.discount_id,
                discount_info: if discounted {
                    catalog.discount_info.clone()
                } else {
                    None
                },
                discounted_price: discounted.then_some(price.discounted_price),
                quantity: line.quantity,
            });
        }

        if !report.is_empty() {
            metrics::counter!("checkout_out_of_stock_total").increment(report.len() as u64);
            return Err(CheckoutError::OutOfStock(report));
        }
        Ok(items)
    }

    async fn deadline<T, E>(
        &self,
        operation: &str,
        call: impl Future<Output = std::result::Result<T, E>>,
    ) -> Result<T>
    where
        CheckoutError: From<E>,
    {
        match tokio::time::timeout(self.config.call_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::error!(operation, "collaborator call timed out");
                Err(CheckoutError::Timeout {
                    operation: operation.to_string(),
                    timeout_ms: self.config.call_timeout.as_millis() as u64,
                })
            }
        }
    }
}

/// Partitions items by brand, keeping item order within each brand.
pub fn group_by_brand(items: Vec<OrderItem>) -> BTreeMap<BrandId, Vec<OrderItem>> {
    let mut groups: BTreeMap<BrandId, Vec<OrderItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.brand_id().clone()).or_default().push(item);
    }
    groups
}

/// Builds one order per brand group.
pub fn build_orders(
    context: &OrderContext,
    groups: BTreeMap<BrandId, Vec<OrderItem>>,
) -> Vec<OrderOpts> {
    groups
        .into_iter()
        .map(|(brand_id, order_items)| OrderOpts {
            user_id: context.user_id.clone(),
            brand_id,
            shipping_address: context.shipping_address.clone(),
            billing_address: context.billing_address.clone(),
            source: context.source,
            order_items,
        })
        .collect()
}
