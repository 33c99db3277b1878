//! Outbound order payloads and checkout inputs.

use std::time::Duration;

use common::{BrandId, CatalogId, DiscountId, Money, UserId, VariantId};
use domain::{Address, CartItem, CatalogSnapshot, DiscountInfo};
use serde::{Deserialize, Serialize};

/// Where an order came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSource {
    Cart,
    Express,
}

impl OrderSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSource::Cart => "cart",
            OrderSource::Express => "express",
        }
    }
}

impl std::fmt::Display for OrderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A re-validated, re-priced line of an outbound order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "catalogID")]
    pub catalog_id: CatalogId,
    #[serde(rename = "variantID")]
    pub variant_id: VariantId,
    pub catalog_info: CatalogSnapshot,
    pub base_price: Money,
    pub retail_price: Money,
    #[serde(rename = "discountID", default, skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<DiscountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_info: Option<DiscountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<Money>,
    pub quantity: u32,
}

impl OrderItem {
    pub fn brand_id(&self) -> &BrandId {
        &self.catalog_info.brand_id
    }
}

/// One order for one brand, as submitted to the order service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderOpts {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    #[serde(rename = "brandID")]
    pub brand_id: BrandId,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub billing_address: Option<Address>,
    pub source: OrderSource,
    pub order_items: Vec<OrderItem>,
}

impl OrderOpts {
    pub fn total_quantity(&self) -> u32 {
        self.order_items.iter().map(|i| i.quantity).sum()
    }
}

/// An order accepted by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub id: String,
    #[serde(rename = "brandID")]
    pub brand_id: BrandId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A (catalog, variant, quantity) triple to re-validate and order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    #[serde(rename = "catalogID")]
    pub catalog_id: CatalogId,
    #[serde(rename = "variantID")]
    pub variant_id: VariantId,
    pub quantity: u32,
}

impl CheckoutLine {
    pub fn new(
        catalog_id: impl Into<CatalogId>,
        variant_id: impl Into<VariantId>,
        quantity: u32,
    ) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            variant_id: variant_id.into(),
            quantity,
        }
    }
}

impl From<&CartItem> for CheckoutLine {
    fn from(item: &CartItem) -> Self {
        Self {
            catalog_id: item.catalog_id.clone(),
            variant_id: item.variant_id.clone(),
            quantity: item.quantity,
        }
    }
}

/// Who the orders are for and where they go.
#[derive(Debug, Clone)]
pub struct OrderContext {
    pub user_id: UserId,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub source: OrderSource,
}

/// Express checkout of several items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressOrder {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub items: Vec<CheckoutLine>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub billing_address: Option<Address>,
}

/// Express checkout of a single item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressItemOrder {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    #[serde(flatten)]
    pub item: CheckoutLine,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub billing_address: Option<Address>,
}

/// Checkout tuning.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutConfig {
    /// Deadline for each collaborator call.
    pub call_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
        }
    }
}

impl CheckoutConfig {
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}
