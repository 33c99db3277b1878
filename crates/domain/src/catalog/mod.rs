//! Catalog collaborator: authoritative product, price, discount and stock data.

mod http;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use common::{BrandId, CatalogId, Money, VariantId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::discount::DiscountInfo;

pub use http::HttpCatalogClient;
pub use memory::InMemoryCatalogService;

/// Errors returned by catalog lookups.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The catalog item does not exist.
    #[error("Catalog not found: {catalog_id}")]
    CatalogNotFound { catalog_id: CatalogId },

    /// The catalog item exists but does not list this variant.
    #[error("Variant {variant_id} not found in catalog {catalog_id}")]
    VariantNotFound {
        catalog_id: CatalogId,
        variant_id: VariantId,
    },

    /// The request never produced a response.
    #[error("Catalog request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The service answered with a non-2xx status.
    #[error("Catalog request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The service answered with `success = false`.
    #[error("Catalog request to {url} was unsuccessful: {message}")]
    Unsuccessful { url: String, message: String },

    /// The response body could not be decoded.
    #[error("Could not decode catalog response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The request exceeded its deadline.
    #[error("Catalog request to {url} timed out")]
    Timeout { url: String },
}

impl CatalogError {
    /// Returns true if the error means the catalog or variant does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::CatalogNotFound { .. } | CatalogError::VariantNotFound { .. }
        )
    }
}

/// A purchasable variant of a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantInfo {
    pub id: VariantId,
    pub sku: String,
    #[serde(default)]
    pub attribute: String,
}

impl VariantInfo {
    pub fn new(id: impl Into<VariantId>, sku: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sku: sku.into(),
            attribute: String::new(),
        }
    }
}

/// Stock availability reported by the catalog service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    #[serde(alias = "in stock", alias = "InStock")]
    InStock,
    #[serde(alias = "out of stock", alias = "OutOfStock")]
    OutOfStock,
    #[serde(other)]
    Unknown,
}

/// Stock for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryInfo {
    pub unit_in_stock: u32,
    pub status: InventoryStatus,
}

impl InventoryInfo {
    /// Stock of `units`, marked out of stock when zero.
    pub fn with_units(units: u32) -> Self {
        Self {
            unit_in_stock: units,
            status: if units == 0 {
                InventoryStatus::OutOfStock
            } else {
                InventoryStatus::InStock
            },
        }
    }

    /// Returns true if `requested` units can be sold.
    pub fn can_fulfil(&self, requested: u32) -> bool {
        self.status != InventoryStatus::OutOfStock
            && self.unit_in_stock > 0
            && self.unit_in_stock >= requested
    }
}

/// A catalog item as returned by the catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogInfo {
    pub id: CatalogId,
    #[serde(rename = "brandID")]
    pub brand_id: BrandId,
    pub name: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub variant_type: String,
    #[serde(default)]
    pub variants: Vec<VariantInfo>,
    #[serde(default)]
    pub discount_info: Option<DiscountInfo>,
    pub base_price: Money,
    pub retail_price: Money,
    pub transfer_price: Money,
    #[serde(default)]
    pub hsn_code: String,
    #[serde(default)]
    pub eta: Option<u32>,
    #[serde(default)]
    pub status: String,
}

impl CatalogInfo {
    /// Creates a catalog item with one price used for base, retail and transfer.
    pub fn new(
        id: impl Into<CatalogId>,
        brand_id: impl Into<BrandId>,
        name: impl Into<String>,
        retail_price: Money,
    ) -> Self {
        Self {
            id: id.into(),
            brand_id: brand_id.into(),
            name: name.into(),
            featured_image: None,
            variant_type: String::new(),
            variants: Vec::new(),
            discount_info: None,
            base_price: retail_price.clone(),
            transfer_price: retail_price.clone(),
            retail_price,
            hsn_code: String::new(),
            eta: None,
            status: "publish".to_string(),
        }
    }

    /// Adds a variant.
    pub fn with_variant(mut self, id: impl Into<VariantId>, sku: impl Into<String>) -> Self {
        self.variants.push(VariantInfo::new(id, sku));
        self
    }

    /// Attaches an active discount.
    pub fn with_discount(mut self, discount: DiscountInfo) -> Self {
        self.discount_info = Some(discount);
        self
    }

    /// Looks up a listed variant.
    pub fn variant(&self, variant_id: &VariantId) -> Option<&VariantInfo> {
        self.variants.iter().find(|v| &v.id == variant_id)
    }
}

/// A catalog item narrowed to one variant, plus that variant's stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogVariant {
    #[serde(flatten)]
    pub catalog: CatalogInfo,
    pub inventory_info: InventoryInfo,
}

impl CatalogVariant {
    /// Returns the variant the response was narrowed to.
    pub fn variant(&self, variant_id: &VariantId) -> Option<&VariantInfo> {
        self.catalog.variant(variant_id)
    }
}

/// Read access to the catalog service.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetches a catalog item with all its variants.
    async fn get_catalog(&self, catalog_id: &CatalogId) -> Result<CatalogInfo, CatalogError>;

    /// Fetches a catalog item narrowed to one variant, with live stock.
    async fn get_variant(
        &self,
        catalog_id: &CatalogId,
        variant_id: &VariantId,
    ) -> Result<CatalogVariant, CatalogError>;
}

#[async_trait]
impl<T: CatalogService + ?Sized> CatalogService for Arc<T> {
    async fn get_catalog(&self, catalog_id: &CatalogId) -> Result<CatalogInfo, CatalogError> {
        (**self).get_catalog(catalog_id).await
    }

    async fn get_variant(
        &self,
        catalog_id: &CatalogId,
        variant_id: &VariantId,
    ) -> Result<CatalogVariant, CatalogError> {
        (**self).get_variant(catalog_id, variant_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_requires_enough_units() {
        assert!(InventoryInfo::with_units(5).can_fulfil(5));
        assert!(!InventoryInfo::with_units(4).can_fulfil(5));
        assert!(!InventoryInfo::with_units(0).can_fulfil(0));
    }

    #[test]
    fn out_of_stock_status_wins_over_units() {
        let info = InventoryInfo {
            unit_in_stock: 10,
            status: InventoryStatus::OutOfStock,
        };
        assert!(!info.can_fulfil(1));
    }

    #[test]
    fn inventory_status_accepts_spaced_names() {
        let status: InventoryStatus = serde_json::from_str("\"out of stock\"").unwrap();
        assert_eq!(status, InventoryStatus::OutOfStock);

        let unknown: InventoryStatus = serde_json::from_str("\"backorder\"").unwrap();
        assert_eq!(unknown, InventoryStatus::Unknown);
    }

    #[test]
    fn catalog_variant_decodes_flattened_payload() {
        let json = serde_json::json!({
            "id": "cat-1",
            "brandID": "brand-1",
            "name": "Linen Shirt",
            "variants": [{"id": "v-1", "sku": "LS-M"}],
            "basePrice": {"currency": "INR", "value": 1000},
            "retailPrice": {"currency": "INR", "value": 1200},
            "transferPrice": {"currency": "INR", "value": 800},
            "inventoryInfo": {"unitInStock": 3, "status": "in_stock"}
        });

        let variant: CatalogVariant = serde_json::from_value(json).unwrap();
        assert_eq!(variant.catalog.brand_id, BrandId::new("brand-1"));
        assert_eq!(variant.inventory_info.unit_in_stock, 3);
        assert!(variant.variant(&VariantId::new("v-1")).is_some());
        assert_eq!(variant.catalog.retail_price, Money::from_units(1200));
    }
}
