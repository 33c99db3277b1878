use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use common::{CatalogId, Money, VariantId};

use super::{CatalogError, CatalogInfo, CatalogService, CatalogVariant, InventoryInfo};
use crate::discount::DiscountInfo;

#[derive(Debug, Clone)]
struct Entry {
    catalog: CatalogInfo,
    stock: HashMap<VariantId, InventoryInfo>,
}

/// In-memory catalog service for testing and local runs.
///
/// Stock is tracked per variant; variants inserted without explicit stock
/// report zero units.
#[derive(Debug, Default)]
pub struct InMemoryCatalogService {
    entries: RwLock<HashMap<CatalogId, Entry>>,
    fail: AtomicBool,
    lookups: AtomicUsize,
}

impl InMemoryCatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog item, giving every listed variant `units` in stock.
    pub fn insert_catalog(&self, catalog: CatalogInfo, units: u32) {
        let stock = catalog
            .variants
            .iter()
            .map(|v| (v.id.clone(), InventoryInfo::with_units(units)))
            .collect();
        self.write().insert(catalog.id.clone(), Entry { catalog, stock });
    }

    /// Sets the stock of one variant.
    pub fn set_stock(&self, catalog_id: &CatalogId, variant_id: &VariantId, units: u32) {
        self.set_inventory(catalog_id, variant_id, InventoryInfo::with_units(units));
    }

    /// Replaces the inventory record of one variant.
    pub fn set_inventory(
        &self,
        catalog_id: &CatalogId,
        variant_id: &VariantId,
        inventory: InventoryInfo,
    ) {
        if let Some(entry) = self.write().get_mut(catalog_id) {
            entry.stock.insert(variant_id.clone(), inventory);
        }
    }

    /// Replaces the active discount of a catalog item.
    pub fn set_discount(&self, catalog_id: &CatalogId, discount: Option<DiscountInfo>) {
        if let Some(entry) = self.write().get_mut(catalog_id) {
            entry.catalog.discount_info = discount;
        }
    }

    /// Changes the retail price of a catalog item.
    pub fn set_retail_price(&self, catalog_id: &CatalogId, price: Money) {
        if let Some(entry) = self.write().get_mut(catalog_id) {
            entry.catalog.retail_price = price;
        }
    }

    /// Makes every lookup fail with a transport error.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of lookups served so far, failed ones included.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<CatalogId, Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, catalog_id: &CatalogId) -> Result<Entry, CatalogError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(CatalogError::Transport {
                url: format!("memory://catalog/{catalog_id}"),
                reason: "catalog service unavailable".to_string(),
            });
        }

        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(catalog_id)
            .cloned()
            .ok_or_else(|| CatalogError::CatalogNotFound {
                catalog_id: catalog_id.clone(),
            })
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    async fn get_catalog(&self, catalog_id: &CatalogId) -> Result<CatalogInfo, CatalogError> {
        self.lookup(catalog_id).map(|entry| entry.catalog)
    }

    async fn get_variant(
        &self,
        catalog_id: &CatalogId,
        variant_id: &VariantId,
    ) -> Result<CatalogVariant, CatalogError> {
        let Entry { mut catalog, stock } = self.lookup(catalog_id)?;

        catalog.variants.retain(|v| &v.id == variant_id);
        if catalog.variants.is_empty() {
            return Err(CatalogError::VariantNotFound {
                catalog_id: catalog_id.clone(),
                variant_id: variant_id.clone(),
            });
        }

        let inventory_info = stock
            .get(variant_id)
            .copied()
            .unwrap_or_else(|| InventoryInfo::with_units(0));
        Ok(CatalogVariant {
            catalog,
            inventory_info,
        })
    }
}
