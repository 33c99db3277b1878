//! Stock failures collected while re-validating a checkout.

use common::{CatalogId, VariantId};
use domain::{InventoryInfo, InventoryStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFailureReason {
    /// No units available at all.
    OutOfStock,
    /// Some units available, fewer than requested.
    InsufficientStock,
}

impl std::fmt::Display for StockFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockFailureReason::OutOfStock => write!(f, "out of stock"),
            StockFailureReason::InsufficientStock => write!(f, "insufficient stock"),
        }
    }
}

/// One item that cannot be fulfilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFailure {
    #[serde(rename = "catalogID")]
    pub catalog_id: CatalogId,
    #[serde(rename = "variantID")]
    pub variant_id: VariantId,
    pub reason: StockFailureReason,
    pub requested: u32,
    pub available: u32,
}

impl StockFailure {
    /// Checks live inventory against a requested quantity.
    pub fn check(
        catalog_id: &CatalogId,
        variant_id: &VariantId,
        inventory: &InventoryInfo,
        requested: u32,
    ) -> Option<Self> {
        let reason = if inventory.status == InventoryStatus::OutOfStock
            || inventory.unit_in_stock == 0
        {
            StockFailureReason::OutOfStock
        } else if inventory.unit_in_stock < requested {
            StockFailureReason::InsufficientStock
        } else {
            return None;
        };

        Some(Self {
            catalog_id: catalog_id.clone(),
            variant_id: variant_id.clone(),
            reason,
            requested,
            available: inventory.unit_in_stock,
        })
    }
}

impl std::fmt::Display for StockFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} {} (requested {}, available {})",
            self.catalog_id, self.variant_id, self.reason, self.requested, self.available
        )
    }
}

/// Every stock failure of one checkout, in item order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockReport {
    failures: Vec<StockFailure>,
}

impl StockReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, failure: StockFailure) {
        self.failures.push(failure);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[StockFailure] {
        &self.failures
    }

    /// Returns true if the report names this variant.
    pub fn contains(&self, catalog_id: &CatalogId, variant_id: &VariantId) -> bool {
        self.failures
            .iter()
            .any(|f| &f.catalog_id == catalog_id && &f.variant_id == variant_id)
    }
}

impl std::fmt::Display for StockReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} item(s) unavailable", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{failure}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (CatalogId, VariantId) {
        (CatalogId::new("cat-1"), VariantId::new("v-1"))
    }

    #[test]
    fn enough_stock_passes() {
        let (c, v) = ids();
        assert!(StockFailure::check(&c, &v, &InventoryInfo::with_units(3), 3).is_none());
    }

    #[test]
    fn zero_units_is_out_of_stock() {
        let (c, v) = ids();
        let failure = StockFailure::check(&c, &v, &InventoryInfo::with_units(0), 1).unwrap();
        assert_eq!(failure.reason, StockFailureReason::OutOfStock);
    }

    #[test]
    fn fewer_units_is_insufficient() {
        let (c, v) = ids();
        let failure = StockFailure::check(&c, &v, &InventoryInfo::with_units(2), 5).unwrap();
        assert_eq!(failure.reason, StockFailureReason::InsufficientStock);
        assert_eq!(failure.available, 2);
    }

    #[test]
    fn status_overrides_unit_count() {
        let (c, v) = ids();
        let inventory = InventoryInfo {
            unit_in_stock: 10,
            status: InventoryStatus::OutOfStock,
        };
        let failure = StockFailure::check(&c, &v, &inventory, 1).unwrap();
        assert_eq!(failure.reason, StockFailureReason::OutOfStock);
    }

    #[test]
    fn report_lists_every_failure() {
        let mut report = StockReport::new();
        report.push(
            StockFailure::check(
                &CatalogId::new("a"),
                &VariantId::new("1"),
                &InventoryInfo::with_units(0),
                1,
            )
            .unwrap(),
        );
        report.push(
            StockFailure::check(
                &CatalogId::new("b"),
                &VariantId::new("2"),
                &InventoryInfo::with_units(1),
                4,
            )
            .unwrap(),
        );

        let message = report.to_string();
        assert!(message.starts_with("2 item(s) unavailable"));
        assert!(message.contains("a/1 out of stock"));
        assert!(message.contains("b/2 insufficient stock"));
        assert!(report.contains(&CatalogId::new("b"), &VariantId::new("2")));
    }
}
