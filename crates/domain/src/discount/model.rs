//! Discount and sale documents.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::{CatalogId, DiscountId, SaleId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// A fixed amount off the retail price. Never capped.
    #[serde(alias = "Flat")]
    Flat,
    /// A percentage of the retail price, optionally capped by `maxValue`.
    #[serde(alias = "Percent")]
    Percent,
}

impl std::fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountKind::Flat => write!(f, "flat"),
            DiscountKind::Percent => write!(f, "percent"),
        }
    }
}

/// A validity window, inclusive of `valid_after` and exclusive of `valid_before`.
///
/// Two windows that only touch at an endpoint do not overlap, so a new
/// discount may start the instant the previous one ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountWindow {
    pub valid_after: DateTime<Utc>,
    pub valid_before: DateTime<Utc>,
}

impl DiscountWindow {
    pub fn new(valid_after: DateTime<Utc>, valid_before: DateTime<Utc>) -> Self {
        Self {
            valid_after,
            valid_before,
        }
    }

    /// Returns true if the window spans a positive duration.
    pub fn is_well_formed(&self) -> bool {
        self.valid_after < self.valid_before
    }

    /// Returns true if the two windows share at least one instant.
    pub fn overlaps(&self, other: &DiscountWindow) -> bool {
        self.valid_after < other.valid_before && other.valid_after < self.valid_before
    }

    /// Returns true if `at` falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.valid_after <= at && at < self.valid_before
    }
}

impl std::fmt::Display for DiscountWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.valid_after.to_rfc3339(),
            self.valid_before.to_rfc3339()
        )
    }
}

/// Denormalized discount as carried by catalog responses and cart snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountInfo {
    pub id: DiscountId,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: Decimal,
    #[serde(default)]
    pub max_value: Decimal,
    #[serde(rename = "variantIDs", default)]
    pub variant_ids: Vec<VariantId>,
    #[serde(rename = "saleID", default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<SaleId>,
    pub valid_after: DateTime<Utc>,
    pub valid_before: DateTime<Utc>,
}

impl DiscountInfo {
    pub fn window(&self) -> DiscountWindow {
        DiscountWindow::new(self.valid_after, self.valid_before)
    }

    /// Returns true if the discount lists this variant.
    pub fn covers(&self, variant_id: &VariantId) -> bool {
        self.variant_ids.contains(variant_id)
    }

    /// Returns true if the discount covers the variant and is live at `at`.
    pub fn applies_to(&self, variant_id: &VariantId, at: DateTime<Utc>) -> bool {
        self.covers(variant_id) && self.window().contains(at)
    }
}

/// A time-bounded price reduction on some variants of one catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: DiscountId,
    #[serde(rename = "catalogID")]
    pub catalog_id: CatalogId,
    #[serde(rename = "variantIDs")]
    pub variant_ids: BTreeSet<VariantId>,
    #[serde(rename = "saleID", default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<SaleId>,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: Decimal,
    #[serde(default)]
    pub max_value: Decimal,
    pub valid_after: DateTime<Utc>,
    pub valid_before: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Discount {
    pub fn window(&self) -> DiscountWindow {
        DiscountWindow::new(self.valid_after, self.valid_before)
    }

    /// Builds the denormalized form embedded in catalog and cart snapshots.
    pub fn to_info(&self) -> DiscountInfo {
        DiscountInfo {
            id: self.id.clone(),
            kind: self.kind,
            value: self.value,
            max_value: self.max_value,
            variant_ids: self.variant_ids.iter().cloned().collect(),
            sale_id: self.sale_id.clone(),
            valid_after: self.valid_after,
            valid_before: self.valid_before,
        }
    }
}

/// A named campaign whose window discounts may inherit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: SaleId,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
    pub valid_after: DateTime<Utc>,
    pub valid_before: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    pub fn window(&self) -> DiscountWindow {
        DiscountWindow::new(self.valid_after, self.valid_before)
    }
}

/// Input for creating a discount.
///
/// The window may be omitted when `sale_id` is set; the sale's window always
/// wins when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiscount {
    #[serde(rename = "catalogID")]
    pub catalog_id: CatalogId,
    #[serde(rename = "variantIDs")]
    pub variant_ids: Vec<VariantId>,
    #[serde(rename = "saleID", default)]
    pub sale_id: Option<SaleId>,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: Decimal,
    #[serde(default)]
    pub max_value: Decimal,
    #[serde(default)]
    pub valid_after: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_before: Option<DateTime<Utc>>,
}

impl CreateDiscount {
    /// Creates a discount request with an explicit window.
    pub fn new(
        catalog_id: impl Into<CatalogId>,
        variant_ids: Vec<VariantId>,
        kind: DiscountKind,
        value: Decimal,
        window: DiscountWindow,
    ) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            variant_ids,
            sale_id: None,
            kind,
            value,
            max_value: Decimal::ZERO,
            valid_after: Some(window.valid_after),
            valid_before: Some(window.valid_before),
        }
    }

    /// Sets the percent cap.
    pub fn with_max_value(mut self, max_value: Decimal) -> Self {
        self.max_value = max_value;
        self
    }

    /// Attaches the discount to a sale.
    pub fn with_sale(mut self, sale_id: SaleId) -> Self {
        self.sale_id = Some(sale_id);
        self
    }
}

/// Input for creating a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSale {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub banner_image: Option<String>,
    pub valid_after: DateTime<Utc>,
    pub valid_before: DateTime<Utc>,
}
