//! Non-overlap check for discount windows on one catalog item.

use common::{CatalogId, DiscountId};
use store::{DocumentQuery, DocumentStore, DocumentStoreExt};

use super::model::{Discount, DiscountWindow};
use super::DISCOUNT_COLLECTION;
use crate::error::DomainError;

/// A requested window that collides with an active discount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountConflict {
    pub catalog_id: CatalogId,
    pub requested: DiscountWindow,
    pub existing_id: DiscountId,
    pub existing: DiscountWindow,
}

impl std::fmt::Display for DiscountConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "window {} for catalog {} overlaps active discount {} with window {}",
            self.requested, self.catalog_id, self.existing_id, self.existing
        )
    }
}

/// Returns the first active discount whose window shares an instant with `window`.
///
/// Inactive discounts and discounts for other catalog items are ignored, so
/// callers may pass an unfiltered list.
pub fn find_conflict(
    catalog_id: &CatalogId,
    window: &DiscountWindow,
    existing: &[Discount],
) -> Option<DiscountConflict> {
    existing
        .iter()
        .filter(|d| d.is_active && &d.catalog_id == catalog_id)
        .find(|d| d.window().overlaps(window))
        .map(|d| DiscountConflict {
            catalog_id: catalog_id.clone(),
            requested: *window,
            existing_id: d.id.clone(),
            existing: d.window(),
        })
}

/// Checks candidate windows against the active discounts in the store.
#[derive(Clone)]
pub struct DiscountValidator<S> {
    store: S,
}

impl<S: DocumentStore> DiscountValidator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fails with [`DomainError::DiscountConflict`] if `window` overlaps any
    /// active discount on the catalog item.
    #[tracing::instrument(skip(self))]
    pub async fn validate_new_window(
        &self,
        catalog_id: &CatalogId,
        window: &DiscountWindow,
    ) -> Result<(), DomainError> {
        let active: Vec<Discount> = self
            .store
            .find_entities(
                DISCOUNT_COLLECTION,
                DocumentQuery::new()
                    .eq("catalogID", catalog_id.as_str())
                    .eq("isActive", true),
            )
            .await?;

        match find_conflict(catalog_id, window, &active) {
            Some(conflict) => {
                tracing::warn!(%conflict, "discount window rejected");
                metrics::counter!("discount_conflicts_total").increment(1);
                Err(DomainError::DiscountConflict(conflict))
            }
            None => Ok(()),
        }
    }
}
