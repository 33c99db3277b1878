//! Discount and sale administration.

use chrono::Utc;
use common::{CatalogId, DiscountId, SaleId};
use rust_decimal::Decimal;
use store::{DocumentQuery, DocumentStore, DocumentStoreExt};

use super::model::{CreateDiscount, CreateSale, Discount, DiscountKind, DiscountWindow, Sale};
use super::validator::DiscountValidator;
use super::{DISCOUNT_COLLECTION, SALE_COLLECTION};
use crate::error::DomainError;

/// Service for creating, reading and deactivating discounts and sales.
///
/// Every new discount goes through [`DiscountValidator`], so at most one
/// active discount covers any instant of a catalog item.
#[derive(Clone)]
pub struct DiscountService<S> {
    store: S,
    validator: DiscountValidator<S>,
}

impl<S: DocumentStore + Clone> DiscountService<S> {
    pub fn new(store: S) -> Self {
        Self {
            validator: DiscountValidator::new(store.clone()),
            store,
        }
    }

    /// Creates an active discount after validating its fields and window.
    ///
    /// When the request names a sale, the sale's window replaces whatever
    /// window the request carried.
    #[tracing::instrument(skip(self, cmd), fields(catalog_id = %cmd.catalog_id))]
    pub async fn create_discount(&self, cmd: CreateDiscount) -> Result<Discount, DomainError> {
        validate_discount_fields(&cmd)?;

        let window = match &cmd.sale_id {
            Some(sale_id) => self.get_sale(sale_id).await?.window(),
            None => match (cmd.valid_after, cmd.valid_before) {
                (Some(after), Some(before)) => DiscountWindow::new(after, before),
                _ => {
                    return Err(DomainError::InvalidDiscount(
                        "validAfter and validBefore are required without a sale".to_string(),
                    ));
                }
            },
        };
        if !window.is_well_formed() {
            return Err(DomainError::InvalidDiscount(format!(
                "window {window} is empty"
            )));
        }

        self.validator
            .validate_new_window(&cmd.catalog_id, &window)
            .await?;

        let discount = Discount {
            id: DiscountId::generate(),
            catalog_id: cmd.catalog_id,
            variant_ids: cmd.variant_ids.into_iter().collect(),
            sale_id: cmd.sale_id,
            kind: cmd.kind,
            value: cmd.value,
            max_value: cmd.max_value,
            valid_after: window.valid_after,
            valid_before: window.valid_before,
            is_active: true,
            created_at: Utc::now(),
        };
        self.store
            .insert_entity(DISCOUNT_COLLECTION, discount.id.as_str(), &discount)
            .await?;

        tracing::info!(discount_id = %discount.id, %window, "discount created");
        metrics::counter!("discounts_created_total").increment(1);
        Ok(discount)
    }

    /// Marks a discount inactive. Deactivation is terminal.
    #[tracing::instrument(skip(self))]
    pub async fn deactivate_discount(&self, id: &DiscountId) -> Result<Discount, DomainError> {
        let mut discount = self.get_discount(id).await?;
        if discount.is_active {
            discount.is_active = false;
            self.store
                .replace_entity(DISCOUNT_COLLECTION, id.as_str(), &discount)
                .await?;
            tracing::info!(discount_id = %id, "discount deactivated");
        }
        Ok(discount)
    }

    /// Loads a discount by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_discount(&self, id: &DiscountId) -> Result<Discount, DomainError> {
        self.store
            .get_entity(DISCOUNT_COLLECTION, id.as_str())
            .await?
            .ok_or_else(|| DomainError::not_found("discount", id))
    }

    /// Lists active discounts on a catalog item, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_active_discounts(
        &self,
        catalog_id: &CatalogId,
    ) -> Result<Vec<Discount>, DomainError> {
        Ok(self
            .store
            .find_entities(
                DISCOUNT_COLLECTION,
                DocumentQuery::new()
                    .eq("catalogID", catalog_id.as_str())
                    .eq("isActive", true),
            )
            .await?)
    }

    /// Creates a sale.
    #[tracing::instrument(skip(self, cmd), fields(slug = %cmd.slug))]
    pub async fn create_sale(&self, cmd: CreateSale) -> Result<Sale, DomainError> {
        if cmd.name.trim().is_empty() || cmd.slug.trim().is_empty() {
            return Err(DomainError::InvalidSale(
                "name and slug are required".to_string(),
            ));
        }
        let window = DiscountWindow::new(cmd.valid_after, cmd.valid_before);
        if !window.is_well_formed() {
            return Err(DomainError::InvalidSale(format!("window {window} is empty")));
        }

        let sale = Sale {
            id: SaleId::generate(),
            name: cmd.name,
            slug: cmd.slug,
            banner_image: cmd.banner_image,
            valid_after: cmd.valid_after,
            valid_before: cmd.valid_before,
            created_at: Utc::now(),
        };
        self.store
            .insert_entity(SALE_COLLECTION, sale.id.as_str(), &sale)
            .await?;

        tracing::info!(sale_id = %sale.id, "sale created");
        Ok(sale)
    }

    /// Loads a sale by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_sale(&self, id: &SaleId) -> Result<Sale, DomainError> {
        self.store
            .get_entity(SALE_COLLECTION, id.as_str())
            .await?
            .ok_or_else(|| DomainError::not_found("sale", id))
    }
}

fn validate_discount_fields(cmd: &CreateDiscount) -> Result<(), DomainError> {
    let invalid = |msg: &str| Err(DomainError::InvalidDiscount(msg.to_string()));

    if cmd.value <= Decimal::ZERO {
        return invalid("value must be positive");
    }
    if cmd.kind == DiscountKind::Percent && cmd.value > Decimal::ONE_HUNDRED {
        return invalid("percent value cannot exceed 100");
    }
    if cmd.max_value.is_sign_negative() && !cmd.max_value.is_zero() {
        return invalid("maxValue cannot be negative");
    }
    if cmd.variant_ids.is_empty() {
        return invalid("at least one variant is required");
    }
    Ok(())
}
