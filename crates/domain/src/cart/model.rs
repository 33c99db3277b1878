//! Cart documents and their pricing snapshots.

use chrono::{DateTime, Utc};
use common::{BrandId, CartId, CartItemId, CatalogId, DiscountId, Money, UserId, VariantId};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogInfo, VariantInfo};
use crate::discount::DiscountInfo;
use crate::error::DomainError;
use crate::pricing::UnitPrice;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub full_name: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Catalog data copied into a cart or order item, narrowed to one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub id: CatalogId,
    #[serde(rename = "brandID")]
    pub brand_id: BrandId,
    pub name: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub variant_type: String,
    pub variant: VariantInfo,
    #[serde(default)]
    pub discount_info: Option<DiscountInfo>,
    #[serde(default)]
    pub hsn_code: String,
    #[serde(default)]
    pub eta: Option<u32>,
}

impl CatalogSnapshot {
    pub fn new(catalog: &CatalogInfo, variant: &VariantInfo) -> Self {
        Self {
            id: catalog.id.clone(),
            brand_id: catalog.brand_id.clone(),
            name: catalog.name.clone(),
            featured_image: catalog.featured_image.clone(),
            variant_type: catalog.variant_type.clone(),
            variant: variant.clone(),
            discount_info: catalog.discount_info.clone(),
            hsn_code: catalog.hsn_code.clone(),
            eta: catalog.eta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(rename = "catalogID")]
    pub catalog_id: CatalogId,
    #[serde(rename = "brandID")]
    pub brand_id: BrandId,
    #[serde(rename = "variantID")]
    pub variant_id: VariantId,
    pub catalog_info: CatalogSnapshot,
    pub base_price: Money,
    pub retail_price: Money,
    pub transfer_price: Money,
    pub quantity: u32,
    #[serde(rename = "discountID", default, skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<DiscountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_info: Option<DiscountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<Money>,
}

impl CartItem {
    /// Builds an item from live catalog data and its computed unit price.
    pub fn new(
        catalog: &CatalogInfo,
        variant: &VariantInfo,
        quantity: u32,
        price: &UnitPrice,
    ) -> Self {
        let mut item = Self {
            id: CartItemId::generate(),
            catalog_id: catalog.id.clone(),
            brand_id: catalog.brand_id.clone(),
            variant_id: variant.id.clone(),
            catalog_info: CatalogSnapshot::new(catalog, variant),
            base_price: catalog.base_price.clone(),
            retail_price: catalog.retail_price.clone(),
            transfer_price: catalog.transfer_price.clone(),
            quantity,
            discount_id: None,
            discount_info: None,
            discounted_price: None,
        };
        item.apply_price(catalog, price);
        item
    }

    /// Refreshes the price snapshot from live catalog data.
    pub fn reprice(&mut self, catalog: &CatalogInfo, variant: &VariantInfo, price: &UnitPrice) {
        self.catalog_info = CatalogSnapshot::new(catalog, variant);
        self.base_price = catalog.base_price.clone();
        self.transfer_price = catalog.transfer_price.clone();
        self.apply_price(catalog, price);
    }

    fn apply_price(&mut self, catalog: &CatalogInfo, price: &UnitPrice) {
        self.retail_price = price.retail_price.clone();
        if price.is_discounted() {
            self.discount_id = price.discount_id.clone();
            self.discount_info = catalog.discount_info.clone();
            self.discounted_price = Some(price.discounted_price.clone());
        } else {
            self.discount_id = None;
            self.discount_info = None;
            self.discounted_price = None;
        }
    }

    /// Price of one unit after any discount.
    pub fn unit_price(&self) -> Money {
        self.discounted_price
            .clone()
            .unwrap_or_else(|| self.retail_price.clone())
    }

    /// Returns `(retail, discount, payable)` for the whole line.
    pub fn line_totals(&self) -> (Money, Money, Money) {
        let retail = self.retail_price.multiply(self.quantity);
        let payable = self.unit_price().multiply(self.quantity);
        let discount = retail.clone() - payable.clone();
        (retail, discount, payable)
    }

    pub fn matches(&self, catalog_id: &CatalogId, variant_id: &VariantId) -> bool {
        &self.catalog_id == catalog_id && &self.variant_id == variant_id
    }
}

/// A user's cart. One per user, cleared but never deleted.
///
/// `total_price`, `total_discount` and `grand_total` are running totals kept
/// in step with every item mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub billing_address: Option<Address>,
    pub total_price: Money,
    pub total_discount: Money,
    pub grand_total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: CartId::generate(),
            user_id,
            items: Vec::new(),
            shipping_address: None,
            billing_address: None,
            total_price: Money::zero(),
            total_discount: Money::zero(),
            grand_total: Money::zero(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn find_item(&self, catalog_id: &CatalogId, variant_id: &VariantId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.matches(catalog_id, variant_id))
    }

    fn position(&self, catalog_id: &CatalogId, variant_id: &VariantId) -> Option<usize> {
        self.items.iter().position(|i| i.matches(catalog_id, variant_id))
    }

    /// Appends an item. The same variant may only appear once.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), DomainError> {
        if self.position(&item.catalog_id, &item.variant_id).is_some() {
            return Err(DomainError::DuplicateCartItem {
                catalog_id: item.catalog_id,
                variant_id: item.variant_id,
            });
        }
        if item.quantity == 0 {
            return Err(DomainError::InvalidQuantity(
                "quantity must be at least 1".to_string(),
            ));
        }

        if self.items.is_empty() {
            self.reset_totals(&item.retail_price);
        }
        self.add_contribution(&item);
        self.items.push(item);
        self.touch();
        Ok(())
    }

    /// Removes an item, subtracting its stored contribution from the totals.
    pub fn remove_item(
        &mut self,
        catalog_id: &CatalogId,
        variant_id: &VariantId,
    ) -> Result<CartItem, DomainError> {
        let idx = self
            .position(catalog_id, variant_id)
            .ok_or_else(|| DomainError::not_found("cart item", format!("{catalog_id}/{variant_id}")))?;

        let item = self.items.remove(idx);
        self.subtract_contribution(&item);
        if self.items.is_empty() {
            self.reset_totals(&item.retail_price);
        }
        self.touch();
        Ok(item)
    }

    /// Returns the item's quantity after a signed change, zero meaning removal.
    pub fn quantity_after(
        &self,
        catalog_id: &CatalogId,
        variant_id: &VariantId,
        delta: i64,
    ) -> Result<u32, DomainError> {
        let current = self
            .find_item(catalog_id, variant_id)
            .map(|item| item.quantity)
            .ok_or_else(|| DomainError::not_found("cart item", format!("{catalog_id}/{variant_id}")))?;

        let next = i64::from(current).checked_add(delta).ok_or_else(|| {
            DomainError::InvalidQuantity(format!("quantity change {delta} is out of range"))
        })?;
        if next < 0 {
            return Err(DomainError::InvalidQuantity(format!(
                "cannot remove {} of {current} units",
                delta.unsigned_abs()
            )));
        }
        u32::try_from(next)
            .map_err(|_| DomainError::InvalidQuantity(format!("quantity {next} is too large")))
    }

    /// Applies a signed quantity change to an item.
    ///
    /// The totals move by `delta` units at `price`; units already in the cart
    /// keep the price they were added at. `update` refreshes the item's
    /// snapshot. Reaching zero removes the item and subtracts its stored
    /// contribution instead. Returns the new quantity.
    pub fn apply_delta(
        &mut self,
        catalog_id: &CatalogId,
        variant_id: &VariantId,
        delta: i64,
        price: &UnitPrice,
        update: impl FnOnce(&mut CartItem),
    ) -> Result<u32, DomainError> {
        let next = self.quantity_after(catalog_id, variant_id, delta)?;
        if next == 0 {
            self.remove_item(catalog_id, variant_id)?;
            return Ok(0);
        }
        let idx = self
            .position(catalog_id, variant_id)
            .ok_or_else(|| DomainError::not_found("cart item", format!("{catalog_id}/{variant_id}")))?;

        let item = &mut self.items[idx];
        update(item);
        item.quantity = next;

        self.total_price += price.retail_price.scale(delta);
        self.total_discount += price.applied_discount.scale(delta);
        self.grand_total += price.discounted_price.scale(delta);
        self.touch();
        Ok(next)
    }

    /// Empties the cart and zeroes the totals.
    pub fn clear(&mut self) {
        self.items.clear();
        let zero = self.total_price.zeroed();
        self.reset_totals(&zero);
        self.touch();
    }

    fn add_contribution(&mut self, item: &CartItem) {
        let (retail, discount, payable) = item.line_totals();
        self.total_price += retail;
        self.total_discount += discount;
        self.grand_total += payable;
    }

    fn subtract_contribution(&mut self, item: &CartItem) {
        let (retail, discount, payable) = item.line_totals();
        self.total_price -= retail;
        self.total_discount -= discount;
        self.grand_total -= payable;
    }

    fn reset_totals(&mut self, currency_of: &Money) {
        self.total_price = currency_of.zeroed();
        self.total_discount = currency_of.zeroed();
        self.grand_total = currency_of.zeroed();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A cart item as shown to the user, priced from its own discount snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInfo {
    #[serde(flatten)]
    pub item: CartItem,
    pub applied_discount: Money,
    pub line_total: Money,
}

/// Read view of a cart with totals recomputed from the item snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartInfo {
    pub id: CartId,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub items: Vec<CartItemInfo>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub total_price: Money,
    pub total_discount: Money,
    pub grand_total: Money,
    pub item_count: usize,
}

/// Input for adding a variant to a cart.
#[derive(Debug, Clone)]
pub struct AddToCart {
    pub user_id: UserId,
    pub catalog_id: CatalogId,
    pub variant_id: VariantId,
    pub quantity: u32,
}

impl AddToCart {
    pub fn new(
        user_id: impl Into<UserId>,
        catalog_id: impl Into<CatalogId>,
        variant_id: impl Into<VariantId>,
        quantity: u32,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            catalog_id: catalog_id.into(),
            variant_id: variant_id.into(),
            quantity,
        }
    }
}

/// Input for changing the quantity of a cart item.
///
/// `quantity` is a signed delta; zero removes the item outright.
#[derive(Debug, Clone)]
pub struct UpdateItemQty {
    pub user_id: UserId,
    pub catalog_id: CatalogId,
    pub variant_id: VariantId,
    pub quantity: i64,
}

impl UpdateItemQty {
    pub fn new(
        user_id: impl Into<UserId>,
        catalog_id: impl Into<CatalogId>,
        variant_id: impl Into<VariantId>,
        quantity: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            catalog_id: catalog_id.into(),
            variant_id: variant_id.into(),
            quantity,
        }
    }
}

/// Input for replacing cart addresses. Absent fields are left unchanged.
#[derive(Debug, Clone)]
pub struct SetCartAddress {
    pub user_id: UserId,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
}
