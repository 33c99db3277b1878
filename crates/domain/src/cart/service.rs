//! Cart service: the only writer of cart documents.

use chrono::Utc;
use common::{CartId, CartItemId, CatalogId, UserId, VariantId};
use store::{Document, DocumentQuery, DocumentStore, DocumentStoreExt, WriteBatch};

use super::CART_COLLECTION;
use super::model::{
    AddToCart, Cart, CartInfo, CartItem, CartItemInfo, SetCartAddress, UpdateItemQty,
};
use crate::catalog::CatalogService;
use crate::customer::{CUSTOMER_COLLECTION, find_customer};
use crate::error::DomainError;
use crate::pricing::price_variant;

/// Service for creating and mutating carts.
///
/// Catalog lookups happen before any write, so a failed lookup leaves the
/// stored cart untouched. Concurrent mutations of one cart are not
/// serialized; the last write wins.
#[derive(Clone)]
pub struct CartService<S, C> {
    store: S,
    catalog: C,
}

impl<S: DocumentStore, C: CatalogService> CartService<S, C> {
    pub fn new(store: S, catalog: C) -> Self {
        Self { store, catalog }
    }

    /// Creates the user's cart and links it to their customer record.
    ///
    /// Both writes commit together. A customer that already has a cart gets
    /// the existing id back.
    #[tracing::instrument(skip(self))]
    pub async fn create_cart(&self, user_id: &UserId) -> Result<CartId, DomainError> {
        let mut customer = find_customer(&self.store, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("customer", user_id))?;
        if let Some(cart_id) = customer.cart_id {
            return Ok(cart_id);
        }

        let cart = Cart::new(user_id.clone());
        customer.cart_id = Some(cart.id.clone());

        let batch = WriteBatch::new()
            .insert(
                CART_COLLECTION,
                Document::from_entity(cart.id.as_str(), &cart)?,
            )
            .replace(
                CUSTOMER_COLLECTION,
                Document::from_entity(customer.id.as_str(), &customer)?,
            );
        self.store.commit(batch).await?;

        tracing::info!(cart_id = %cart.id, "cart created");
        Ok(cart.id)
    }

    /// Adds a variant to the cart with a pricing snapshot from the catalog.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id, catalog_id = %cmd.catalog_id, variant_id = %cmd.variant_id))]
    pub async fn add_to_cart(&self, cmd: AddToCart) -> Result<Cart, DomainError> {
        if cmd.quantity == 0 {
            return Err(DomainError::InvalidQuantity(
                "quantity must be at least 1".to_string(),
            ));
        }

        let mut cart = self.load_cart(&cmd.user_id).await?;
        if cart.find_item(&cmd.catalog_id, &cmd.variant_id).is_some() {
            return Err(DomainError::DuplicateCartItem {
                catalog_id: cmd.catalog_id,
                variant_id: cmd.variant_id,
            });
        }

        let catalog = self.catalog.get_catalog(&cmd.catalog_id).await?;
        let variant = catalog
            .variant(&cmd.variant_id)
            .ok_or_else(|| DomainError::UnknownVariant {
                catalog_id: cmd.catalog_id.clone(),
                variant_id: cmd.variant_id.clone(),
            })?;
        let price = price_variant(
            &catalog.retail_price,
            &cmd.variant_id,
            catalog.discount_info.as_ref(),
            Utc::now(),
        )?;

        cart.add_item(CartItem::new(&catalog, variant, cmd.quantity, &price))?;
        self.save(&cart).await?;

        tracing::info!(
            cart_id = %cart.id,
            quantity = cmd.quantity,
            discounted = price.is_discounted(),
            "item added to cart"
        );
        metrics::counter!("cart_items_added_total").increment(1);
        Ok(cart)
    }

    /// Applies a signed quantity change to a cart item.
    ///
    /// A zero delta removes the item. Otherwise the totals move by the delta
    /// at the live unit price and the item's snapshot is refreshed.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id, catalog_id = %cmd.catalog_id, variant_id = %cmd.variant_id, delta = cmd.quantity))]
    pub async fn update_item_qty(&self, cmd: UpdateItemQty) -> Result<Cart, DomainError> {
        let mut cart = self.load_cart(&cmd.user_id).await?;
        let next = cart.quantity_after(&cmd.catalog_id, &cmd.variant_id, cmd.quantity)?;

        if cmd.quantity == 0 || next == 0 {
            cart.remove_item(&cmd.catalog_id, &cmd.variant_id)?;
            self.save(&cart).await?;
            tracing::info!(cart_id = %cart.id, "item removed from cart");
            return Ok(cart);
        }

        let catalog = self.catalog.get_catalog(&cmd.catalog_id).await?;
        let variant = catalog
            .variant(&cmd.variant_id)
            .ok_or_else(|| DomainError::UnknownVariant {
                catalog_id: cmd.catalog_id.clone(),
                variant_id: cmd.variant_id.clone(),
            })?;
        let price = price_variant(
            &catalog.retail_price,
            &cmd.variant_id,
            catalog.discount_info.as_ref(),
            Utc::now(),
        )?;

        let quantity = cart.apply_delta(
            &cmd.catalog_id,
            &cmd.variant_id,
            cmd.quantity,
            &price,
            |item| item.reprice(&catalog, variant, &price),
        )?;
        self.save(&cart).await?;

        tracing::info!(cart_id = %cart.id, quantity, "cart item quantity updated");
        Ok(cart)
    }

    /// Returns the cart with prices recomputed from each item's snapshot.
    ///
    /// No collaborator is called; the stored running totals are ignored in
    /// favour of a fresh sum.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart_info(&self, user_id: &UserId) -> Result<CartInfo, DomainError> {
        let cart = self.load_cart(user_id).await?;
        let now = Utc::now();

        let zero = cart
            .items
            .first()
            .map(|i| i.retail_price.zeroed())
            .unwrap_or_else(|| cart.total_price.zeroed());
        let mut total_price = zero.clone();
        let mut total_discount = zero.clone();
        let mut grand_total = zero;

        let mut items = Vec::with_capacity(cart.items.len());
        for mut item in cart.items {
            let unit = price_variant(
                &item.retail_price,
                &item.variant_id,
                item.catalog_info.discount_info.as_ref(),
                now,
            )?;
            item.discounted_price = unit
                .is_discounted()
                .then(|| unit.discounted_price.clone());

            let (retail, discount, payable) = item.line_totals();
            total_price += retail;
            total_discount += discount.clone();
            grand_total += payable.clone();
            items.push(CartItemInfo {
                item,
                applied_discount: discount,
                line_total: payable,
            });
        }

        Ok(CartInfo {
            id: cart.id,
            user_id: cart.user_id,
            item_count: items.len(),
            items,
            shipping_address: cart.shipping_address,
            billing_address: cart.billing_address,
            total_price,
            total_discount,
            grand_total,
        })
    }

    /// Replaces the addresses present in the command.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id))]
    pub async fn set_cart_address(&self, cmd: SetCartAddress) -> Result<Cart, DomainError> {
        if cmd.shipping_address.is_none() && cmd.billing_address.is_none() {
            return Err(DomainError::EmptyUpdate);
        }

        let mut cart = self.load_cart(&cmd.user_id).await?;
        if let Some(shipping) = cmd.shipping_address {
            cart.shipping_address = Some(shipping);
        }
        if let Some(billing) = cmd.billing_address {
            cart.billing_address = Some(billing);
        }
        cart.updated_at = Utc::now();
        self.save(&cart).await?;
        Ok(cart)
    }

    /// Empties the cart, keeping the document and its addresses.
    #[tracing::instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: &UserId) -> Result<Cart, DomainError> {
        let mut cart = self.load_cart(user_id).await?;
        cart.clear();
        self.save(&cart).await?;
        tracing::info!(cart_id = %cart.id, "cart cleared");
        Ok(cart)
    }

    /// Removes the given items, leaving anything else in the cart untouched.
    ///
    /// Ids no longer in the cart are skipped.
    #[tracing::instrument(skip(self, item_ids), fields(items = item_ids.len()))]
    pub async fn remove_items(
        &self,
        user_id: &UserId,
        item_ids: &[CartItemId],
    ) -> Result<Cart, DomainError> {
        let mut cart = self.load_cart(user_id).await?;
        let targets: Vec<(CatalogId, VariantId)> = cart
            .items
            .iter()
            .filter(|item| item_ids.contains(&item.id))
            .map(|item| (item.catalog_id.clone(), item.variant_id.clone()))
            .collect();

        for (catalog_id, variant_id) in &targets {
            cart.remove_item(catalog_id, variant_id)?;
        }
        self.save(&cart).await?;

        tracing::info!(cart_id = %cart.id, removed = targets.len(), "items removed from cart");
        Ok(cart)
    }

    /// Loads the user's cart.
    pub async fn get_cart(&self, user_id: &UserId) -> Result<Cart, DomainError> {
        self.load_cart(user_id).await
    }

    async fn load_cart(&self, user_id: &UserId) -> Result<Cart, DomainError> {
        self.store
            .find_one_entity(
                CART_COLLECTION,
                DocumentQuery::new().eq("userID", user_id.as_str()),
            )
            .await?
            .ok_or_else(|| DomainError::not_found("cart", user_id))
    }

    async fn save(&self, cart: &Cart) -> Result<(), DomainError> {
        self.store
            .replace_entity(CART_COLLECTION, cart.id.as_str(), cart)
            .await?;
        Ok(())
    }
}
