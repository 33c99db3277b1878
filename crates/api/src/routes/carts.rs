//! Cart endpoints. Carts are addressed by the owning user's ID.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{CatalogId, UserId, VariantId};
use domain::{AddToCart, Address, Cart, CartInfo, SetCartAddress, UpdateItemQty};
use serde::Deserialize;
use store::DocumentStore;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AddItemRequest {
    #[serde(rename = "catalogID")]
    pub catalog_id: CatalogId,
    #[serde(rename = "variantID")]
    pub variant_id: VariantId,
    pub quantity: u32,
}

/// Signed quantity change; zero removes the item.
#[derive(Deserialize)]
pub struct UpdateItemRequest {
    #[serde(rename = "catalogID")]
    pub catalog_id: CatalogId,
    #[serde(rename = "variantID")]
    pub variant_id: VariantId,
    pub quantity: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub billing_address: Option<Address>,
}

/// GET /carts/{user_id}
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<CartInfo>, ApiError> {
    let info = state.carts.get_cart_info(&UserId::new(user_id)).await?;
    Ok(Json(info))
}

/// POST /carts/{user_id}/items
#[tracing::instrument(skip(state, req), fields(catalog_id = %req.catalog_id, variant_id = %req.variant_id))]
pub async fn add_item<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<Cart>, ApiError> {
    let cmd = AddToCart::new(user_id, req.catalog_id, req.variant_id, req.quantity);
    let cart = state.carts.add_to_cart(cmd).await?;
    Ok(Json(cart))
}

/// PATCH /carts/{user_id}/items
#[tracing::instrument(skip(state, req), fields(catalog_id = %req.catalog_id, delta = req.quantity))]
pub async fn update_item<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<Cart>, ApiError> {
    let cmd = UpdateItemQty::new(user_id, req.catalog_id, req.variant_id, req.quantity);
    let cart = state.carts.update_item_qty(cmd).await?;
    Ok(Json(cart))
}

/// DELETE /carts/{user_id}/items: empties the cart.
#[tracing::instrument(skip(state))]
pub async fn clear<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<Cart>, ApiError> {
    let cart = state.carts.clear_cart(&UserId::new(user_id)).await?;
    Ok(Json(cart))
}

/// PUT /carts/{user_id}/address
#[tracing::instrument(skip(state, req))]
pub async fn set_address<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<Cart>, ApiError> {
    let cmd = SetCartAddress {
        user_id: UserId::new(user_id),
        shipping_address: req.shipping_address,
        billing_address: req.billing_address,
    };
    let cart = state.carts.set_cart_address(cmd).await?;
    Ok(Json(cart))
}
