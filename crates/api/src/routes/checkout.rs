//! Checkout endpoints: from a stored cart, or express without one.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::{ExpressItemOrder, ExpressOrder, PlacedOrder};
use common::UserId;
use serde::Serialize;
use store::DocumentStore;

use crate::error::ApiError;
use crate::state::AppState;

/// Orders created by one checkout, one per brand.
#[derive(Serialize)]
pub struct CheckoutResponse {
    pub orders: Vec<PlacedOrder>,
}

fn placed(orders: Vec<PlacedOrder>) -> (StatusCode, Json<CheckoutResponse>) {
    (StatusCode::CREATED, Json(CheckoutResponse { orders }))
}

/// POST /carts/{user_id}/checkout
#[tracing::instrument(skip(state))]
pub async fn cart<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let orders = state.checkout.checkout(&UserId::new(user_id)).await?;
    Ok(placed(orders))
}

/// POST /checkout/express
#[tracing::instrument(skip(state, order), fields(user_id = %order.user_id, items = order.items.len()))]
pub async fn express<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(order): Json<ExpressOrder>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let orders = state.express.checkout(order).await?;
    Ok(placed(orders))
}

/// POST /checkout/express/item
#[tracing::instrument(skip(state, order), fields(user_id = %order.user_id))]
pub async fn express_item<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(order): Json<ExpressItemOrder>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let orders = state.express.checkout_item(order).await?;
    Ok(placed(orders))
}
