//! Customer registration.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{CartId, CustomerId, UserId};
use serde::{Deserialize, Serialize};
use store::DocumentStore;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    #[serde(rename = "customerID")]
    pub customer_id: CustomerId,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    #[serde(rename = "cartID")]
    pub cart_id: CartId,
}

/// POST /customers: registers a user and gives them a cart.
///
/// Registering the same user twice returns the existing customer and cart.
#[tracing::instrument(skip(state, req), fields(user_id = %req.user_id))]
pub async fn register<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::BadRequest("userID must not be empty".to_string()));
    }
    let user_id = UserId::new(user_id);

    let customer = state.customers.register(&user_id).await?;
    let cart_id = state.carts.create_cart(&user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            customer_id: customer.id,
            user_id,
            cart_id,
        }),
    ))
}
