//! Discount and sale administration.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{CatalogId, DiscountId, SaleId};
use domain::{CreateDiscount, CreateSale, Discount, Sale};
use store::DocumentStore;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /sales
#[tracing::instrument(skip(state, req), fields(slug = %req.slug))]
pub async fn create_sale<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateSale>,
) -> Result<(StatusCode, Json<Sale>), ApiError> {
    let sale = state.discounts.create_sale(req).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// GET /sales/{id}
#[tracing::instrument(skip(state))]
pub async fn get_sale<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Sale>, ApiError> {
    let sale = state.discounts.get_sale(&SaleId::new(id)).await?;
    Ok(Json(sale))
}

/// POST /discounts
///
/// Rejected with 409 when the window overlaps an active discount on the
/// same catalog item.
#[tracing::instrument(skip(state, req), fields(catalog_id = %req.catalog_id))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateDiscount>,
) -> Result<(StatusCode, Json<Discount>), ApiError> {
    let discount = state.discounts.create_discount(req).await?;
    Ok((StatusCode::CREATED, Json(discount)))
}

/// GET /discounts/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Discount>, ApiError> {
    let discount = state.discounts.get_discount(&DiscountId::new(id)).await?;
    Ok(Json(discount))
}

/// POST /discounts/{id}/deactivate
#[tracing::instrument(skip(state))]
pub async fn deactivate<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Discount>, ApiError> {
    let discount = state
        .discounts
        .deactivate_discount(&DiscountId::new(id))
        .await?;
    Ok(Json(discount))
}

/// GET /catalogs/{catalog_id}/discounts: active discounts on one catalog item.
#[tracing::instrument(skip(state))]
pub async fn list_for_catalog<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(catalog_id): Path<String>,
) -> Result<Json<Vec<Discount>>, ApiError> {
    let discounts = state
        .discounts
        .list_active_discounts(&CatalogId::new(catalog_id))
        .await?;
    Ok(Json(discounts))
}
