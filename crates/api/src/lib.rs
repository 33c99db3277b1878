//! HTTP API server with observability for the storefront pipeline.
//!
//! Provides REST endpoints for carts, discounts, sales and checkout, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use checkout::{CheckoutConfig, InMemoryOrderService};
use domain::InMemoryCatalogService;
use metrics_exporter_prometheus::PrometheusHandle;
use store::DocumentStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::{AppState, SharedCatalog, SharedOrders};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/customers", post(routes::customers::register::<S>))
        .route("/carts/{user_id}", get(routes::carts::get::<S>))
        .route(
            "/carts/{user_id}/items",
            post(routes::carts::add_item::<S>)
                .patch(routes::carts::update_item::<S>)
                .delete(routes::carts::clear::<S>),
        )
        .route("/carts/{user_id}/address", put(routes::carts::set_address::<S>))
        .route("/carts/{user_id}/checkout", post(routes::checkout::cart::<S>))
        .route("/checkout/express", post(routes::checkout::express::<S>))
        .route("/checkout/express/item", post(routes::checkout::express_item::<S>))
        .route("/sales", post(routes::discounts::create_sale::<S>))
        .route("/sales/{id}", get(routes::discounts::get_sale::<S>))
        .route("/discounts", post(routes::discounts::create::<S>))
        .route("/discounts/{id}", get(routes::discounts::get::<S>))
        .route(
            "/discounts/{id}/deactivate",
            post(routes::discounts::deactivate::<S>),
        )
        .route(
            "/catalogs/{catalog_id}/discounts",
            get(routes::discounts::list_for_catalog::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state backed by in-memory collaborators.
///
/// Returns the catalog and order handles so callers can seed and inspect them.
pub fn create_default_state<S: DocumentStore + Clone + 'static>(
    store: S,
) -> (
    Arc<AppState<S>>,
    Arc<InMemoryCatalogService>,
    InMemoryOrderService,
) {
    let catalog = Arc::new(InMemoryCatalogService::new());
    let orders = InMemoryOrderService::new();

    let state = Arc::new(AppState::new(
        store,
        catalog.clone(),
        Arc::new(orders.clone()),
        CheckoutConfig::default(),
    ));

    (state, catalog, orders)
}
