//! Shared application state.

use std::sync::Arc;

use checkout::{CheckoutAssembler, CheckoutConfig, ExpressCheckout, OrderService};
use domain::{CartService, CatalogService, CustomerService, DiscountService};
use store::DocumentStore;

/// Catalog collaborator shared by every service.
pub type SharedCatalog = Arc<dyn CatalogService>;

/// Order collaborator shared by both checkout paths.
pub type SharedOrders = Arc<dyn OrderService>;

/// Shared application state accessible from all handlers.
pub struct AppState<S: DocumentStore> {
    pub customers: CustomerService<S>,
    pub carts: CartService<S, SharedCatalog>,
    pub discounts: DiscountService<S>,
    pub checkout: CheckoutAssembler<S, SharedCatalog, SharedOrders>,
    pub express: ExpressCheckout<SharedCatalog, SharedOrders>,
}

impl<S: DocumentStore + Clone> AppState<S> {
    /// Wires every service to the same store and collaborators.
    pub fn new(
        store: S,
        catalog: SharedCatalog,
        orders: SharedOrders,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            customers: CustomerService::new(store.clone()),
            carts: CartService::new(store.clone(), catalog.clone()),
            discounts: DiscountService::new(store.clone()),
            checkout: CheckoutAssembler::new(store, catalog.clone(), orders.clone(), config),
            express: ExpressCheckout::new(catalog, orders, config),
        }
    }
}
