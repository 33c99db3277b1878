//! Integration tests for cart and express checkout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use checkout::{
    CheckoutAssembler, CheckoutConfig, CheckoutError, CheckoutLine, ExpressCheckout,
    ExpressItemOrder, ExpressOrder, InMemoryOrderService, OrderOpts, OrderService,
    OrderServiceError, OrderSource, PlacedOrder, StockFailureReason,
};
use common::{BrandId, CatalogId, DiscountId, Money, UserId, VariantId};
use domain::{
    AddToCart, CartService, CatalogError, CatalogInfo, CatalogService, CatalogVariant,
    CustomerService, DiscountInfo, DiscountKind, InMemoryCatalogService,
};
use rust_decimal::Decimal;
use store::InMemoryDocumentStore;

type Catalog = Arc<InMemoryCatalogService>;

struct Fixture {
    store: InMemoryDocumentStore,
    catalog: Catalog,
    orders: InMemoryOrderService,
    carts: CartService<InMemoryDocumentStore, Catalog>,
    assembler: CheckoutAssembler<InMemoryDocumentStore, Catalog, InMemoryOrderService>,
    user: UserId,
}

fn seed_catalog() -> Catalog {
    let catalog = Arc::new(InMemoryCatalogService::new());
    catalog.insert_catalog(
        CatalogInfo::new("shirt", "brand-a", "Shirt", Money::from_units(1000))
            .with_variant("shirt-s", "SH-S")
            .with_variant("shirt-m", "SH-M"),
        10,
    );
    catalog.insert_catalog(
        CatalogInfo::new("mug", "brand-b", "Mug", Money::from_units(250)).with_variant("mug-1", "MG"),
        10,
    );
    catalog.insert_catalog(
        CatalogInfo::new("lamp", "brand-c", "Lamp", Money::from_units(1500))
            .with_variant("lamp-1", "LP"),
        10,
    );
    catalog
}

async fn fixture() -> Fixture {
    let store = InMemoryDocumentStore::new();
    let catalog = seed_catalog();
    let orders = InMemoryOrderService::new();
    let user = UserId::new("u-1");

    CustomerService::new(store.clone())
        .register(&user)
        .await
        .unwrap();
    let carts = CartService::new(store.clone(), catalog.clone());
    carts.create_cart(&user).await.unwrap();

    let assembler = CheckoutAssembler::new(
        store.clone(),
        catalog.clone(),
        orders.clone(),
        CheckoutConfig::default(),
    );

    Fixture {
        store,
        catalog,
        orders,
        carts,
        assembler,
        user,
    }
}

async fn add(fx: &Fixture, catalog: &str, variant: &str, quantity: u32) {
    fx.carts
        .add_to_cart(AddToCart::new(fx.user.clone(), catalog, variant, quantity))
        .await
        .unwrap();
}

mod cart_checkout {
    use super::*;

    #[tokio::test]
    async fn out_of_stock_item_blocks_every_order() {
        let fx = fixture().await;
        add(&fx, "shirt", "shirt-s", 1).await;
        add(&fx, "shirt", "shirt-m", 2).await;
        add(&fx, "mug", "mug-1", 1).await;
        fx.catalog
            .set_stock(&CatalogId::new("shirt"), &VariantId::new("shirt-m"), 0);

        let err = fx.assembler.checkout(&fx.user).await.unwrap_err();

        match err {
            CheckoutError::OutOfStock(report) => {
                assert_eq!(report.len(), 1);
                let failure = &report.failures()[0];
                assert_eq!(failure.variant_id, VariantId::new("shirt-m"));
                assert_eq!(failure.reason, StockFailureReason::OutOfStock);
            }
            other => panic!("expected stock report, got {other:?}"),
        }
        assert!(fx.orders.submitted_orders().is_empty());
        assert_eq!(fx.carts.get_cart(&fx.user).await.unwrap().item_count(), 3);
    }

    #[tokio::test]
    async fn every_stock_failure_is_reported() {
        let fx = fixture().await;
        add(&fx, "shirt", "shirt-s", 5).await;
        add(&fx, "mug", "mug-1", 1).await;
        add(&fx, "lamp", "lamp-1", 1).await;
        fx.catalog
            .set_stock(&CatalogId::new("shirt"), &VariantId::new("shirt-s"), 2);
        fx.catalog
            .set_stock(&CatalogId::new("lamp"), &VariantId::new("lamp-1"), 0);

        let Err(CheckoutError::OutOfStock(report)) = fx.assembler.checkout(&fx.user).await else {
            panic!("expected stock report");
        };
        assert_eq!(report.len(), 2);
        assert_eq!(
            report.failures()[0].reason,
            StockFailureReason::InsufficientStock
        );
        assert!(report.contains(&CatalogId::new("lamp"), &VariantId::new("lamp-1")));
    }

    #[tokio::test]
    async fn one_order_per_brand() {
        let fx = fixture().await;
        add(&fx, "shirt", "shirt-s", 1).await;
        add(&fx, "shirt", "shirt-m", 2).await;
        add(&fx, "mug", "mug-1", 3).await;
        add(&fx, "lamp", "lamp-1", 1).await;

        let placed = fx.assembler.checkout(&fx.user).await.unwrap();
        assert_eq!(placed.len(), 3);

        let submitted = fx.orders.submitted_orders();
        assert_eq!(fx.orders.batch_count(), 1);
        assert_eq!(submitted.len(), 3);
        assert!(submitted.iter().all(|o| o.source == OrderSource::Cart));
        for order in &submitted {
            assert!(
                order
                    .order_items
                    .iter()
                    .all(|i| i.brand_id() == &order.brand_id)
            );
        }
        let total: u32 = submitted.iter().map(|o| o.total_quantity()).sum();
        assert_eq!(total, 7);

        let shirts = submitted
            .iter()
            .find(|o| o.brand_id == BrandId::new("brand-a"))
            .unwrap();
        assert_eq!(shirts.order_items.len(), 2);
    }

    #[tokio::test]
    async fn successful_checkout_clears_cart() {
        let fx = fixture().await;
        add(&fx, "mug", "mug-1", 1).await;

        fx.assembler.checkout(&fx.user).await.unwrap();

        let cart = fx.carts.get_cart(&fx.user).await.unwrap();
        assert!(cart.is_empty());
        assert!(cart.grand_total.is_zero());
    }

    /// Order service during whose submission the user adds another item.
    struct AddsDuringSubmit {
        inner: InMemoryOrderService,
        carts: CartService<InMemoryDocumentStore, Catalog>,
        user: UserId,
    }

    #[async_trait]
    impl OrderService for AddsDuringSubmit {
        async fn submit_orders(
            &self,
            orders: Vec<OrderOpts>,
        ) -> Result<Vec<PlacedOrder>, OrderServiceError> {
            self.carts
                .add_to_cart(AddToCart::new(self.user.clone(), "lamp", "lamp-1", 1))
                .await
                .unwrap();
            self.inner.submit_orders(orders).await
        }
    }

    #[tokio::test]
    async fn item_added_during_checkout_stays_in_cart() {
        let fx = fixture().await;
        add(&fx, "mug", "mug-1", 2).await;

        let orders = AddsDuringSubmit {
            inner: InMemoryOrderService::new(),
            carts: fx.carts.clone(),
            user: fx.user.clone(),
        };
        let assembler = CheckoutAssembler::new(
            fx.store.clone(),
            fx.catalog.clone(),
            orders,
            CheckoutConfig::default(),
        );

        let placed = assembler.checkout(&fx.user).await.unwrap();
        assert_eq!(placed.len(), 1);

        let cart = fx.carts.get_cart(&fx.user).await.unwrap();
        assert_eq!(cart.item_count(), 1);
        assert!(
            cart.find_item(&CatalogId::new("lamp"), &VariantId::new("lamp-1"))
                .is_some()
        );
        assert_eq!(cart.grand_total, Money::from_units(1500));
    }

    #[tokio::test]
    async fn checkout_uses_live_discount() {
        let fx = fixture().await;
        add(&fx, "shirt", "shirt-s", 1).await;

        let now = Utc::now();
        fx.catalog.set_discount(
            &CatalogId::new("shirt"),
            Some(DiscountInfo {
                id: DiscountId::new("d-live"),
                kind: DiscountKind::Flat,
                value: Decimal::from(150),
                max_value: Decimal::ZERO,
                variant_ids: vec![VariantId::new("shirt-s")],
                sale_id: None,
                valid_after: now - chrono::Duration::hours(1),
                valid_before: now + chrono::Duration::hours(1),
            }),
        );

        fx.assembler.checkout(&fx.user).await.unwrap();

        let item = &fx.orders.submitted_orders()[0].order_items[0];
        assert_eq!(item.discount_id, Some(DiscountId::new("d-live")));
        assert_eq!(item.discounted_price, Some(Money::from_units(850)));
    }

    #[tokio::test]
    async fn empty_and_missing_carts() {
        let fx = fixture().await;

        let err = fx.assembler.checkout(&fx.user).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart(_)));
        assert!(err.is_validation());

        let err = fx
            .assembler
            .checkout(&UserId::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::CartNotFound(_)));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn rejected_submission_keeps_cart() {
        let fx = fixture().await;
        add(&fx, "mug", "mug-1", 1).await;
        fx.orders.set_fail_on_submit(true);

        let err = fx.assembler.checkout(&fx.user).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Order(_)));
        assert_eq!(fx.carts.get_cart(&fx.user).await.unwrap().item_count(), 1);
    }
}

mod deadlines {
    use super::*;

    /// Catalog that answers after a fixed delay.
    struct SlowCatalog {
        inner: Catalog,
        delay: Duration,
    }

    #[async_trait]
    impl CatalogService for SlowCatalog {
        async fn get_catalog(&self, catalog_id: &CatalogId) -> Result<CatalogInfo, CatalogError> {
            tokio::time::sleep(self.delay).await;
            self.inner.get_catalog(catalog_id).await
        }

        async fn get_variant(
            &self,
            catalog_id: &CatalogId,
            variant_id: &VariantId,
        ) -> Result<CatalogVariant, CatalogError> {
            tokio::time::sleep(self.delay).await;
            self.inner.get_variant(catalog_id, variant_id).await
        }
    }

    #[tokio::test]
    async fn slow_catalog_times_out_without_submitting() {
        let orders = InMemoryOrderService::new();
        let express = ExpressCheckout::new(
            SlowCatalog {
                inner: seed_catalog(),
                delay: Duration::from_millis(200),
            },
            orders.clone(),
            CheckoutConfig::default().with_call_timeout(Duration::from_millis(20)),
        );

        let err = express
            .checkout_item(ExpressItemOrder {
                user_id: UserId::new("u-1"),
                item: CheckoutLine::new("mug", "mug-1", 1),
                shipping_address: None,
                billing_address: None,
            })
            .await
            .unwrap_err();

        match err {
            CheckoutError::Timeout { operation, timeout_ms } => {
                assert_eq!(operation, "catalog variant lookup");
                assert_eq!(timeout_ms, 20);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(orders.submitted_orders().is_empty());
    }
}

mod express {
    use super::*;

    fn express() -> (ExpressCheckout<Catalog, InMemoryOrderService>, Catalog, InMemoryOrderService) {
        let catalog = seed_catalog();
        let orders = InMemoryOrderService::new();
        let express = ExpressCheckout::new(catalog.clone(), orders.clone(), CheckoutConfig::default());
        (express, catalog, orders)
    }

    fn order(items: Vec<CheckoutLine>) -> ExpressOrder {
        ExpressOrder {
            user_id: UserId::new("u-9"),
            items,
            shipping_address: None,
            billing_address: None,
        }
    }

    #[tokio::test]
    async fn groups_items_by_brand() {
        let (express, _, orders) = express();
        let placed = express
            .checkout(order(vec![
                CheckoutLine::new("shirt", "shirt-s", 1),
                CheckoutLine::new("mug", "mug-1", 2),
                CheckoutLine::new("shirt", "shirt-m", 1),
            ]))
            .await
            .unwrap();

        assert_eq!(placed.len(), 2);
        let submitted = orders.submitted_orders();
        assert!(submitted.iter().all(|o| o.source == OrderSource::Express));
        assert_eq!(submitted.iter().map(|o| o.total_quantity()).sum::<u32>(), 4);
    }

    #[tokio::test]
    async fn single_item_places_one_order() {
        let (express, _, orders) = express();
        let placed = express
            .checkout_item(ExpressItemOrder {
                user_id: UserId::new("u-9"),
                item: CheckoutLine::new("lamp", "lamp-1", 2),
                shipping_address: None,
                billing_address: None,
            })
            .await
            .unwrap();

        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].brand_id, BrandId::new("brand-c"));
        assert_eq!(orders.submitted_orders()[0].order_items[0].quantity, 2);
    }

    #[tokio::test]
    async fn accumulates_failures_before_failing() {
        let (express, catalog, orders) = express();
        catalog.set_stock(&CatalogId::new("mug"), &VariantId::new("mug-1"), 0);
        catalog.set_stock(&CatalogId::new("lamp"), &VariantId::new("lamp-1"), 1);

        let err = express
            .checkout(order(vec![
                CheckoutLine::new("mug", "mug-1", 1),
                CheckoutLine::new("shirt", "shirt-s", 1),
                CheckoutLine::new("lamp", "lamp-1", 3),
            ]))
            .await
            .unwrap_err();

        let CheckoutError::OutOfStock(report) = err else {
            panic!("expected stock report");
        };
        assert_eq!(report.len(), 2);
        assert!(orders.submitted_orders().is_empty());
    }

    #[tokio::test]
    async fn rejects_empty_and_zero_quantity_requests() {
        let (express, catalog, _) = express();

        let err = express.checkout(order(vec![])).await.unwrap_err();
        assert!(err.is_validation());

        let err = express
            .checkout(order(vec![CheckoutLine::new("mug", "mug-1", 0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidItem(_)));
        assert_eq!(catalog.lookup_count(), 0);
    }

    #[tokio::test]
    async fn unknown_variant_is_not_found() {
        let (express, _, _) = express();
        let err = express
            .checkout(order(vec![CheckoutLine::new("mug", "mug-7", 1)]))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
