//! Tests for the HTTP catalog client against an in-process mock server.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use common::{CatalogId, Money, VariantId};
use domain::{CatalogError, CatalogService, HttpCatalogClient, InventoryStatus};
use serde_json::json;
use tokio::net::TcpListener;

fn catalog_body(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "brandID": "brand-1",
        "name": "Linen Shirt",
        "variants": [{"id": "v-1", "sku": "LS-S", "attribute": "S"}],
        "basePrice": {"currency": "INR", "value": "900"},
        "retailPrice": {"currency": "INR", "value": "1200"},
        "transferPrice": {"currency": "INR", "value": "800"},
        "discountInfo": {
            "id": "d-1",
            "type": "percent",
            "value": 10,
            "maxValue": 0,
            "variantIDs": ["v-1"],
            "validAfter": "2026-01-01T00:00:00Z",
            "validBefore": "2027-01-01T00:00:00Z"
        }
    })
}

async fn catalog(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "missing" => StatusCode::NOT_FOUND.into_response(),
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "refused" => Json(json!({"success": false, "message": "catalog unpublished"})).into_response(),
        "garbled" => (StatusCode::OK, "not json").into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(json!({"success": true, "payload": catalog_body("slow")})).into_response()
        }
        _ => Json(json!({"success": true, "payload": catalog_body(&id)})).into_response(),
    }
}

async fn variant(Path((id, variant_id)): Path<(String, String)>) -> Response {
    if variant_id != "v-1" {
        return StatusCode::NOT_FOUND.into_response();
    }
    let mut body = catalog_body(&id);
    body["inventoryInfo"] = json!({"unitInStock": 0, "status": "out of stock"});
    Json(json!({"success": true, "payload": body})).into_response()
}

async fn start_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route("/api/keeper/catalog/{id}", get(catalog))
        .route("/api/keeper/catalog/{id}/variant/{variant_id}", get(variant));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn client(timeout: Duration) -> HttpCatalogClient {
    let addr = start_server().await;
    HttpCatalogClient::new(format!("http://{addr}/"), timeout).unwrap()
}

#[tokio::test]
async fn fetches_catalog_payload() {
    let client = client(Duration::from_secs(2)).await;
    let info = client.get_catalog(&CatalogId::new("cat-1")).await.unwrap();

    assert_eq!(info.id, CatalogId::new("cat-1"));
    assert_eq!(info.retail_price, Money::from_units(1200));
    assert!(info.discount_info.unwrap().covers(&VariantId::new("v-1")));
}

#[tokio::test]
async fn fetches_variant_with_inventory() {
    let client = client(Duration::from_secs(2)).await;
    let variant = client
        .get_variant(&CatalogId::new("cat-1"), &VariantId::new("v-1"))
        .await
        .unwrap();

    assert_eq!(variant.inventory_info.unit_in_stock, 0);
    assert_eq!(variant.inventory_info.status, InventoryStatus::OutOfStock);
}

#[tokio::test]
async fn not_found_maps_to_typed_errors() {
    let client = client(Duration::from_secs(2)).await;

    let err = client
        .get_catalog(&CatalogId::new("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::CatalogNotFound { .. }));

    let err = client
        .get_variant(&CatalogId::new("cat-1"), &VariantId::new("v-9"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::VariantNotFound { .. }));
}

#[tokio::test]
async fn failures_are_hard_errors() {
    let client = client(Duration::from_secs(2)).await;

    let err = client.get_catalog(&CatalogId::new("broken")).await.unwrap_err();
    assert!(matches!(err, CatalogError::Status { status: 500, .. }));

    let err = client.get_catalog(&CatalogId::new("refused")).await.unwrap_err();
    match err {
        CatalogError::Unsuccessful { message, .. } => assert_eq!(message, "catalog unpublished"),
        other => panic!("expected unsuccessful, got {other:?}"),
    }

    let err = client.get_catalog(&CatalogId::new("garbled")).await.unwrap_err();
    assert!(matches!(err, CatalogError::Decode { .. }));
}

#[tokio::test]
async fn slow_response_times_out() {
    let client = client(Duration::from_millis(100)).await;
    let err = client.get_catalog(&CatalogId::new("slow")).await.unwrap_err();
    assert!(matches!(err, CatalogError::Timeout { .. }));
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpCatalogClient::new(format!("http://{addr}"), Duration::from_secs(1)).unwrap();
    let err = client.get_catalog(&CatalogId::new("cat-1")).await.unwrap_err();
    assert!(matches!(err, CatalogError::Transport { .. }));
}

#[tokio::test]
async fn ids_are_sent_as_single_path_segments() {
    let client = client(Duration::from_secs(1)).await;

    let catalog = client
        .get_catalog(&CatalogId::new("shirt/variant/v-1?x=1"))
        .await
        .unwrap();
    assert_eq!(catalog.id, CatalogId::new("shirt/variant/v-1?x=1"));

    let err = client
        .get_variant(&CatalogId::new("cat-1"), &VariantId::new("v-1?debug=1"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::VariantNotFound { .. }));
}
