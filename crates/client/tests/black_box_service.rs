use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use backoffice_client::{
    ApiClient, ClientConfig, CustomerAddresses, ResourceApi, ResourceService, ServiceError,
};
use backoffice_core::{ListParams, ResourceId};
use backoffice_inventory::{InventoryItem, Warehouse};
use backoffice_parties::Supplier;
use backoffice_products::{Product, Review};
use backoffice_sales::{Order, Rfq};
use rust_decimal::Decimal;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
struct Recorded {
    method: &'static str,
    path: String,
    query: HashMap<String, String>,
    authorization: Option<String>,
    request_id: Option<String>,
    body: Option<Value>,
}

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<Recorded>>>);

impl Log {
    fn push(&self, entry: Recorded) {
        self.0.lock().unwrap().push(entry);
    }

    fn all(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    fn last(&self) -> Recorded {
        self.all().pop().expect("no request recorded")
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn record(
    log: &Log,
    method: &'static str,
    path: String,
    query: HashMap<String, String>,
    headers: &HeaderMap,
    body: Option<Value>,
) {
    log.push(Recorded {
        method,
        path,
        query,
        authorization: header(headers, "authorization"),
        request_id: header(headers, "x-request-id"),
        body,
    });
}

async fn list_products(
    State(log): State<Log>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    let page: u64 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: u64 = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    record(&log, "GET", "/private/products".into(), query, &headers, None);

    let total = 25u64;
    let start = (page - 1) * limit;
    let end = (start + limit).min(total);
    let items: Vec<Value> = (start..end)
        .map(|i| json!({ "_id": format!("p{i}"), "name": format!("Product {i}"), "price": 2 }))
        .collect();

    Json(json!({
        "success": true,
        "data": { "items": items, "total": total, "page": page, "limit": limit, "totalPages": 3 }
    }))
}

async fn get_product(
    State(log): State<Log>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    record(&log, "GET", format!("/private/products/{id}"), HashMap::new(), &headers, None);
    match id.as_str() {
        "missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Product not found" })),
        ),
        "silent" => (StatusCode::NOT_FOUND, Json(json!({}))),
        "broken" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false })),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": { "_id": id, "name": "Widget", "price": 9.5 } })),
        ),
    }
}

async fn create_product(
    State(log): State<Log>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record(&log, "POST", "/private/products".into(), HashMap::new(), &headers, Some(body.clone()));
    let mut created = body;
    created["_id"] = json!("new-1");
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Product created", "data": created })),
    )
}

async fn update_product(
    State(log): State<Log>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&log, "PUT", format!("/private/products/{id}"), HashMap::new(), &headers, Some(body.clone()));
    let mut updated = body;
    updated["_id"] = json!(id);
    Json(json!({ "success": true, "data": updated }))
}

async fn delete_product(
    State(log): State<Log>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    record(&log, "DELETE", format!("/private/products/{id}"), HashMap::new(), &headers, None);
    Json(json!({ "success": true, "message": "Product deleted successfully" }))
}

fn app(log: Log) -> Router {
    Router::new()
        .route("/api/private/products", get(list_products).post(create_product))
        .route(
            "/api/private/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            "/api/private/rfqs",
            get(|| async {
                Json(json!({
                    "success": true,
                    "data": {
                        "rfqs": [
                            { "_id": "r1", "rfqNumber": "RFQ-001", "quantity": 5 },
                            { "_id": "r2", "rfqNumber": "RFQ-002", "quantity": 7 }
                        ],
                        "pagination": { "totalItems": 12, "currentPage": 2, "pageSize": 2, "totalPages": 6 }
                    }
                }))
            }),
        )
        .route(
            "/api/private/inventory",
            get(|| async {
                Json(json!({
                    "inventory": [
                        { "_id": "i1", "productName": "Bolt", "quantity": 3, "reorderLevel": 10 }
                    ]
                }))
            }),
        )
        .route(
            "/api/private/orders",
            get(|| async { Json(json!({ "success": true, "data": { "orders": [] } })) }),
        )
        .route(
            "/api/private/reviews",
            get(|| async { Json(json!({ "success": false, "message": "Reviews are disabled" })) }),
        )
        .route(
            "/api/private/suppliers",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Token expired" })),
                )
            }),
        )
        .route(
            "/api/private/warehouses",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({ "warehouses": [] }))
            }),
        )
        .route(
            "/api/private/customers/:id/addresses",
            get(|Path(id): Path<String>| async move {
                Json(json!({
                    "success": true,
                    "data": [
                        { "_id": format!("{id}-a1"), "line1": "1 Main St", "city": "Oslo", "isDefault": true }
                    ]
                }))
            }),
        )
        .with_state(log)
}

struct TestServer {
    base_url: String,
    log: Log,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let log = Log::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/api", addr);

        let router = app(log.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url,
            log,
            handle,
        }
    }

    fn client(&self) -> ApiClient {
        ApiClient::new(&ClientConfig::new(&self.base_url).with_token("test-token")).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn list_returns_canonical_page_and_omits_empty_filters() {
    let srv = TestServer::spawn().await;
    let products = ResourceService::<Product>::new(srv.client());

    let params = ListParams::new(2, 10)
        .with_search("")
        .with_filter("status", "");
    let page = products.list(&params).await.unwrap();

    assert_eq!(page.total, 25);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.items[0].id.as_str(), "p10");
    assert_eq!(page.items[0].price, Decimal::from(2));

    let req = srv.log.last();
    assert_eq!(req.query.get("page").map(String::as_str), Some("2"));
    assert_eq!(req.query.get("limit").map(String::as_str), Some("10"));
    assert!(!req.query.contains_key("search"));
    assert!(!req.query.contains_key("status"));
}

#[tokio::test]
async fn list_forwards_search_filters_and_sort() {
    let srv = TestServer::spawn().await;
    let products = ResourceService::<Product>::new(srv.client());

    let params = ListParams::default()
        .with_search("bolt")
        .with_filter("status", "active")
        .with_sort("name", backoffice_core::SortOrder::Desc);
    products.list(&params).await.unwrap();

    let req = srv.log.last();
    assert_eq!(req.query.get("search").map(String::as_str), Some("bolt"));
    assert_eq!(req.query.get("status").map(String::as_str), Some("active"));
    assert_eq!(req.query.get("sortBy").map(String::as_str), Some("name"));
    assert_eq!(req.query.get("sortOrder").map(String::as_str), Some("desc"));
}

#[tokio::test]
async fn every_request_carries_bearer_token_and_request_id() {
    let srv = TestServer::spawn().await;
    let products = ResourceService::<Product>::new(srv.client());

    products.get_by_id(&ResourceId::new("p1")).await.unwrap();

    let req = srv.log.last();
    assert_eq!(req.authorization.as_deref(), Some("Bearer test-token"));
    let request_id = req.request_id.expect("x-request-id header missing");
    assert!(uuid::Uuid::parse_str(&request_id).is_ok());
}

#[tokio::test]
async fn resource_named_envelopes_are_normalized() {
    let srv = TestServer::spawn().await;

    let rfqs = ResourceService::<Rfq>::new(srv.client())
        .list(&ListParams::new(2, 2))
        .await
        .unwrap();
    assert_eq!(rfqs.total, 12);
    assert_eq!(rfqs.page, 2);
    assert_eq!(rfqs.total_pages, 6);
    assert_eq!(rfqs.items[1].id.as_str(), "r2");
    assert_eq!(rfqs.items[1].rfq_number.as_deref(), Some("RFQ-002"));

    let inventory = ResourceService::<InventoryItem>::new(srv.client())
        .list(&ListParams::default())
        .await
        .unwrap();
    assert_eq!(inventory.total, 1);
    assert_eq!(inventory.total_pages, 1);
    assert_eq!(inventory.items[0].id.as_str(), "i1");
}

#[tokio::test]
async fn undeclared_envelope_is_a_normalization_error() {
    let srv = TestServer::spawn().await;

    let err = ResourceService::<Order>::new(srv.client())
        .list(&ListParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Normalization { .. }));
    assert_eq!(err.to_string(), "Failed to fetch orders");
}

#[tokio::test]
async fn error_message_comes_from_server_or_fallback() {
    let srv = TestServer::spawn().await;
    let products = ResourceService::<Product>::new(srv.client());

    let err = products.get_by_id(&ResourceId::new("missing")).await.unwrap_err();
    assert_eq!(err, ServiceError::api(404, "Product not found"));
    assert!(!err.is_retryable());

    let err = products.get_by_id(&ResourceId::new("silent")).await.unwrap_err();
    assert_eq!(err, ServiceError::api(404, "Failed to fetch product"));

    let err = products.get_by_id(&ResourceId::new("broken")).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn success_false_on_200_is_an_api_error() {
    let srv = TestServer::spawn().await;

    let err = ResourceService::<Review>::new(srv.client())
        .list(&ListParams::default())
        .await
        .unwrap_err();

    assert_eq!(err, ServiceError::api(200, "Reviews are disabled"));
}

#[tokio::test]
async fn unauthorized_is_not_retryable() {
    let srv = TestServer::spawn().await;

    let err = ResourceService::<Supplier>::new(srv.client())
        .list(&ListParams::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ServiceError::Unauthorized {
            message: "Token expired".into()
        }
    );
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let srv = TestServer::spawn().await;
    let config = ClientConfig::new(&srv.base_url).with_timeout(Duration::from_secs(1));
    let warehouses = ResourceService::<Warehouse>::new(ApiClient::new(&config).unwrap());

    let err = warehouses.list(&ListParams::default()).await.unwrap_err();

    assert!(matches!(err, ServiceError::Timeout { .. }), "got {err:?}");
    assert_eq!(err.message(), "Failed to fetch warehouses");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::new(format!("http://{addr}/api"));
    let products = ResourceService::<Product>::new(ApiClient::new(&config).unwrap());

    let err = products.list(&ListParams::default()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Network { .. }), "got {err:?}");
    assert_eq!(err.to_string(), "Failed to fetch products");
}

#[tokio::test]
async fn create_update_delete_round_trip() {
    let srv = TestServer::spawn().await;
    let products = ResourceService::<Product>::new(srv.client());

    let created = products
        .create(json!({ "name": "Gadget", "price": 12.5 }))
        .await
        .unwrap();
    assert_eq!(created.id.as_str(), "new-1");
    assert_eq!(created.name, "Gadget");
    assert_eq!(created.price, Decimal::new(125, 1));

    let post = srv.log.last();
    assert_eq!(post.method, "POST");
    assert_eq!(post.body, Some(json!({ "name": "Gadget", "price": 12.5 })));

    let updated = products
        .update(&created.id, json!({ "name": "Gadget Pro" }))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Gadget Pro");
    assert_eq!(srv.log.last().path, "/private/products/new-1");

    let ack = products.delete(&created.id).await.unwrap();
    assert_eq!(ack.message, "Product deleted successfully");
    assert_eq!(srv.log.last().method, "DELETE");
}

#[tokio::test]
async fn empty_id_is_rejected_without_a_request() {
    let srv = TestServer::spawn().await;
    let products = ResourceService::<Product>::new(srv.client());

    let err = products.get_by_id(&ResourceId::new("")).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRequest { .. }));

    let err = products.delete(&ResourceId::new("  ")).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRequest { .. }));

    assert!(srv.log.all().is_empty());
}

#[tokio::test]
async fn customer_addresses_are_listed_under_the_customer() {
    let srv = TestServer::spawn().await;
    let addresses = CustomerAddresses::new(srv.client());

    let list = addresses.list(&ResourceId::new("c7")).await.unwrap();

    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id.as_str(), "c7-a1");
    assert_eq!(list[0].city, "Oslo");
    assert!(list[0].is_default);
}
