use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use backoffice_client::{ApiClient, ClientConfig, ResourceService, ServiceError};
use backoffice_core::ResourceId;
use backoffice_products::Product;
use backoffice_purchasing::{
    PurchaseOrder, PurchaseOrderDraft, PurchaseOrderForm, PurchaseOrderStatus, ShippingMethod,
    SubmitError,
};
use backoffice_query::{InMemoryQueryCache, Notification, QueryClient, QueryConfig, RecordingNotifier, ResourceHooks};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Backend {
    created: Arc<Mutex<Vec<Value>>>,
    create_hits: Arc<Mutex<u32>>,
    searches: Arc<Mutex<Vec<String>>>,
}

async fn create_order(State(backend): State<Backend>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    *backend.create_hits.lock().unwrap() += 1;
    if body["supplier_id"] == "s-hold" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "success": false, "message": "Supplier is on hold" })),
        );
    }
    let mut order = body.clone();
    order["_id"] = json!("po-1");
    order["po_number"] = json!("PO-0001");
    backend.created.lock().unwrap().push(body);
    (StatusCode::CREATED, Json(json!({ "success": true, "data": order })))
}

async fn list_products(
    State(backend): State<Backend>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let search = query.get("search").cloned().unwrap_or_default();
    backend.searches.lock().unwrap().push(search.clone());
    let items: Vec<Value> = [
        json!({ "_id": "p1", "name": "Pallet wrap", "price": 12.5 }),
        json!({ "_id": "p2", "name": "Packing tape", "price": 3.25 }),
    ]
    .into_iter()
    .filter(|p| p["name"].as_str().unwrap().to_lowercase().contains(&search.to_lowercase()))
    .collect();
    let total = items.len();
    Json(json!({ "success": true, "data": { "items": items, "total": total, "page": 1, "limit": 20 } }))
}

struct TestServer {
    base_url: String,
    backend: Backend,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let backend = Backend::default();
        let app = Router::new()
            .route("/api/private/purchase-orders", post(create_order))
            .route("/api/private/products", get(list_products))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            backend,
            handle,
        }
    }

    fn create_hits(&self) -> u32 {
        *self.backend.create_hits.lock().unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn form(srv: &TestServer, notifier: Arc<RecordingNotifier>) -> PurchaseOrderForm {
    let api = ApiClient::new(&ClientConfig::new(&srv.base_url)).unwrap();
    let client = QueryClient::with_parts(Arc::new(InMemoryQueryCache::new()), notifier, QueryConfig::default());
    PurchaseOrderForm::new(
        ResourceHooks::<PurchaseOrder>::new(
            client.clone(),
            Arc::new(ResourceService::<PurchaseOrder>::new(api.clone())),
        ),
        ResourceHooks::<Product>::new(client, Arc::new(ResourceService::<Product>::new(api))),
    )
}

fn filled_draft(supplier: &str) -> PurchaseOrderDraft {
    let mut draft = PurchaseOrderDraft::new();
    draft.set_supplier(ResourceId::new(supplier));
    draft.set_status(PurchaseOrderStatus::Pending);
    draft.set_currency("USD");
    draft.set_expected_date(NaiveDate::from_ymd_opt(2024, 8, 15).unwrap());
    draft.set_shipping_method(ShippingMethod::Freight);
    draft.set_shipping_cost(Decimal::new(1550, 2)).unwrap();
    for (quantity, price) in [(3, 10), (1, 50)] {
        let i = draft.add_item();
        draft.set_quantity(i, quantity).unwrap();
        draft.set_unit_price(i, Decimal::from(price)).unwrap();
    }
    draft
}

#[tokio::test]
async fn invalid_draft_is_rejected_without_a_request() {
    let srv = TestServer::spawn().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let mut form = form(&srv, notifier.clone());
    form.draft_mut().add_item();

    let err = form.submit().await.unwrap_err();

    let errors = match err {
        SubmitError::Invalid(errors) => errors,
        other => panic!("expected field errors, got {other:?}"),
    };
    assert!(errors.contains("supplier_id"));
    assert!(errors.contains("items[0].product_id"));
    assert_eq!(form.field_errors(), &errors);
    assert_eq!(form.draft().items().len(), 1);
    assert_eq!(srv.create_hits(), 0);
    assert!(notifier.notifications().is_empty());
}

#[tokio::test]
async fn successful_submit_sends_the_whole_order_and_clears_the_draft() {
    let srv = TestServer::spawn().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let form = form(&srv, notifier.clone());

    let lookup = form.product_lookup(" wrap ").await;
    let products = lookup.data().unwrap();
    assert_eq!(products.items.len(), 1);
    assert_eq!(srv.backend.searches.lock().unwrap().as_slice(), ["wrap".to_string()]);

    let mut draft = filled_draft("s1");
    draft.select_product(0, &products.items[0]).unwrap();
    draft.select_product(1, &products.items[0]).unwrap();
    let mut form = form.with_draft(draft).unwrap();
    // 3 x 12.5 + 1 x 12.5
    assert_eq!(form.draft().total_amount(), Decimal::from(50));

    let order = form.submit().await.unwrap();

    assert_eq!(order.id, ResourceId::new("po-1"));
    assert_eq!(order.po_number.as_deref(), Some("PO-0001"));
    assert_eq!(order.grand_total(), Decimal::new(6550, 2));
    assert_eq!(form.draft(), &PurchaseOrderDraft::default());
    assert!(form.field_errors().is_empty());
    assert!(!form.is_submitting());
    assert_eq!(
        notifier.last(),
        Some(Notification::success("Purchase order added successfully!"))
    );

    let created = srv.backend.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    let body = &created[0];
    assert_eq!(body["supplier_id"], "s1");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["shipping_method"], "freight");
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["items"][0]["product_id"], "p1");
    assert_eq!(body["items"][0]["quantity"], 3);
    assert_eq!(body["total_amount"].as_f64(), Some(50.0));
}

#[tokio::test]
async fn server_rejection_keeps_the_draft_and_notifies() {
    let srv = TestServer::spawn().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let mut draft = filled_draft("s-hold");
    let wrap: Product = serde_json::from_value(json!({ "id": "p1", "name": "Pallet wrap", "price": 12.5 })).unwrap();
    let tape: Product = serde_json::from_value(json!({ "id": "p2", "name": "Packing tape", "price": 3.25 })).unwrap();
    draft.select_product(0, &wrap).unwrap();
    draft.select_product(1, &tape).unwrap();
    let mut form = form(&srv, notifier.clone()).with_draft(draft.clone()).unwrap();

    let err = form.submit().await.unwrap_err();

    match err {
        SubmitError::Service(ServiceError::Api { status, ref message }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "Supplier is on hold");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(srv.create_hits(), 1);
    assert_eq!(form.draft(), &draft);
    assert_eq!(notifier.last(), Some(Notification::error("Supplier is on hold")));
}
