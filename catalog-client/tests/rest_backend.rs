// catalog-client/tests/rest_backend.rs
// REST backend against a local stub server

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use catalog_client::{ClientConfig, RestBackend};
use parking_lot::Mutex;
use serde_json::{json, Value};
use shared::{BackendError, BlobStore, DataStore, Filter};

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    query: String,
    headers: HeaderMap,
    body: Bytes,
}

#[derive(Clone)]
struct Stub {
    seen: Arc<Mutex<Vec<Seen>>>,
    reply: Arc<Mutex<(StatusCode, String)>>,
}

impl Stub {
    fn reply(&self, status: StatusCode, body: Value) {
        *self.reply.lock() = (status, body.to_string());
    }

    fn last(&self) -> Seen {
        self.seen.lock().last().cloned().expect("no request recorded")
    }
}

async fn record(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    stub.seen.lock().push(Seen {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        headers,
        body,
    });
    stub.reply.lock().clone()
}

async fn start() -> (RestBackend, Stub) {
    let stub = Stub {
        seen: Arc::new(Mutex::new(Vec::new())),
        reply: Arc::new(Mutex::new((StatusCode::OK, "[]".to_string()))),
    };
    let app = Router::new().fallback(record).with_state(stub.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig::new(format!("http://{addr}"), "service-key").with_timeout(5);
    (RestBackend::new(&config).unwrap(), stub)
}

#[tokio::test]
async fn test_query_sends_filters_and_auth() {
    let (backend, stub) = start().await;
    stub.reply(
        StatusCode::OK,
        json!([{ "id": 4, "category": "Furniture", "subcategory": null, "subcategory1": null }]),
    );

    let rows = backend
        .query(
            "products",
            &[Filter::eq("category", "Furniture"), Filter::is_null("subcategory")],
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 4);

    let seen = stub.last();
    assert_eq!(seen.method, Method::GET);
    assert_eq!(seen.path, "/rest/v1/products");
    assert!(seen.query.contains("select=*") || seen.query.contains("select=%2A"));
    assert!(seen.query.contains("category=eq.Furniture"));
    assert!(seen.query.contains("subcategory=is.null"));
    assert_eq!(seen.headers["apikey"], "service-key");
    assert_eq!(seen.headers["authorization"], "Bearer service-key");
}

#[tokio::test]
async fn test_insert_returns_first_row() {
    let (backend, stub) = start().await;
    stub.reply(StatusCode::CREATED, json!([{ "id": 12, "title": "Cushions", "productid": 4 }]));

    let mut row = shared::Record::new();
    row.insert("title".into(), json!("Cushions"));
    row.insert("productid".into(), json!(4));
    let stored = backend.insert("addons", row).await.unwrap();
    assert_eq!(stored["id"], 12);

    let seen = stub.last();
    assert_eq!(seen.method, Method::POST);
    assert_eq!(seen.headers["prefer"], "return=representation");
    let body: Value = serde_json::from_slice(&seen.body).unwrap();
    assert_eq!(body["title"], "Cushions");
}

#[tokio::test]
async fn test_insert_with_empty_representation_is_decode_error() {
    let (backend, stub) = start().await;
    stub.reply(StatusCode::CREATED, json!([]));

    let err = backend.insert("addons", shared::Record::new()).await.unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn test_update_and_delete_use_filters() {
    let (backend, stub) = start().await;
    stub.reply(StatusCode::NO_CONTENT, json!(null));

    let mut patch = shared::Record::new();
    patch.insert("title".into(), json!("Throws"));
    backend
        .update("addons", &[Filter::id(12)], patch)
        .await
        .unwrap();
    let seen = stub.last();
    assert_eq!(seen.method, Method::PATCH);
    assert_eq!(seen.query, "id=eq.12");

    backend.delete("addons", &[Filter::id(12)]).await.unwrap();
    assert_eq!(stub.last().method, Method::DELETE);
}

#[tokio::test]
async fn test_unfiltered_delete_is_refused() {
    let (backend, stub) = start().await;
    assert!(backend.delete("addons", &[]).await.is_err());
    assert!(stub.seen.lock().is_empty());
}

#[tokio::test]
async fn test_status_mapping() {
    let (backend, stub) = start().await;

    stub.reply(StatusCode::NOT_FOUND, json!({ "message": "relation does not exist" }));
    assert!(matches!(
        backend.query("missing", &[]).await,
        Err(BackendError::NotFound(_))
    ));

    stub.reply(StatusCode::BAD_REQUEST, json!({ "message": "column does not exist" }));
    match backend.query("products", &[]).await {
        Err(BackendError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("column does not exist"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_returns_key_inside_bucket() {
    let (backend, stub) = start().await;
    stub.reply(StatusCode::OK, json!({ "Key": "addon/Mesh Chair-main-5" }));

    let key = backend
        .upload("addon", "Mesh Chair-main-5", vec![1, 2, 3], "image/png", false)
        .await
        .unwrap();
    assert_eq!(key, "Mesh Chair-main-5");

    let seen = stub.last();
    assert_eq!(seen.path, "/storage/v1/object/addon/Mesh%20Chair-main-5");
    assert_eq!(seen.headers["x-upsert"], "false");
    assert_eq!(seen.headers["content-type"], "image/png");
    assert_eq!(seen.body.as_ref(), &[1, 2, 3]);
}

#[tokio::test]
async fn test_upload_conflict() {
    let (backend, stub) = start().await;
    stub.reply(StatusCode::CONFLICT, json!({ "error": "Duplicate" }));

    let err = backend
        .upload("addon", "Oak-main-2", vec![0], "image/png", false)
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Conflict(_)));
}

#[tokio::test]
async fn test_remove_sends_prefixes() {
    let (backend, stub) = start().await;
    stub.reply(StatusCode::OK, json!([]));

    backend
        .remove("addon", &["Oak-main-2".to_string(), "Oak-0-2".to_string()])
        .await
        .unwrap();
    let seen = stub.last();
    assert_eq!(seen.method, Method::DELETE);
    assert_eq!(seen.path, "/storage/v1/object/addon");
    let body: Value = serde_json::from_slice(&seen.body).unwrap();
    assert_eq!(body, json!({ "prefixes": ["Oak-main-2", "Oak-0-2"] }));
}
