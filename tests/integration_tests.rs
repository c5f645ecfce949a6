use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use product_api::{
    app::products::{handler::AppState, service::ProductService},
    core::{auth::ApiKey, middleware::ErrorPolicy},
    infrastructure::memory_store::InMemoryProductStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const KEY: &str = "test-key";

fn test_app_with_store(store: Arc<InMemoryProductStore>, policy: ErrorPolicy) -> Router {
    let state = AppState {
        product_service: ProductService::new(store),
    };
    product_api::app(state, ApiKey::new(KEY), policy)
}

fn test_app() -> (Router, Arc<InMemoryProductStore>) {
    let store = Arc::new(InMemoryProductStore::with_seed_data());
    (
        test_app_with_store(Arc::clone(&store), ErrorPolicy::default()),
        store,
    )
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, key: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn delete(uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(key) = key {
        builder = builder.header("authorization", format!("Bearer {}", key));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn new_product() -> Value {
    json!({
        "name": "Desk Lamp",
        "description": "LED lamp with dimmer",
        "price": 35.5,
        "category": "home"
    })
}

#[tokio::test]
async fn test_welcome() {
    let (app, _) = test_app();
    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8(bytes.to_vec())
        .unwrap()
        .starts_with("Welcome to the Product API!"));
}

#[tokio::test]
async fn test_get_each_seed_product() {
    let (app, _) = test_app();
    let (_, list) = send(&app, get("/api/products")).await;

    for product in list["products"].as_array().unwrap() {
        let id = product["id"].as_str().unwrap();
        let (status, body) = send(&app, get(&format!("/api/products/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body, product);
    }

    let (status, body) = send(&app, get("/api/products/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": { "message": "Product not found" } }));
}

#[tokio::test]
async fn test_create_requires_api_key() {
    let (app, store) = test_app();

    let (status, body) = send(&app, json_request("POST", "/api/products", None, &new_product())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("API key is required"));
    assert_eq!(store.len(), 3);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/products", Some("wrong"), &new_product()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid API key provided.");
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_auth_runs_before_validation() {
    let (app, _) = test_app();
    let (status, _) = send(&app, json_request("POST", "/api/products", None, &json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_product() {
    let (app, store) = test_app();
    let (status, body) = send(
        &app,
        json_request("POST", "/api/products", Some(KEY), &new_product()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Desk Lamp");
    assert_eq!(body["inStock"], true);
    assert_eq!(store.len(), 4);

    let id = body["id"].as_str().unwrap();
    let (status, fetched) = send(&app, get(&format!("/api/products/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn test_create_negative_price() {
    let (app, store) = test_app();
    let mut payload = new_product();
    payload["price"] = json!(-1);

    let (status, body) = send(&app, json_request("POST", "/api/products", Some(KEY), &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("non-negative"));
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_malformed_json_body() {
    let (app, _) = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/products")
        .header("content-type", "application/json")
        .header("x-api-key", KEY)
        .body(Body::from("{\"name\": "))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid JSON format in request body");
}

#[tokio::test]
async fn test_update_empty_body() {
    let (app, _) = test_app();
    let (status, body) = send(&app, json_request("PUT", "/api/products/1", Some(KEY), &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("At least one field must be provided for update"));
}

#[tokio::test]
async fn test_update_merges_and_keeps_id() {
    let (app, _) = test_app();
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/products/3",
            Some(KEY),
            &json!({ "inStock": true, "price": 45 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "3");
    assert_eq!(body["name"], "Coffee Maker");
    assert_eq!(body["inStock"], true);
    assert_eq!(body["price"].as_f64(), Some(45.0));

    let (status, _) = send(
        &app,
        json_request("PUT", "/api/products/404", Some(KEY), &json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        json_request("PUT", "/api/products/3", None, &json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_pagination() {
    let (app, _) = test_app();
    let (status, body) = send(&app, get("/api/products?limit=2&page=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["pagination"],
        json!({
            "currentPage": 2,
            "totalPages": 2,
            "totalProducts": 3,
            "hasNext": false,
            "hasPrev": true
        })
    );
}

#[tokio::test]
async fn test_list_filters() {
    let (app, _) = test_app();
    let (_, body) = send(&app, get("/api/products?category=Kitchen")).await;
    assert_eq!(body["pagination"]["totalProducts"], 1);

    let (_, body) = send(&app, get("/api/products?inStock=true")).await;
    assert_eq!(body["pagination"]["totalProducts"], 2);

    let (_, body) = send(&app, get("/api/products?search=LATEST")).await;
    assert_eq!(body["products"][0]["id"], "2");
}

#[tokio::test]
async fn test_delete_twice() {
    let (app, store) = test_app();

    let (status, body) = send(&app, delete("/api/products/2", Some(KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");
    assert_eq!(body["product"]["name"], "Smartphone");
    assert_eq!(store.len(), 2);

    let (status, body) = send(&app, delete("/api/products/2", Some(KEY))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_delete_requires_api_key() {
    let (app, store) = test_app();
    let (status, _) = send(&app, delete("/api/products/1", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_stats() {
    let (app, _) = test_app();
    let (status, body) = send(&app, get("/api/products/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "totalProducts": 3,
            "inStockCount": 2,
            "outOfStockCount": 1,
            "categories": { "electronics": 2, "kitchen": 1 },
            "averagePrice": 683.33
        })
    );
}

#[tokio::test]
async fn test_search() {
    let (app, _) = test_app();
    let (status, body) = send(&app, get("/api/products/search?q=laptop")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "laptop");
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["id"], "1");

    let (status, body) = send(&app, get("/api/products/search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Search query parameter \"q\" is required"
    );
}

#[tokio::test]
async fn test_unmatched_routes() {
    let (app, _) = test_app();

    let (status, body) = send(&app, get("/api/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Route /api/unknown not found");

    let (status, body) = send(
        &app,
        json_request("PATCH", "/api/products/1", Some(KEY), &json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Route /api/products/1 not found");
}

#[tokio::test]
async fn test_development_mode_includes_stack() {
    let store = Arc::new(InMemoryProductStore::with_seed_data());
    let app = test_app_with_store(store, ErrorPolicy { expose_stack: true });

    let (status, body) = send(&app, get("/api/products/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["stack"].as_str().is_some());
}

#[tokio::test]
async fn test_update_with_only_unknown_keys_keeps_product() {
    let (app, _) = test_app();
    let (status, body) = send(
        &app,
        json_request("PUT", "/api/products/1", Some(KEY), &json!({ "id": "99" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "1");
    assert_eq!(body["name"], "Laptop");
}

#[tokio::test]
async fn test_repeated_query_parameters_get_error_envelope() {
    let (app, _) = test_app();

    let (status, body) = send(&app, get("/api/products?page=1&page=2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid query parameters"));

    let (status, body) = send(&app, get("/api/products/search?q=a&q=b")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_empty_x_api_key_uses_authorization_header() {
    let (app, store) = test_app();
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/products/3")
        .header("x-api-key", "")
        .header("authorization", format!("Bearer {}", KEY))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["name"], "Coffee Maker");
    assert_eq!(store.len(), 2);
}
