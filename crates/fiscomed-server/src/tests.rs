//! Handler tests using tower's oneshot service utilities

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use fiscomed_core::db::Database;

use crate::{create_router_with_advisors, ServerConfig};

fn test_router() -> Router {
    let db = Database::in_memory().unwrap();
    create_router_with_advisors(db, ServerConfig::default(), None)
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let router = test_router();
    let response = send(&router, get("/api/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["advisor_configured"], false);
}

#[tokio::test]
async fn test_create_classify_validate_learn_cycle() {
    let router = test_router();

    // A novel expense gets the unclassified default
    let response = send(
        &router,
        post(
            "/api/transactions",
            json!({
                "kind": "expense",
                "date": "2024-03-15",
                "amount": 450.0,
                "concept": "Gasolina",
                "provider": "Pemex",
                "payment_method": "04 - Tarjeta de crédito"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["duplicate"], false);
    assert_eq!(body["suggestion"]["classification"], "Unclassified");
    assert_eq!(body["suggestion"]["confidence"], "low");
    assert_eq!(body["suggestion"]["method"], "default");

    // The accountant approves with a catalog classification
    let response = send(
        &router,
        post(
            &format!("/api/transactions/{}/validate", id),
            json!({
                "status": "approved",
                "classification": "Gasolina y peajes",
                "validator": "contador"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    // The learned rule is visible
    let response = send(&router, get("/api/rules")).await;
    let rules = body_json(response).await;
    assert_eq!(rules.as_array().unwrap().len(), 1);
    assert_eq!(rules[0]["concept_pattern"], "Gasolina");
    assert_eq!(rules[0]["classification"], "Gasolina y peajes");
    assert_eq!(rules[0]["usage_count"], 1);

    // A standalone classification now hits the rule
    let response = send(
        &router,
        post(
            "/api/classify",
            json!({
                "concept": "Gasolina",
                "provider": "Pemex",
                "kind": "expense",
                "amount": 500.0
            }),
        ),
    )
    .await;
    let suggestion = body_json(response).await;
    assert_eq!(suggestion["classification"], "Gasolina y peajes");
    assert_eq!(suggestion["deductible_percentage"], 50);
    assert_eq!(suggestion["confidence"], "high");
    assert_eq!(suggestion["method"], "learned_rule");
}

#[tokio::test]
async fn test_create_rejects_invalid_kind() {
    let router = test_router();
    let response = send(
        &router,
        post(
            "/api/transactions",
            json!({
                "kind": "transfer",
                "amount": 10.0,
                "concept": "x"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_non_positive_amount() {
    let router = test_router();
    let response = send(
        &router,
        post(
            "/api/transactions",
            json!({
                "kind": "expense",
                "amount": -5.0,
                "concept": "Gasolina"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_unknown_payment_method() {
    let router = test_router();
    let response = send(
        &router,
        post(
            "/api/transactions",
            json!({
                "kind": "expense",
                "amount": 100.0,
                "concept": "Gasolina",
                "payment_method": "77 - Trueque"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cash_warning_is_returned() {
    let router = test_router();
    let response = send(
        &router,
        post(
            "/api/transactions",
            json!({
                "kind": "expense",
                "amount": 2500.0,
                "concept": "Material de oficina",
                "payment_method": "01 - Efectivo"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["cash_warning"].as_str().unwrap().contains("efectivo"));
    assert_eq!(body["suggestion"]["deductible_percentage"], 0);
}

#[tokio::test]
async fn test_duplicate_cfdi_is_flagged() {
    let router = test_router();
    let payload = json!({
        "kind": "expense",
        "amount": 650.0,
        "concept": "Material de oficina",
        "payment_method": "04",
        "cfdi_uuid": "0f8fad5b-d9cb-469f-a165-70867728950e"
    });

    let response = send(&router, post("/api/transactions", payload.clone())).await;
    let first = body_json(response).await;
    assert_eq!(first["duplicate"], false);

    let response = send(&router, post("/api/transactions", payload)).await;
    let second = body_json(response).await;
    assert_eq!(second["duplicate"], true);
    assert_eq!(second["id"], first["id"]);
}

#[tokio::test]
async fn test_get_transaction_not_found() {
    let router = test_router();
    let response = send(&router, get("/api/transactions/99")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validate_not_found() {
    let router = test_router();
    let response = send(
        &router,
        post(
            "/api/transactions/99/validate",
            json!({"status": "approved", "classification": "Seguros"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validate_rejects_pending_status() {
    let router = test_router();
    let response = send(
        &router,
        post("/api/transactions/1/validate", json!({"status": "pending"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_classification_catalog_endpoints() {
    let router = test_router();

    let response = send(&router, get("/api/catalog/classifications?kind=income")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
    // Income classifications never carry a deduction
    for entry in body.as_array().unwrap() {
        assert_eq!(entry["percentage"], 0);
    }

    let response = send(&router, get("/api/catalog/classifications?kind=expense")).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 16);

    let response = send(&router, get("/api/catalog/classifications?kind=nope")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_methods_endpoint() {
    let router = test_router();
    let response = send(&router, get("/api/catalog/payment-methods")).await;
    let body = body_json(response).await;
    let labels: Vec<&str> = body.as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    assert_eq!(labels.len(), 6);
    assert!(labels.contains(&"01 - Efectivo"));
    assert!(labels.contains(&"03 - Transferencia electrónica"));
}

#[tokio::test]
async fn test_summary_endpoint() {
    let router = test_router();

    send(
        &router,
        post(
            "/api/transactions",
            json!({
                "kind": "income",
                "amount": 1500.0,
                "concept": "Consulta médica general",
                "payment_method": "03"
            }),
        ),
    )
    .await;
    send(
        &router,
        post(
            "/api/transactions",
            json!({
                "kind": "expense",
                "amount": 400.0,
                "concept": "Gasolina",
                "payment_method": "04"
            }),
        ),
    )
    .await;

    let response = send(&router, get("/api/summary")).await;
    let body = body_json(response).await;
    assert_eq!(body["total_income"], 1500.0);
    assert_eq!(body["total_expenses"], 400.0);
    assert_eq!(body["net_profit"], 1100.0);
    assert_eq!(body["pending_validation"], 2);
}

#[tokio::test]
async fn test_audit_log_records_access() {
    let router = test_router();

    let request = Request::builder()
        .uri("/api/transactions")
        .header("x-fiscomed-user", "dra-lopez")
        .body(Body::empty())
        .unwrap();
    send(&router, request).await;

    let response = send(&router, get("/api/audit")).await;
    let body = body_json(response).await;
    let entries = body.as_array().unwrap();
    assert!(!entries.is_empty());
    assert_eq!(entries[0]["user"], "dra-lopez");
    assert_eq!(entries[0]["action"], "list");
}
