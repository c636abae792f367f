//! Integration tests for the request routes.
//!
//! Drives the full router against an isolated, migrated database.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tramites_api::{create_router, middleware::auth::USER_ID_HEADER};
use tramites_testing::TestEnv;

fn app(env: &TestEnv) -> Router {
    create_router(env.pool().clone(), Duration::from_secs(30))
}

fn request(method: Method, uri: &str, user: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri).header(USER_ID_HEADER, user);

    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request build"),
        None => builder.body(Body::empty()).expect("request build"),
    }
}

async fn body_json(response: Response) -> Value {
    let body =
        axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body extraction");
    serde_json::from_slice(&body).expect("json deserialization")
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn created_request_is_readable_by_any_caller() {
    let env = TestEnv::new().await.expect("test env setup");

    let response = app(&env)
        .oneshot(request(
            Method::POST,
            "/requests",
            "user-1",
            Some(json!({ "title": "Certificado", "description": "urgente" })),
        ))
        .await
        .expect("request execution");

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["user_id"], "user-1");
    assert_eq!(created["status"], "pending");
    assert_eq!(created["approval_document_path"], Value::Null);

    let id = created["id"].as_str().expect("id string");
    let response = app(&env)
        .oneshot(request(Method::GET, &format!("/requests/{id}"), "user-1", None))
        .await
        .expect("request execution");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], id);

    let response = app(&env)
        .oneshot(request(Method::GET, &format!("/requests/{id}"), "user-2", None))
        .await
        .expect("request execution");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user_id"], "user-1");

    env.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn list_returns_only_callers_requests() {
    let env = TestEnv::new().await.expect("test env setup");
    env.create_request("alice", "A").await.expect("create");
    env.create_request("bob", "B").await.expect("create");

    let response = app(&env)
        .oneshot(request(Method::GET, "/requests", "alice", None))
        .await
        .expect("request execution");

    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    let list = list.as_array().expect("array");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["user_id"], "alice");

    env.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn approval_records_document_path_once() {
    let env = TestEnv::new().await.expect("test env setup");
    let filed = env.create_request("user-1", "Licencia").await.expect("create");
    let uri = format!("/requests/{}/approve", filed.id);

    let response = app(&env)
        .oneshot(request(
            Method::POST,
            &uri,
            "reviewer",
            Some(json!({ "approval_document_path": "/srv/approvals/licencia.pdf" })),
        ))
        .await
        .expect("request execution");

    assert_eq!(response.status(), StatusCode::OK);
    let approved = body_json(response).await;
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["approval_document_path"], "/srv/approvals/licencia.pdf");

    let response = app(&env)
        .oneshot(request(
            Method::POST,
            &uri,
            "reviewer",
            Some(json!({ "approval_document_path": "/srv/approvals/other.pdf" })),
        ))
        .await
        .expect("request execution");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    env.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn overlong_document_path_is_rejected_before_storage() {
    let env = TestEnv::new().await.expect("test env setup");
    let filed = env.create_request("user-1", "Licencia").await.expect("create");

    let response = app(&env)
        .oneshot(request(
            Method::POST,
            &format!("/requests/{}/approve", filed.id),
            "reviewer",
            Some(json!({ "approval_document_path": "p".repeat(256) })),
        ))
        .await
        .expect("request execution");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stored = env
        .storage()
        .requests
        .find_by_id(filed.id)
        .await
        .expect("find")
        .expect("exists");
    assert!(stored.approval_document_path.is_none());

    env.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn rejecting_unknown_request_is_not_found() {
    let env = TestEnv::new().await.expect("test env setup");

    let response = app(&env)
        .oneshot(request(
            Method::POST,
            "/requests/7f1c1d34-6d7e-4b63-a3c4-6f0d9f0f3b10/reject",
            "reviewer",
            None,
        ))
        .await
        .expect("request execution");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    env.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn reads_and_decisions_follow_the_same_rule_across_callers() {
    let env = TestEnv::new().await.expect("test env setup");
    let rejected = env.create_request("alice", "Secreto").await.expect("create");
    let approved = env.create_request("alice", "Permiso").await.expect("create");

    let response = app(&env)
        .oneshot(request(Method::GET, &format!("/requests/{}", rejected.id), "mallory", None))
        .await
        .expect("request execution");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(&env)
        .oneshot(request(
            Method::POST,
            &format!("/requests/{}/reject", rejected.id),
            "mallory",
            None,
        ))
        .await
        .expect("request execution");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_id"], "alice");
    assert_eq!(body["status"], "rejected");

    let response = app(&env)
        .oneshot(request(
            Method::POST,
            &format!("/requests/{}/approve", approved.id),
            "mallory",
            Some(json!({ "approval_document_path": "/srv/approvals/permiso.pdf" })),
        ))
        .await
        .expect("request execution");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["approval_document_path"], "/srv/approvals/permiso.pdf");

    // The owner sees the decisions made by the other caller.
    let response = app(&env)
        .oneshot(request(Method::GET, &format!("/requests/{}", rejected.id), "alice", None))
        .await
        .expect("request execution");
    assert_eq!(body_json(response).await["status"], "rejected");

    let response = app(&env)
        .oneshot(request(
            Method::POST,
            &format!("/requests/{}/approve", rejected.id),
            "alice",
            Some(json!({ "approval_document_path": "/srv/approvals/secreto.pdf" })),
        ))
        .await
        .expect("request execution");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    env.cleanup().await.expect("cleanup");
}
