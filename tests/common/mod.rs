#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use hangout_planner::{
    app::build_app,
    auth::services::seed_admin,
    config::{AdminSeed, AppConfig},
    state::AppState,
};

pub const ADMIN_PASSWORD: &str = "AdminPass1!";

pub fn app() -> Router {
    let state = AppState::in_memory(AppConfig::for_tests()).expect("test state");
    build_app(state)
}

/// App whose store already holds an `Admin` account named `admin`.
pub async fn app_with_admin() -> Router {
    let state = AppState::in_memory(AppConfig::for_tests()).expect("test state");
    let seed = AdminSeed {
        username: "admin".into(),
        email: "admin@hangouts.test".into(),
        password: ADMIN_PASSWORD.into(),
        phone_number: "+15550000000".into(),
    };
    seed_admin(state.users.as_ref(), state.hasher.as_ref(), &seed)
        .await
        .expect("seed admin");
    build_app(state)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    let req = match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

pub fn registration(username: &str, email: &str, phone: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "firstName": "Test",
        "lastName": "User",
        "password": "Secret1!",
        "phoneNumber": phone,
    })
}

/// Registers a user and returns `(user_id, token)`.
pub async fn register(app: &Router, username: &str, email: &str, phone: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        "POST",
        "/register",
        None,
        Some(registration(username, email, phone)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    (
        body["userId"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

pub async fn login(app: &Router, key: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({ "usernameOrEmail": key, "password": password })),
    )
    .await
}
