mod common;

use axum::http::StatusCode;
use serde_json::json;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use common::{app, app_with_admin, login, register, registration, send, ADMIN_PASSWORD};

fn alice() -> serde_json::Value {
    json!({
        "username": "alice01",
        "email": "alice@x.com",
        "password": "Secret1!",
        "firstName": "Alice",
        "lastName": "A",
        "phoneNumber": "+15551234567",
    })
}

fn timestamp(v: &serde_json::Value) -> OffsetDateTime {
    OffsetDateTime::parse(v.as_str().expect("timestamp string"), &Rfc3339).unwrap()
}

#[tokio::test]
async fn register_then_login_flow() {
    let app = app();

    let (status, body) = send(&app, "POST", "/register", None, Some(alice())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["xpLevel"], 1);
    assert_eq!(body["role"], "User");
    assert_eq!(body["username"], "alice01");
    assert_eq!(body["email"], "alice@x.com");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
    let registered_at = timestamp(&body["lastLoginAt"]);

    let mut again = alice();
    again["email"] = json!("other@x.com");
    let (status, body) = send(&app, "POST", "/register", None, Some(again)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");
    assert_eq!(body["field"], "username");

    let (status, body) = login(&app, "alice01", "Secret1!").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert!(timestamp(&body["lastLoginAt"]) > registered_at);

    let (status, body) = login(&app, "alice01", "WrongPass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn email_and_phone_conflicts_name_their_field() {
    let app = app();
    register(&app, "alice01", "alice@x.com", "+15551234567").await;

    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(registration("bob01", "alice@x.com", "+15559876543")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already exists");

    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(registration("bob01", "bob@x.com", "+15551234567")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Phone number already exists");
    assert_eq!(body["field"], "phoneNumber");
}

#[tokio::test]
async fn invalid_registration_lists_every_field() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": "al", "email": "nope", "password": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec!["username", "email", "firstName", "lastName", "password", "phoneNumber"]
    );
}

#[tokio::test]
async fn login_by_email_and_unknown_user() {
    let app = app();
    register(&app, "alice01", "alice@x.com", "+15551234567").await;

    let (status, body) = login(&app, "alice@x.com", "Secret1!").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice01");

    let (unknown_status, unknown_body) = login(&app, "ghost", "Secret1!").await;
    let (wrong_status, wrong_body) = login(&app, "alice01", "Secret2!").await;
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, wrong_status);
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn logout_and_me_require_bearer() {
    let app = app();
    let (user_id, token) = register(&app, "alice01", "alice@x.com", "+15551234567").await;

    let (status, _) = send(&app, "POST", "/logout", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "POST", "/logout", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "POST", "/logout", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    // tokens are not revoked on logout
    let (status, body) = send(&app, "GET", "/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], user_id);
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn users_lists_active_accounts() {
    let app = app();
    let (_, token) = register(&app, "alice01", "alice@x.com", "+15551234567").await;
    register(&app, "bob01", "bob@x.com", "+15559876543").await;

    let (status, body) = send(&app, "GET", "/users", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alice01", "bob01"]);
}

#[tokio::test]
async fn admin_creates_and_deactivates_accounts() {
    let app = app_with_admin().await;
    let (status, body) = login(&app, "admin", ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "Admin");
    let admin_id = body["userId"].as_i64().unwrap();
    let admin_token = body["token"].as_str().unwrap().to_string();

    let mut account = registration("mod01", "mod@x.com", "+15550000001");
    account["role"] = json!("Moderator");
    let (status, body) = send(
        &app,
        "POST",
        "/admin/users",
        Some(admin_token.as_str()),
        Some(account),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "Moderator");
    assert!(body.get("token").is_none());
    assert!(body["lastLoginAt"].is_null());
    let mod_id = body["userId"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/admin/users/{}", admin_id),
        Some(admin_token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/admin/users/{}", mod_id),
        Some(admin_token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/admin/users/{}", mod_id),
        Some(admin_token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // a deactivated account cannot log in and gets the generic failure
    let (status, body) = login(&app, "mod01", "Secret1!").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));

    // and its username stays taken
    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(registration("mod01", "fresh@x.com", "+15550000009")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "username");
}

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let app = app_with_admin().await;
    let (_, token) = register(&app, "alice01", "alice@x.com", "+15551234567").await;

    let mut account = registration("mod01", "mod@x.com", "+15550000001");
    account["role"] = json!("Admin");
    let (status, body) =
        send(&app, "POST", "/admin/users", Some(token.as_str()), Some(account)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin role required");

    let (status, _) = send(&app, "DELETE", "/admin/users/1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}
