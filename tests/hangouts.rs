mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};

use common::{app, register, send};

fn in_days(days: i64) -> String {
    (OffsetDateTime::now_utc() + Duration::days(days))
        .format(&Rfc3339)
        .unwrap()
}

fn hangout(title: &str, days: i64, max: i32) -> Value {
    json!({
        "title": title,
        "description": "Board games and pizza",
        "plannedDate": in_days(days),
        "location": "Alice's place",
        "maxParticipants": max,
        "estimatedCost": 15.0,
    })
}

#[tokio::test]
async fn hangout_lifecycle() {
    let app = app();
    let (alice_id, alice) = register(&app, "alice01", "alice@x.com", "+15551234567").await;
    let (bob_id, bob) = register(&app, "bob01", "bob@x.com", "+15559876543").await;

    let (status, body) = send(
        &app,
        "POST",
        "/hangouts",
        Some(alice.as_str()),
        Some(hangout("Game night", 2, 4)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["createdByUserId"], alice_id);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/hangouts/{}/join", id),
        Some(bob.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isConfirmed"], false);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/hangouts/{}/join", id),
        Some(bob.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Already joined this hangout");

    // only the creator confirms
    let confirm = format!("/hangouts/{}/participants/{}/confirm", id, bob_id);
    let (status, _) = send(&app, "POST", &confirm, Some(bob.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(&app, "POST", &confirm, Some(alice.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isConfirmed"], true);

    let hangout_uri = format!("/hangouts/{}", id);
    let (status, body) = send(&app, "GET", &hangout_uri, Some(bob.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Game night");
    assert_eq!(body["participants"].as_array().unwrap().len(), 1);
    assert_eq!(body["participants"][0]["userId"], bob_id);

    let (status, _) = send(&app, "DELETE", &hangout_uri, Some(bob.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &hangout_uri, Some(alice.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &hangout_uri, Some(bob.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_hangout_rejects_joins() {
    let app = app();
    let (_, alice) = register(&app, "alice01", "alice@x.com", "+15551234567").await;
    let (_, bob) = register(&app, "bob01", "bob@x.com", "+15559876543").await;
    let (_, carol) = register(&app, "carol01", "carol@x.com", "+15550001111").await;

    let (_, body) = send(
        &app,
        "POST",
        "/hangouts",
        Some(alice.as_str()),
        Some(hangout("Coffee", 1, 1)),
    )
    .await;
    let join = format!("/hangouts/{}/join", body["id"].as_i64().unwrap());

    let (status, _) = send(&app, "POST", &join, Some(bob.as_str()), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, "POST", &join, Some(carol.as_str()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Hangout is full");
}

#[tokio::test]
async fn leaving_frees_a_seat() {
    let app = app();
    let (_, alice) = register(&app, "alice01", "alice@x.com", "+15551234567").await;
    let (_, bob) = register(&app, "bob01", "bob@x.com", "+15559876543").await;

    let (_, body) = send(
        &app,
        "POST",
        "/hangouts",
        Some(alice.as_str()),
        Some(hangout("Hike", 3, 1)),
    )
    .await;
    let id = body["id"].as_i64().unwrap();
    let leave = format!("/hangouts/{}/participants/me", id);

    let (status, _) = send(&app, "DELETE", &leave, Some(bob.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&app, "POST", &format!("/hangouts/{}/join", id), Some(bob.as_str()), None).await;
    let (status, _) = send(&app, "DELETE", &leave, Some(bob.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) =
        send(&app, "POST", &format!("/hangouts/{}/join", id), Some(alice.as_str()), None).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn list_is_ordered_by_planned_date() {
    let app = app();
    let (_, alice) = register(&app, "alice01", "alice@x.com", "+15551234567").await;

    for (title, days) in [("Later", 10), ("Sooner", 1), ("Middle", 5)] {
        let (status, _) = send(
            &app,
            "POST",
            "/hangouts",
            Some(alice.as_str()),
            Some(hangout(title, days, 3)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/hangouts", Some(alice.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Sooner", "Middle", "Later"]);
}

#[tokio::test]
async fn invalid_hangout_is_rejected() {
    let app = app();
    let (_, alice) = register(&app, "alice01", "alice@x.com", "+15551234567").await;

    let mut body = hangout("", -1, 0);
    body["estimatedCost"] = json!(-5.0);
    let (status, body) = send(&app, "POST", "/hangouts", Some(alice.as_str()), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec!["title", "maxParticipants", "estimatedCost", "plannedDate"]
    );
}

#[tokio::test]
async fn hangouts_require_authentication() {
    let app = app();
    let (status, _) = send(&app, "GET", "/hangouts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "POST", "/hangouts", None, Some(hangout("x", 1, 1))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
