//! Moderation queue over HTTP.
//!
//! Run with: `cargo test -p studyvault-api --test moderation_test`

mod helpers;

use helpers::{
    api_path, local_key, moderator_bearer, setup_test_app, setup_test_app_with, submit_pdf,
    StorageKind, PDF_BYTES,
};
use serde_json::json;

#[tokio::test]
async fn test_pending_list_is_newest_first() {
    let app = setup_test_app(None).await;
    submit_pdf(&app, "first").await;
    submit_pdf(&app, "second").await;
    submit_pdf(&app, "third").await;

    let response = app
        .client()
        .get(&api_path("/moderation/pending"))
        .add_header("Authorization", moderator_bearer())
        .add_query_param("limit", 2)
        .await;
    assert_eq!(response.status_code(), 200);
    let page: Vec<serde_json::Value> = response.json();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["title"], "third");
    assert_eq!(page[1]["title"], "second");

    let rest: Vec<serde_json::Value> = app
        .client()
        .get(&api_path("/moderation/pending"))
        .add_header("Authorization", moderator_bearer())
        .add_query_param("limit", 2)
        .add_query_param("offset", 2)
        .await
        .json();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0]["title"], "first");
}

#[tokio::test]
async fn test_approve_publishes_identical_bytes() {
    let app = setup_test_app(None).await;
    let id = submit_pdf(&app, "Lab manual").await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .client()
        .post(&api_path(&format!("/moderation/{}/decision", id)))
        .add_header("Authorization", moderator_bearer())
        .json(&json!({ "decision": "approve", "reviewer": "dr.rao" }))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    let view: serde_json::Value = response.json();
    assert_eq!(view["status"], "published");
    assert_eq!(view["reviewed_by"], "dr.rao");

    let key = local_key(view["url"].as_str().unwrap());
    let file = app.client().get(&format!("/files/{}", key)).await;
    assert_eq!(file.status_code(), 200);
    assert_eq!(file.header("content-type"), "application/pdf");
    assert_eq!(file.as_bytes().as_ref(), PDF_BYTES);

    let pending: Vec<serde_json::Value> = app
        .client()
        .get(&api_path("/moderation/pending"))
        .add_header("Authorization", moderator_bearer())
        .await
        .json();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_reject_requires_confirmation() {
    let app = setup_test_app(None).await;
    let id = submit_pdf(&app, "Holiday photos").await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let path = api_path(&format!("/moderation/{}/decision", id));

    let unconfirmed = app
        .client()
        .post(&path)
        .add_header("Authorization", moderator_bearer())
        .json(&json!({ "decision": "reject", "note": "not study material" }))
        .await;
    assert_eq!(unconfirmed.status_code(), 400);
    let still_pending: serde_json::Value = app
        .client()
        .get(&api_path(&format!("/submissions/{}", id)))
        .await
        .json();
    assert_eq!(still_pending["status"], "pending_review");

    let confirmed = app
        .client()
        .post(&path)
        .add_header("Authorization", moderator_bearer())
        .json(&json!({ "decision": "reject", "note": "not study material", "confirm": true }))
        .await;
    assert_eq!(confirmed.status_code(), 200);
    let view: serde_json::Value = confirmed.json();
    assert_eq!(view["status"], "rejected");
    assert_eq!(view["review_note"], "not study material");
    assert!(view.get("url").is_none());
}

#[tokio::test]
async fn test_deciding_twice_conflicts() {
    let app = setup_test_app(None).await;
    let id = submit_pdf(&app, "Notes").await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let path = api_path(&format!("/moderation/{}/decision", id));

    let first = app
        .client()
        .post(&path)
        .add_header("Authorization", moderator_bearer())
        .json(&json!({ "decision": "approve" }))
        .await;
    assert_eq!(first.status_code(), 200);

    let second = app
        .client()
        .post(&path)
        .add_header("Authorization", moderator_bearer())
        .json(&json!({ "decision": "reject", "confirm": true }))
        .await;
    assert_eq!(second.status_code(), 409);
    let body: serde_json::Value = second.json();
    assert_eq!(body["code"], "INVALID_STATE_TRANSITION");

    let view: serde_json::Value = app
        .client()
        .get(&api_path(&format!("/submissions/{}", id)))
        .await
        .json();
    assert_eq!(view["status"], "published");
}

#[tokio::test]
async fn test_storage_failure_keeps_submission_pending() {
    let app = setup_test_app_with(None, StorageKind::Memory).await;
    let id = submit_pdf(&app, "Quantum notes").await["id"]
        .as_str()
        .unwrap()
        .to_string();

    app.memory.set_fail_uploads(true);
    let response = app
        .client()
        .post(&api_path(&format!("/moderation/{}/decision", id)))
        .add_header("Authorization", moderator_bearer())
        .json(&json!({ "decision": "approve" }))
        .await;
    assert_eq!(response.status_code(), 502);
    assert_eq!(app.memory.file_count(), 0);

    let view: serde_json::Value = app
        .client()
        .get(&api_path(&format!("/submissions/{}", id)))
        .await
        .json();
    assert_eq!(view["status"], "pending_review");

    app.memory.set_fail_uploads(false);
    let retry = app
        .client()
        .post(&api_path(&format!("/moderation/{}/decision", id)))
        .add_header("Authorization", moderator_bearer())
        .json(&json!({ "decision": "approve" }))
        .await;
    assert_eq!(retry.status_code(), 200);
    assert_eq!(app.memory.file_count(), 1);
}

#[tokio::test]
async fn test_invalid_decision_body_is_400() {
    let app = setup_test_app(None).await;
    let id = submit_pdf(&app, "Notes").await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .client()
        .post(&api_path(&format!("/moderation/{}/decision", id)))
        .add_header("Authorization", moderator_bearer())
        .json(&json!({ "decision": "maybe" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_decision_on_unknown_submission_is_404() {
    let app = setup_test_app(None).await;
    let response = app
        .client()
        .post(&api_path(&format!(
            "/moderation/{}/decision",
            uuid::Uuid::new_v4()
        )))
        .add_header("Authorization", moderator_bearer())
        .json(&json!({ "decision": "approve" }))
        .await;
    assert_eq!(response.status_code(), 404);
}
