//! Submission intake over HTTP.
//!
//! Run with: `cargo test -p studyvault-api --test submissions_test`

mod helpers;

use axum_test::multipart::MultipartForm;
use helpers::{api_path, setup_test_app, submission_form, submit_pdf, verdict, PDF_BYTES};

#[tokio::test]
async fn test_confident_pdf_is_published() {
    let app = setup_test_app(Some(verdict(true, 85))).await;

    let outcome = submit_pdf(&app, "DSA Mid-Sem 2024").await;
    assert_eq!(outcome["status"], "published");
    assert_eq!(outcome["verdict"]["confidence"], 85);
    assert_eq!(outcome["verdict"]["isStudyRelated"], true);

    let id = outcome["id"].as_str().unwrap();
    let response = app
        .client()
        .get(&api_path(&format!("/submissions/{}", id)))
        .await;
    assert_eq!(response.status_code(), 200);
    let view: serde_json::Value = response.json();
    assert_eq!(view["status"], "published");
    assert_eq!(view["category"], "question-paper");
    assert!(view["url"].as_str().unwrap().ends_with(".pdf"));
}

#[tokio::test]
async fn test_uncertain_pdf_is_held() {
    let app = setup_test_app(Some(verdict(true, 50))).await;

    let outcome = submit_pdf(&app, "Unclear scan").await;
    assert_eq!(outcome["status"], "pending_review");
    assert_eq!(outcome["verdict"]["confidence"], 50);

    let id = outcome["id"].as_str().unwrap();
    let view: serde_json::Value = app
        .client()
        .get(&api_path(&format!("/submissions/{}", id)))
        .await
        .json();
    assert!(view.get("url").is_none());
}

#[tokio::test]
async fn test_boundary_confidence_is_held() {
    let app = setup_test_app(Some(verdict(true, 70))).await;
    let outcome = submit_pdf(&app, "Boundary").await;
    assert_eq!(outcome["status"], "pending_review");
}

#[tokio::test]
async fn test_without_classifier_every_pdf_is_held() {
    let app = setup_test_app(None).await;
    let outcome = submit_pdf(&app, "No oracle").await;
    assert_eq!(outcome["status"], "pending_review");
    assert!(outcome["verdict"].is_null());
}

#[tokio::test]
async fn test_non_pdf_is_held_without_classification() {
    let app = setup_test_app(Some(verdict(true, 99))).await;
    let response = app
        .client()
        .post(&api_path("/submissions"))
        .multipart(submission_form("Lab slides", "slides.pptx", b"PK\x03\x04 slides"))
        .await;
    assert_eq!(response.status_code(), 201);
    let outcome: serde_json::Value = response.json();
    assert_eq!(outcome["status"], "pending_review");
    assert!(outcome["verdict"].is_null());
}

#[tokio::test]
async fn test_unsupported_extension_is_415() {
    let app = setup_test_app(None).await;
    let response = app
        .client()
        .post(&api_path("/submissions"))
        .multipart(submission_form("Installer", "setup.exe", b"MZ binary"))
        .await;
    assert_eq!(response.status_code(), 415);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_FILE_TYPE");
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_oversized_file_is_413() {
    let app = setup_test_app(None).await;
    let mut data = PDF_BYTES.to_vec();
    data.resize(helpers::MAX_UPLOAD_BYTES + 1, b' ');

    let response = app
        .client()
        .post(&api_path("/submissions"))
        .multipart(submission_form("Huge", "huge.pdf", &data))
        .await;
    assert_eq!(response.status_code(), 413);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let app = setup_test_app(None).await;

    let no_file = MultipartForm::new()
        .add_text("title", "Notes")
        .add_text("subject", "Physics")
        .add_text("department", "Physics")
        .add_text("category", "study-material")
        .add_text("submitter", "Ravi");
    let response = app
        .client()
        .post(&api_path("/submissions"))
        .multipart(no_file)
        .await;
    assert_eq!(response.status_code(), 400);

    let blank_title = submission_form("   ", "paper.pdf", PDF_BYTES);
    let response = app
        .client()
        .post(&api_path("/submissions"))
        .multipart(blank_title)
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn test_unknown_department_and_category_are_rejected() {
    let app = setup_test_app(None).await;

    let bad_department = MultipartForm::new()
        .add_text("title", "Notes")
        .add_text("subject", "Botany")
        .add_text("department", "Underwater Basket Weaving")
        .add_text("category", "study-material")
        .add_text("submitter", "Ravi")
        .add_part(
            "file",
            axum_test::multipart::Part::bytes(PDF_BYTES.to_vec())
                .file_name("notes.pdf")
                .mime_type("application/pdf"),
        );
    let response = app
        .client()
        .post(&api_path("/submissions"))
        .multipart(bad_department)
        .await;
    assert_eq!(response.status_code(), 400);

    let bad_category = MultipartForm::new()
        .add_text("title", "Notes")
        .add_text("subject", "Optics")
        .add_text("department", "physics")
        .add_text("category", "novel")
        .add_text("submitter", "Ravi")
        .add_part(
            "file",
            axum_test::multipart::Part::bytes(PDF_BYTES.to_vec())
                .file_name("notes.pdf")
                .mime_type("application/pdf"),
        );
    let response = app
        .client()
        .post(&api_path("/submissions"))
        .multipart(bad_category)
        .await;
    assert_eq!(response.status_code(), 400);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_unknown_submission_is_404() {
    let app = setup_test_app(None).await;
    let response = app
        .client()
        .get(&api_path(&format!("/submissions/{}", uuid::Uuid::new_v4())))
        .await;
    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}
