//! Test helpers: build AppState and router over the in-memory submission store.
//!
//! Run from workspace root: `cargo test -p studyvault-api`.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bytes::Bytes;
use studyvault_api::constants::{self, MULTIPART_OVERHEAD_BYTES};
use studyvault_api::setup::routes;
use studyvault_api::{AppState, HttpConfig};
use studyvault_core::models::Verdict;
use studyvault_core::NonPdfPolicy;
use studyvault_db::{InMemorySubmissionStore, SubmissionStore};
use studyvault_processing::{ExtractionError, TextExtractor};
use studyvault_services::{
    CatalogService, ClassifierError, DisabledClassifier, IntakeService, IntakeSettings,
    ModerationService, NoopNotifier, RelevanceClassifier,
};
use studyvault_storage::{LocalStorage, MemoryStorage, Storage};
use tempfile::TempDir;

pub const MAX_UPLOAD_BYTES: usize = 256 * 1024;
pub const LOCAL_BASE_URL: &str = "http://localhost:3000/files";
pub const TEST_MODERATOR_API_KEY: &str = "test-moderator-api-key-at-least-32-characters";
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n% data structures unit 2 question bank\n%%EOF";

/// `Authorization` header value for the moderation and admin routes.
pub fn moderator_bearer() -> String {
    format!("Bearer {}", TEST_MODERATOR_API_KEY)
}

/// API path prefix for tests (e.g. `/api/v0/submissions`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

struct FixedExtractor;

#[async_trait]
impl TextExtractor for FixedExtractor {
    async fn extract(&self, _data: Bytes, _page_cap: usize) -> Result<String, ExtractionError> {
        Ok("Q1. Explain the heap property.".to_string())
    }
}

struct FixedClassifier(Verdict);

#[async_trait]
impl RelevanceClassifier for FixedClassifier {
    async fn classify(&self, _file_name: &str, _excerpt: &str) -> Result<Verdict, ClassifierError> {
        Ok(self.0.clone())
    }
}

pub fn verdict(is_study_related: bool, confidence: u8) -> Verdict {
    Verdict::new(
        is_study_related,
        confidence,
        "Data structures question paper".to_string(),
        vec!["question-paper".to_string()],
        "Contains exam questions".to_string(),
    )
}

pub enum StorageKind {
    /// Local filesystem under a temp dir, served back through `/files`.
    Local,
    /// In-memory storage whose uploads can be made to fail.
    Memory,
}

pub struct TestApp {
    pub server: TestServer,
    pub store: InMemorySubmissionStore,
    pub memory: MemoryStorage,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// App with local storage. `None` disables the classifier, so every PDF is held.
pub async fn setup_test_app(classifier_verdict: Option<Verdict>) -> TestApp {
    setup_test_app_with(classifier_verdict, StorageKind::Local).await
}

pub async fn setup_test_app_with(classifier_verdict: Option<Verdict>, kind: StorageKind) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let memory = MemoryStorage::new();
    let storage: Arc<dyn Storage> = match kind {
        StorageKind::Local => Arc::new(
            LocalStorage::new(temp_dir.path(), LOCAL_BASE_URL.to_string())
                .await
                .expect("Failed to create local storage"),
        ),
        StorageKind::Memory => Arc::new(memory.clone()),
    };

    let store = InMemorySubmissionStore::new();
    let shared_store: Arc<dyn SubmissionStore> = Arc::new(store.clone());

    let classifier: Arc<dyn RelevanceClassifier> = match classifier_verdict {
        Some(v) => Arc::new(FixedClassifier(v)),
        None => Arc::new(DisabledClassifier),
    };

    let settings = IntakeSettings {
        max_upload_bytes: MAX_UPLOAD_BYTES,
        allowed_extensions: ["pdf", "doc", "docx", "ppt", "pptx"]
            .iter()
            .map(|e| e.to_string())
            .collect(),
        departments: vec!["Computer Science".to_string(), "Physics".to_string()],
        page_cap: 5,
        classifier_timeout: Duration::from_secs(2),
        non_pdf_policy: NonPdfPolicy::Hold,
        notify_on_every_intake: false,
    };

    let state = Arc::new(AppState {
        intake: IntakeService::new(
            shared_store.clone(),
            storage.clone(),
            Arc::new(FixedExtractor),
            classifier,
            Arc::new(NoopNotifier),
            settings,
        ),
        moderation: ModerationService::new(shared_store.clone(), storage.clone()),
        catalog: CatalogService::new(shared_store, storage.clone()),
        storage,
        pool: None,
        http: HttpConfig {
            cors_origins: vec!["*".to_string()],
            max_body_bytes: MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
            concurrency_limit: 64,
            moderator_api_key: TEST_MODERATOR_API_KEY.to_string(),
        },
    });

    let server = TestServer::new(routes::setup_routes(state)).expect("Failed to start test server");

    TestApp {
        server,
        store,
        memory,
        _temp_dir: temp_dir,
    }
}

/// Multipart form for a submission; `file_name` decides the document kind.
pub fn submission_form(title: &str, file_name: &str, data: &[u8]) -> MultipartForm {
    let mime = if file_name.ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    };
    MultipartForm::new()
        .add_text("title", title.to_string())
        .add_text("subject", "Data Structures")
        .add_text("description", "Mid-semester paper")
        .add_text("department", "Computer Science")
        .add_text("category", "question-paper")
        .add_text("submitter", "Asha")
        .add_part(
            "file",
            Part::bytes(data.to_vec())
                .file_name(file_name.to_string())
                .mime_type(mime),
        )
}

/// Submit a PDF and return the response JSON.
pub async fn submit_pdf(app: &TestApp, title: &str) -> serde_json::Value {
    let response = app
        .client()
        .post(&api_path("/submissions"))
        .multipart(submission_form(title, "paper.pdf", PDF_BYTES))
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    response.json()
}

/// Storage key of a local-backend URL.
pub fn local_key(url: &str) -> String {
    url.trim_start_matches(LOCAL_BASE_URL)
        .trim_start_matches('/')
        .to_string()
}
