#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use studyvault_core::models::{Category, NewSubmission, Verdict};
use studyvault_core::NonPdfPolicy;
use studyvault_db::InMemorySubmissionStore;
use studyvault_processing::{ExtractionError, TextExtractor};
use studyvault_services::{
    CatalogService, ClassifierError, IntakeService, IntakeSettings, ModerationService,
    Notifier, NotifyError, RelevanceClassifier, UploadNotice,
};
use studyvault_storage::MemoryStorage;

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n% unit 2 question bank";

/// Returns fixed text, or fails.
pub struct StubExtractor {
    pub result: Result<String, String>,
}

#[async_trait]
impl TextExtractor for StubExtractor {
    async fn extract(&self, _data: Bytes, _page_cap: usize) -> Result<String, ExtractionError> {
        self.result
            .clone()
            .map_err(ExtractionError::Corrupt)
    }
}

pub enum ClassifierBehavior {
    Verdict(Verdict),
    Fail,
    Hang,
}

pub struct StubClassifier {
    pub behavior: ClassifierBehavior,
    pub calls: AtomicUsize,
}

impl StubClassifier {
    pub fn new(behavior: ClassifierBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelevanceClassifier for StubClassifier {
    async fn classify(&self, _file_name: &str, _excerpt: &str) -> Result<Verdict, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            ClassifierBehavior::Verdict(v) => Ok(v.clone()),
            ClassifierBehavior::Fail => Err(ClassifierError::Transport("connection refused".into())),
            ClassifierBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ClassifierError::Timeout(3600))
            }
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<UploadNotice>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<UploadNotice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: &UploadNotice) -> Result<(), NotifyError> {
        self.notices.lock().unwrap().push(notice.clone());
        if self.fail {
            return Err(NotifyError::Delivery("smtp down".into()));
        }
        Ok(())
    }
}

pub fn verdict(is_study_related: bool, confidence: u8) -> Verdict {
    Verdict::new(
        is_study_related,
        confidence,
        "Question bank for unit 2",
        vec!["question-paper".to_string()],
        "Numbered exam questions",
    )
}

pub fn settings() -> IntakeSettings {
    IntakeSettings {
        max_upload_bytes: 10 * 1024 * 1024,
        allowed_extensions: ["pdf", "doc", "docx", "ppt", "pptx"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        departments: vec!["Computer Science".to_string(), "Physics".to_string()],
        page_cap: 5,
        classifier_timeout: Duration::from_millis(200),
        non_pdf_policy: NonPdfPolicy::Hold,
        notify_on_every_intake: false,
    }
}

pub fn new_pdf(title: &str) -> NewSubmission {
    NewSubmission {
        title: title.to_string(),
        subject: "Data Structures".to_string(),
        description: Some("Unit 2 question bank".to_string()),
        department: "Computer Science".to_string(),
        category: Category::QuestionPaper,
        submitter: "Asha".to_string(),
        submitter_id: None,
        file_name: "dsa-unit2.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        data: Bytes::from_static(PDF_BYTES),
    }
}

pub struct Harness {
    pub store: InMemorySubmissionStore,
    pub storage: MemoryStorage,
    pub classifier: Arc<StubClassifier>,
    pub notifier: Arc<RecordingNotifier>,
    pub intake: IntakeService,
    pub moderation: ModerationService,
    pub catalog: CatalogService,
}

pub struct HarnessBuilder {
    extractor: Result<String, String>,
    classifier: ClassifierBehavior,
    settings: IntakeSettings,
    notifier_fails: bool,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            extractor: Ok("Q1. Define a binary heap.".to_string()),
            classifier: ClassifierBehavior::Verdict(verdict(true, 85)),
            settings: settings(),
            notifier_fails: false,
        }
    }

    pub fn classifier(mut self, behavior: ClassifierBehavior) -> Self {
        self.classifier = behavior;
        self
    }

    pub fn extraction_fails(mut self) -> Self {
        self.extractor = Err("xref table not found".to_string());
        self
    }

    pub fn settings(mut self, f: impl FnOnce(&mut IntakeSettings)) -> Self {
        f(&mut self.settings);
        self
    }

    pub fn notifier_fails(mut self) -> Self {
        self.notifier_fails = true;
        self
    }

    pub fn build(self) -> Harness {
        let store = InMemorySubmissionStore::new();
        let storage = MemoryStorage::new();
        let classifier = Arc::new(StubClassifier::new(self.classifier));
        let notifier = Arc::new(RecordingNotifier {
            notices: Mutex::new(Vec::new()),
            fail: self.notifier_fails,
        });

        let intake = IntakeService::new(
            Arc::new(store.clone()),
            Arc::new(storage.clone()),
            Arc::new(StubExtractor {
                result: self.extractor,
            }),
            classifier.clone(),
            notifier.clone(),
            self.settings,
        );
        let moderation = ModerationService::new(Arc::new(store.clone()), Arc::new(storage.clone()));
        let catalog = CatalogService::new(Arc::new(store.clone()), Arc::new(storage.clone()));

        Harness {
            store,
            storage,
            classifier,
            notifier,
            intake,
            moderation,
            catalog,
        }
    }
}
