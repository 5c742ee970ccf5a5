//! Service wiring: repository, storage, extractor, classifier and notifier.

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;
use studyvault_core::Config;
use studyvault_db::{SubmissionRepository, SubmissionStore};
use studyvault_processing::{PdfTextExtractor, TextExtractor};
use studyvault_services::{
    CatalogService, DisabledClassifier, EmailNotifier, IntakeService, IntakeSettings,
    ModerationService, NoopNotifier, Notifier, OpenAiClassifier, OpenAiClassifierConfig,
    RelevanceClassifier,
};
use studyvault_storage::Storage;

use crate::state::{AppState, HttpConfig};

pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let store: Arc<dyn SubmissionStore> = Arc::new(SubmissionRepository::new(pool.clone()));
    let extractor: Arc<dyn TextExtractor> = Arc::new(PdfTextExtractor);

    let classifier: Arc<dyn RelevanceClassifier> = match OpenAiClassifierConfig::from_config(config)
    {
        Some(classifier_config) => {
            tracing::info!(
                model = %classifier_config.model,
                timeout_secs = classifier_config.timeout.as_secs(),
                "Relevance classifier enabled"
            );
            Arc::new(OpenAiClassifier::new(classifier_config))
        }
        None => {
            tracing::warn!(
                "OPENAI_API_KEY not set, relevance classifier disabled; every PDF will be held for review"
            );
            Arc::new(DisabledClassifier)
        }
    };

    let notifier: Arc<dyn Notifier> = match EmailNotifier::from_config(config) {
        Some(email) => Arc::new(email),
        None => Arc::new(NoopNotifier),
    };

    let intake = IntakeService::new(
        store.clone(),
        storage.clone(),
        extractor,
        classifier,
        notifier,
        IntakeSettings::from_config(config),
    );
    let moderation = ModerationService::new(store.clone(), storage.clone());
    let catalog = CatalogService::new(store, storage.clone());

    Ok(Arc::new(AppState {
        intake,
        moderation,
        catalog,
        storage,
        pool: Some(pool),
        http: HttpConfig::from_config(config),
    }))
}
