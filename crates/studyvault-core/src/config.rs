//! Configuration module
//!
//! Environment-driven configuration for the API and its services: database,
//! storage, upload limits, the relevance classifier and moderator notifications.

use std::env;

use crate::admission::NonPdfPolicy;
use crate::storage_types::StorageBackend;

const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MIN_MODERATOR_KEY_LEN: usize = 32;

pub const DEFAULT_DEPARTMENTS: &[&str] = &[
    "Computer Science",
    "Electrical Engineering",
    "Mechanical Engineering",
    "Civil Engineering",
    "Electronics & Communication",
    "Information Technology",
    "Chemical Engineering",
    "Biotechnology",
    "Mathematics",
    "Physics",
    "Chemistry",
];

/// Settings shared by every binary.
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub log_format: String,
}

#[derive(Clone, Debug)]
pub struct StudyVaultConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload constraints
    pub max_upload_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub departments: Vec<String>,
    // Classification
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub classifier_model: String,
    pub classifier_timeout_secs: u64,
    pub classifier_char_budget: usize,
    pub extraction_page_cap: usize,
    pub non_pdf_policy: NonPdfPolicy,
    // Moderator notifications
    pub email_enabled: bool,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_tls: bool,
    pub email_from: Option<String>,
    pub moderator_emails: Vec<String>,
    pub notify_on_every_intake: bool,
    /// Bearer token for the moderation and admin routes.
    pub moderator_api_key: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<StudyVaultConfig>);

impl Config {
    fn inner(&self) -> &StudyVaultConfig {
        &self.0
    }

    pub fn is_production(&self) -> bool {
        matches!(
            self.inner().base.environment.to_lowercase().as_str(),
            "production" | "prod"
        )
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = StudyVaultConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.inner().base.log_format
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.inner().max_upload_bytes
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.inner().allowed_extensions
    }

    pub fn departments(&self) -> &[String] {
        &self.inner().departments
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        self.inner().openai_api_key.as_deref()
    }

    pub fn openai_base_url(&self) -> &str {
        &self.inner().openai_base_url
    }

    pub fn classifier_model(&self) -> &str {
        &self.inner().classifier_model
    }

    pub fn classifier_timeout_secs(&self) -> u64 {
        self.inner().classifier_timeout_secs
    }

    pub fn classifier_char_budget(&self) -> usize {
        self.inner().classifier_char_budget
    }

    pub fn extraction_page_cap(&self) -> usize {
        self.inner().extraction_page_cap
    }

    pub fn non_pdf_policy(&self) -> NonPdfPolicy {
        self.inner().non_pdf_policy
    }

    pub fn email_enabled(&self) -> bool {
        self.inner().email_enabled
    }

    pub fn smtp_host(&self) -> Option<&str> {
        self.inner().smtp_host.as_deref()
    }

    pub fn smtp_port(&self) -> Option<u16> {
        self.inner().smtp_port
    }

    pub fn smtp_user(&self) -> Option<&str> {
        self.inner().smtp_user.as_deref()
    }

    pub fn smtp_password(&self) -> Option<&str> {
        self.inner().smtp_password.as_deref()
    }

    pub fn smtp_tls(&self) -> bool {
        self.inner().smtp_tls
    }

    pub fn email_from(&self) -> Option<&str> {
        self.inner().email_from.as_deref()
    }

    pub fn moderator_emails(&self) -> &[String] {
        &self.inner().moderator_emails
    }

    pub fn notify_on_every_intake(&self) -> bool {
        self.inner().notify_on_every_intake
    }

    pub fn moderator_api_key(&self) -> &str {
        self.inner().moderator_api_key.trim()
    }
}

fn env_list(name: &str, default: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().to_lowercase().parse().ok())
        .unwrap_or(default)
}

impl StudyVaultConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MAX_UPLOAD_MB: usize = 10;
        const CLASSIFIER_TIMEOUT_SECS: u64 = 30;
        const CLASSIFIER_CHAR_BUDGET: usize = 8000;
        const EXTRACTION_PAGE_CAP: usize = 5;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let base = BaseConfig {
            server_port: env::var("SERVER_PORT")
                .or_else(|_| env::var("PORT"))
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?,
            cors_origins: cors_origins_str
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "compact".to_string())
                .to_lowercase(),
        };

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<StorageBackend>()?;

        let non_pdf_policy = match env::var("NON_PDF_POLICY") {
            Ok(value) => value.parse::<NonPdfPolicy>()?,
            Err(_) => NonPdfPolicy::default(),
        };

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_UPLOAD_MB * 1024 * 1024);

        let config = StudyVaultConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: Some(
                env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./data/uploads".to_string()),
            ),
            local_storage_base_url: Some(
                env::var("LOCAL_STORAGE_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/files".to_string()),
            ),
            max_upload_bytes,
            allowed_extensions: env_list("ALLOWED_EXTENSIONS", "pdf,doc,docx,ppt,pptx")
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            departments: match env::var("DEPARTMENTS") {
                Ok(_) => env_list("DEPARTMENTS", ""),
                Err(_) => DEFAULT_DEPARTMENTS.iter().map(|d| d.to_string()).collect(),
            },
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            classifier_model: env::var("CLASSIFIER_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            classifier_timeout_secs: env::var("CLASSIFIER_TIMEOUT_SECS")
                .unwrap_or_else(|_| CLASSIFIER_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CLASSIFIER_TIMEOUT_SECS),
            classifier_char_budget: env::var("CLASSIFIER_CHAR_BUDGET")
                .unwrap_or_else(|_| CLASSIFIER_CHAR_BUDGET.to_string())
                .parse()
                .unwrap_or(CLASSIFIER_CHAR_BUDGET),
            extraction_page_cap: env::var("EXTRACTION_PAGE_CAP")
                .unwrap_or_else(|_| EXTRACTION_PAGE_CAP.to_string())
                .parse()
                .unwrap_or(EXTRACTION_PAGE_CAP),
            non_pdf_policy,
            email_enabled: env_bool("EMAIL_ENABLED", false),
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port: env::var("SMTP_PORT").ok().and_then(|p| p.parse().ok()),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            smtp_tls: env_bool("SMTP_TLS", true),
            email_from: env::var("EMAIL_FROM")
                .or_else(|_| env::var("SMTP_FROM"))
                .ok(),
            moderator_emails: env_list("MODERATOR_EMAILS", ""),
            notify_on_every_intake: env_bool("NOTIFY_ON_EVERY_INTAKE", false),
            moderator_api_key: env::var("MODERATOR_API_KEY")
                .map_err(|_| anyhow::anyhow!("MODERATOR_API_KEY must be set"))?,
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.moderator_api_key.trim().len() < MIN_MODERATOR_KEY_LEN {
            return Err(anyhow::anyhow!(
                "MODERATOR_API_KEY must be at least {} characters long",
                MIN_MODERATOR_KEY_LEN
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_BYTES must be greater than zero"));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }

        if self.departments.is_empty() {
            return Err(anyhow::anyhow!("DEPARTMENTS must not be empty"));
        }

        if self.extraction_page_cap == 0 {
            return Err(anyhow::anyhow!("EXTRACTION_PAGE_CAP must be at least 1"));
        }

        if self.classifier_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "CLASSIFIER_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if self.email_enabled {
            if self.smtp_host.is_none() || self.email_from.is_none() {
                return Err(anyhow::anyhow!(
                    "EMAIL_ENABLED=true requires SMTP_HOST and EMAIL_FROM to be set"
                ));
            }
            if self.moderator_emails.is_empty() {
                return Err(anyhow::anyhow!(
                    "EMAIL_ENABLED=true requires at least one address in MODERATOR_EMAILS"
                ));
            }
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() || self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
