//! SMTP notifier for new uploads.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use studyvault_core::models::SubmissionStatus;
use studyvault_core::Config;

use super::{Notifier, NotifyError, UploadNotice};

pub const REVIEW_SUBJECT: &str = "New File Upload Requires Review";
pub const PUBLISHED_SUBJECT: &str = "New File Upload Published";

/// Sends a plain-text summary of each upload to the moderator list.
#[derive(Clone)]
pub struct EmailNotifier {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl EmailNotifier {
    /// Returns `None` if email is disabled or SMTP is not fully configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.email_enabled() {
            tracing::debug!("Moderator email disabled (EMAIL_ENABLED=false)");
            return None;
        }
        let host = config.smtp_host()?;
        let from: Mailbox = match config.email_from()?.parse() {
            Ok(from) => from,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid EMAIL_FROM, moderator email disabled");
                return None;
            }
        };
        let recipients: Vec<Mailbox> = config
            .moderator_emails()
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        if recipients.is_empty() {
            tracing::warn!("No valid MODERATOR_EMAILS, moderator email disabled");
            return None;
        }
        let port = config.smtp_port().unwrap_or(587);

        let mailer = if config.smtp_tls() {
            let b = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host).ok()?;
            let b = b.port(port);
            let b = if let (Some(u), Some(p)) = (config.smtp_user(), config.smtp_password()) {
                b.credentials(Credentials::new(u.to_string(), p.to_string()))
            } else {
                b
            };
            tracing::info!(host = %host, port = port, "Moderator email initialized (SMTP with STARTTLS)");
            b.build()
        } else {
            let b = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            let b = if let (Some(u), Some(p)) = (config.smtp_user(), config.smtp_password()) {
                b.credentials(Credentials::new(u.to_string(), p.to_string()))
            } else {
                b
            };
            tracing::info!(host = %host, port = port, "Moderator email initialized (SMTP)");
            b.build()
        };

        Some(Self {
            mailer: Arc::new(mailer),
            from,
            recipients,
        })
    }
}

pub(crate) fn subject_for(notice: &UploadNotice) -> &'static str {
    match notice.status {
        SubmissionStatus::Published => PUBLISHED_SUBJECT,
        _ => REVIEW_SUBJECT,
    }
}

pub(crate) fn render_body(notice: &UploadNotice) -> String {
    let action = match notice.status {
        SubmissionStatus::Published => {
            "This file passed automatic screening and is now listed publicly."
        }
        _ => {
            "Action Required: This file has been uploaded and is pending your review. \
             Please approve or reject it from the moderation queue."
        }
    };

    format!(
        "New File Upload for Review\n\n\
         File Name:   {}\n\
         Subject:     {}\n\
         Department:  {}\n\
         Category:    {}\n\
         Uploaded by: {}\n\n\
         {}\n",
        notice.file_name,
        notice.subject,
        notice.department,
        notice.category,
        notice.submitter,
        action
    )
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, notice: &UploadNotice) -> Result<(), NotifyError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject_for(notice));
        for mb in &self.recipients {
            builder = builder.to(mb.clone());
        }
        let email = builder
            .header(ContentType::TEXT_PLAIN)
            .body(render_body(notice))
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        tracing::info!(
            count = self.recipients.len(),
            file_name = %notice.file_name,
            "Moderator notification sent"
        );
        Ok(())
    }
}
