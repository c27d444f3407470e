//! Best-effort email notification
//!
//! The notifier never fails a registration. Without SMTP settings it only
//! logs what it would have sent.

mod smtp;

pub use smtp::{SENDER_NAME, SmtpMailer, build_message, sender_mailbox};

use std::sync::Arc;

use async_trait::async_trait;
use shared::models::Registration;

use crate::config::Config;
use crate::error::DeliveryError;

pub const PASS_SUBJECT: &str = "Isai Illam – E-Pass Confirmation";
pub const PASS_BODY: &str =
    "Your registration is confirmed. Please show the attached pass at entry.";

/// A file attached to an outgoing email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// An email ready to hand to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<EmailAttachment>,
}

impl OutgoingEmail {
    /// Confirmation email carrying the rendered pass
    pub fn pass_confirmation(registration: &Registration, pass_pdf: Vec<u8>) -> Self {
        Self {
            to: registration.email.clone(),
            subject: PASS_SUBJECT.to_string(),
            body: PASS_BODY.to_string(),
            attachments: vec![EmailAttachment {
                file_name: format!("Isai-Illam-Pass-{}.pdf", registration.id),
                content_type: "application/pdf".to_string(),
                bytes: pass_pdf,
            }],
        }
    }
}

/// Result of a send attempt that did not error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent { message_id: String },
    /// No transport configured; nothing left the process
    Skipped,
}

/// Something that can put an email on the wire
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver the email and return its Message-ID
    async fn deliver(&self, email: &OutgoingEmail) -> Result<String, DeliveryError>;
}

/// Email notifier with an optional transport
#[derive(Clone, Default)]
pub struct Notifier {
    transport: Option<Arc<dyn MailTransport>>,
}

impl Notifier {
    /// Notifier backed by `transport`
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    /// Notifier that logs instead of sending
    pub fn disabled() -> Self {
        Self { transport: None }
    }

    /// SMTP notifier when all SMTP settings are present, disabled otherwise
    pub fn from_config(config: &Config) -> Result<Self, DeliveryError> {
        match &config.smtp {
            Some(smtp) => {
                let mailer = SmtpMailer::new(smtp, &config.email_from)?;
                Ok(Self::new(Arc::new(mailer)))
            }
            None => Ok(Self::disabled()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn send(&self, email: OutgoingEmail) -> Result<Delivery, DeliveryError> {
        let Some(transport) = &self.transport else {
            tracing::info!(
                to = %email.to,
                subject = %email.subject,
                attachments = email.attachments.len(),
                "Email transport not configured, skipping send"
            );
            return Ok(Delivery::Skipped);
        };

        let message_id = transport.deliver(&email).await?;
        tracing::info!(to = %email.to, message_id = %message_id, "Email sent");
        Ok(Delivery::Sent { message_id })
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("configured", &self.is_configured())
            .finish()
    }
}
