//! SMTP transport using Lettre.

use std::str::FromStr;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

use super::{MailTransport, OutgoingEmail};
use crate::config::SmtpConfig;
use crate::error::DeliveryError;

/// Display name on outgoing mail
pub const SENDER_NAME: &str = "Isai Illam";

/// Sends mail through an authenticated SMTP relay
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the relay transport; no connection is made until the first send.
    pub fn new(smtp: &SmtpConfig, from_address: &str) -> Result<Self, DeliveryError> {
        let from = sender_mailbox(from_address)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
            .port(smtp.port)
            .tls(transport_tls(smtp)?)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

/// Port 465 wraps the connection in TLS; every other port upgrades with
/// STARTTLS when the server offers it and stays plaintext otherwise.
fn transport_tls(smtp: &SmtpConfig) -> Result<Tls, DeliveryError> {
    let parameters = TlsParameters::new(smtp.host.clone())
        .map_err(|e| DeliveryError::Transport(format!("SMTP TLS setup error: {e}")))?;
    Ok(if smtp.implicit_tls() {
        Tls::Wrapper(parameters)
    } else {
        Tls::Opportunistic(parameters)
    })
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<String, DeliveryError> {
        let message_id = new_message_id(&self.from);
        let message = build_message(&self.from, email, &message_id)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport(format!("Failed to send email: {e}")))?;
        Ok(message_id)
    }
}

/// `"Isai Illam" <address>`
pub fn sender_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    let address = parse_address(address)?;
    Ok(Mailbox::new(Some(SENDER_NAME.to_string()), address))
}

fn parse_address(address: &str) -> Result<Address, DeliveryError> {
    Address::from_str(address).map_err(|e| DeliveryError::Address {
        address: address.to_string(),
        message: e.to_string(),
    })
}

fn new_message_id(from: &Mailbox) -> String {
    format!("<{}@{}>", Uuid::new_v4().simple(), from.email.domain())
}

/// Plain-text body followed by one part per attachment
pub fn build_message(
    from: &Mailbox,
    email: &OutgoingEmail,
    message_id: &str,
) -> Result<Message, DeliveryError> {
    let to = Mailbox::new(None, parse_address(&email.to)?);

    let mut body = MultiPart::mixed().singlepart(SinglePart::plain(email.body.clone()));
    for attachment in &email.attachments {
        let content_type = ContentType::parse(&attachment.content_type)
            .map_err(|e| DeliveryError::Build(format!("Invalid attachment type: {e}")))?;
        body = body.singlepart(
            Attachment::new(attachment.file_name.clone())
                .body(attachment.bytes.clone(), content_type),
        );
    }

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.clone())
        .message_id(Some(message_id.to_string()))
        .multipart(body)
        .map_err(|e| DeliveryError::Build(format!("Failed to build email: {e}")))
}
