//! Registration Model

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Event name used when the form does not name one
pub const DEFAULT_EVENT_NAME: &str = "Isai Illam";

/// Registration form payload (POST /api/register)
///
/// Field names follow the registration form. Every field is optional at the
/// wire level so that a missing field surfaces as a validation error naming
/// it, instead of a generic JSON rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub club_name: Option<String>,
    pub event: Option<String>,
    /// Payment proof as a `data:<mime>;base64,<payload>` URI
    pub payment_screenshot: Option<String>,
}

/// A validated, identified registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Short participant id printed on the pass and encoded in the QR code
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// Department or club the attendee belongs to
    pub club: String,
    pub event: String,
    pub registration_date: DateTime<Utc>,
    /// File name of the stored payment proof
    pub payment_proof: String,
}

impl Registration {
    /// Registration date as stored in the sheet (`2025-01-05T10:20:30.123Z`)
    pub fn registration_date_text(&self) -> String {
        self.registration_date
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// What a scanner recovers from the pass QR code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassPayload {
    pub id: String,
    pub name: String,
    pub event: String,
}

impl PassPayload {
    pub fn for_registration(registration: &Registration) -> Self {
        Self {
            id: registration.id.clone(),
            name: registration.full_name.clone(),
            event: registration.event.clone(),
        }
    }
}

/// Success body of POST /api/register
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReceipt {
    pub participant_id: String,
    pub email_sent: bool,
}
