//! Registration intake
//!
//! validate → decode proof → assign id → store proof → append row →
//! render pass → notify.
//!
//! Everything up to the sheet append must succeed for the registration to
//! count. Rendering and email are best-effort and only change the reported
//! [`PassDelivery`].

pub mod proof;
pub mod validation;

use chrono::Utc;
use shared::error::ErrorCode;
use shared::models::{Registration, RegistrationRequest};
use shared::util::participant_id;

use crate::email::{Delivery, Notifier, OutgoingEmail};
use crate::error::ServiceResult;
use crate::pass::PassRenderer;
use crate::store::RegistrationSheet;
use proof::{ProofStore, decode_data_uri};
use validation::validate_request;

/// What happened to the pass email after the row was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassDelivery {
    /// Handed to the mail transport
    Sent,
    /// No transport configured
    Skipped,
    /// Rendering or sending failed
    Failed,
}

/// A recorded registration and what happened to its pass
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub registration: Registration,
    pub pass: PassDelivery,
}

impl RegistrationOutcome {
    /// `true` only if an email actually went out
    pub fn notified(&self) -> bool {
        self.pass == PassDelivery::Sent
    }
}

/// The registration workflow and the stores it writes to
#[derive(Debug, Clone)]
pub struct IntakePipeline {
    proofs: ProofStore,
    sheet: RegistrationSheet,
    renderer: PassRenderer,
    notifier: Notifier,
    default_event: String,
}

impl IntakePipeline {
    pub fn new(
        proofs: ProofStore,
        sheet: RegistrationSheet,
        notifier: Notifier,
        default_event: impl Into<String>,
    ) -> Self {
        Self {
            proofs,
            sheet,
            renderer: PassRenderer::new(),
            notifier,
            default_event: default_event.into(),
        }
    }

    pub fn sheet(&self) -> &RegistrationSheet {
        &self.sheet
    }

    pub fn proofs(&self) -> &ProofStore {
        &self.proofs
    }

    /// Run one registration through the pipeline
    pub async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> ServiceResult<RegistrationOutcome> {
        let form = validate_request(request, &self.default_event)?;
        let proof = decode_data_uri(&form.payment_screenshot)?;

        let id = participant_id();
        let registered_at = Utc::now();
        let proof_file = self
            .proofs
            .save(&proof, &id, registered_at.timestamp_millis())
            .await?;

        let registration = Registration {
            id,
            full_name: form.full_name,
            email: form.email,
            phone: form.phone,
            club: form.club,
            event: form.event,
            registration_date: registered_at,
            payment_proof: proof_file,
        };

        if let Err(e) = self.sheet.append(&registration).await {
            // No row, no proof
            self.proofs.discard(&registration.payment_proof).await;
            return Err(e.into());
        }

        tracing::info!(
            participant_id = %registration.id,
            event = %registration.event,
            proof = %registration.payment_proof,
            "Registration recorded"
        );

        let pass = self.send_pass(&registration).await;
        Ok(RegistrationOutcome { registration, pass })
    }

    /// Render the pass and email it
    async fn send_pass(&self, registration: &Registration) -> PassDelivery {
        let pdf = match self.renderer.render(registration) {
            Ok(pdf) => pdf,
            Err(e) => {
                tracing::error!(
                    participant_id = %registration.id,
                    code = %ErrorCode::PassRenderFailed,
                    error = %e,
                    "Failed to render pass"
                );
                return PassDelivery::Failed;
            }
        };

        let email = OutgoingEmail::pass_confirmation(registration, pdf);
        match self.notifier.send(email).await {
            Ok(Delivery::Sent { .. }) => PassDelivery::Sent,
            Ok(Delivery::Skipped) => PassDelivery::Skipped,
            Err(e) => {
                tracing::warn!(
                    participant_id = %registration.id,
                    code = %ErrorCode::EmailDeliveryFailed,
                    error = %e,
                    "Failed to send pass email"
                );
                PassDelivery::Failed
            }
        }
    }
}
