//! Registration API handler
//!
//! POST /api/register (and the /register alias)

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use http::StatusCode;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{RegistrationReceipt, RegistrationRequest};

use crate::error::ServiceResult;
use crate::intake::PassDelivery;
use crate::state::AppState;

pub const SENT_MESSAGE: &str = "Registration successful! E-pass sent to email";
pub const SKIPPED_MESSAGE: &str = "Registration successful! E-pass email is not enabled; \
     please keep your participant ID for entry";
pub const NOT_SENT_MESSAGE: &str = "Registration successful! We could not email your e-pass; \
     please contact the organisers with your participant ID";

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> ServiceResult<ApiResponse<RegistrationReceipt>> {
    let Json(request) = payload.map_err(rejection_error)?;

    let outcome = state.pipeline.register(&request).await?;

    let message = match outcome.pass {
        PassDelivery::Sent => SENT_MESSAGE,
        PassDelivery::Skipped => SKIPPED_MESSAGE,
        PassDelivery::Failed => NOT_SENT_MESSAGE,
    };
    let email_sent = outcome.notified();
    Ok(ApiResponse::success(
        message,
        RegistrationReceipt {
            participant_id: outcome.registration.id,
            email_sent,
        },
    ))
}

/// Malformed bodies are client errors like any other invalid form
fn rejection_error(rejection: JsonRejection) -> AppError {
    tracing::debug!(status = %rejection.status(), error = %rejection.body_text(), "Rejected registration body");
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(ErrorCode::PaymentProofTooLarge)
    } else {
        AppError::invalid_request(rejection.body_text())
    }
}
