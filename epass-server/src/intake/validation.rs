//! Registration form validation
//!
//! Limits mirror the registration form so a request that passes the browser
//! checks also passes here.

use std::str::FromStr;

use lettre::Address;
use shared::error::{AppError, ErrorCode};
use shared::models::RegistrationRequest;

/// Attendee, club and event names
pub const MAX_NAME_LEN: usize = 100;

/// Email addresses
pub const MAX_EMAIL_LEN: usize = 255;

/// Mobile numbers are exactly this many digits
pub const PHONE_DIGITS: usize = 10;

/// Form fields after validation, trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub club: String,
    pub event: String,
    pub payment_screenshot: String,
}

/// Validate the form; the first failing field wins.
///
/// `default_event` fills in a blank or missing event name.
pub fn validate_request(
    request: &RegistrationRequest,
    default_event: &str,
) -> Result<ValidatedForm, AppError> {
    let full_name = required_text(request.full_name.as_deref(), "fullName", MAX_NAME_LEN)?;
    let email = required_text(request.email.as_deref(), "email", MAX_EMAIL_LEN)?;
    validate_email(&email)?;
    let phone = required_text(request.mobile_number.as_deref(), "mobileNumber", PHONE_DIGITS)
        .map_err(|e| match e.code {
            // A long number is a phone format error, not a length error
            ErrorCode::ValueOutOfRange => invalid_phone(),
            _ => e,
        })?;
    validate_phone(&phone)?;
    let club = required_text(request.club_name.as_deref(), "clubName", MAX_NAME_LEN)?;

    let payment_screenshot = request
        .payment_screenshot
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::PaymentProofMissing))?
        .to_string();

    let event = match request.event.as_deref().map(str::trim) {
        Some(event) if !event.is_empty() => within_limit(event, "event", MAX_NAME_LEN)?,
        _ => default_event.to_string(),
    };

    Ok(ValidatedForm {
        full_name,
        email,
        phone,
        club,
        event,
        payment_screenshot,
    })
}

/// Validate that a required string is non-empty and within the length limit.
fn required_text(value: Option<&str>, field: &str, max_len: usize) -> Result<String, AppError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::required(field));
    }
    within_limit(value, field, max_len)
}

fn within_limit(value: &str, field: &str, max_len: usize) -> Result<String, AppError> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} is too long ({len} chars, max {max_len})"),
        )
        .with_detail("field", field));
    }
    Ok(value.to_string())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let invalid = || AppError::new(ErrorCode::InvalidEmail).with_detail("field", "email");
    let address = Address::from_str(email).map_err(|_| invalid())?;
    // lettre accepts dotless domains (`user@localhost`); the form does not
    if !address.domain().contains('.') {
        return Err(invalid());
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), AppError> {
    if phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(invalid_phone())
    }
}

fn invalid_phone() -> AppError {
    AppError::new(ErrorCode::InvalidPhone).with_detail("field", "mobileNumber")
}
