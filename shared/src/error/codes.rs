//! Unified error codes for the e-pass service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Registration input errors
//! - 2xxx: Storage errors
//! - 3xxx: Delivery errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can switch on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Registration ====================
    /// Email address is malformed
    InvalidEmail = 1001,
    /// Phone number is not exactly 10 digits
    InvalidPhone = 1002,
    /// Payment proof was not attached
    PaymentProofMissing = 1003,
    /// Payment proof could not be decoded
    PaymentProofInvalid = 1004,
    /// Payment proof exceeds the upload limit
    PaymentProofTooLarge = 1005,
    /// Payment proof could not be written to storage
    PaymentProofStoreFailed = 1006,

    // ==================== 2xxx: Storage ====================
    /// Registration sheet could not be read or written
    RegistrationStoreFailed = 2001,

    // ==================== 3xxx: Delivery ====================
    /// Email could not be delivered
    EmailDeliveryFailed = 3001,
    /// Pass document could not be rendered
    PassRenderFailed = 3002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::NotFound => "Not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Registration
            ErrorCode::InvalidEmail => "Please enter a valid email address",
            ErrorCode::InvalidPhone => "Please enter a valid 10-digit mobile number",
            ErrorCode::PaymentProofMissing => "Payment screenshot is required",
            ErrorCode::PaymentProofInvalid => "Payment screenshot could not be read",
            ErrorCode::PaymentProofTooLarge => "Payment screenshot must be less than 5MB",
            ErrorCode::PaymentProofStoreFailed => "Failed to save payment screenshot",

            // Storage
            ErrorCode::RegistrationStoreFailed => "Failed to process registration",

            // Delivery
            ErrorCode::EmailDeliveryFailed => "Failed to send email",
            ErrorCode::PassRenderFailed => "Failed to render e-pass",

            // System
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Registration
            1001 => Ok(ErrorCode::InvalidEmail),
            1002 => Ok(ErrorCode::InvalidPhone),
            1003 => Ok(ErrorCode::PaymentProofMissing),
            1004 => Ok(ErrorCode::PaymentProofInvalid),
            1005 => Ok(ErrorCode::PaymentProofTooLarge),
            1006 => Ok(ErrorCode::PaymentProofStoreFailed),

            // Storage
            2001 => Ok(ErrorCode::RegistrationStoreFailed),

            // Delivery
            3001 => Ok(ErrorCode::EmailDeliveryFailed),
            3002 => Ok(ErrorCode::PassRenderFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
