//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            Self::RegistrationStoreFailed
            | Self::EmailDeliveryFailed
            | Self::PassRenderFailed
            | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation and payment proof errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
