//! Service-layer error types for the e-pass server
//!
//! Each side effect of the intake pipeline has its own error enum:
//! - [`StorageError`]: proof file and registration sheet I/O
//! - [`RenderError`]: pass document rendering
//! - [`DeliveryError`]: email delivery
//!
//! `ServiceError` bridges them to the API-layer error (`AppError`) so handlers
//! can use `?` directly. Only storage and validation errors ever reach the
//! client; render and delivery errors are absorbed by the pipeline.

use std::path::PathBuf;

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Proof file or registration sheet I/O failure
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write payment proof {}: {source}", .path.display())]
    ProofWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read registration sheet {}: {message}", .path.display())]
    SheetRead { path: PathBuf, message: String },
    #[error("failed to write registration sheet {}: {message}", .path.display())]
    SheetWrite { path: PathBuf, message: String },
    #[error("registration sheet task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Pass document could not be produced
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to serialize QR payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("failed to encode QR code: {0}")]
    Qr(#[from] qrcode::types::QrError),
}

/// Email could not be delivered
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid mailbox {address:?}: {message}")]
    Address { address: String, message: String },
    #[error("failed to build email: {0}")]
    Build(String),
    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// Service-layer error
///
/// - `App`: validation / business-rule errors (pass-through to client)
/// - `Storage`: infrastructure errors (logged, mapped by which step failed)
#[derive(Debug)]
pub enum ServiceError {
    App(AppError),
    Storage(StorageError),
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        ServiceError::Storage(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            // Without a stored proof the client has to resubmit
            ServiceError::Storage(err @ StorageError::ProofWrite { .. }) => {
                tracing::error!(error = %err, "Payment proof write failed");
                AppError::new(ErrorCode::PaymentProofStoreFailed)
            }
            ServiceError::Storage(err @ StorageError::Task(_)) => {
                tracing::error!(error = %err, "Storage task did not complete");
                AppError::new(ErrorCode::InternalError)
            }
            ServiceError::Storage(err) => {
                tracing::error!(error = %err, "Registration storage error");
                AppError::new(ErrorCode::RegistrationStoreFailed)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
