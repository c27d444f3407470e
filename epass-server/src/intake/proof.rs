//! Payment proof handling
//!
//! The form sends the proof as a data URI (`data:image/png;base64,...`).
//! Decoding is pure and happens before an id is assigned; writing happens
//! afterwards, into a file named after the participant id and a millisecond
//! timestamp.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use shared::error::{AppError, ErrorCode};

use crate::error::StorageError;

/// Maximum decoded proof size (5MB, same as the form's upload limit)
pub const MAX_PROOF_SIZE: usize = 5 * 1024 * 1024;

/// Extension used when the declared MIME type is not recognized
const DEFAULT_EXTENSION: &str = "png";

/// A decoded payment proof, not yet written anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProof {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PaymentProof {
    /// File extension inferred from the declared MIME type
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }
}

/// Map a MIME type to a file extension (unknown → `png`)
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "application/pdf" => "pdf",
        _ => DEFAULT_EXTENSION,
    }
}

/// Decode a `data:<mime>[;param]*;base64,<payload>` URI
pub fn decode_data_uri(uri: &str) -> Result<PaymentProof, AppError> {
    let invalid = |reason: &str| {
        AppError::new(ErrorCode::PaymentProofInvalid).with_detail("reason", reason)
    };

    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| invalid("not a data URI"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("missing payload separator"))?;

    let mut parts = header.split(';');
    let mime_type = parts.next().unwrap_or_default().trim().to_string();
    if !parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(invalid("payload is not base64"));
    }

    // Browsers never wrap, but hand-built payloads sometimes carry whitespace
    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(payload.as_bytes())
        .map_err(|_| invalid("payload is not valid base64"))?;

    if bytes.is_empty() {
        return Err(invalid("payload is empty"));
    }
    if bytes.len() > MAX_PROOF_SIZE {
        return Err(AppError::new(ErrorCode::PaymentProofTooLarge)
            .with_detail("size", bytes.len())
            .with_detail("max", MAX_PROOF_SIZE));
    }

    Ok(PaymentProof { mime_type, bytes })
}

/// File name for a stored proof: `payment-<id>-<millis>.<ext>`
pub fn proof_file_name(participant_id: &str, timestamp_millis: i64, extension: &str) -> String {
    format!("payment-{participant_id}-{timestamp_millis}.{extension}")
}

/// Directory holding uploaded payment proofs
#[derive(Debug, Clone)]
pub struct ProofStore {
    dir: PathBuf,
}

impl ProofStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the proof and return its file name
    pub async fn save(
        &self,
        proof: &PaymentProof,
        participant_id: &str,
        timestamp_millis: i64,
    ) -> Result<String, StorageError> {
        let file_name = proof_file_name(participant_id, timestamp_millis, proof.extension());
        let path = self.dir.join(&file_name);

        let write = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, &proof.bytes).await
        };
        write
            .await
            .map_err(|source| StorageError::ProofWrite {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(file = %file_name, size = proof.bytes.len(), "Payment proof stored");
        Ok(file_name)
    }

    /// Remove a stored proof whose registration was not recorded
    pub async fn discard(&self, file_name: &str) {
        let path = self.dir.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::info!(file = %file_name, "Orphaned payment proof removed"),
            Err(e) => tracing::warn!(
                file = %file_name,
                error = %e,
                "Failed to remove orphaned payment proof"
            ),
        }
    }
}
