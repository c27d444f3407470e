//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Registration input errors
/// - 2xxx: Storage errors
/// - 3xxx: Delivery errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Registration input errors (1xxx)
    Registration,
    /// Storage errors (2xxx)
    Storage,
    /// Delivery errors (3xxx)
    Delivery,
    /// System errors (9xxx and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Registration,
            2000..3000 => Self::Storage,
            3000..4000 => Self::Delivery,
            _ => Self::System,
        }
    }

    /// Whether errors of this category are server-side faults worth an error log
    pub fn is_server_fault(&self) -> bool {
        matches!(self, Self::Storage | Self::System)
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
