//! Data models
//!
//! Shared between the e-pass server and its tests.

pub mod registration;

// Re-exports
pub use registration::*;
