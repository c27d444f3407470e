//! Shared types for the e-pass server
//!
//! Error codes and the API response envelope, registration models, and
//! small utilities used by the server and its tests.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};
