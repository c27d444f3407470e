//! Isai Illam e-pass server
//!
//! Takes an event registration over HTTP, stores the payment proof and a
//! spreadsheet row, then emails the registrant a PDF pass with a QR code.
//!
//! ```text
//! epass-server/src/
//! ├── api/        # HTTP routes and handlers
//! ├── intake/     # validation, payment proof, registration pipeline
//! ├── store.rs    # registration spreadsheet
//! ├── pass/       # PDF pass rendering
//! ├── email/      # best-effort email delivery
//! ├── config.rs   # environment configuration
//! ├── error.rs    # service-layer errors
//! ├── logger.rs   # tracing setup
//! └── state.rs    # shared application state
//! ```

pub mod api;
pub mod config;
pub mod email;
pub mod error;
pub mod intake;
pub mod logger;
pub mod pass;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{DeliveryError, RenderError, ServiceError, StorageError};
pub use intake::{IntakePipeline, PassDelivery, RegistrationOutcome};
pub use state::AppState;
