//! Application state for epass-server

use std::sync::Arc;

use crate::config::Config;
use crate::email::Notifier;
use crate::intake::IntakePipeline;
use crate::intake::proof::ProofStore;
use crate::store::RegistrationSheet;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    pub pipeline: Arc<IntakePipeline>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, BoxError> {
        let notifier = Notifier::from_config(config)?;
        config.log_smtp_status();

        if config.serverless {
            tracing::info!(
                upload_dir = %config.upload_dir.display(),
                "Serverless filesystem, payment proofs are not persistent"
            );
        }

        let pipeline = IntakePipeline::new(
            ProofStore::new(&config.upload_dir),
            RegistrationSheet::new(&config.sheet_path),
            notifier,
            &config.event_name,
        );
        Ok(Self::with_pipeline(pipeline))
    }

    /// State around an already assembled pipeline
    pub fn with_pipeline(pipeline: IntakePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
