//! Defines the read-only application state and the handling of one
//! blob trigger.

use crate::client::{self, StartWorkflowRequest};
use crate::conf::{self, Settings};
use crate::error::Error;
use crate::trigger::Trigger;
use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use tracing::{info, instrument};

/// An App is an initialized application state, derived from settings.
pub struct App {
    /// The original settings.
    pub settings: Settings,
}

impl App {
    /// Initialize an App instance given a settings struct. Consumes
    /// the settings struct.
    pub fn new(settings: Settings) -> Self {
        App { settings }
    }

    /// Handle one triggered blob: build the workflow input and start
    /// request, acquire an authenticated Conductor client, and start
    /// the configured workflow. Returns the execution id reported by
    /// the server. Errors propagate unchanged; the binary boundary
    /// logs them exactly once.
    #[instrument(skip(self, trigger, http), fields(blob = %trigger.blob_name))]
    pub async fn handle(&self, trigger: &Trigger, http: &reqwest::Client) -> Result<String, Error> {
        info!(
            "Processing blob {} ({} bytes)",
            trigger.blob_name, trigger.blob_size
        );
        let request = StartWorkflowRequest::new(
            self.settings.workflow_name.clone(),
            self.settings.workflow_version,
            trigger.workflow_input()?,
        )?;
        let conductor = client::connect(http, &self.settings).await?;
        let execution_id = conductor.start_workflow(&request).await?;
        info!(
            "Successfully started workflow {} with execution id {}",
            self.settings.workflow_name, execution_id
        );
        Ok(execution_id)
    }
}

/// Global App instance.
static CURRENT: OnceCell<App> = OnceCell::new();

/// Initialize the global App instance.
pub fn init() -> Result<()> {
    let settings = conf::from_env()?;
    CURRENT
        .set(App::new(settings))
        .map_err(|_| anyhow!("app::CURRENT was already initialized"))
}

/// Get the current App instance, or panic if it hasn't been
/// initialized.
pub fn current() -> &'static App {
    CURRENT.get().expect("app is not initialized")
}
