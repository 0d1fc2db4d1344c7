//! Defines configuration as read from the environment.

use crate::error::Error;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Default `workflow_version` value.
fn default_workflow_version() -> u32 {
    1
}

/// The bridge is configured to start one Conductor workflow per
/// triggered blob. The configuration must be given as environment
/// variables, or through `local.settings.json` for the local test
/// binary.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Base URL of the Orkes Conductor server, e.g.
    /// `https://play.orkes.io/api`.
    pub orkes_base_url: String,

    /// Application key id used to authenticate against the server.
    pub orkes_key_id: String,

    /// Application key secret paired with the key id.
    pub orkes_key_secret: String,

    /// Name of the registered workflow to start for each blob.
    pub workflow_name: String,

    /// Version of the workflow definition to start. Defaults to 1. A
    /// value that doesn't parse as an integer is a configuration
    /// error, not a fallback.
    #[serde(default = "default_workflow_version")]
    pub workflow_version: u32,
}

/// Read settings from the process environment.
pub fn from_env() -> Result<Settings, Error> {
    Ok(envy::from_env()?)
}

/// The shape of an Azure Functions `local.settings.json` file. Only
/// the `Values` mapping matters here; it holds the same keys the
/// deployed app reads from the environment.
#[derive(Debug, Deserialize)]
struct LocalSettings {
    #[serde(rename = "Values", default)]
    values: HashMap<String, String>,
}

/// Read settings from a `local.settings.json` file. Used only by the
/// local test binary; the file must exist and hold valid JSON.
pub fn from_local_settings(path: &Path) -> Result<Settings, Error> {
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("{} could not be read: {}", path.display(), e)))?;
    let settings: LocalSettings = serde_json::from_str(&raw)
        .map_err(|e| Error::Config(format!("{} is not valid JSON: {}", path.display(), e)))?;
    Ok(envy::from_iter(settings.values)?)
}
