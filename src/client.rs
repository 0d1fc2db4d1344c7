//! Defines the Conductor client used to launch workflows.
//!
//! Orkes Conductor authenticates applications by exchanging a key
//! id/secret pair for a short-lived JWT, carried in the
//! `X-Authorization` header of every subsequent API call.

use crate::conf::Settings;
use crate::error::Error;
use crate::trigger::WorkflowInput;
use anyhow::{anyhow, Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A workflow start request, as accepted by the Conductor server.
#[derive(Debug, Serialize)]
pub struct StartWorkflowRequest {
    pub name: String,
    pub version: u32,
    pub input: WorkflowInput,
}

impl StartWorkflowRequest {
    /// Build a start request. The server requires a non-empty workflow
    /// name and a version of at least 1; both are checked here so a
    /// bad configuration fails before any remote call.
    pub fn new(name: String, version: u32, input: WorkflowInput) -> Result<Self, Error> {
        if name.is_empty() {
            return Err(Error::Config(String::from("workflow name must not be empty")));
        }
        if version < 1 {
            return Err(Error::Config(String::from(
                "workflow version must be at least 1",
            )));
        }
        Ok(StartWorkflowRequest {
            name,
            version,
            input,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    key_id: &'a str,
    key_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// An authenticated handle on the Conductor server.
#[derive(Debug)]
pub struct Conductor {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

/// Prefix the base URL with a scheme if none was given, and drop any
/// trailing slash so endpoint paths can be appended uniformly.
fn normalize_base_url(raw: &str) -> String {
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };
    with_scheme.trim_end_matches('/').to_string()
}

/// Acquire an authenticated Conductor client for the configured
/// server. Any failure to obtain a token (network, malformed URL,
/// rejected credentials) surfaces as a single remote error; causes are
/// not distinguished at this layer.
pub async fn connect(http: &reqwest::Client, settings: &Settings) -> Result<Conductor, Error> {
    let base_url = normalize_base_url(&settings.orkes_base_url);
    info!("Acquiring Conductor token from {}", base_url);
    let response = http
        .post(format!("{}/token", base_url))
        .json(&TokenRequest {
            key_id: &settings.orkes_key_id,
            key_secret: &settings.orkes_key_secret,
        })
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Remote(format!(
            "token endpoint at {} returned {}: {}",
            base_url, status, body
        )));
    }
    let TokenResponse { token } = response.json().await?;
    Ok(Conductor {
        http: http.clone(),
        base_url,
        token,
    })
}

impl Conductor {
    /// Submit a workflow start request and return the execution id
    /// reported by the server. The id is opaque and never parsed;
    /// only the transport-level JSON quoting is stripped.
    pub async fn start_workflow(&self, request: &StartWorkflowRequest) -> Result<String, Error> {
        info!(
            "Starting workflow: {} (version {})",
            request.name, request.version
        );
        let response = self
            .http
            .post(format!("{}/workflow", self.base_url))
            .header("X-Authorization", &self.token)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(format!(
                "workflow start for {} returned {}: {}",
                request.name, status, body
            )));
        }
        let body = response.text().await?;
        Ok(body.trim().trim_matches('"').to_string())
    }
}

/// Global HTTP client instance, shared across invocations so
/// connections are reused.
static CURRENT: OnceCell<reqwest::Client> = OnceCell::new();

/// Initialize the global HTTP client.
pub fn init() -> Result<()> {
    let http = reqwest::Client::builder()
        .build()
        .context("Failed to build the HTTP client")?;
    CURRENT
        .set(http)
        .map_err(|_| anyhow!("client::CURRENT was already initialized"))
}

/// Get the current HTTP client instance, or panic if it hasn't been
/// initialized.
pub fn current() -> &'static reqwest::Client {
    CURRENT.get().expect("client is not initialized")
}
