use anyhow::Result;
use orkes_blob_bridge::client::{self, StartWorkflowRequest};
use orkes_blob_bridge::trigger::WorkflowInput;
use orkes_blob_bridge::{certs, conf};
use std::path::Path;
use tracing::info;

/// Start the configured workflow once with fixed test input, using
/// settings from `local.settings.json`. Verifies Orkes connectivity
/// without going through the Functions host.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    certs::setup()?;
    info!("Starting local test");

    let settings = conf::from_local_settings(Path::new("local.settings.json"))?;
    client::init()?;

    let input = WorkflowInput {
        blob_name: String::from("test.txt"),
        blob_size: 100,
        blob_content: String::from("This is a test content for local testing"),
    };
    let request = StartWorkflowRequest::new(
        settings.workflow_name.clone(),
        settings.workflow_version,
        input,
    )?;
    let conductor = client::connect(client::current(), &settings).await?;
    let execution_id = conductor.start_workflow(&request).await?;

    info!("Test completed successfully. Execution id: {}", execution_id);
    Ok(())
}
