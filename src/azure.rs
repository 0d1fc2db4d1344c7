//! Wire types for the Azure Functions custom handler protocol. The
//! Functions host POSTs one JSON invocation per triggered blob to the
//! handler's `/<FunctionName>` route and expects a JSON description of
//! outputs and logs in return.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One invocation as delivered by the Functions host.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeRequest {
    pub data: TriggerData,
    #[serde(default)]
    pub metadata: TriggerMetadata,
}

/// Bound trigger data. The `myblob` key matches the binding name in
/// `OrkesBlobTrigger/function.json`; the host base64-encodes the blob
/// bytes because the binding declares `dataType: binary`.
#[derive(Debug, Deserialize)]
pub struct TriggerData {
    #[serde(rename = "myblob")]
    pub blob: String,
}

/// Trigger metadata attached by the host. Only the fields used to
/// describe the blob are modelled.
#[derive(Debug, Default, Deserialize)]
pub struct TriggerMetadata {
    /// Container-qualified path of the triggering blob, e.g.
    /// `orkesblob/report.txt`.
    #[serde(rename = "blobTrigger", default)]
    pub blob_trigger: Option<String>,

    #[serde(rename = "Properties", alias = "properties", default)]
    pub properties: Option<BlobProperties>,
}

/// Storage-level blob properties. The length key varies between host
/// versions.
#[derive(Debug, Deserialize)]
pub struct BlobProperties {
    #[serde(rename = "Length", alias = "ContentLength", default)]
    pub length: Option<u64>,
}

/// The response the Functions host expects from a custom handler.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeResponse {
    pub outputs: HashMap<String, serde_json::Value>,
    pub logs: Vec<String>,
    pub return_value: Option<String>,
}

impl InvokeResponse {
    /// Response for a successfully started workflow. The execution id
    /// is surfaced through the host's log stream.
    pub fn started(execution_id: &str) -> Self {
        InvokeResponse {
            outputs: HashMap::new(),
            logs: vec![format!("Started Orkes workflow execution {}", execution_id)],
            return_value: None,
        }
    }
}
