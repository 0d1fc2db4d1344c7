//! Defines a _trigger_, the input for one workflow launch. The trigger
//! is built from the blob invocation delivered by the Functions host.

use crate::azure::InvokeRequest;
use crate::error::Error;
use base64ct::{Base64, Encoding};
use serde::Serialize;

/// One triggered blob.
#[derive(Debug)]
pub struct Trigger {
    /// Container-qualified blob path.
    pub blob_name: String,

    /// Blob length in bytes, as reported by storage.
    pub blob_size: u64,

    /// The raw blob bytes.
    pub content: Vec<u8>,
}

/// The input payload handed to the started workflow. Serializes with
/// the keys the workflow definition expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInput {
    pub blob_name: String,
    pub blob_size: u64,
    pub blob_content: String,
}

impl Trigger {
    /// Builds a trigger from a host invocation: base64-decodes the
    /// bound blob bytes and takes the blob path from the trigger
    /// metadata. The reported length falls back to the decoded byte
    /// count when the host attaches no blob properties.
    pub fn from_invocation(invocation: &InvokeRequest) -> Result<Self, Error> {
        let content = Base64::decode_vec(&invocation.data.blob)
            .map_err(|e| Error::Payload(format!("blob data is not valid base64: {}", e)))?;
        let blob_name = invocation
            .metadata
            .blob_trigger
            .clone()
            .ok_or_else(|| Error::Payload(String::from("invocation has no blobTrigger metadata")))?;
        let blob_size = invocation
            .metadata
            .properties
            .as_ref()
            .and_then(|properties| properties.length)
            .unwrap_or(content.len() as u64);
        Ok(Trigger {
            blob_name,
            blob_size,
            content,
        })
    }

    /// Builds the workflow input, decoding the blob content as UTF-8.
    /// Blobs holding anything other than UTF-8 text fail the
    /// invocation.
    pub fn workflow_input(&self) -> Result<WorkflowInput, Error> {
        let text = std::str::from_utf8(&self.content)
            .map_err(|_| Error::BlobNotText(self.blob_name.clone()))?;
        Ok(WorkflowInput {
            blob_name: self.blob_name.clone(),
            blob_size: self.blob_size,
            blob_content: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invocation(payload: serde_json::Value) -> InvokeRequest {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn builds_trigger_from_invocation() {
        let trigger = Trigger::from_invocation(&invocation(json!({
            "Data": {"myblob": "aGVsbG8gd29ybGQ="},
            "Metadata": {
                "blobTrigger": "orkesblob/test.txt",
                "Properties": {"Length": 100}
            }
        })))
        .unwrap();
        assert_eq!(trigger.blob_name, "orkesblob/test.txt");
        assert_eq!(trigger.blob_size, 100);
        assert_eq!(trigger.content, b"hello world");
    }

    #[test]
    fn blob_size_falls_back_to_decoded_length() {
        let trigger = Trigger::from_invocation(&invocation(json!({
            "Data": {"myblob": "aGVsbG8="},
            "Metadata": {"blobTrigger": "orkesblob/test.txt"}
        })))
        .unwrap();
        assert_eq!(trigger.blob_size, 5);
    }

    #[test]
    fn missing_blob_trigger_metadata_is_rejected() {
        let err = Trigger::from_invocation(&invocation(json!({
            "Data": {"myblob": "aGVsbG8="}
        })))
        .unwrap_err();
        assert!(matches!(err, Error::Payload(_)));
    }

    #[test]
    fn undecodable_blob_data_is_rejected() {
        let err = Trigger::from_invocation(&invocation(json!({
            "Data": {"myblob": "%%% not base64 %%%"},
            "Metadata": {"blobTrigger": "orkesblob/test.txt"}
        })))
        .unwrap_err();
        assert!(matches!(err, Error::Payload(_)));
    }

    #[test]
    fn workflow_input_carries_name_size_and_text() {
        let trigger = Trigger {
            blob_name: String::from("test.txt"),
            blob_size: 100,
            content: b"This is a test content for local testing".to_vec(),
        };
        let input = trigger.workflow_input().unwrap();
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "blobName": "test.txt",
                "blobSize": 100,
                "blobContent": "This is a test content for local testing"
            })
        );
    }

    #[test]
    fn binary_blob_content_is_rejected() {
        let trigger = Trigger {
            blob_name: String::from("test.bin"),
            blob_size: 2,
            content: vec![0xff, 0xfe],
        };
        let err = trigger.workflow_input().unwrap_err();
        assert!(matches!(err, Error::BlobNotText(_)));
    }
}
