//! Event glue between Azure Blob Storage and Orkes Conductor: every
//! blob landing in the watched container starts one workflow execution
//! carrying the blob's name, size and text content as input.
//!
//! The deployed path is an Azure Functions custom handler (see
//! `src/main.rs`); `src/bin/local-test.rs` starts a workflow once with
//! fixed input to verify connectivity outside the Functions host.

pub mod app;
pub mod azure;
pub mod certs;
pub mod client;
pub mod conf;
pub mod error;
pub mod trigger;
