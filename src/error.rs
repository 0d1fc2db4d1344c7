//! Error types separating configuration failures from remote-call
//! failures. Inner layers return these; the binaries log them once at
//! their boundary and let the process or invocation fail.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed configuration, from the environment or the
    /// local settings file. Never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// Any failure while talking to the Conductor server. Causes are
    /// not distinguished at this layer.
    #[error("conductor request failed: {0}")]
    Remote(String),

    /// The triggering blob does not hold valid UTF-8 text. Binary
    /// blobs fail the whole invocation.
    #[error("blob {0} does not contain valid UTF-8 text")]
    BlobNotText(String),

    /// The invocation payload delivered by the Functions host could
    /// not be understood.
    #[error("malformed trigger payload: {0}")]
    Payload(String),
}

impl From<envy::Error> for Error {
    fn from(err: envy::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Remote(err.to_string())
    }
}
