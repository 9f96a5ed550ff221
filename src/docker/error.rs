use std::path::PathBuf;
use std::time::Duration;

/// Errors that may occur while querying the Docker Engine API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to docker socket `{path}`: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build request for `{uri}`: {source}")]
    Request {
        uri: String,
        #[source]
        source: hyper::http::Error,
    },
    #[error("HTTP error while requesting `{uri}`: {source}")]
    Http {
        uri: String,
        #[source]
        source: hyper::Error,
    },
    #[error("request `{uri}` timed out after {timeout:?}")]
    Timeout { uri: String, timeout: Duration },
    #[error("request `{uri}` failed with status {status}: {body}")]
    Status {
        uri: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode response of `{uri}`: {source}")]
    Decode {
        uri: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("response of `{uri}` is missing `{field}`")]
    MissingField { uri: String, field: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
