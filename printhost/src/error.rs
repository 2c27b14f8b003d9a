use reqwest::StatusCode;

/// Errors returned while talking to the print host.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never completed, or the response body could not be
    /// decoded.
    #[error("request to the print host failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The print host answered with a well-formed `{error}` payload.
    #[error("print host reported an error: {0}")]
    Backend(String),

    /// The upload endpoint answered with something other than `200 OK`.
    #[error("upload rejected with status {0}")]
    UploadRejected(StatusCode),

    /// The configured base url can not have endpoints appended to it.
    #[error("invalid print host url: {0}")]
    InvalidUrl(String),
}

/// Result type used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
