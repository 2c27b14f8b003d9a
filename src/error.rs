/// Errors surfaced by console operations.
///
/// Every failure is isolated to the operation that triggered it; none of
/// them stop the background loops.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never reached the backend, or its answer could not be
    /// decoded.
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    /// The backend answered with a well-formed error; the message is the
    /// backend's own.
    #[error("{0}")]
    Backend(String),

    /// The backend refused an upload with the given HTTP status.
    #[error("upload rejected with status {0}")]
    UploadRejected(u16),

    /// A printer address that can not be stored.
    #[error("invalid printer address: {0:?}")]
    InvalidAddress(String),

    /// A path that does not name a file.
    #[error("not a file: {0}")]
    InvalidFile(String),

    /// Local i/o failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Was this a connectivity failure, as opposed to a failure reported by
    /// the backend?
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Error::Connectivity(_))
    }
}

#[cfg(feature = "printhost")]
impl From<::printhost::Error> for Error {
    fn from(err: ::printhost::Error) -> Self {
        match err {
            ::printhost::Error::Backend(message) => Error::Backend(message),
            ::printhost::Error::UploadRejected(status) => Error::UploadRejected(status.as_u16()),
            err @ (::printhost::Error::Http(_) | ::printhost::Error::InvalidUrl(_)) => {
                Error::Connectivity(err.to_string())
            }
        }
    }
}

/// Result type used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
