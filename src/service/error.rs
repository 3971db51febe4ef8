use std::fmt;

/// Failure talking to the ticketing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service could not be reached at all.
    Connection(String),
    /// The service answered with an error status.
    Request { status: u16, reason: String },
    /// The named object does not exist.
    NotFound(String),
    /// The service answered with something we could not read.
    Parse(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(detail) => write!(
                f,
                "Problem connecting to the support services API. Is the service accessible from this host? ({detail})"
            ),
            Self::Request { status, reason } => write!(
                f,
                "Unable to connect to support services API. Reason: {reason} (status {status})"
            ),
            Self::NotFound(what) => write!(f, "Unable to find {what}"),
            Self::Parse(detail) => write!(f, "Problem parsing the service response: {detail}"),
        }
    }
}

impl std::error::Error for ServiceError {}
