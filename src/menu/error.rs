use crate::service::ServiceError;
use std::{fmt, io};

/// Why a page could not be produced.
#[derive(Debug)]
pub enum MenuError {
    /// The feed failed; buffered items are untouched.
    Fetch(ServiceError),
    /// Writing the page failed.
    Render(io::Error),
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "failed to write menu: {err}"),
        }
    }
}

impl std::error::Error for MenuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            Self::Render(err) => Some(err),
        }
    }
}

impl From<ServiceError> for MenuError {
    fn from(err: ServiceError) -> Self {
        Self::Fetch(err)
    }
}

impl From<io::Error> for MenuError {
    fn from(err: io::Error) -> Self {
        Self::Render(err)
    }
}
