//! Error types for query building.
//!
//! Every builder operation reports a single failure kind,
//! [`Error::InvalidArgument`], raised before any state is touched. The
//! remaining variants cover the URL and configuration helpers around it.

use thiserror::Error;

/// Main error type for query building.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An argument failed its type or arity contract
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The built query could not be parsed as an absolute URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A parameter naming table could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Specialized result type for query building.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for an [`Error::InvalidArgument`] with the given message.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
