//! Error taxonomy for channel income calculations
//!
//! Every failure carries an explicit [`ErrorKind`] so callers can branch on the
//! kind of failure instead of on its message.

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input URL matched none of the known channel URL shapes
    InvalidChannelUrl,
    /// A handle or custom-name lookup produced no channel
    ChannelLookup,
    /// The provider returned no channel for a resolved identifier
    ChannelNotFound,
    /// The provider rejected the API key or the quota is exhausted
    QuotaOrAuth,
    /// Any other upstream failure
    Provider,
    /// Fetching the recent video sample failed
    Processing,
    /// The process is misconfigured
    Config,
}

/// Errors that can occur while estimating channel income
#[derive(Debug, Error)]
pub enum Error {
    /// The channel URL could not be parsed
    #[error("Invalid YouTube channel URL: {0}")]
    InvalidChannelUrl(String),

    /// A name-based channel lookup returned nothing usable
    #[error("Failed to look up channel '{query}': {reason}")]
    ChannelLookup { query: String, reason: String },

    /// The channel does not exist
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// HTTP 401/403 from the provider
    #[error("YouTube API key is invalid or the quota has been exceeded: {0}")]
    QuotaOrAuth(String),

    /// Generic provider failure with the operation that failed
    #[error("Failed to {context}: {message}")]
    Provider { context: String, message: String },

    /// Failure while collecting the recent video sample
    #[error("Failed to {context}: {source}")]
    Processing {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a provider error for the given operation
    pub fn provider(context: impl Into<String>, message: impl ToString) -> Self {
        Error::Provider {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Wraps an error raised while collecting the video sample
    pub fn processing(context: impl Into<String>, source: Error) -> Self {
        Error::Processing {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidChannelUrl(_) => ErrorKind::InvalidChannelUrl,
            Error::ChannelLookup { .. } => ErrorKind::ChannelLookup,
            Error::ChannelNotFound(_) => ErrorKind::ChannelNotFound,
            Error::QuotaOrAuth(_) => ErrorKind::QuotaOrAuth,
            Error::Provider { .. } => ErrorKind::Provider,
            Error::Processing { .. } => ErrorKind::Processing,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}
