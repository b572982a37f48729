//! Error types for the event manager.

use thiserror::Error;

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the event manager
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An event name or listener pattern failed validation
    #[error("Invalid event name '{name}': {reason}")]
    InvalidEventName {
        /// The offending name, as given
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// A listener failed while handling an event
    #[error("Handler error: {0}")]
    HandlerError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The task running an awaited publish went away without reporting
    #[error("Failed to receive from channel")]
    ChannelReceiveError,

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Create a new handler error
    pub fn handler(msg: impl Into<String>) -> Self {
        Error::HandlerError(msg.into())
    }

    pub(crate) fn invalid_name(name: impl Into<String>, reason: &'static str) -> Self {
        Error::InvalidEventName {
            name: name.into(),
            reason,
        }
    }

    /// Check if this error is a configuration error (bad name or pattern)
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::InvalidEventName { .. })
    }

    /// Check if this error was raised by a listener
    pub fn is_handler_error(&self) -> bool {
        matches!(self, Error::HandlerError(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::handler("boom");
        assert_eq!(err.to_string(), "Handler error: boom");

        let err = Error::invalid_name("++df", "must start with a letter");
        assert_eq!(
            err.to_string(),
            "Invalid event name '++df': must start with a letter"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::invalid_name("", "empty").is_config_error());
        assert!(!Error::handler("x").is_config_error());
        assert!(Error::handler("x").is_handler_error());
        assert!(!Error::internal("x").is_handler_error());
    }
}
