use std::io;
use thiserror::Error;

/// Custom error types for MTC sync
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Message error: {0}")]
    Message(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Receiver closed: {0}")]
    ReceiverClosed(String),

    #[error("Receiver busy: {0}")]
    ReceiverBusy(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new message error
    pub fn message(msg: impl Into<String>) -> Self {
        Error::Message(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Creates a new receiver closed error
    pub fn receiver_closed(msg: impl Into<String>) -> Self {
        Error::ReceiverClosed(msg.into())
    }

    /// Creates a new receiver busy error
    pub fn receiver_busy(msg: impl Into<String>) -> Self {
        Error::ReceiverBusy(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::message("truncated sysex");
        assert!(matches!(err, Error::Message(_)));
        assert_eq!(err.to_string(), "Message error: truncated sysex");

        let err = Error::config("unknown frame rate");
        assert_eq!(err.to_string(), "Configuration error: unknown frame rate");

        let err = Error::receiver_busy("256 messages pending");
        assert!(matches!(err, Error::ReceiverBusy(_)));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::Other, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
