//! Error types for the surveillance pipeline

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration, raised before any simulation runs
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// IO error while writing a report artifact
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Chart encoding or saving failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// Check if the error came from writing output
    pub fn is_output(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Image(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = Error::config("window size must be at least 1");
        assert!(err.is_configuration());
        assert!(!err.is_output());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: window size must be at least 1"
        );
    }

    #[test]
    fn test_io_error_is_distinct() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(err.is_output());
        assert!(!err.is_configuration());
    }
}
