//! Error types module
//!
//! All failures surfaced by the editor, the invoker and the storage helpers are
//! unified under the `EditorError` enum. Every variant describes itself through
//! the `ErrorMetadata` trait so callers can decide whether to retry and how
//! loudly to log.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like a target size that does not apply
    Debug,
    /// Warning level - for recoverable issues like a failed remote call
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be handled by callers
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "REMOTE_EXECUTION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the caller
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorError {
    #[error("Failed to load image: {0}")]
    Load(String),

    #[error("Could not read image size: {0}")]
    Probe(String),

    #[error("Could not calculate resized image dimensions: {0}")]
    Dimension(String),

    #[error("Could not map path to storage key: {0}")]
    KeyMapping(String),

    #[error("Remote image processing failed: {message}")]
    RemoteExecution {
        message: String,
        filename: Option<String>,
    },

    #[error("Could not decode streamed image: {0}")]
    StreamDecode(String),

    #[error("Invalid quality {0}: must be between 0 and 100")]
    InvalidQuality(u32),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EditorError {
    /// Remote failure without an associated output file.
    pub fn remote(message: impl Into<String>) -> Self {
        EditorError::RemoteExecution {
            message: message.into(),
            filename: None,
        }
    }

    /// Attach the destination filename to a remote failure. Other variants are returned unchanged.
    pub fn with_filename(self, file: impl Into<String>) -> Self {
        match self {
            EditorError::RemoteExecution { message, .. } => EditorError::RemoteExecution {
                message,
                filename: Some(file.into()),
            },
            other => other,
        }
    }

    /// Get a short error type name for logging
    pub fn error_type(&self) -> &str {
        match self {
            EditorError::Load(_) => "Load",
            EditorError::Probe(_) => "Probe",
            EditorError::Dimension(_) => "Dimension",
            EditorError::KeyMapping(_) => "KeyMapping",
            EditorError::RemoteExecution { .. } => "RemoteExecution",
            EditorError::StreamDecode(_) => "StreamDecode",
            EditorError::InvalidQuality(_) => "InvalidQuality",
            EditorError::Config(_) => "Config",
        }
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        EditorError::remote(format!("Payload serialization error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn editor_error_static_metadata(
    err: &EditorError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        EditorError::Load(_) => (
            "LOAD_ERROR",
            false,
            Some("Verify the file exists, is a URL or lives in the configured bucket"),
            LogLevel::Debug,
        ),
        EditorError::Probe(_) => (
            "PROBE_ERROR",
            false,
            Some("Check image format and try a different file"),
            LogLevel::Warn,
        ),
        EditorError::Dimension(_) => (
            "DIMENSION_ERROR",
            false,
            Some("Request a size smaller than the original"),
            LogLevel::Debug,
        ),
        EditorError::KeyMapping(_) => (
            "KEY_MAPPING_ERROR",
            false,
            Some("Save inside the upload directory or the configured bucket"),
            LogLevel::Warn,
        ),
        EditorError::RemoteExecution { .. } => (
            "REMOTE_EXECUTION_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        EditorError::StreamDecode(_) => (
            "STREAM_DECODE_ERROR",
            true,
            Some("Retry the stream request"),
            LogLevel::Error,
        ),
        EditorError::InvalidQuality(_) => (
            "INVALID_QUALITY",
            false,
            Some("Use a quality between 0 and 100"),
            LogLevel::Debug,
        ),
        EditorError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Check the AWS_LAMBDA_IMAGE_* environment variables"),
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for EditorError {
    fn error_code(&self) -> &'static str {
        editor_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        editor_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        editor_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        editor_error_static_metadata(self).3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_remote_execution() {
        let err = EditorError::remote("function timed out");
        assert_eq!(err.error_code(), "REMOTE_EXECUTION_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Error);
        assert_eq!(
            err.to_string(),
            "Remote image processing failed: function timed out"
        );
    }

    #[test]
    fn test_error_metadata_dimension() {
        let err = EditorError::Dimension("no solution".to_string());
        assert_eq!(err.error_code(), "DIMENSION_ERROR");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Debug);
        assert_eq!(err.error_type(), "Dimension");
    }

    #[test]
    fn test_with_filename_only_touches_remote_errors() {
        let err = EditorError::remote("boom").with_filename("a-100x100.jpg");
        assert_eq!(
            err,
            EditorError::RemoteExecution {
                message: "boom".to_string(),
                filename: Some("a-100x100.jpg".to_string()),
            }
        );

        let err = EditorError::Load("missing".to_string()).with_filename("x.jpg");
        assert_eq!(err, EditorError::Load("missing".to_string()));
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        assert!(EditorError::Config("x".into()).suggested_action().is_some());
        assert!(EditorError::InvalidQuality(120)
            .suggested_action()
            .is_some());
    }
}
