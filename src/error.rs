//! Error types and handling for `wxannounce`

use thiserror::Error;

/// Main error type for the weather announcement pipeline
#[derive(Error, Debug)]
pub enum WxError {
    /// Token shape fits more than one country; the pipeline continues with a best guess
    #[error("Ambiguous location '{token}': assuming country '{assumed_country}'")]
    ClassificationAmbiguous {
        token: String,
        assumed_country: String,
    },

    /// No coordinates or station data could be found for the token
    #[error("Could not resolve location '{token}': {message}")]
    ResolutionFailed { token: String, message: String },

    /// A single provider failed (transport, status or parse)
    #[error("{source_name} request failed: {message}")]
    SourceFetchFailed {
        source_name: String,
        message: String,
    },

    /// Display temperature outside the plausible range
    #[error("Temperature {value}°{unit} is outside the sane range [{min}, {max}]")]
    NormalizationOutOfRange {
        value: i64,
        unit: char,
        min: i32,
        max: i32,
    },

    /// Cache store cannot be used; caching is disabled for this run
    #[error("Cache unavailable: {message}")]
    CacheUnavailable { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WxError {
    /// Create a new resolution error
    pub fn resolution<T: Into<String>, S: Into<String>>(token: T, message: S) -> Self {
        Self::ResolutionFailed {
            token: token.into(),
            message: message.into(),
        }
    }

    /// Create a new provider fetch error
    pub fn fetch<N: Into<String>, S: Into<String>>(source_name: N, message: S) -> Self {
        Self::SourceFetchFailed {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::CacheUnavailable {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Process exit code for a terminal failure
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            WxError::ResolutionFailed { .. } => 2,
            WxError::SourceFetchFailed { .. } => 3,
            WxError::Config { .. } => 4,
            WxError::Io { .. } => 5,
            _ => 1,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WxError::ResolutionFailed { token, .. } => {
                format!("Could not resolve location '{token}'")
            }
            WxError::SourceFetchFailed { source_name, .. } => {
                format!("Unable to retrieve weather from {source_name}. Please check your internet connection.")
            }
            WxError::Config { message } => format!("Configuration error: {message}"),
            WxError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = WxError::resolution("K9Z 9Z9", "no geocoding result");
        assert!(matches!(err, WxError::ResolutionFailed { .. }));

        let err = WxError::fetch("open-meteo", "timeout");
        assert!(matches!(err, WxError::SourceFetchFailed { .. }));

        let err = WxError::config("bad unit");
        assert!(matches!(err, WxError::Config { .. }));
    }

    #[test]
    fn test_user_messages() {
        let err = WxError::resolution("99999", "exhausted");
        assert_eq!(err.user_message(), "Could not resolve location '99999'");
        assert_eq!(err.exit_code(), 2);

        let err = WxError::config("test");
        assert!(err.user_message().contains("Configuration error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WxError = io_err.into();
        assert!(matches!(err, WxError::Io { .. }));
        assert_eq!(err.exit_code(), 5);
    }
}
