//! Error types for the tax calculator.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while discovering jurisdictions,
//! composing requests, and talking to the upstream calculation engine.

use thiserror::Error;

/// The main error type for the tax calculator.
///
/// All operations in the crate return this error type. It is `Clone` so a
/// request builder can hand back the error it captured without giving up
/// its accumulated state.
///
/// # Example
///
/// ```
/// use taxcalc::error::TaxError;
///
/// let error = TaxError::UnknownJurisdiction {
///     code: "ZZ".to_string(),
/// };
/// assert_eq!(error.to_string(), "no jurisdiction found for code: ZZ");
/// assert!(error.is_validation());
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaxError {
    /// An input to the request builder was invalid.
    #[error("{message}")]
    Validation {
        /// A description of what made the input invalid.
        message: String,
    },

    /// A jurisdiction code could not be resolved against the directory.
    #[error("no jurisdiction found for code: {code}")]
    UnknownJurisdiction {
        /// The code that was not found.
        code: String,
    },

    /// Jurisdiction discovery failed.
    #[error("jurisdiction discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// The upstream engine could not be reached or answered with a non-success status.
    #[error("{message}")]
    Transport {
        /// A description of the transport failure.
        message: String,
    },

    /// The upstream engine answered with a body that could not be decoded.
    #[error("failed to decode upstream response: {message}")]
    Decode {
        /// A description of the decode failure.
        message: String,
    },

    /// Waiting on the rate limiter was canceled.
    #[error("failed to wait for rate limit: {message}")]
    RateLimit {
        /// A description of why the wait ended.
        message: String,
    },

    /// Inbound request parameters were missing or malformed.
    #[error("{message}")]
    InvalidParams {
        /// A description of the parameter problem.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value was out of range.
    #[error("Invalid configuration field '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// The HTTP server could not bind or stopped with an I/O error.
    #[error("server error: {message}")]
    Server {
        /// A description of the I/O failure.
        message: String,
    },
}

impl TaxError {
    /// Creates a validation error from a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns true for errors caused by caller input rather than by the
    /// environment (network, upstream, discovery, shutdown).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::UnknownJurisdiction { .. } | Self::InvalidParams { .. }
        )
    }
}

/// Failures of the two-stage jurisdiction discovery protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// The loader script could not be fetched.
    #[error("loader unreachable at {url}: {message}")]
    LoaderUnreachable {
        /// The loader URL.
        url: String,
        /// A description of the failure.
        message: String,
    },

    /// The versioned bundle could not be fetched.
    #[error("bundle unreachable at {url}: {message}")]
    BundleUnreachable {
        /// The bundle URL.
        url: String,
        /// A description of the failure.
        message: String,
    },

    /// The loader did not carry a usable version for the calculator component.
    #[error("version not found in loader: {message}")]
    VersionNotFound {
        /// A description of what was missing.
        message: String,
    },

    /// An expected pattern did not occur in a fetched script.
    #[error("could not find {what} in script")]
    PatternNotFound {
        /// What the pattern was supposed to locate.
        what: String,
    },

    /// The embedded federal object could not be repaired into valid JSON.
    #[error("malformed federal jurisdiction object: {message}")]
    MalformedFederal {
        /// The JSON decode error.
        message: String,
    },

    /// The discovery task ended without producing an outcome.
    #[error("jurisdiction discovery interrupted: {message}")]
    Interrupted {
        /// Why the task ended.
        message: String,
    },
}

/// A type alias for Results that return TaxError.
pub type TaxResult<T> = Result<T, TaxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_jurisdiction_displays_code() {
        let error = TaxError::UnknownJurisdiction {
            code: "ZZ".to_string(),
        };
        assert_eq!(error.to_string(), "no jurisdiction found for code: ZZ");
    }

    #[test]
    fn test_validation_displays_message_verbatim() {
        let error = TaxError::validation("salary amount must be non-negative");
        assert_eq!(error.to_string(), "salary amount must be non-negative");
    }

    #[test]
    fn test_discovery_error_wraps_sub_kind() {
        let error: TaxError = DiscoveryError::PatternNotFound {
            what: "state jurisdictions".to_string(),
        }
        .into();
        assert_eq!(
            error.to_string(),
            "jurisdiction discovery failed: could not find state jurisdictions in script"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = TaxError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_is_validation_classifies_input_errors() {
        assert!(TaxError::validation("x").is_validation());
        assert!(
            TaxError::InvalidParams {
                message: "salary must be specified".to_string()
            }
            .is_validation()
        );
        assert!(
            !TaxError::Transport {
                message: "connection refused".to_string()
            }
            .is_validation()
        );
        assert!(
            !TaxError::RateLimit {
                message: "canceled".to_string()
            }
            .is_validation()
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<TaxError>();
        assert_error::<DiscoveryError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn discover() -> Result<(), DiscoveryError> {
            Err(DiscoveryError::VersionNotFound {
                message: "no pcc entry".to_string(),
            })
        }

        fn propagates_error() -> TaxResult<()> {
            discover()?;
            Ok(())
        }

        assert!(matches!(propagates_error(), Err(TaxError::Discovery(_))));
    }
}
