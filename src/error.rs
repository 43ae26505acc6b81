//! Error types shared by the detection engine and the interceptor.

use thiserror::Error;

/// Errors raised by the detection engine.
///
/// Protocol, method and route mismatches are not errors; they classify the
/// request as [`Classification::Pass`](crate::detection::Classification::Pass).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    /// A rule document field exists but is not an array of strings.
    #[error("malformed rule data: {0}")]
    MalformedRuleData(String),

    /// The detector was built with a contradictory or unusable setup.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Failure reported by a rendering backend.
#[derive(Debug, Error)]
#[error("backend error: {message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised while intercepting a request.
#[derive(Debug, Error)]
pub enum InterceptError {
    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
