use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::http_client::HttpError;

/// Input validation errors. Never retried; surfaced as HTTP 400.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid {name}")]
    InvalidCoordinate { name: &'static str },
    #[error("BBox too large: area {area:.1} exceeds {max} square degrees")]
    BoundingBoxTooLarge { area: f64, max: f64 },
    #[error("icao24 is required")]
    MissingAircraftId,
    #[error("icao24 must be 1-6 hex characters: '{value}'")]
    InvalidAircraftId { value: String },
    #[error("callsign is required")]
    MissingCallsign,
}

/// Upstream error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// Dependency returned 5xx, could not be reached, or answered with an unusable payload.
    Unavailable,
    /// Dependency answered with a non-success, non-5xx status that is passed through.
    Rejected,
}

/// Structured upstream error carrying an HTTP-like status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    kind: UpstreamErrorKind,
    status: u16,
    message: String,
}

impl UpstreamError {
    pub const UNAVAILABLE_STATUS: u16 = 502;

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: UpstreamErrorKind::Unavailable,
            status: Self::UNAVAILABLE_STATUS,
            message: message.into(),
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: UpstreamErrorKind::Rejected,
            status,
            message: message.into(),
        }
    }

    /// Classifies a non-success upstream status: 5xx maps to unavailable (502),
    /// everything else is passed through verbatim.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        if status >= 500 {
            Self::unavailable(message)
        } else {
            Self::rejected(status, message)
        }
    }

    pub fn transport(upstream: &str, error: &HttpError) -> Self {
        Self::unavailable(format!("{upstream} transport error: {}", error.message()))
    }

    pub const fn kind(&self) -> UpstreamErrorKind {
        self.kind
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            UpstreamErrorKind::Unavailable => "upstream.unavailable",
            UpstreamErrorKind::Rejected => "upstream.rejected",
        }
    }
}

impl Display for UpstreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, status {})", self.message, self.code(), self.status)
    }
}

impl std::error::Error for UpstreamError {}

/// Route cache snapshot read/write failures. Logged, never fatal.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("route cache snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("route cache snapshot is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_collapse_to_unavailable() {
        let error = UpstreamError::from_status(503, "maintenance");
        assert_eq!(error.kind(), UpstreamErrorKind::Unavailable);
        assert_eq!(error.status(), 502);
        assert_eq!(error.code(), "upstream.unavailable");
    }

    #[test]
    fn client_errors_pass_through() {
        let error = UpstreamError::from_status(429, "slow down");
        assert_eq!(error.kind(), UpstreamErrorKind::Rejected);
        assert_eq!(error.status(), 429);
        assert_eq!(error.message(), "slow down");
    }
}
