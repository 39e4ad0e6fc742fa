//! User-visible request errors
//!
//! Every failure a handler can produce is a structured value carrying a
//! message and the offending identifier; nothing is raised as a fault and
//! one failed request never affects others.

use thiserror::Error;

/// A structured endpoint failure, echoed back to the caller as JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The path identifier is missing or malformed.
    #[error("{message}")]
    InvalidInput { message: String, identifier: String },

    /// The identifier is not in the configured allow-list.
    #[error("{message}")]
    Forbidden { message: String, identifier: String },

    /// Zip-code-to-coordinate resolution failed.
    #[error("Latitude-longitude lookup unsuccessful.")]
    ResolutionFailed { identifier: String },

    /// The upstream reports the resource as absent.
    #[error("{message}")]
    NotFound { message: String, identifier: String },

    /// The upstream was unreachable or answered with garbage.
    #[error("Problem with upstream request: {message}")]
    Transport { message: String, identifier: String },
}

impl ApiError {
    /// Stable machine-readable code for the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput { .. } => "invalid_input",
            ApiError::Forbidden { .. } => "forbidden",
            ApiError::ResolutionFailed { .. } => "resolution_failed",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Transport { .. } => "transport_error",
        }
    }

    /// The identifier the failing request was about.
    pub fn identifier(&self) -> &str {
        match self {
            ApiError::InvalidInput { identifier, .. }
            | ApiError::Forbidden { identifier, .. }
            | ApiError::ResolutionFailed { identifier }
            | ApiError::NotFound { identifier, .. }
            | ApiError::Transport { identifier, .. } => identifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            ApiError::InvalidInput {
                message: "m".into(),
                identifier: "i".into(),
            },
            ApiError::Forbidden {
                message: "m".into(),
                identifier: "i".into(),
            },
            ApiError::ResolutionFailed { identifier: "i".into() },
            ApiError::NotFound {
                message: "m".into(),
                identifier: "i".into(),
            },
            ApiError::Transport {
                message: "m".into(),
                identifier: "i".into(),
            },
        ];
        for (i, a) in errors.iter().enumerate() {
            for (j, b) in errors.iter().enumerate() {
                assert_eq!(i == j, a.code() == b.code());
            }
        }
    }

    #[test]
    fn test_identifier_is_echoed() {
        let error = ApiError::NotFound {
            message: "Zone ID invalid.".into(),
            identifier: "TXZ999".into(),
        };
        assert_eq!(error.identifier(), "TXZ999");
    }
}
