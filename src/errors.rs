//! Shrinkgen Error Handling
//!
//! Every failure the generator core can report is a variant of [`GeneratorError`].
//! Shrink and expand never fail: a value the generator cannot account for falls
//! back to a constant generator instead of an error.

use miette::Diagnostic;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = GeneratorError> = std::result::Result<T, E>;

// ============================================================================
// ERROR TYPE
// ============================================================================

/// All errors raised by generator construction, iteration and generation.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("invalid argument to {operation}: {reason}")]
    #[diagnostic(
        code(shrinkgen::invalid_argument),
        help("check the arguments passed to the named operation")
    )]
    InvalidArgument { operation: String, reason: String },

    #[error("unique generator found {found} of {requested} distinct values after {attempts} draws")]
    #[diagnostic(
        code(shrinkgen::exhausted_domain),
        help("the base generator cannot produce enough distinct values; lower the count or widen the base domain")
    )]
    ExhaustedDomain {
        requested: usize,
        found: usize,
        attempts: usize,
    },

    #[error("configuration error: {message}")]
    #[diagnostic(code(shrinkgen::config))]
    Config { message: String },
}

/// Coarse classification of [`GeneratorError`], handy for test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    ExhaustedDomain,
    Config,
}

impl GeneratorError {
    pub fn invalid_argument(operation: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::ExhaustedDomain { .. } => ErrorKind::ExhaustedDomain,
            Self::Config { .. } => ErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = GeneratorError::invalid_argument("take", "count must be positive");
        assert_eq!(
            err.to_string(),
            "invalid argument to take: count must be positive"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_exhausted_domain_has_diagnostic_code() {
        let err = GeneratorError::ExhaustedDomain {
            requested: 5,
            found: 2,
            attempts: 250,
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("shrinkgen::exhausted_domain"));
        assert!(err.to_string().contains("2 of 5"));
    }
}
