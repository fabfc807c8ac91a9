//! Shared error types for identifier parsing and policy collaborators
//!
//! Every boundary where raw policy strings enter the system converts them
//! into tagged types; failures surface here instead of being skipped.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A namespaced identifier could not be parsed
    #[error("Invalid {kind} identifier '{value}': {reason}")]
    InvalidIdentifier {
        /// What was being parsed (role, domain, user, ...)
        kind: &'static str,
        /// The raw input
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// A raw policy row does not have the expected shape
    #[error("Invalid policy rule: {0}")]
    InvalidRule(String),

    /// The external policy engine failed
    #[error("Policy engine error: {0}")]
    Engine(String),
}

impl CoreError {
    /// Create an identifier error
    pub fn invalid_identifier(
        kind: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CoreError::InvalidIdentifier {
            kind,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a rule shape error
    pub fn invalid_rule<S: Into<String>>(msg: S) -> Self {
        CoreError::InvalidRule(msg.into())
    }

    /// Create a policy engine error
    pub fn engine<S: Into<String>>(msg: S) -> Self {
        CoreError::Engine(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let err = CoreError::engine("adapter offline");
        assert!(matches!(err, CoreError::Engine(_)));

        let err = CoreError::invalid_rule("too few fields");
        assert!(matches!(err, CoreError::InvalidRule(_)));
    }

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_identifier("role", "role:admin", "missing level");
        assert_eq!(
            err.to_string(),
            "Invalid role identifier 'role:admin': missing level"
        );

        let err = CoreError::engine("connection refused");
        assert_eq!(err.to_string(), "Policy engine error: connection refused");
    }
}
