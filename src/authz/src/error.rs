//! Error types for matrix resolution

use crate::matrix::{MemberKind, UniverseError};
use rolematrix_core::CoreError;
use thiserror::Error;

/// Matrix resolution errors
///
/// A failed resolution never degrades into a deny: callers either get a
/// complete matrix or one of these.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// A policy rule references an object or action outside the universe
    #[error("Unknown {kind} '{member}' in rule [{rule}] for {identity} in {domain}")]
    UnknownUniverseMember {
        kind: MemberKind,
        member: String,
        identity: String,
        domain: String,
        rule: String,
    },

    /// The external policy engine failed
    #[error("Upstream resolution failed: {operation}({identity}, {domain}): {source}")]
    Upstream {
        operation: &'static str,
        identity: String,
        domain: String,
        #[source]
        source: CoreError,
    },

    /// An alias is malformed or points at another alias
    #[error("Alias misconfiguration: {0}")]
    AliasMisconfiguration(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Matrix operation error
    #[error("Matrix error: {0}")]
    Universe(#[from] UniverseError),

    /// Identifier parsing error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthzError {
    /// Wrap a collaborator failure with the call that produced it
    pub fn upstream(
        operation: &'static str,
        identity: impl ToString,
        domain: impl ToString,
        source: CoreError,
    ) -> Self {
        AuthzError::Upstream {
            operation,
            identity: identity.to_string(),
            domain: domain.to_string(),
            source,
        }
    }
}

/// Result type for matrix resolution
pub type Result<T> = std::result::Result<T, AuthzError>;
