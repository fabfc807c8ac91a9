//! # rolematrix core
//!
//! Tagged identifiers, policy rows, identity types and the policy engine
//! trait shared by the matrix resolution crates. Raw namespaced strings are
//! parsed here once; nothing downstream inspects string prefixes.

pub mod types;
pub mod traits;
pub mod error;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use traits::PolicyEngine;
pub use types::{
    CanonicalAction, CanonicalObject, Division, DivisionRole, DivisionType, Domain, Effect,
    GroupingRule, Membership, PolicyTuple, QualifiedRole, Subject, User, UserId,
};
