//! Shared types for matrix resolution

pub mod ident;
pub mod identity;
pub mod policy;

// Re-export commonly used types
pub use ident::{CanonicalAction, CanonicalObject, Domain, QualifiedRole, Subject, UserId};
pub use identity::{Division, DivisionRole, DivisionType, Membership, User};
pub use policy::{Effect, GroupingRule, PolicyTuple};
