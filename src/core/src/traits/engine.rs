//! Interface to the external policy engine
//!
//! Storage and role-hierarchy inference live behind this trait. Calls are
//! synchronous and read-only from the caller's point of view; any locking or
//! transactions are the implementation's concern.

use crate::error::Result;
use crate::types::{Domain, PolicyTuple, QualifiedRole, Subject};

/// Policy engine collaborator
pub trait PolicyEngine: Send + Sync {
    /// Whether `subject` holds `role` in `domain`, directly or transitively
    fn has_role(&self, subject: &Subject, role: &QualifiedRole, domain: &Domain) -> Result<bool>;

    /// Hierarchy-resolved grants for `subject` in `domain`
    ///
    /// Returned tuples keep the subject that carries the grant (the subject
    /// itself or one of the roles it inherits).
    fn implicit_permissions_for_user(
        &self,
        subject: &Subject,
        domain: &Domain,
    ) -> Result<Vec<PolicyTuple>>;

    /// Raw grants whose subject and domain equal the given pair
    fn filtered_policy(&self, subject: &Subject, domain: &Domain) -> Result<Vec<PolicyTuple>>;

    /// The full rule set
    fn raw_policy(&self) -> Result<Vec<PolicyTuple>>;
}
