//! Role-scoped resolution

use super::MatrixResolver;
use crate::error::{AuthzError, Result};
use crate::matrix::PermissionMatrix;
use rolematrix_core::{Domain, PolicyEngine, PolicyTuple, QualifiedRole, Subject};
use tracing::{debug, info};

impl MatrixResolver {
    /// Resolve one role's matrix in one domain
    ///
    /// Only tuples whose subject and domain equal `(role, domain)` are used;
    /// no hierarchy is climbed here. The root role in the top-level domain
    /// resolves to all-allow without looking at tuples.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::UnknownUniverseMember`] when a relevant tuple
    /// names an object or action outside the universe.
    pub fn resolve_role(
        &self,
        role: &QualifiedRole,
        domain: &Domain,
        tuples: &[PolicyTuple],
    ) -> Result<PermissionMatrix> {
        let relevant = tuples
            .iter()
            .filter(|t| t.role() == Some(role) && &t.domain == domain);
        self.resolve_role_rows(role, domain, relevant)
    }

    /// Resolve `role` from rows already narrowed to `(role, domain)`
    pub(crate) fn resolve_role_rows<'a, I>(
        &self,
        role: &QualifiedRole,
        domain: &Domain,
        rows: I,
    ) -> Result<PermissionMatrix>
    where
        I: IntoIterator<Item = &'a PolicyTuple>,
    {
        if self.root.matches(role, domain) {
            info!(role = %role, domain = %domain, "Root role bypass");
            return Ok(self.all_allow());
        }

        let matrix = self.apply_tuples(role, domain, rows)?;
        debug!(
            role = %role,
            domain = %domain,
            allowed = matrix.allowed_count(),
            "Resolved role matrix"
        );
        Ok(matrix)
    }

    /// Resolve a role using the engine's filtered policy
    pub fn resolve_role_from(
        &self,
        engine: &dyn PolicyEngine,
        role: &QualifiedRole,
        domain: &Domain,
    ) -> Result<PermissionMatrix> {
        if self.root.matches(role, domain) {
            return self.resolve_role(role, domain, &[]);
        }

        let subject = Subject::Role(role.clone());
        let tuples = engine
            .filtered_policy(&subject, domain)
            .map_err(|e| AuthzError::upstream("filtered_policy", role, domain, e))?;
        self.resolve_role(role, domain, &tuples)
    }
}
