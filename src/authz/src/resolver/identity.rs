//! Identity-scoped resolution
//!
//! Two paths produce a user's matrix:
//!
//! - [`MatrixResolver::resolve_user`] collects the roles the user holds,
//!   directly or inherited, and merges each role's matrix over a tuple
//!   snapshot.
//! - [`MatrixResolver::resolve_user_implicit`] asks the engine for the
//!   already flattened grants and resolves them in one pass.
//!
//! For the same underlying policy both return the same matrix.

use super::{group_by_subject, MatrixResolver};
use crate::error::{AuthzError, Result};
use crate::matrix::PermissionMatrix;
use rolematrix_core::{Domain, PolicyEngine, PolicyTuple, QualifiedRole, Subject, User, UserId};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

impl MatrixResolver {
    /// Whether `user` holds the root role in the top-level domain
    ///
    /// A direct root membership counts without asking the engine.
    pub fn holds_root(&self, engine: &dyn PolicyEngine, user: &User) -> Result<bool> {
        let direct = user
            .memberships
            .iter()
            .any(|m| self.root.matches(&m.role, &m.domain));
        if direct {
            return Ok(true);
        }
        self.engine_holds_root(engine, &user.id)
    }

    fn engine_holds_root(&self, engine: &dyn PolicyEngine, user: &UserId) -> Result<bool> {
        let subject = Subject::User(user.clone());
        engine
            .has_role(&subject, &self.root.role, &self.root.domain)
            .map_err(|e| AuthzError::upstream("has_role", user, &self.root.domain, e))
    }

    /// Resolve a user's matrix in `domain` by merging their roles
    ///
    /// Every role the user holds in `domain` is resolved with
    /// [`resolve_role`](Self::resolve_role) and OR-merged, together with any
    /// grants made to the user directly. Held roles are the user's
    /// memberships plus every role with grants in `domain` that the engine
    /// reports the user inherits. A deny in one role never retracts an allow
    /// from another.
    pub fn resolve_user(
        &self,
        engine: &dyn PolicyEngine,
        user: &User,
        domain: &Domain,
        tuples: &[PolicyTuple],
    ) -> Result<PermissionMatrix> {
        if self.holds_root(engine, user)? {
            info!(user = %user.id, domain = %domain, "Root user bypass");
            return Ok(self.all_allow());
        }

        let matrix = self.merge_memberships(engine, user, domain, tuples)?;
        debug!(
            user = %user.id,
            domain = %domain,
            allowed = matrix.allowed_count(),
            "Resolved user matrix"
        );
        Ok(matrix)
    }

    /// Resolve a user's matrix from the engine's hierarchy-resolved grants
    ///
    /// Grants are grouped by the subject that carries them and each group is
    /// resolved like a role before merging, so within-role denies behave the
    /// same as in [`resolve_user`](Self::resolve_user).
    pub fn resolve_user_implicit(
        &self,
        engine: &dyn PolicyEngine,
        user: &UserId,
        domain: &Domain,
    ) -> Result<PermissionMatrix> {
        if self.engine_holds_root(engine, user)? {
            info!(user = %user, domain = %domain, "Root user bypass");
            return Ok(self.all_allow());
        }

        let subject = Subject::User(user.clone());
        let implicit = engine
            .implicit_permissions_for_user(&subject, domain)
            .map_err(|e| AuthzError::upstream("implicit_permissions_for_user", user, domain, e))?;

        let foreign = implicit.iter().filter(|t| &t.domain != domain).count();
        if foreign > 0 {
            warn!(
                user = %user,
                domain = %domain,
                dropped = foreign,
                "Engine returned grants from other domains"
            );
        }

        let mut acc = self.empty_matrix();
        for (carrier, group) in group_by_subject(&implicit, domain) {
            let matrix = match carrier {
                Subject::Role(role) => self.resolve_role_rows(role, domain, group)?,
                Subject::User(_) => self.apply_tuples(carrier, domain, group)?,
            };
            acc.merge_or_assign(&matrix)?;
        }

        debug!(
            user = %user,
            domain = %domain,
            grants = implicit.len() - foreign,
            allowed = acc.allowed_count(),
            "Resolved implicit user matrix"
        );
        Ok(acc)
    }

    /// Resolve a user's matrix across every domain they participate in
    pub fn resolve_user_all_domains(
        &self,
        engine: &dyn PolicyEngine,
        user: &User,
        tuples: &[PolicyTuple],
    ) -> Result<PermissionMatrix> {
        if self.holds_root(engine, user)? {
            info!(user = %user.id, "Root user bypass");
            return Ok(self.all_allow());
        }

        let mut acc = self.empty_matrix();
        for domain in user.domains() {
            acc.merge_or_assign(&self.merge_memberships(engine, user, domain, tuples)?)?;
        }
        Ok(acc)
    }

    // Only roles carrying grants in `domain` can change the merge, so those
    // are the only inheritance candidates put to the engine.
    fn held_roles<'a>(
        &self,
        engine: &dyn PolicyEngine,
        user: &'a User,
        domain: &'a Domain,
        tuples: &'a [PolicyTuple],
    ) -> Result<BTreeSet<&'a QualifiedRole>> {
        let mut held: BTreeSet<&QualifiedRole> = user.roles_in(domain).collect();
        let candidates: BTreeSet<&QualifiedRole> = tuples
            .iter()
            .filter(|t| &t.domain == domain)
            .filter_map(PolicyTuple::role)
            .filter(|role| !held.contains(role))
            .collect();

        let subject = Subject::User(user.id.clone());
        for role in candidates {
            let inherited = engine
                .has_role(&subject, role, domain)
                .map_err(|e| AuthzError::upstream("has_role", &user.id, domain, e))?;
            if inherited {
                held.insert(role);
            }
        }
        Ok(held)
    }

    fn merge_memberships(
        &self,
        engine: &dyn PolicyEngine,
        user: &User,
        domain: &Domain,
        tuples: &[PolicyTuple],
    ) -> Result<PermissionMatrix> {
        let mut acc = self.empty_matrix();
        for role in self.held_roles(engine, user, domain, tuples)? {
            acc.merge_or_assign(&self.resolve_role(role, domain, tuples)?)?;
        }

        let subject = Subject::User(user.id.clone());
        let direct = tuples
            .iter()
            .filter(|t| t.subject == subject && &t.domain == domain);
        acc.merge_or_assign(&self.apply_tuples(&user.id, domain, direct)?)?;

        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatrixConfig;
    use crate::memory::{InMemoryPolicyEngine, PolicySnapshot};
    use rolematrix_core::{GroupingRule, QualifiedRole};

    fn resolver() -> MatrixResolver {
        MatrixResolver::from_config(&MatrixConfig::default()).unwrap()
    }

    fn tuple(fields: &[&str]) -> PolicyTuple {
        PolicyTuple::from_fields(fields).unwrap()
    }

    fn grouping(fields: &[&str]) -> GroupingRule {
        GroupingRule::from_fields(fields).unwrap()
    }

    fn role(s: &str) -> QualifiedRole {
        QualifiedRole::parse(s).unwrap()
    }

    fn dom(s: &str) -> Domain {
        Domain::parse(s).unwrap()
    }

    fn user(id: &str, memberships: &[(&str, &str)]) -> User {
        memberships
            .iter()
            .fold(User::new(UserId::parse(id).unwrap()), |u, (r, d)| {
                u.with_membership(role(r), dom(d))
            })
    }

    fn engine(tuples: Vec<PolicyTuple>, groupings: Vec<GroupingRule>) -> InMemoryPolicyEngine {
        InMemoryPolicyEngine::new(PolicySnapshot::new(tuples, groupings))
    }

    #[test]
    fn test_roles_merge_with_or() {
        let resolver = resolver();
        let tuples = vec![
            tuple(&["role:writer:2", "dom:marketing", "news", "create"]),
            tuple(&["role:writer:2", "dom:marketing", "account", "read", "deny"]),
            tuple(&["role:viewer:3", "dom:marketing", "account", "read"]),
        ];
        let ian = user(
            "user:ian",
            &[("role:writer:2", "dom:marketing"), ("role:viewer:3", "dom:marketing")],
        );
        let engine = engine(tuples.clone(), vec![]);

        let matrix = resolver
            .resolve_user(&engine, &ian, &dom("dom:marketing"), &tuples)
            .unwrap();

        assert_eq!(matrix.allowed("news", "create"), Some(true));
        assert_eq!(matrix.allowed("news", "create_limited"), Some(true));
        // the viewer allow survives the writer deny
        assert_eq!(matrix.allowed("account", "read"), Some(true));
        assert_eq!(matrix.allowed_count(), 3);
    }

    #[test]
    fn test_memberships_in_other_domains_ignored() {
        let resolver = resolver();
        let tuples = vec![tuple(&["role:admin:1", "dom:sales", "news", "all"])];
        let ian = user("user:ian", &[("role:admin:1", "dom:sales")]);
        let engine = engine(tuples.clone(), vec![]);

        let matrix = resolver
            .resolve_user(&engine, &ian, &dom("dom:marketing"), &tuples)
            .unwrap();
        assert!(matrix.is_all_deny());
    }

    #[test]
    fn test_direct_user_grants_merged() {
        let resolver = resolver();
        let tuples = vec![tuple(&["user:ian", "dom:marketing", "period", "update"])];
        let ian = user("user:ian", &[]);
        let engine = engine(tuples.clone(), vec![]);

        let matrix = resolver
            .resolve_user(&engine, &ian, &dom("dom:marketing"), &tuples)
            .unwrap();
        assert_eq!(matrix.allowed("period", "update"), Some(true));
        assert_eq!(matrix.allowed("period", "update_limited"), Some(true));
        assert_eq!(matrix.allowed_count(), 2);
    }

    #[test]
    fn test_transitive_root_bypasses() {
        let resolver = resolver();
        // ian is an operator, operators inherit root in the top-level domain
        let engine = engine(
            vec![],
            vec![
                grouping(&["user:ian", "role:operator:1", "dom:Company"]),
                grouping(&["role:operator:1", "role:root:0", "dom:Company"]),
            ],
        );
        let ian = user("user:ian", &[("role:operator:1", "dom:Company")]);

        let a = resolver
            .resolve_user(&engine, &ian, &dom("dom:marketing"), &[])
            .unwrap();
        let b = resolver
            .resolve_user_implicit(&engine, &ian.id, &dom("dom:marketing"))
            .unwrap();
        assert!(a.is_all_allow());
        assert!(b.is_all_allow());
    }

    #[test]
    fn test_paths_agree() {
        let resolver = resolver();
        let tuples = vec![
            tuple(&["role:admin:1", "dom:marketing", "news", "all"]),
            tuple(&["role:admin:1", "dom:marketing", "news", "delete", "deny"]),
            tuple(&["role:guest:4", "dom:marketing", "news", "delete_limited"]),
            tuple(&["role:guest:4", "dom:sales", "account", "all"]),
            tuple(&["user:ian", "dom:marketing", "exhibition", "all_limited"]),
        ];
        let groupings = vec![
            grouping(&["user:ian", "role:admin:1", "dom:marketing"]),
            grouping(&["user:ian", "role:guest:4", "dom:marketing"]),
        ];
        let ian = user(
            "user:ian",
            &[("role:admin:1", "dom:marketing"), ("role:guest:4", "dom:marketing")],
        );
        let engine = engine(tuples.clone(), groupings);
        let marketing = dom("dom:marketing");

        let a = resolver.resolve_user(&engine, &ian, &marketing, &tuples).unwrap();
        let b = resolver
            .resolve_user_implicit(&engine, &ian.id, &marketing)
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(a.allowed("news", "delete"), Some(false));
        assert_eq!(a.allowed("news", "delete_limited"), Some(true));
        assert_eq!(a.allowed("exhibition", "read"), Some(true));
        assert_eq!(a.allowed("account", "read"), Some(false));
    }

    #[test]
    fn test_inherited_roles_merged() {
        let resolver = resolver();
        let tuples = vec![tuple(&["role:editor:2", "dom:marketing", "account", "update"])];
        // ian is an admin, admins inherit editor in marketing
        let engine = engine(
            tuples.clone(),
            vec![
                grouping(&["user:ian", "role:admin:1", "dom:marketing"]),
                grouping(&["role:admin:1", "role:editor:2", "dom:marketing"]),
            ],
        );
        let ian = user("user:ian", &[("role:admin:1", "dom:marketing")]);
        let marketing = dom("dom:marketing");

        let a = resolver.resolve_user(&engine, &ian, &marketing, &tuples).unwrap();
        let b = resolver
            .resolve_user_implicit(&engine, &ian.id, &marketing)
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(a.allowed("account", "update"), Some(true));
        assert_eq!(a.allowed("account", "update_limited"), Some(true));
        assert_eq!(a.allowed_count(), 2);
    }

    #[test]
    fn test_root_membership_requires_exact_names() {
        let resolver = resolver();
        // differs from the root identity only by case
        let ian = user("user:ian", &[("role:Root:0", "dom:company")]);
        let engine = engine(vec![], vec![grouping(&["user:ian", "role:Root:0", "dom:company"])]);

        assert!(!resolver.holds_root(&engine, &ian).unwrap());
        for domain in ["dom:marketing", "dom:company"] {
            let domain = dom(domain);
            let a = resolver.resolve_user(&engine, &ian, &domain, &[]).unwrap();
            let b = resolver
                .resolve_user_implicit(&engine, &ian.id, &domain)
                .unwrap();
            assert!(a.is_all_deny());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_all_domains_merge() {
        let resolver = resolver();
        let tuples = vec![
            tuple(&["role:admin:1", "dom:marketing", "news", "read"]),
            tuple(&["role:admin:1", "dom:sales", "account", "read"]),
        ];
        let ian = user(
            "user:ian",
            &[("role:admin:1", "dom:marketing"), ("role:admin:1", "dom:sales")],
        );
        let engine = engine(tuples.clone(), vec![]);

        let matrix = resolver
            .resolve_user_all_domains(&engine, &ian, &tuples)
            .unwrap();
        assert_eq!(matrix.allowed("news", "read"), Some(true));
        assert_eq!(matrix.allowed("account", "read"), Some(true));
        assert_eq!(matrix.allowed_count(), 2);
    }
}
