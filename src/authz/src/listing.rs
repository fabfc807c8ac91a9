//! User and division permission listings
//!
//! Each listing reads the engine's full rule set once and resolves every
//! entry against that same snapshot.

use crate::completion::DomainCompletion;
use crate::error::{AuthzError, Result};
use crate::matrix::{PermissionMatrix, PermissionRecord};
use crate::resolver::MatrixResolver;
use rolematrix_core::{
    Division, DivisionType, Domain, Membership, PolicyEngine, PolicyTuple, QualifiedRole, User,
    UserId,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A user with permissions merged across all their memberships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissions {
    pub user: UserId,
    pub memberships: Vec<Membership>,
    pub permissions: Vec<PermissionRecord>,
}

/// A division with the resolved permissions of each of its roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionPermissions {
    pub domain: Domain,
    #[serde(rename = "type")]
    pub kind: DivisionType,
    pub roles: Vec<RolePermissions>,
}

/// One role's resolved permissions within a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissions {
    pub role: QualifiedRole,
    pub domain: Domain,
    pub permissions: Vec<PermissionRecord>,
}

fn raw_policy(engine: &dyn PolicyEngine) -> Result<Vec<PolicyTuple>> {
    engine
        .raw_policy()
        .map_err(|e| AuthzError::upstream("raw_policy", "*", "*", e))
}

impl MatrixResolver {
    /// List users with their merged permissions
    pub fn list_users(&self, engine: &dyn PolicyEngine, users: &[User]) -> Result<Vec<UserPermissions>> {
        let tuples = raw_policy(engine)?;

        let listing = users
            .iter()
            .map(|user| -> Result<UserPermissions> {
                let matrix = self.resolve_user_all_domains(engine, user, &tuples)?;
                Ok(UserPermissions {
                    user: user.id.clone(),
                    memberships: user.memberships.clone(),
                    permissions: matrix.to_records(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(users = listing.len(), "Listed user permissions");
        Ok(listing)
    }

    /// List divisions with each role's permissions
    pub fn list_divisions(
        &self,
        engine: &dyn PolicyEngine,
        divisions: &[Division],
    ) -> Result<Vec<DivisionPermissions>> {
        let completion = self.complete_all(&raw_policy(engine)?)?;

        divisions
            .iter()
            .map(|division| -> Result<DivisionPermissions> {
                Ok(DivisionPermissions {
                    domain: division.domain.clone(),
                    kind: division.kind,
                    roles: self.division_roles(&completion, division)?,
                })
            })
            .collect()
    }

    /// Flat list of every division role with its permissions
    pub fn list_division_roles(
        &self,
        engine: &dyn PolicyEngine,
        divisions: &[Division],
    ) -> Result<Vec<RolePermissions>> {
        let completion = self.complete_all(&raw_policy(engine)?)?;

        let mut listing = Vec::new();
        for division in divisions {
            listing.extend(self.division_roles(&completion, division)?);
        }
        Ok(listing)
    }

    // Roles without any grant still list, fully denied (or all-allow for root)
    fn division_roles(
        &self,
        completion: &DomainCompletion,
        division: &Division,
    ) -> Result<Vec<RolePermissions>> {
        division
            .roles
            .iter()
            .map(|def| -> Result<RolePermissions> {
                let role = def.qualified()?;
                let matrix = match completion.get(&division.domain, &role) {
                    Some(matrix) => matrix.clone(),
                    None => self.resolve_role(&role, &division.domain, &[])?,
                };
                Ok(role_permissions(role, division.domain.clone(), &matrix))
            })
            .collect()
    }
}

fn role_permissions(role: QualifiedRole, domain: Domain, matrix: &PermissionMatrix) -> RolePermissions {
    RolePermissions {
        role,
        domain,
        permissions: matrix.to_records(),
    }
}
