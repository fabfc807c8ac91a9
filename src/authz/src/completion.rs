//! Domain completion map: every (domain, role) pair seen in policy, resolved

use crate::error::Result;
use crate::matrix::{PermissionMatrix, PermissionRecord};
use crate::resolver::MatrixResolver;
use rolematrix_core::{Domain, PolicyTuple, QualifiedRole, Subject};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::debug;

/// Resolved matrices keyed by domain, then role
///
/// Iteration is ordered by domain name, then by role level and name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainCompletion {
    domains: BTreeMap<Domain, BTreeMap<QualifiedRole, PermissionMatrix>>,
}

impl DomainCompletion {
    /// Matrix for `role` in `domain`, if the pair appeared in policy
    pub fn get(&self, domain: &Domain, role: &QualifiedRole) -> Option<&PermissionMatrix> {
        self.domains.get(domain)?.get(role)
    }

    /// Roles resolved for `domain`
    pub fn roles(&self, domain: &Domain) -> Option<&BTreeMap<QualifiedRole, PermissionMatrix>> {
        self.domains.get(domain)
    }

    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.domains.keys()
    }

    /// Number of domains
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Number of (domain, role) pairs
    pub fn role_count(&self) -> usize {
        self.domains.values().map(BTreeMap::len).sum()
    }

    /// Every (domain, role, matrix) triple in order
    pub fn iter(&self) -> impl Iterator<Item = (&Domain, &QualifiedRole, &PermissionMatrix)> {
        self.domains
            .iter()
            .flat_map(|(domain, roles)| roles.iter().map(move |(role, m)| (domain, role, m)))
    }

    /// Presentation form for bulk export
    pub fn to_export(&self) -> Vec<DomainExport> {
        self.domains
            .iter()
            .map(|(domain, roles)| DomainExport {
                domain: domain.to_string(),
                roles: roles
                    .iter()
                    .map(|(role, matrix)| RoleExport {
                        role: role.to_string(),
                        name: role.name().to_string(),
                        level: role.level(),
                        permissions: matrix.to_records(),
                    })
                    .collect(),
            })
            .collect()
    }
}

impl Serialize for DomainCompletion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_export().serialize(serializer)
    }
}

/// Exported domain with its resolved roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainExport {
    pub domain: String,
    pub roles: Vec<RoleExport>,
}

/// Exported role matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleExport {
    pub role: String,
    pub name: String,
    pub level: u32,
    pub permissions: Vec<PermissionRecord>,
}

impl MatrixResolver {
    /// Resolve every (domain, role) pair that appears in `tuples`
    ///
    /// Rows granted to users directly are not part of the map and are
    /// skipped. Any row naming an object or action outside the universe
    /// fails the whole completion.
    pub fn complete_all(&self, tuples: &[PolicyTuple]) -> Result<DomainCompletion> {
        let mut groups: BTreeMap<&Domain, BTreeMap<&QualifiedRole, Vec<&PolicyTuple>>> =
            BTreeMap::new();
        let mut skipped = 0usize;

        for tuple in tuples {
            match &tuple.subject {
                Subject::Role(role) => groups
                    .entry(&tuple.domain)
                    .or_default()
                    .entry(role)
                    .or_default()
                    .push(tuple),
                Subject::User(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(skipped, "Skipped user-subject rows in completion");
        }

        let mut domains = BTreeMap::new();
        for (domain, roles) in groups {
            let mut resolved = BTreeMap::new();
            for (role, group) in roles {
                let matrix = self.resolve_role_rows(role, domain, group)?;
                resolved.insert(role.clone(), matrix);
            }
            domains.insert(domain.clone(), resolved);
        }

        let completion = DomainCompletion { domains };
        debug!(
            domains = completion.len(),
            roles = completion.role_count(),
            "Completed domain map"
        );
        Ok(completion)
    }
}
