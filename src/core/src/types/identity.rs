//! Users, divisions and their role memberships

use super::ident::{Domain, QualifiedRole, UserId};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Kind of organizational division
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivisionType {
    /// The top-level company
    Company,
    /// A regular division inside the company
    Division,
    /// External guests
    Guest,
}

/// Role definition inside a division
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionRole {
    pub name: String,
    pub level: u32,
}

impl DivisionRole {
    /// Create a division role
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }

    /// Policy subject for this role
    pub fn qualified(&self) -> Result<QualifiedRole> {
        QualifiedRole::new(self.name.clone(), self.level)
    }
}

/// Organizational division; its name is the policy domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub domain: Domain,
    #[serde(rename = "type")]
    pub kind: DivisionType,
    #[serde(default)]
    pub roles: Vec<DivisionRole>,
}

impl Division {
    /// Create a division without roles
    pub fn new(domain: Domain, kind: DivisionType) -> Self {
        Self {
            domain,
            kind,
            roles: Vec::new(),
        }
    }

    /// Add a role definition
    pub fn with_role(mut self, name: impl Into<String>, level: u32) -> Self {
        self.roles.push(DivisionRole::new(name, level));
        self
    }
}

/// A user's role within a domain
///
/// The domain is a key into the division catalogue; memberships never own
/// the division they point to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Membership {
    pub role: QualifiedRole,
    pub domain: Domain,
}

impl Membership {
    /// Create a membership
    pub fn new(role: QualifiedRole, domain: Domain) -> Self {
        Self { role, domain }
    }
}

/// User with their role memberships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

impl User {
    /// Create a user without memberships
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            memberships: Vec::new(),
        }
    }

    /// Add a membership
    pub fn with_membership(mut self, role: QualifiedRole, domain: Domain) -> Self {
        self.memberships.push(Membership::new(role, domain));
        self
    }

    /// Roles held directly in `domain`
    pub fn roles_in<'a>(&'a self, domain: &'a Domain) -> impl Iterator<Item = &'a QualifiedRole> + 'a {
        self.memberships
            .iter()
            .filter(move |m| &m.domain == domain)
            .map(|m| &m.role)
    }

    /// Distinct domains the user participates in, in membership order
    pub fn domains(&self) -> Vec<&Domain> {
        let mut domains: Vec<&Domain> = Vec::new();
        for membership in &self.memberships {
            if !domains.contains(&&membership.domain) {
                domains.push(&membership.domain);
            }
        }
        domains
    }
}
