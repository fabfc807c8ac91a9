//! Matrix resolution
//!
//! [`MatrixResolver`] bundles the static configuration (universe, aliases,
//! root identity) and turns sparse policy tuples into total matrices:
//!
//! ```text
//! tuples → alias expansion → per-role matrix → OR-merge per identity
//!                                  ↑
//!                  root role in top-level domain → all allow
//! ```
//!
//! Resolution is pure: every call reads the snapshot it is given and returns
//! a freshly built matrix. Nothing is cached between calls.

mod identity;
mod role;

use crate::alias::ActionAliases;
use crate::config::MatrixConfig;
use crate::error::{AuthzError, Result};
use crate::matrix::{PermissionMatrix, UniverseError};
use crate::universe::Universe;
use rolematrix_core::{Domain, PolicyTuple, QualifiedRole};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// The distinguished root role and the domain it is anchored in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootIdentity {
    pub role: QualifiedRole,
    pub domain: Domain,
}

impl RootIdentity {
    pub fn new(role: QualifiedRole, domain: Domain) -> Self {
        Self { role, domain }
    }

    /// Whether `role` in `domain` is the root identity
    ///
    /// Exact comparison, the same one the policy engine applies to `has_role`.
    pub fn matches(&self, role: &QualifiedRole, domain: &Domain) -> bool {
        &self.role == role && &self.domain == domain
    }
}

/// Resolves complete permission matrices from policy tuples
#[derive(Debug, Clone)]
pub struct MatrixResolver {
    universe: Arc<Universe>,
    aliases: Arc<ActionAliases>,
    root: RootIdentity,
}

impl MatrixResolver {
    /// Create a resolver from already validated parts
    pub fn new(universe: Arc<Universe>, aliases: ActionAliases, root: RootIdentity) -> Self {
        Self {
            universe,
            aliases: Arc::new(aliases),
            root,
        }
    }

    /// Validate a configuration and build a resolver from it
    ///
    /// All configuration errors (bad universes, malformed aliases, bad root
    /// identifiers) surface here, before any request is served.
    pub fn from_config(config: &MatrixConfig) -> Result<Self> {
        let universe = Arc::new(Universe::from_names(&config.objects, &config.actions)?);
        let aliases = ActionAliases::new(&config.aliases, &universe)?;
        let root = RootIdentity::new(
            QualifiedRole::parse(&config.root.role)?,
            Domain::parse(&config.root.domain)?,
        );

        info!(
            objects = universe.objects().len(),
            actions = universe.actions().len(),
            aliases = aliases.len(),
            root = %root.role,
            root_domain = %root.domain,
            "Matrix resolver initialized"
        );

        Ok(Self::new(universe, aliases, root))
    }

    pub fn universe(&self) -> &Arc<Universe> {
        &self.universe
    }

    pub fn aliases(&self) -> &ActionAliases {
        &self.aliases
    }

    pub fn root(&self) -> &RootIdentity {
        &self.root
    }

    /// All-deny matrix over this resolver's universe
    pub fn empty_matrix(&self) -> PermissionMatrix {
        self.universe.empty_matrix()
    }

    /// All-allow matrix over this resolver's universe
    pub fn all_allow(&self) -> PermissionMatrix {
        self.universe.all_allow()
    }

    /// Build one identity's matrix from the tuples that concern it
    ///
    /// Allows and denies are collected separately; within one identity an
    /// explicit deny wins over an allow for the same cell, whatever the
    /// tuple order.
    pub(crate) fn apply_tuples<'a, I>(
        &self,
        identity: &dyn fmt::Display,
        domain: &Domain,
        tuples: I,
    ) -> Result<PermissionMatrix>
    where
        I: IntoIterator<Item = &'a PolicyTuple>,
    {
        let mut granted = self.empty_matrix();
        let mut denied = self.empty_matrix();

        for tuple in tuples {
            let target = if tuple.effect.is_allow() {
                &mut granted
            } else {
                &mut denied
            };
            for action in self.aliases.expand(&tuple.action) {
                target
                    .set(&tuple.object, action, true)
                    .map_err(|e| rule_error(e, identity, domain, tuple))?;
            }
        }

        granted.clear_masked(&denied)?;
        Ok(granted)
    }
}

fn rule_error(
    err: UniverseError,
    identity: &dyn fmt::Display,
    domain: &Domain,
    tuple: &PolicyTuple,
) -> AuthzError {
    match err {
        UniverseError::UnknownMember { kind, member } => AuthzError::UnknownUniverseMember {
            kind,
            member,
            identity: identity.to_string(),
            domain: domain.to_string(),
            rule: tuple.to_string(),
        },
        other => AuthzError::Universe(other),
    }
}

/// Group tuples by subject, keeping only those in `domain`
fn group_by_subject<'a>(
    tuples: &'a [PolicyTuple],
    domain: &Domain,
) -> BTreeMap<&'a rolematrix_core::Subject, Vec<&'a PolicyTuple>> {
    let mut groups: BTreeMap<_, Vec<_>> = BTreeMap::new();
    for tuple in tuples.iter().filter(|t| &t.domain == domain) {
        groups.entry(&tuple.subject).or_default().push(tuple);
    }
    groups
}
