//! Shared fixtures for the matrix integration tests

#![allow(dead_code)]

use rolematrix_authz::{InMemoryPolicyEngine, MatrixConfig, MatrixResolver, PolicySnapshot};
use rolematrix_core::{Domain, GroupingRule, PolicyTuple, QualifiedRole, User, UserId};

/// Two objects, three actions and a single `create` alias
pub const SMALL_CONFIG: &str = r#"
objects = ["news", "account"]
actions = ["read", "create", "create_limited"]

[aliases]
create = ["create", "create_limited"]
"#;

pub fn small_resolver() -> MatrixResolver {
    let config = MatrixConfig::from_toml_str(SMALL_CONFIG).unwrap();
    MatrixResolver::from_config(&config).unwrap()
}

pub fn default_resolver() -> MatrixResolver {
    MatrixResolver::from_config(&MatrixConfig::default()).unwrap()
}

pub fn tuple(fields: &[&str]) -> PolicyTuple {
    PolicyTuple::from_fields(fields).unwrap()
}

pub fn grouping(fields: &[&str]) -> GroupingRule {
    GroupingRule::from_fields(fields).unwrap()
}

pub fn role(s: &str) -> QualifiedRole {
    QualifiedRole::parse(s).unwrap()
}

pub fn dom(s: &str) -> Domain {
    Domain::parse(s).unwrap()
}

pub fn user(id: &str, memberships: &[(&str, &str)]) -> User {
    memberships
        .iter()
        .fold(User::new(UserId::parse(id).unwrap()), |u, (r, d)| {
            u.with_membership(role(r), dom(d))
        })
}

/// Engine whose grouping rules mirror the users' direct memberships
pub fn engine_for(tuples: &[PolicyTuple], users: &[User]) -> InMemoryPolicyEngine {
    engine_with(tuples, users, &[])
}

/// Like [`engine_for`], plus extra grouping rules (role inheritance)
pub fn engine_with(
    tuples: &[PolicyTuple],
    users: &[User],
    extra: &[GroupingRule],
) -> InMemoryPolicyEngine {
    let groupings = users
        .iter()
        .flat_map(|u| {
            u.memberships
                .iter()
                .map(move |m| GroupingRule::new(u.id.clone(), m.role.clone(), m.domain.clone()))
        })
        .chain(extra.iter().cloned())
        .collect();
    InMemoryPolicyEngine::new(PolicySnapshot::new(tuples.to_vec(), groupings))
}

/// Install a test subscriber once; `RUST_LOG` controls the output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
