//! In-memory reference policy engine
//!
//! Holds policy tuples and grouping rules in an immutable [`PolicySnapshot`].
//! [`InMemoryPolicyEngine::replace`] swaps the whole snapshot at once, so a
//! caller sees either the old or the new rule set, never a mix. Callers that
//! need several consistent reads pin one with [`InMemoryPolicyEngine::snapshot`].

use parking_lot::RwLock;
use rolematrix_core::{Domain, GroupingRule, PolicyEngine, PolicyTuple, QualifiedRole, Result, Subject};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::info;

/// Immutable policy state
#[derive(Debug, Clone, Default)]
pub struct PolicySnapshot {
    tuples: Vec<PolicyTuple>,
    groupings: Vec<GroupingRule>,
}

impl PolicySnapshot {
    pub fn new(tuples: Vec<PolicyTuple>, groupings: Vec<GroupingRule>) -> Self {
        Self { tuples, groupings }
    }

    pub fn tuples(&self) -> &[PolicyTuple] {
        &self.tuples
    }

    pub fn groupings(&self) -> &[GroupingRule] {
        &self.groupings
    }

    /// Roles `subject` holds in `domain`, directly or through other roles
    ///
    /// Breadth-first over the grouping rules of that domain. Cycles in the
    /// hierarchy are tolerated.
    pub fn roles_for(&self, subject: &Subject, domain: &Domain) -> Vec<QualifiedRole> {
        let mut roles = Vec::new();
        let mut visited: HashSet<Subject> = HashSet::new();
        let mut queue = VecDeque::from([subject.clone()]);
        visited.insert(subject.clone());

        while let Some(current) = queue.pop_front() {
            for rule in self
                .groupings
                .iter()
                .filter(|g| g.member == current && &g.domain == domain)
            {
                let next = Subject::Role(rule.role.clone());
                if visited.insert(next.clone()) {
                    roles.push(rule.role.clone());
                    queue.push_back(next);
                }
            }
        }

        roles
    }
}

impl PolicyEngine for PolicySnapshot {
    fn has_role(&self, subject: &Subject, role: &QualifiedRole, domain: &Domain) -> Result<bool> {
        Ok(self.roles_for(subject, domain).contains(role))
    }

    fn implicit_permissions_for_user(
        &self,
        subject: &Subject,
        domain: &Domain,
    ) -> Result<Vec<PolicyTuple>> {
        let mut carriers: HashSet<Subject> = self
            .roles_for(subject, domain)
            .into_iter()
            .map(Subject::Role)
            .collect();
        carriers.insert(subject.clone());

        Ok(self
            .tuples
            .iter()
            .filter(|t| &t.domain == domain && carriers.contains(&t.subject))
            .cloned()
            .collect())
    }

    fn filtered_policy(&self, subject: &Subject, domain: &Domain) -> Result<Vec<PolicyTuple>> {
        Ok(self
            .tuples
            .iter()
            .filter(|t| &t.subject == subject && &t.domain == domain)
            .cloned()
            .collect())
    }

    fn raw_policy(&self) -> Result<Vec<PolicyTuple>> {
        Ok(self.tuples.clone())
    }
}

/// Policy engine over a swappable snapshot
#[derive(Debug, Default)]
pub struct InMemoryPolicyEngine {
    current: RwLock<Arc<PolicySnapshot>>,
}

impl InMemoryPolicyEngine {
    pub fn new(snapshot: PolicySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Pin the current snapshot
    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        self.current.read().clone()
    }

    /// Atomically install a new snapshot, returning the previous one
    pub fn replace(&self, snapshot: PolicySnapshot) -> Arc<PolicySnapshot> {
        let tuples = snapshot.tuples.len();
        let groupings = snapshot.groupings.len();
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(snapshot));
        info!(tuples, groupings, "Policy snapshot replaced");
        previous
    }
}

impl PolicyEngine for InMemoryPolicyEngine {
    fn has_role(&self, subject: &Subject, role: &QualifiedRole, domain: &Domain) -> Result<bool> {
        self.snapshot().has_role(subject, role, domain)
    }

    fn implicit_permissions_for_user(
        &self,
        subject: &Subject,
        domain: &Domain,
    ) -> Result<Vec<PolicyTuple>> {
        self.snapshot().implicit_permissions_for_user(subject, domain)
    }

    fn filtered_policy(&self, subject: &Subject, domain: &Domain) -> Result<Vec<PolicyTuple>> {
        self.snapshot().filtered_policy(subject, domain)
    }

    fn raw_policy(&self) -> Result<Vec<PolicyTuple>> {
        self.snapshot().raw_policy()
    }
}
