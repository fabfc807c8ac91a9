//! Policy rows as returned by the external policy engine

use super::ident::{CanonicalAction, CanonicalObject, Domain, QualifiedRole, Subject};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Grant the action
    Allow,
    /// Explicitly withhold the action
    Deny,
}

impl Effect {
    /// Whether this effect grants access
    pub fn is_allow(self) -> bool {
        matches!(self, Effect::Allow)
    }
}

impl FromStr for Effect {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Effect::Allow),
            "deny" => Ok(Effect::Deny),
            _ => Err(CoreError::invalid_identifier(
                "effect",
                s,
                "expected 'allow' or 'deny'",
            )),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Allow => f.write_str("allow"),
            Effect::Deny => f.write_str("deny"),
        }
    }
}

/// A single granted rule: (subject, domain, object, action, effect)
///
/// The action may be an alias token; it is expanded during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyTuple {
    pub subject: Subject,
    pub domain: Domain,
    pub object: CanonicalObject,
    pub action: CanonicalAction,
    pub effect: Effect,
}

impl PolicyTuple {
    /// Create a tuple from already parsed parts
    pub fn new(
        subject: impl Into<Subject>,
        domain: Domain,
        object: CanonicalObject,
        action: CanonicalAction,
        effect: Effect,
    ) -> Self {
        Self {
            subject: subject.into(),
            domain,
            object,
            action,
            effect,
        }
    }

    /// Parse a positional row `[sub, dom, obj, act, eft]`
    ///
    /// A row without the effect column grants (`allow`). Surrounding
    /// whitespace on each field is ignored.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self> {
        if fields.len() < 4 || fields.len() > 5 {
            return Err(CoreError::invalid_rule(format!(
                "expected 4 or 5 fields, got {}",
                fields.len()
            )));
        }
        let field = |i: usize| fields[i].as_ref().trim();

        let effect = if fields.len() == 5 {
            field(4).parse::<Effect>()?
        } else {
            Effect::Allow
        };

        Ok(Self {
            subject: Subject::parse(field(0))?,
            domain: Domain::parse(field(1))?,
            object: CanonicalObject::parse(field(2))?,
            action: CanonicalAction::parse(field(3))?,
            effect,
        })
    }

    /// Role subject, if any
    pub fn role(&self) -> Option<&QualifiedRole> {
        self.subject.as_role()
    }
}

impl fmt::Display for PolicyTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.subject,
            self.domain,
            self.object.qualified(),
            self.action.qualified(),
            self.effect
        )
    }
}

/// Role membership row: `member` holds `role` within `domain`
///
/// The member is a user, or a role inheriting another role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupingRule {
    pub member: Subject,
    pub role: QualifiedRole,
    pub domain: Domain,
}

impl GroupingRule {
    /// Create a grouping rule
    pub fn new(member: impl Into<Subject>, role: QualifiedRole, domain: Domain) -> Self {
        Self {
            member: member.into(),
            role,
            domain,
        }
    }

    /// Parse a positional row `[member, role, dom]`
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self> {
        if fields.len() != 3 {
            return Err(CoreError::invalid_rule(format!(
                "grouping rule expects 3 fields, got {}",
                fields.len()
            )));
        }
        Ok(Self {
            member: Subject::parse(fields[0].as_ref().trim())?,
            role: QualifiedRole::parse(fields[1].as_ref().trim())?,
            domain: Domain::parse(fields[2].as_ref().trim())?,
        })
    }
}
