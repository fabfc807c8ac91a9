//! Tagged identifiers parsed from namespaced policy strings
//!
//! Policy rows arrive as loosely namespaced strings (`role:admin:1`,
//! `dom:marketing`, `obj:news`, ...). They are parsed once at the boundary
//! into the types below so that resolution logic never inspects prefixes.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Prefix for user subjects
pub const USER_PREFIX: &str = "user:";
/// Prefix for role subjects
pub const ROLE_PREFIX: &str = "role:";
/// Prefix for domains
pub const DOMAIN_PREFIX: &str = "dom:";
/// Prefix for objects
pub const OBJECT_PREFIX: &str = "obj:";
/// Prefix for actions
pub const ACTION_PREFIX: &str = "act:";

fn validate_name(kind: &'static str, raw: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CoreError::invalid_identifier(kind, raw, "name cannot be empty"));
    }
    if name.contains(':') {
        return Err(CoreError::invalid_identifier(
            kind,
            raw,
            "name cannot contain ':'",
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(CoreError::invalid_identifier(
            kind,
            raw,
            "name cannot contain whitespace",
        ));
    }
    Ok(())
}

macro_rules! simple_name {
    (@display $ty:ident, $prefix:expr, prefixed) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
    (@display $ty:ident, $prefix:expr, bare) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
    ($(#[$meta:meta])* $ty:ident, $kind:literal, $prefix:expr, display = $mode:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $ty(String);

        impl $ty {
            /// Parse from a string, with or without the namespace prefix
            pub fn parse(raw: &str) -> Result<Self> {
                let name = raw.strip_prefix($prefix).unwrap_or(raw);
                validate_name($kind, raw, name)?;
                Ok(Self(name.to_string()))
            }

            /// Bare name without namespace prefix
            pub fn name(&self) -> &str {
                &self.0
            }

            /// Name with namespace prefix, as stored in policy rows
            pub fn qualified(&self) -> String {
                format!("{}{}", $prefix, self.0)
            }
        }

        simple_name!(@display $ty, $prefix, $mode);

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self> {
                Self::parse(&value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.to_string()
            }
        }
    };
}

simple_name!(
    /// Organizational scope (`dom:marketing`)
    Domain,
    "domain",
    DOMAIN_PREFIX,
    display = prefixed
);

simple_name!(
    /// User identity (`user:ian`)
    UserId,
    "user",
    USER_PREFIX,
    display = prefixed
);

simple_name!(
    /// Member of the object universe (`news`, `obj:news`)
    CanonicalObject,
    "object",
    OBJECT_PREFIX,
    display = bare
);

simple_name!(
    /// Member of the action universe, or a symbolic alias token (`create`, `act:all`)
    CanonicalAction,
    "action",
    ACTION_PREFIX,
    display = bare
);

/// Role name plus level (`role:admin:1`)
///
/// The level orders roles inside a division for presentation. It does not
/// imply shadowing: `role:admin:0` and `role:admin:1` are unrelated roles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedRole {
    name: String,
    level: u32,
}

impl QualifiedRole {
    /// Create a role from its parts
    pub fn new(name: impl Into<String>, level: u32) -> Result<Self> {
        let name = name.into();
        validate_name("role", &name, &name)?;
        Ok(Self { name, level })
    }

    /// Parse `role:<name>:<level>`
    pub fn parse(raw: &str) -> Result<Self> {
        let rest = raw.strip_prefix(ROLE_PREFIX).ok_or_else(|| {
            CoreError::invalid_identifier("role", raw, format!("missing '{}' prefix", ROLE_PREFIX))
        })?;
        let (name, level) = rest
            .rsplit_once(':')
            .ok_or_else(|| CoreError::invalid_identifier("role", raw, "missing level"))?;
        validate_name("role", raw, name)?;
        let level = level.parse::<u32>().map_err(|e| {
            CoreError::invalid_identifier("role", raw, format!("invalid level: {}", e))
        })?;

        Ok(Self {
            name: name.to_string(),
            level,
        })
    }

    /// Role name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Presentation level within a division
    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Ord for QualifiedRole {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level
            .cmp(&other.level)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for QualifiedRole {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for QualifiedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}", ROLE_PREFIX, self.name, self.level)
    }
}

impl FromStr for QualifiedRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for QualifiedRole {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<QualifiedRole> for String {
    fn from(value: QualifiedRole) -> Self {
        value.to_string()
    }
}

/// Policy subject: either a user or a qualified role
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Subject {
    /// A plain user
    User(UserId),
    /// A qualified role
    Role(QualifiedRole),
}

impl Subject {
    /// Parse `user:<name>` or `role:<name>:<level>`
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.starts_with(ROLE_PREFIX) {
            QualifiedRole::parse(raw).map(Subject::Role)
        } else if raw.starts_with(USER_PREFIX) {
            UserId::parse(raw).map(Subject::User)
        } else {
            Err(CoreError::invalid_identifier(
                "subject",
                raw,
                format!("expected '{}' or '{}' prefix", USER_PREFIX, ROLE_PREFIX),
            ))
        }
    }

    /// The role, if this subject is one
    pub fn as_role(&self) -> Option<&QualifiedRole> {
        match self {
            Subject::Role(role) => Some(role),
            Subject::User(_) => None,
        }
    }

    /// Whether this subject is a role
    pub fn is_role(&self) -> bool {
        matches!(self, Subject::Role(_))
    }
}

impl From<QualifiedRole> for Subject {
    fn from(role: QualifiedRole) -> Self {
        Subject::Role(role)
    }
}

impl From<UserId> for Subject {
    fn from(user: UserId) -> Self {
        Subject::User(user)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::User(user) => fmt::Display::fmt(user, f),
            Subject::Role(role) => fmt::Display::fmt(role, f),
        }
    }
}

impl FromStr for Subject {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Subject {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        value.to_string()
    }
}
