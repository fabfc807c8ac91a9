//! Presentation records for serialized matrices

use serde::{Deserialize, Serialize};

/// One action and whether it is allowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub name: String,
    pub allowed: bool,
}

/// One object row of a matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub object: String,
    pub actions: Vec<ActionRecord>,
}

impl PermissionRecord {
    /// Names of allowed actions
    pub fn allowed_actions(&self) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .filter(|a| a.allowed)
            .map(|a| a.name.as_str())
    }
}
