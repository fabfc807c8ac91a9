//! Action alias expansion
//!
//! Policy authors grant coarse intent (`create`, `all`); matrices enumerate
//! the fine-grained canonical actions that intent confers.

use crate::error::{AuthzError, Result};
use crate::universe::Universe;
use rolematrix_core::CanonicalAction;
use std::collections::{BTreeMap, HashMap};
use std::slice;

/// Alias table validated against an action universe
#[derive(Debug, Clone, Default)]
pub struct ActionAliases {
    table: HashMap<CanonicalAction, Vec<CanonicalAction>>,
}

impl ActionAliases {
    /// Table without aliases: every action expands to itself
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate and build the alias table
    ///
    /// Each alias must expand to a non-empty set of canonical actions.
    /// Expansions are not recursive: an entry naming another alias (that is
    /// not itself canonical) or an unknown action is rejected here, once,
    /// instead of on every request.
    pub fn new<S: AsRef<str>>(raw: &BTreeMap<String, Vec<S>>, universe: &Universe) -> Result<Self> {
        let mut keys = Vec::with_capacity(raw.len());
        for key in raw.keys() {
            keys.push(CanonicalAction::parse(key)?);
        }

        let mut table = HashMap::with_capacity(raw.len());
        for (key, targets) in keys.iter().zip(raw.values()) {
            if targets.is_empty() {
                return Err(AuthzError::AliasMisconfiguration(format!(
                    "alias '{}' expands to nothing",
                    key
                )));
            }

            let mut expansion: Vec<(usize, CanonicalAction)> = Vec::with_capacity(targets.len());
            for target in targets {
                let action = CanonicalAction::parse(target.as_ref())?;
                let Some(idx) = universe.action_index(&action) else {
                    let reason = if keys.contains(&action) {
                        format!("alias '{}' expands to alias '{}'", key, action)
                    } else {
                        format!("alias '{}' expands to unknown action '{}'", key, action)
                    };
                    return Err(AuthzError::AliasMisconfiguration(reason));
                };
                if !expansion.iter().any(|(i, _)| *i == idx) {
                    expansion.push((idx, action));
                }
            }

            // universe order keeps expansions deterministic
            expansion.sort_by_key(|(i, _)| *i);

            if table
                .insert(key.clone(), expansion.into_iter().map(|(_, a)| a).collect())
                .is_some()
            {
                return Err(AuthzError::AliasMisconfiguration(format!(
                    "alias '{}' is defined more than once",
                    key
                )));
            }
        }

        Ok(Self { table })
    }

    /// Canonical actions conferred by `action`
    ///
    /// Non-alias actions expand to themselves. Expansion never fails; a
    /// token outside the universe is caught when the matrix cell is set.
    pub fn expand<'a>(&'a self, action: &'a CanonicalAction) -> &'a [CanonicalAction] {
        match self.table.get(action) {
            Some(expansion) => expansion,
            None => slice::from_ref(action),
        }
    }

    pub fn is_alias(&self, action: &CanonicalAction) -> bool {
        self.table.contains_key(action)
    }

    /// Number of aliases
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
