//! Universe registry: the fixed, ordered objects and actions every matrix covers

use crate::error::{AuthzError, Result};
use crate::matrix::PermissionMatrix;
use rolematrix_core::{CanonicalAction, CanonicalObject};
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered object and action universes
///
/// Matrices are only ever created through [`Universe::empty_matrix`] and
/// [`Universe::all_allow`], so every matrix is total by construction.
#[derive(Debug)]
pub struct Universe {
    objects: Vec<CanonicalObject>,
    actions: Vec<CanonicalAction>,
    object_index: HashMap<CanonicalObject, usize>,
    action_index: HashMap<CanonicalAction, usize>,
}

impl Universe {
    /// Build a universe, rejecting empty or duplicated member lists
    pub fn new(objects: Vec<CanonicalObject>, actions: Vec<CanonicalAction>) -> Result<Self> {
        if objects.is_empty() {
            return Err(AuthzError::InvalidConfig(
                "Object universe cannot be empty".to_string(),
            ));
        }
        if actions.is_empty() {
            return Err(AuthzError::InvalidConfig(
                "Action universe cannot be empty".to_string(),
            ));
        }

        let mut object_index = HashMap::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            if object_index.insert(object.clone(), i).is_some() {
                return Err(AuthzError::InvalidConfig(format!(
                    "Duplicate object '{}'",
                    object
                )));
            }
        }

        let mut action_index = HashMap::with_capacity(actions.len());
        for (i, action) in actions.iter().enumerate() {
            if action_index.insert(action.clone(), i).is_some() {
                return Err(AuthzError::InvalidConfig(format!(
                    "Duplicate action '{}'",
                    action
                )));
            }
        }

        Ok(Self {
            objects,
            actions,
            object_index,
            action_index,
        })
    }

    /// Parse and build from raw names (`news` or `obj:news`, `read` or `act:read`)
    pub fn from_names<S: AsRef<str>>(objects: &[S], actions: &[S]) -> Result<Self> {
        let objects = objects
            .iter()
            .map(|o| CanonicalObject::parse(o.as_ref()))
            .collect::<rolematrix_core::Result<Vec<_>>>()?;
        let actions = actions
            .iter()
            .map(|a| CanonicalAction::parse(a.as_ref()))
            .collect::<rolematrix_core::Result<Vec<_>>>()?;
        Self::new(objects, actions)
    }

    /// Objects in configured order
    pub fn objects(&self) -> &[CanonicalObject] {
        &self.objects
    }

    /// Actions in configured order
    pub fn actions(&self) -> &[CanonicalAction] {
        &self.actions
    }

    pub fn object_index(&self, object: &CanonicalObject) -> Option<usize> {
        self.object_index.get(object).copied()
    }

    pub fn action_index(&self, action: &CanonicalAction) -> Option<usize> {
        self.action_index.get(action).copied()
    }

    /// Whether `action` is a canonical action
    pub fn contains_action(&self, action: &CanonicalAction) -> bool {
        self.action_index.contains_key(action)
    }

    /// Number of cells in every matrix built from this universe
    pub fn cell_count(&self) -> usize {
        self.objects.len() * self.actions.len()
    }

    /// Matrix with every cell denied
    pub fn empty_matrix(self: &Arc<Self>) -> PermissionMatrix {
        PermissionMatrix::filled(Arc::clone(self), false)
    }

    /// Matrix with every cell allowed
    pub fn all_allow(self: &Arc<Self>) -> PermissionMatrix {
        PermissionMatrix::filled(Arc::clone(self), true)
    }
}

impl PartialEq for Universe {
    fn eq(&self, other: &Self) -> bool {
        self.objects == other.objects && self.actions == other.actions
    }
}

impl Eq for Universe {}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Arc<Universe> {
        Arc::new(Universe::from_names(&["news", "account"], &["read", "create", "create_limited"]).unwrap())
    }

    #[test]
    fn test_universe_order_preserved() {
        let universe = small();
        let objects: Vec<_> = universe.objects().iter().map(|o| o.name()).collect();
        assert_eq!(objects, vec!["news", "account"]);
        assert_eq!(universe.cell_count(), 6);
        assert_eq!(
            universe.action_index(&CanonicalAction::parse("create_limited").unwrap()),
            Some(2)
        );
    }

    #[test]
    fn test_prefixed_names_accepted() {
        let universe = Universe::from_names(&["obj:news"], &["act:read"]).unwrap();
        assert!(universe.contains_action(&CanonicalAction::parse("read").unwrap()));
    }

    #[test]
    fn test_invalid_universes() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            Universe::from_names(&empty, &["read"]),
            Err(AuthzError::InvalidConfig(_))
        ));
        assert!(matches!(
            Universe::from_names(&["news"], &empty),
            Err(AuthzError::InvalidConfig(_))
        ));
        assert!(matches!(
            Universe::from_names(&["news", "obj:news"], &["read"]),
            Err(AuthzError::InvalidConfig(_))
        ));
        assert!(matches!(
            Universe::from_names(&["news"], &["bad action"]),
            Err(AuthzError::Core(_))
        ));
    }

    #[test]
    fn test_empty_and_full_matrices() {
        let universe = small();
        let empty = universe.empty_matrix();
        assert_eq!(empty.len(), 6);
        assert!(empty.is_all_deny());

        let full = universe.all_allow();
        assert!(full.is_all_allow());
    }
}
