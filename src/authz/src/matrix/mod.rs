//! Dense, total object × action permission matrix

mod record;

pub use record::{ActionRecord, PermissionRecord};

use crate::universe::Universe;
use rolematrix_core::{CanonicalAction, CanonicalObject};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Which universe a member belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Object,
    Action,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Object => f.write_str("object"),
            MemberKind::Action => f.write_str("action"),
        }
    }
}

/// Matrix-level errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UniverseError {
    /// Object or action outside the configured universe
    #[error("Unknown {kind} '{member}'")]
    UnknownMember { kind: MemberKind, member: String },

    /// Matrices built from different universes cannot be combined
    #[error("Matrices belong to different universes")]
    Mismatch,
}

/// Complete allow/deny table for one identity in one domain
///
/// Cells are stored row-major (object, then action) in universe order.
#[derive(Debug, Clone)]
pub struct PermissionMatrix {
    universe: Arc<Universe>,
    cells: Vec<bool>,
}

impl PermissionMatrix {
    pub(crate) fn filled(universe: Arc<Universe>, value: bool) -> Self {
        let cells = vec![value; universe.cell_count()];
        Self { universe, cells }
    }

    /// Universe this matrix was built from
    pub fn universe(&self) -> &Arc<Universe> {
        &self.universe
    }

    fn cell(&self, object: &CanonicalObject, action: &CanonicalAction) -> Result<usize, UniverseError> {
        let o = self
            .universe
            .object_index(object)
            .ok_or_else(|| UniverseError::UnknownMember {
                kind: MemberKind::Object,
                member: object.name().to_string(),
            })?;
        let a = self
            .universe
            .action_index(action)
            .ok_or_else(|| UniverseError::UnknownMember {
                kind: MemberKind::Action,
                member: action.name().to_string(),
            })?;
        Ok(o * self.universe.actions().len() + a)
    }

    /// Set a single cell
    pub fn set(
        &mut self,
        object: &CanonicalObject,
        action: &CanonicalAction,
        allowed: bool,
    ) -> Result<(), UniverseError> {
        let idx = self.cell(object, action)?;
        self.cells[idx] = allowed;
        Ok(())
    }

    /// Cell value, or `None` when either member is outside the universe
    pub fn get(&self, object: &CanonicalObject, action: &CanonicalAction) -> Option<bool> {
        self.cell(object, action).ok().map(|idx| self.cells[idx])
    }

    /// Cell value looked up by bare names
    pub fn allowed(&self, object: &str, action: &str) -> Option<bool> {
        let object = CanonicalObject::parse(object).ok()?;
        let action = CanonicalAction::parse(action).ok()?;
        self.get(&object, &action)
    }

    fn check_universe(&self, other: &PermissionMatrix) -> Result<(), UniverseError> {
        if Arc::ptr_eq(&self.universe, &other.universe) || self.universe == other.universe {
            Ok(())
        } else {
            Err(UniverseError::Mismatch)
        }
    }

    /// Pointwise OR into `self`
    pub fn merge_or_assign(&mut self, other: &PermissionMatrix) -> Result<(), UniverseError> {
        self.check_universe(other)?;
        for (cell, theirs) in self.cells.iter_mut().zip(&other.cells) {
            *cell |= *theirs;
        }
        Ok(())
    }

    /// Pointwise OR
    ///
    /// A deny in one operand never retracts an allow in the other.
    pub fn merge_or(&self, other: &PermissionMatrix) -> Result<PermissionMatrix, UniverseError> {
        let mut merged = self.clone();
        merged.merge_or_assign(other)?;
        Ok(merged)
    }

    /// Clear every cell that is set in `mask`
    pub(crate) fn clear_masked(&mut self, mask: &PermissionMatrix) -> Result<(), UniverseError> {
        self.check_universe(mask)?;
        for (cell, masked) in self.cells.iter_mut().zip(&mask.cells) {
            if *masked {
                *cell = false;
            }
        }
        Ok(())
    }

    pub fn is_all_allow(&self) -> bool {
        self.cells.iter().all(|c| *c)
    }

    pub fn is_all_deny(&self) -> bool {
        self.cells.iter().all(|c| !*c)
    }

    /// Number of cells (always |objects| × |actions|)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A universe is never empty, so neither is a matrix
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of allowed cells
    pub fn allowed_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// Every cell in universe order
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalObject, &CanonicalAction, bool)> + '_ {
        let actions = self.universe.actions();
        self.universe.objects().iter().enumerate().flat_map(move |(o, object)| {
            actions
                .iter()
                .enumerate()
                .map(move |(a, action)| (object, action, self.cells[o * actions.len() + a]))
        })
    }

    /// Presentation records, one per object, in universe order
    pub fn to_records(&self) -> Vec<PermissionRecord> {
        let actions = self.universe.actions();
        self.universe
            .objects()
            .iter()
            .zip(self.cells.chunks(actions.len()))
            .map(|(object, row)| PermissionRecord {
                object: object.name().to_string(),
                actions: actions
                    .iter()
                    .zip(row)
                    .map(|(action, allowed)| ActionRecord {
                        name: action.name().to_string(),
                        allowed: *allowed,
                    })
                    .collect(),
            })
            .collect()
    }
}

impl PartialEq for PermissionMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.check_universe(other).is_ok() && self.cells == other.cells
    }
}

impl Eq for PermissionMatrix {}

impl Serialize for PermissionMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_records().serialize(serializer)
    }
}
