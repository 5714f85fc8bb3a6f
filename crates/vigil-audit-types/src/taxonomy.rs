//! The named set of audit action kinds registered with the activity store.

use crate::SaveType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// A `(code, label)` action subtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionType {
    pub code: i32,
    pub label: String,
}

impl ActionType {
    /// Create a new action type.
    pub fn new(code: i32, label: impl Into<String>) -> Self {
        Self {
            code,
            label: label.into(),
        }
    }
}

impl From<SaveType> for ActionType {
    fn from(save_type: SaveType) -> Self {
        Self::new(save_type.code(), save_type.label())
    }
}

/// Errors building a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    #[error("taxonomy name must not be empty")]
    EmptyName,

    #[error("duplicate action code {code} in taxonomy '{name}'")]
    DuplicateCode { name: String, code: i32 },
}

/// Immutable activity type with its ordered action set.
///
/// Codes are unique within a taxonomy. Once built it is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTaxonomy {
    name: String,
    actions: Vec<ActionType>,
}

impl ActivityTaxonomy {
    /// Build a taxonomy, rejecting empty names and repeated codes.
    pub fn new(
        name: impl Into<String>,
        actions: impl IntoIterator<Item = ActionType>,
    ) -> Result<Self, TaxonomyError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TaxonomyError::EmptyName);
        }

        let actions: Vec<ActionType> = actions.into_iter().collect();
        let mut seen = HashSet::with_capacity(actions.len());
        for action in &actions {
            if !seen.insert(action.code) {
                return Err(TaxonomyError::DuplicateCode {
                    name,
                    code: action.code,
                });
            }
        }

        Ok(Self { name, actions })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Actions in registration order.
    pub fn actions(&self) -> &[ActionType] {
        &self.actions
    }

    /// Find an action by code.
    pub fn action(&self, code: i32) -> Option<&ActionType> {
        self.actions.iter().find(|a| a.code == code)
    }

    pub fn contains_code(&self, code: i32) -> bool {
        self.action(code).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_duplicate_codes() {
        let err = ActivityTaxonomy::new(
            "access_rights",
            [ActionType::new(1, "a"), ActionType::new(1, "b")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TaxonomyError::DuplicateCode {
                name: "access_rights".into(),
                code: 1
            }
        );
    }

    #[test]
    fn test_rejects_empty_name() {
        assert_eq!(
            ActivityTaxonomy::new("  ", []).unwrap_err(),
            TaxonomyError::EmptyName
        );
    }

    #[test]
    fn test_preserves_order_and_lookup() {
        let taxonomy = ActivityTaxonomy::new(
            "access_rights",
            [SaveType::Moved.into(), SaveType::ItemSaved.into()],
        )
        .unwrap();
        assert_eq!(taxonomy.actions()[0].label, "Moved");
        assert_eq!(taxonomy.action(1).map(|a| a.label.as_str()), Some("ItemSaved"));
        assert!(!taxonomy.contains_code(0));
    }
}
