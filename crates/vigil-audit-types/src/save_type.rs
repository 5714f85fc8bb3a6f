//! Classification of how a security change was saved.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Why or how an access-rights change was made.
///
/// The numeric code of each variant is stable and is what the audit store
/// receives as the action code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
#[repr(i32)]
pub enum SaveType {
    /// Carries no audit meaning; never registered as an action.
    None = 0,
    /// The access list of a single item was saved.
    ItemSaved = 1,
    /// The access list was replaced wholesale.
    Replace = 2,
    /// Individual entries were added or changed.
    Modify = 3,
    /// The access list was replaced on an item and all its descendants.
    RecursiveReplace = 4,
    /// Entries were modified on an item and all its descendants.
    RecursiveModify = 5,
    /// Access rights came along with a copied item.
    Copied = 6,
    /// Access rights changed because the item was moved.
    Moved = 7,
}

impl SaveType {
    /// Numeric code of this save type.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Display label used in the taxonomy and in messages.
    pub fn label(self) -> String {
        self.to_string()
    }

    /// Whether this is the no-op classification.
    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Look up a save type by its numeric code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::iter().find(|t| t.code() == code)
    }

    /// All save types that carry audit meaning, in code order.
    pub fn auditable() -> impl Iterator<Item = Self> {
        Self::iter().filter(|t| !t.is_none())
    }
}

impl Default for SaveType {
    fn default() -> Self {
        Self::None
    }
}
