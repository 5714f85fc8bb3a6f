//! Access-control entries carried by a change event.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The kind of security entity an entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString)]
pub enum EntityKind {
    User,
    Group,
    VisitorGroup,
}

/// Access level granted to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString)]
pub enum AccessLevel {
    NoAccess,
    Read,
    Create,
    Edit,
    Delete,
    Publish,
    Administer,
    Full,
}

/// One entry of an access list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub entity_kind: EntityKind,
    /// Entity name; may be empty when the emitter could not resolve it.
    #[serde(default)]
    pub name: String,
    pub access_level: AccessLevel,
}

impl PermissionEntry {
    /// Create a new entry.
    pub fn new(entity_kind: EntityKind, name: impl Into<String>, access_level: AccessLevel) -> Self {
        Self {
            entity_kind,
            name: name.into(),
            access_level,
        }
    }

    /// Entry for a single user.
    pub fn user(name: impl Into<String>, access_level: AccessLevel) -> Self {
        Self::new(EntityKind::User, name, access_level)
    }

    /// Entry for a group.
    pub fn group(name: impl Into<String>, access_level: AccessLevel) -> Self {
        Self::new(EntityKind::Group, name, access_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(EntityKind::Group.to_string(), "Group");
        assert_eq!(AccessLevel::Full.to_string(), "Full");
        assert_eq!(AccessLevel::NoAccess.to_string(), "NoAccess");
    }

    #[test]
    fn test_entry_deserializes_without_name() {
        let entry: PermissionEntry =
            serde_json::from_str(r#"{"entity_kind":"User","access_level":"Read"}"#).unwrap();
        assert_eq!(entry, PermissionEntry::user("", AccessLevel::Read));
    }
}
