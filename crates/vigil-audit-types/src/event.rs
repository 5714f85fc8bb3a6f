//! Raw change notifications emitted by the content repository.

use crate::{ContentRef, PermissionEntry, SaveType};
use serde::{Deserialize, Serialize};

/// A permission/access-rights modification on a piece of content.
///
/// Owned by the emitter; the audit pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub content: ContentRef,
    #[serde(default)]
    pub save_type: SaveType,
    /// Entries in the order the emitter applied them.
    #[serde(default)]
    pub entries: Vec<PermissionEntry>,
    /// Creator as reported by the emitter. Known to be empty in practice and
    /// never used as the acting identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl ChangeEvent {
    /// Create an event with no entries.
    pub fn new(content: impl Into<ContentRef>, save_type: SaveType) -> Self {
        Self {
            content: content.into(),
            save_type,
            entries: Vec::new(),
            creator: None,
        }
    }

    /// Append an entry, keeping insertion order.
    pub fn with_entry(mut self, entry: PermissionEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Set the emitter-reported creator.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccessLevel;

    #[test]
    fn test_entries_keep_insertion_order() {
        let event = ChangeEvent::new(1, SaveType::Modify)
            .with_entry(PermissionEntry::user("zed", AccessLevel::Read))
            .with_entry(PermissionEntry::user("amy", AccessLevel::Edit));
        let names: Vec<_> = event.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["zed", "amy"]);
    }

    #[test]
    fn test_deserialize_json_line() {
        let line = r#"{"content":{"id":123},"save_type":"ItemSaved","entries":[{"entity_kind":"Group","name":"Editors","access_level":"Edit"}]}"#;
        let event: ChangeEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.save_type, SaveType::ItemSaved);
        assert_eq!(event.entries.len(), 1);
        assert!(event.creator.is_none());
    }
}
