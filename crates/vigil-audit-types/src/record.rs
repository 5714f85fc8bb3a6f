//! The persisted representation of one change event.

use crate::ActionType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Data mapping handed to the audit store.
pub type RecordData = BTreeMap<String, serde_json::Value>;

/// Data key holding the human-readable message.
pub const MESSAGE_KEY: &str = "message";

/// One audit-log entry, created per change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Activity-type name the record is filed under.
    pub activity_type: String,
    /// Save-type derived action tag.
    pub action: ActionType,
    /// When the record was built.
    pub created_at: DateTime<Utc>,
    /// Data mapping handed to the store. Always contains [`MESSAGE_KEY`].
    pub data: RecordData,
}

impl AuditRecord {
    /// Create a record carrying `message`.
    pub fn new(
        activity_type: impl Into<String>,
        action: ActionType,
        message: impl Into<String>,
    ) -> Self {
        let mut data = RecordData::new();
        data.insert(
            MESSAGE_KEY.to_string(),
            serde_json::Value::String(message.into()),
        );
        Self {
            activity_type: activity_type.into(),
            action,
            created_at: Utc::now(),
            data,
        }
    }

    /// Add a data value. Values that fail to serialize are skipped.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let key = key.into();
        if key == MESSAGE_KEY {
            return self;
        }
        if let Ok(json) = serde_json::to_value(value) {
            self.data.insert(key, json);
        }
        self
    }

    /// The free-form message.
    pub fn message(&self) -> &str {
        self.data
            .get(MESSAGE_KEY)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SaveType;

    #[test]
    fn test_message_is_in_data() {
        let record = AuditRecord::new("access_rights", SaveType::Copied.into(), "hello");
        assert_eq!(record.message(), "hello");
        assert_eq!(record.data.len(), 1);
    }

    #[test]
    fn test_with_data_cannot_overwrite_message() {
        let record = AuditRecord::new("access_rights", SaveType::Copied.into(), "hello")
            .with_data(MESSAGE_KEY, "other")
            .with_data("entry_count", 3);
        assert_eq!(record.message(), "hello");
        assert_eq!(record.data["entry_count"], serde_json::json!(3));
    }
}
