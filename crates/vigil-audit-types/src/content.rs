//! References to content items in the repository.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the content item whose access rights changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub id: u64,
    /// Specific version of the item, if the change targeted one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_id: Option<u64>,
    /// Name of the content provider for items not stored in the default one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl ContentRef {
    /// Reference to an item in the default provider.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            work_id: None,
            provider: None,
        }
    }

    /// Pin the reference to a version.
    pub fn with_work_id(mut self, work_id: u64) -> Self {
        self.work_id = Some(work_id);
        self
    }

    /// Set the provider name.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

impl From<u64> for ContentRef {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Renders `id`, `id_work`, `id__provider` or `id_work_provider`.
impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        match (&self.work_id, &self.provider) {
            (None, None) => Ok(()),
            (Some(work), None) => write!(f, "_{work}"),
            (None, Some(provider)) => write!(f, "__{provider}"),
            (Some(work), Some(provider)) => write!(f, "_{work}_{provider}"),
        }
    }
}
