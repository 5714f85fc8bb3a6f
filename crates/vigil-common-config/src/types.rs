//! Configuration types.

use serde::{Deserialize, Serialize};

/// Activity-type name used when none is configured.
pub const DEFAULT_ACTIVITY_TYPE: &str = "access_rights";

/// Audit pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// When false the pipeline never subscribes.
    pub enabled: bool,
    /// Taxonomy name and activity type of every record.
    pub activity_type: String,
    /// Logging settings.
    pub log: LogSection,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            activity_type: DEFAULT_ACTIVITY_TYPE.to_string(),
            log: LogSection::default(),
        }
    }
}

/// Logging section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: String,
    pub format: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuditConfig::default();
        assert!(config.enabled);
        assert_eq!(config.activity_type, "access_rights");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_yaml_merges_with_defaults() {
        let config: AuditConfig = serde_yaml::from_str("enabled: false\n").unwrap();
        assert!(!config.enabled);
        assert_eq!(config.activity_type, DEFAULT_ACTIVITY_TYPE);
        assert_eq!(config.log, LogSection::default());
    }
}
