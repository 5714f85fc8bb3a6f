//! Configuration file loading and parsing.

use crate::env::{vars, EnvError, Environment};
use crate::types::AuditConfig;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "vigil.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

fn env_var_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var pattern is valid")
    })
}

impl ConfigLoader {
    /// Create a loader for the given config directory.
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: config_dir.as_ref().to_path_buf(),
        }
    }

    /// Create a loader from `VIGIL_CONFIG_DIR`, falling back to the working directory.
    pub fn from_env() -> Self {
        match Environment::get(vars::VIGIL_CONFIG_DIR) {
            Some(dir) => Self::new(dir),
            None => Self::default(),
        }
    }

    /// Path of the config file this loader reads.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_FILE_NAME)
    }

    /// Load the file (defaults when absent), then apply env overrides.
    pub fn load(&self) -> Result<AuditConfig, ConfigError> {
        let mut config = self.load_file()?;
        Self::apply_env_overrides(&mut config)?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn load_file(&self) -> Result<AuditConfig, ConfigError> {
        let config_path = self.config_path();
        if !config_path.exists() {
            return Ok(AuditConfig::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let expanded = expand_env_vars(&contents)?;

        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }

    fn apply_env_overrides(config: &mut AuditConfig) -> Result<(), ConfigError> {
        if let Some(enabled) = Environment::get_bool(vars::VIGIL_AUDIT_ENABLED)? {
            config.enabled = enabled;
        }
        if let Some(activity_type) = Environment::get(vars::VIGIL_AUDIT_ACTIVITY_TYPE) {
            config.activity_type = activity_type;
        }
        Ok(())
    }

    fn validate(config: &AuditConfig) -> Result<(), ConfigError> {
        if config.activity_type.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "activity_type must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand `${VAR}` and `${VAR:-default}`.
fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in env_var_pattern().captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_defaults_when_no_file() {
        let dir = tempdir().unwrap();
        let config = ConfigLoader::new(dir.path()).load_file().unwrap();
        assert_eq!(config, AuditConfig::default());
    }

    #[test]
    fn test_load_file_with_default_expansion() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "activity_type: ${VIGIL_TEST_UNSET_TYPE:-permissions}\nlog:\n  level: debug\n",
        )
        .unwrap();

        let config = ConfigLoader::new(dir.path()).load_file().unwrap();
        assert_eq!(config.activity_type, "permissions");
        assert_eq!(config.log.level, "debug");
        assert!(config.enabled);
    }

    #[test]
    fn test_missing_env_var_without_default() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "activity_type: ${VIGIL_TEST_DEFINITELY_UNSET}\n",
        )
        .unwrap();

        let err = ConfigLoader::new(dir.path()).load_file().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotFound { .. }));
    }

    #[test]
    fn test_invalid_yaml_reports_parse_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "enabled: [not a bool\n").unwrap();

        let err = ConfigLoader::new(dir.path()).load_file().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_validation_rejects_empty_activity_type() {
        let config = AuditConfig {
            activity_type: " ".to_string(),
            ..AuditConfig::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    // The only test that touches the override variables.
    #[test]
    fn test_env_overrides_win_over_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "activity_type: from_file
").unwrap();

        std::env::set_var(vars::VIGIL_AUDIT_ACTIVITY_TYPE, "from_env");
        std::env::set_var(vars::VIGIL_AUDIT_ENABLED, "off");
        let result = ConfigLoader::new(dir.path()).load();
        std::env::remove_var(vars::VIGIL_AUDIT_ACTIVITY_TYPE);
        std::env::remove_var(vars::VIGIL_AUDIT_ENABLED);

        let config = result.unwrap();
        assert_eq!(config.activity_type, "from_env");
        assert!(!config.enabled);
    }
}
