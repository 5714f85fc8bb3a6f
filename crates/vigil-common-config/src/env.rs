//! Environment variable handling.

use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Environment variable names.
pub mod vars {
    pub const VIGIL_CONFIG_DIR: &str = "VIGIL_CONFIG_DIR";
    pub const VIGIL_AUDIT_ENABLED: &str = "VIGIL_AUDIT_ENABLED";
    pub const VIGIL_AUDIT_ACTIVITY_TYPE: &str = "VIGIL_AUDIT_ACTIVITY_TYPE";
}

/// Access to process environment, after loading `.env` files.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Load `.env` then `.env.local` (later overrides earlier).
    pub fn init() -> Self {
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");
        Self { _guard: () }
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }

    /// Get a boolean variable; unparseable values are an error.
    pub fn get_bool(var: &str) -> Result<Option<bool>, EnvError> {
        match env::var(var) {
            Ok(v) => match v.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Some(true)),
                "false" | "0" | "no" | "off" => Ok(Some(false)),
                other => Err(EnvError::InvalidValue {
                    var: var.to_string(),
                    message: format!("expected a boolean, got '{other}'"),
                }),
            },
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_bool() {
        env::set_var("VIGIL_TEST_BOOL_ON", "Yes");
        env::set_var("VIGIL_TEST_BOOL_BAD", "maybe");
        assert_eq!(Environment::get_bool("VIGIL_TEST_BOOL_ON").unwrap(), Some(true));
        assert!(Environment::get_bool("VIGIL_TEST_BOOL_BAD").is_err());
        assert_eq!(Environment::get_bool("VIGIL_TEST_BOOL_UNSET").unwrap(), None);
        env::remove_var("VIGIL_TEST_BOOL_ON");
        env::remove_var("VIGIL_TEST_BOOL_BAD");
    }
}
