//! Configuration for the Vigil audit pipeline.
//!
//! Settings live in `vigil.yaml`; environment variables override them.

pub mod env;
pub mod loader;
pub mod types;

pub use env::{vars, EnvError, Environment};
pub use loader::{ConfigError, ConfigLoader, CONFIG_FILE_NAME};
pub use types::{AuditConfig, LogSection, DEFAULT_ACTIVITY_TYPE};
