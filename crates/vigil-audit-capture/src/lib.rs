//! Permission-change audit capture for Vigil.
//!
//! This crate turns access-rights change notifications into audit records:
//!
//! - [`registrar`] declares the activity taxonomy with the external registry
//! - [`formatter`] renders a change event into a human-readable message
//! - [`persister`] writes one record per event and confirms the stored id
//! - [`lifecycle`] subscribes to the change stream and contains every failure
//!
//! Collaborators are reached only through the traits in [`collaborators`];
//! [`memory`] provides in-process implementations of each of them.

pub mod bridge;
pub mod collaborators;
pub mod error;
pub mod formatter;
pub mod lifecycle;
pub mod memory;
pub mod persister;
pub mod registrar;

pub use bridge::{AsyncAuditStore, BlockingStore};
pub use collaborators::{
    AuditStore, ChangeHandler, ChangeSource, SecurityContext, ServiceResolver, TaxonomyRegistry,
};
pub use error::{
    CaptureError, PersistenceError, RegistrationError, RegistryError, StartupError, StartupStep,
    StoreError, SubscribeError, UnsubscribeError,
};
pub use formatter::{describe_entries, describe_entry, render_message, ChangeFormatter, FormattedChange};
pub use lifecycle::{AuditChangeHandler, AuditLifecycle, HandlerStats, LifecycleSettings, LifecycleState};
pub use memory::{ChangeBus, FixedActor, InMemoryRegistry, InMemoryStore, ServiceRegistry, StoredRecord};
pub use persister::AuditPersister;
pub use registrar::{build_taxonomy, register, TaxonomyRegistrar};

// Re-export types for convenience
pub use vigil_audit_types::{
    AccessLevel, ActionType, ActivityTaxonomy, AuditRecord, ChangeEvent, ContentRef, EntityKind,
    PermissionEntry, RecordData, RecordId, SaveType,
};
pub use vigil_common_core::SubscriptionId;
