//! Narrow interfaces to the systems the pipeline depends on.
//!
//! The pipeline never sees the publisher, the store or the host's service
//! container directly; it only talks to these traits.

use crate::error::{RegistryError, StoreError, SubscribeError, UnsubscribeError};
use std::sync::Arc;
use vigil_audit_types::{ActionType, ChangeEvent, RecordData, RecordId};
use vigil_common_core::SubscriptionId;

/// Registry of audit activity types.
pub trait TaxonomyRegistry: Send + Sync {
    /// Upsert an activity type with its ordered action set.
    fn register(&self, name: &str, actions: &[ActionType]) -> Result<(), RegistryError>;
}

/// Durable audit storage.
pub trait AuditStore: Send + Sync {
    /// Write one entry and block until the store confirms it.
    ///
    /// `Ok(None)` means the store accepted the call but assigned no id.
    fn write(
        &self,
        activity_type: &str,
        action: &ActionType,
        data: &RecordData,
    ) -> Result<Option<RecordId>, StoreError>;
}

/// Receives change notifications.
///
/// Called synchronously on the emitter's thread, possibly from several
/// threads at once.
pub trait ChangeHandler: Send + Sync {
    fn on_change(&self, event: &ChangeEvent);
}

/// Source of permission-change notifications.
pub trait ChangeSource: Send + Sync {
    fn subscribe(&self, handler: Arc<dyn ChangeHandler>) -> Result<SubscriptionId, SubscribeError>;

    fn unsubscribe(&self, subscription: SubscriptionId) -> Result<(), UnsubscribeError>;
}

/// Access to the ambient security principal.
pub trait SecurityContext: Send + Sync {
    /// Name of the acting principal. Never empty.
    fn current_actor_name(&self) -> String;
}

/// Looks up collaborators from the host's service container.
///
/// `None` means the service is not registered.
pub trait ServiceResolver {
    fn taxonomy_registry(&self) -> Option<Arc<dyn TaxonomyRegistry>>;

    fn audit_store(&self) -> Option<Arc<dyn AuditStore>>;

    fn change_source(&self) -> Option<Arc<dyn ChangeSource>>;
}
