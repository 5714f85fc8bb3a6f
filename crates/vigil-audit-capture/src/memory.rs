//! In-process collaborators.
//!
//! Useful for hosts without a durable store and for exercising the pipeline
//! in tests. Each one can be told to fail so fault handling can be observed.

use crate::collaborators::{
    AuditStore, ChangeHandler, ChangeSource, SecurityContext, ServiceResolver, TaxonomyRegistry,
};
use crate::error::{RegistryError, StoreError, SubscribeError, UnsubscribeError};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vigil_audit_types::{ActionType, ChangeEvent, RecordData, RecordId};
use vigil_common_core::SubscriptionId;

/// Process-local taxonomy registry; registering a name again replaces it.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    taxonomies: RwLock<HashMap<String, Vec<ActionType>>>,
    failure: Mutex<Option<String>>,
    registrations: AtomicUsize,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `register` call fail.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Registered actions for `name`.
    pub fn actions(&self, name: &str) -> Option<Vec<ActionType>> {
        self.taxonomies.read().get(name).cloned()
    }

    /// Number of distinct taxonomies.
    pub fn len(&self) -> usize {
        self.taxonomies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful `register` calls.
    pub fn registration_count(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }
}

impl TaxonomyRegistry for InMemoryRegistry {
    fn register(&self, name: &str, actions: &[ActionType]) -> Result<(), RegistryError> {
        if let Some(message) = self.failure.lock().clone() {
            return Err(RegistryError::new(message));
        }
        self.taxonomies
            .write()
            .insert(name.to_string(), actions.to_vec());
        self.registrations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A row written to [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub activity_type: String,
    pub action: ActionType,
    pub data: RecordData,
}

#[derive(Debug, Clone, Default)]
enum StoreMode {
    #[default]
    Normal,
    Fail(StoreError),
    WithholdIds,
}

/// Audit store that keeps rows in memory, in write order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<StoredRecord>>,
    mode: Mutex<StoreMode>,
    attempts: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail with `error`.
    pub fn fail_with(&self, error: StoreError) {
        *self.mode.lock() = StoreMode::Fail(error);
    }

    /// Accept writes but return no identifier.
    pub fn withhold_ids(&self) {
        *self.mode.lock() = StoreMode::WithholdIds;
    }

    pub fn recover(&self) {
        *self.mode.lock() = StoreMode::Normal;
    }

    /// Snapshot of stored rows.
    pub fn records(&self) -> Vec<StoredRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `write` calls, successful or not.
    pub fn write_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl AuditStore for InMemoryStore {
    fn write(
        &self,
        activity_type: &str,
        action: &ActionType,
        data: &RecordData,
    ) -> Result<Option<RecordId>, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.mode.lock().clone() {
            StoreMode::Fail(error) => return Err(error),
            StoreMode::WithholdIds => return Ok(None),
            StoreMode::Normal => {}
        }

        let id = RecordId::new();
        self.records.lock().push(StoredRecord {
            id,
            activity_type: activity_type.to_string(),
            action: action.clone(),
            data: data.clone(),
        });
        Ok(Some(id))
    }
}

/// Synchronous publish/subscribe hub for change events.
///
/// `publish` runs every handler on the caller's thread, in subscription order.
#[derive(Default)]
pub struct ChangeBus {
    handlers: RwLock<Vec<(SubscriptionId, Arc<dyn ChangeHandler>)>>,
    rejection: Mutex<Option<SubscribeError>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every current subscriber.
    pub fn publish(&self, event: &ChangeEvent) {
        // Snapshot so handlers may (un)subscribe without deadlocking.
        let handlers: Vec<_> = self
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler.on_change(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Refuse new subscriptions with `error`.
    pub fn reject_subscriptions(&self, error: SubscribeError) {
        *self.rejection.lock() = Some(error);
    }

    pub fn accept_subscriptions(&self) {
        *self.rejection.lock() = None;
    }
}

impl ChangeSource for ChangeBus {
    fn subscribe(&self, handler: Arc<dyn ChangeHandler>) -> Result<SubscriptionId, SubscribeError> {
        if let Some(error) = self.rejection.lock().clone() {
            return Err(error);
        }
        let id = SubscriptionId::new();
        self.handlers.write().push((id, handler));
        Ok(id)
    }

    fn unsubscribe(&self, subscription: SubscriptionId) -> Result<(), UnsubscribeError> {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription);
        if handlers.len() == before {
            return Err(UnsubscribeError::UnknownSubscription(subscription));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Security context that always reports the same principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedActor(String);

impl FixedActor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl SecurityContext for FixedActor {
    fn current_actor_name(&self) -> String {
        self.0.clone()
    }
}

/// Explicit service container.
#[derive(Default, Clone)]
pub struct ServiceRegistry {
    taxonomy_registry: Option<Arc<dyn TaxonomyRegistry>>,
    audit_store: Option<Arc<dyn AuditStore>>,
    change_source: Option<Arc<dyn ChangeSource>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_taxonomy_registry(mut self, registry: Arc<dyn TaxonomyRegistry>) -> Self {
        self.taxonomy_registry = Some(registry);
        self
    }

    pub fn with_audit_store(mut self, store: Arc<dyn AuditStore>) -> Self {
        self.audit_store = Some(store);
        self
    }

    pub fn with_change_source(mut self, source: Arc<dyn ChangeSource>) -> Self {
        self.change_source = Some(source);
        self
    }
}

impl ServiceResolver for ServiceRegistry {
    fn taxonomy_registry(&self) -> Option<Arc<dyn TaxonomyRegistry>> {
        self.taxonomy_registry.clone()
    }

    fn audit_store(&self) -> Option<Arc<dyn AuditStore>> {
        self.audit_store.clone()
    }

    fn change_source(&self) -> Option<Arc<dyn ChangeSource>> {
        self.change_source.clone()
    }
}
