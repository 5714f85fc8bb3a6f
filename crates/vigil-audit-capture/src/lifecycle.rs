//! Subscription lifecycle and the per-event handler.
//!
//! State machine: `Inactive -> Active` only after all four startup steps
//! succeed, `Active -> Inactive` only after a successful unsubscribe. Any
//! failure is logged and leaves the previous state in place.

use crate::collaborators::{ChangeHandler, SecurityContext, ServiceResolver};
use crate::error::{CaptureError, StartupError, StartupStep, UnsubscribeError};
use crate::formatter::ChangeFormatter;
use crate::persister::AuditPersister;
use crate::registrar::TaxonomyRegistrar;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use vigil_audit_types::{ActionType, AuditRecord, ChangeEvent, RecordId};
use vigil_common_config::AuditConfig;
use vigil_common_core::SubscriptionId;
use vigil_common_log::spans::{change_span, lifecycle_span, record_error};

/// Settings the lifecycle needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSettings {
    pub enabled: bool,
    pub activity_type: String,
}

impl From<&AuditConfig> for LifecycleSettings {
    fn from(config: &AuditConfig) -> Self {
        Self {
            enabled: config.enabled,
            activity_type: config.activity_type.clone(),
        }
    }
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self::from(&AuditConfig::default())
    }
}

/// Externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Inactive,
    Active,
}

/// Counters kept by the handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerStats {
    pub persisted: u64,
    pub failed: u64,
}

/// Turns each delivered change event into exactly one persisted record.
///
/// Nothing raised while handling an event (error or panic) leaves
/// [`ChangeHandler::on_change`].
pub struct AuditChangeHandler {
    activity_type: String,
    formatter: ChangeFormatter,
    persister: AuditPersister,
    persisted: AtomicU64,
    failed: AtomicU64,
}

impl AuditChangeHandler {
    pub fn new(
        activity_type: impl Into<String>,
        formatter: ChangeFormatter,
        persister: AuditPersister,
    ) -> Self {
        Self {
            activity_type: activity_type.into(),
            formatter,
            persister,
            persisted: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Build the record for `event`.
    pub fn build_record(&self, event: &ChangeEvent) -> AuditRecord {
        let formatted = self.formatter.format(event);
        AuditRecord::new(&self.activity_type, ActionType::from(event.save_type), formatted.message)
            .with_data("actor", &formatted.actor)
            .with_data("content", event.content.to_string())
            .with_data("save_type", event.save_type.label())
            .with_data("entry_count", event.entries.len())
    }

    /// Format and persist one event, returning the stored id.
    pub fn handle(&self, event: &ChangeEvent) -> Result<RecordId, CaptureError> {
        let record = self.build_record(event);
        Ok(self.persister.persist(&record)?)
    }

    pub fn stats(&self) -> HandlerStats {
        HandlerStats {
            persisted: self.persisted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl ChangeHandler for AuditChangeHandler {
    fn on_change(&self, event: &ChangeEvent) {
        let content = event.content.to_string();
        let span = change_span(&content, &event.save_type.label());
        let _guard = span.enter();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.handle(event)))
            .unwrap_or_else(|payload| Err(CaptureError::from_panic(payload.as_ref())));

        match outcome {
            Ok(id) => {
                self.persisted.fetch_add(1, Ordering::Relaxed);
                span.record("record_id", tracing::field::display(&id));
                debug!(record_id = %id, "audit record stored");
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                record_error(&e);
                error!(
                    entries = event.entries.len(),
                    "failed to store audit record; event dropped"
                );
            }
        }
    }
}

struct ActiveSubscription {
    subscription: SubscriptionId,
    handler: Arc<AuditChangeHandler>,
}

/// Owns the subscription to the change stream.
///
/// `start` and `stop` never fail outward: the host keeps running without
/// audit logging if anything goes wrong.
pub struct AuditLifecycle {
    settings: LifecycleSettings,
    security: Arc<dyn SecurityContext>,
    active: Mutex<Option<ActiveSubscription>>,
}

impl AuditLifecycle {
    pub fn new(settings: LifecycleSettings, security: Arc<dyn SecurityContext>) -> Self {
        Self {
            settings,
            security,
            active: Mutex::new(None),
        }
    }

    pub fn from_config(config: &AuditConfig, security: Arc<dyn SecurityContext>) -> Self {
        Self::new(LifecycleSettings::from(config), security)
    }

    pub fn state(&self) -> LifecycleState {
        if self.active.lock().is_some() {
            LifecycleState::Active
        } else {
            LifecycleState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    /// Handler counters while active.
    pub fn stats(&self) -> Option<HandlerStats> {
        self.active.lock().as_ref().map(|active| active.handler.stats())
    }

    /// Resolve dependencies, register the taxonomy and subscribe.
    ///
    /// Returns `true` when active afterwards. Calling it while already
    /// active does nothing and returns `true`.
    pub fn start(&self, resolver: &dyn ServiceResolver) -> bool {
        let span = lifecycle_span("start");
        let _guard = span.enter();

        let mut active = self.active.lock();
        if active.is_some() {
            debug!("audit capture already active");
            return true;
        }

        if !self.settings.enabled {
            info!("audit capture disabled by configuration");
            return false;
        }

        let mut step = StartupStep::ResolveRegistry;
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.try_start(resolver, &mut step)))
            .unwrap_or_else(|payload| {
                Err(StartupError {
                    step,
                    source: CaptureError::from_panic(payload.as_ref()),
                })
            });

        match result {
            Ok(subscription) => {
                info!(
                    activity_type = %self.settings.activity_type,
                    subscription = %subscription.subscription,
                    "audit capture active"
                );
                *active = Some(subscription);
                true
            }
            Err(e) => {
                error!(
                    step = %e.step,
                    error = %e.source,
                    "audit capture startup failed; continuing without audit logging"
                );
                false
            }
        }
    }

    fn try_start(
        &self,
        resolver: &dyn ServiceResolver,
        step: &mut StartupStep,
    ) -> Result<ActiveSubscription, StartupError> {
        let fail = |step: StartupStep| move |source: CaptureError| StartupError { step, source };

        *step = StartupStep::ResolveRegistry;
        let registry = resolver
            .taxonomy_registry()
            .ok_or_else(|| CaptureError::dependency("taxonomy registry"))
            .map_err(fail(*step))?;

        *step = StartupStep::RegisterTaxonomy;
        let registrar = TaxonomyRegistrar::new(&self.settings.activity_type)
            .map_err(|e| fail(StartupStep::RegisterTaxonomy)(e.into()))?;
        registrar
            .register(registry.as_ref())
            .map_err(|e| fail(StartupStep::RegisterTaxonomy)(e.into()))?;

        *step = StartupStep::ResolveStore;
        let store = resolver
            .audit_store()
            .ok_or_else(|| CaptureError::dependency("audit store"))
            .map_err(fail(*step))?;

        *step = StartupStep::SubscribeChanges;
        let source = resolver
            .change_source()
            .ok_or_else(|| CaptureError::dependency("change source"))
            .map_err(fail(*step))?;

        let handler = Arc::new(AuditChangeHandler::new(
            self.settings.activity_type.clone(),
            ChangeFormatter::new(self.security.clone()),
            AuditPersister::new(store),
        ));
        let subscription = source
            .subscribe(handler.clone())
            .map_err(|e| fail(StartupStep::SubscribeChanges)(e.into()))?;

        Ok(ActiveSubscription {
            subscription,
            handler,
        })
    }

    /// Unsubscribe if active. Safe to call repeatedly or before `start`.
    pub fn stop(&self, resolver: &dyn ServiceResolver) {
        let span = lifecycle_span("stop");
        let _guard = span.enter();

        let mut active = self.active.lock();
        let Some(subscription) = active.as_ref() else {
            debug!("audit capture not active; nothing to stop");
            return;
        };

        let source = match panic::catch_unwind(AssertUnwindSafe(|| resolver.change_source())) {
            Ok(Some(source)) => source,
            Ok(None) => {
                warn!(
                    subscription = %subscription.subscription,
                    "change source unavailable at stop; subscription left in place"
                );
                return;
            }
            Err(payload) => {
                warn!(
                    error = %CaptureError::from_panic(payload.as_ref()),
                    "resolving change source panicked at stop; subscription left in place"
                );
                return;
            }
        };

        let id = subscription.subscription;
        let result = panic::catch_unwind(AssertUnwindSafe(|| source.unsubscribe(id)))
            .unwrap_or_else(|payload| {
                Err(UnsubscribeError::Source(
                    CaptureError::from_panic(payload.as_ref()).to_string(),
                ))
            });

        match result {
            Ok(()) => {
                *active = None;
                info!(subscription = %id, "audit capture stopped");
            }
            Err(e) => {
                warn!(
                    error = %CaptureError::UnsubscribeFailure(e),
                    subscription = %id,
                    "audit capture still subscribed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::ChangeSource;
    use crate::error::{StoreError, SubscribeError};
    use crate::memory::{ChangeBus, FixedActor, InMemoryRegistry, InMemoryStore, ServiceRegistry};
    use vigil_test_utils::{capture_logs, fixtures};

    struct Harness {
        registry: Arc<InMemoryRegistry>,
        store: Arc<InMemoryStore>,
        bus: Arc<ChangeBus>,
        services: ServiceRegistry,
        lifecycle: AuditLifecycle,
    }

    fn harness() -> Harness {
        let registry = Arc::new(InMemoryRegistry::new());
        let store = Arc::new(InMemoryStore::new());
        let bus = Arc::new(ChangeBus::new());
        let services = ServiceRegistry::new()
            .with_taxonomy_registry(registry.clone())
            .with_audit_store(store.clone())
            .with_change_source(bus.clone());
        let lifecycle =
            AuditLifecycle::new(LifecycleSettings::default(), Arc::new(FixedActor::new("bob")));
        Harness {
            registry,
            store,
            bus,
            services,
            lifecycle,
        }
    }

    #[test]
    fn test_start_activates_and_persists_events() {
        let h = harness();
        assert!(h.lifecycle.start(&h.services));
        assert_eq!(h.lifecycle.state(), LifecycleState::Active);
        assert!(h.registry.actions("access_rights").is_some());

        h.bus.publish(&fixtures::alice_and_editors());

        let records = h.store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].activity_type, "access_rights");
        assert_eq!(records[0].action, ActionType::new(1, "ItemSaved"));
        assert_eq!(records[0].data["actor"], "bob");
        assert_eq!(records[0].data["content"], "123");
        assert_eq!(records[0].data["entry_count"], 2);
        assert_eq!(
            h.lifecycle.stats(),
            Some(HandlerStats {
                persisted: 1,
                failed: 0
            })
        );
    }

    #[test]
    fn test_start_twice_does_not_double_subscribe() {
        let h = harness();
        assert!(h.lifecycle.start(&h.services));
        assert!(h.lifecycle.start(&h.services));
        assert_eq!(h.bus.subscriber_count(), 1);
        assert_eq!(h.registry.registration_count(), 1);

        h.bus.publish(&fixtures::alice_and_editors());
        assert_eq!(h.store.write_attempts(), 1);
    }

    #[test]
    fn test_disabled_config_never_touches_collaborators() {
        let h = harness();
        let lifecycle = AuditLifecycle::new(
            LifecycleSettings {
                enabled: false,
                ..LifecycleSettings::default()
            },
            Arc::new(FixedActor::new("bob")),
        );
        assert!(!lifecycle.start(&h.services));
        assert_eq!(lifecycle.state(), LifecycleState::Inactive);
        assert_eq!(h.registry.registration_count(), 0);
        assert_eq!(h.bus.subscriber_count(), 0);
    }

    #[test]
    fn test_each_missing_dependency_leaves_inactive() {
        let registry = Arc::new(InMemoryRegistry::new());
        let store = Arc::new(InMemoryStore::new());
        let bus = Arc::new(ChangeBus::new());

        let partials = [
            ServiceRegistry::new()
                .with_audit_store(store.clone())
                .with_change_source(bus.clone()),
            ServiceRegistry::new()
                .with_taxonomy_registry(registry.clone())
                .with_change_source(bus.clone()),
            ServiceRegistry::new()
                .with_taxonomy_registry(registry.clone())
                .with_audit_store(store.clone()),
        ];

        for services in &partials {
            let lifecycle = AuditLifecycle::new(
                LifecycleSettings::default(),
                Arc::new(FixedActor::new("bob")),
            );
            assert!(!lifecycle.start(services));
            assert!(!lifecycle.is_active());
            assert_eq!(bus.subscriber_count(), 0);
        }
    }

    #[test]
    fn test_registration_failure_aborts_before_subscribing() {
        let h = harness();
        h.registry.fail_with("registry offline");
        assert!(!h.lifecycle.start(&h.services));
        assert!(!h.lifecycle.is_active());
        assert_eq!(h.bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscribe_failure_leaves_inactive() {
        let h = harness();
        h.bus.reject_subscriptions(SubscribeError::new("closed"));
        assert!(!h.lifecycle.start(&h.services));
        assert!(!h.lifecycle.is_active());

        h.bus.accept_subscriptions();
        assert!(h.lifecycle.start(&h.services));
    }

    #[test]
    fn test_panicking_registry_is_contained() {
        struct PanickingRegistry;
        impl crate::collaborators::TaxonomyRegistry for PanickingRegistry {
            fn register(
                &self,
                _name: &str,
                _actions: &[ActionType],
            ) -> Result<(), crate::error::RegistryError> {
                panic!("registry exploded");
            }
        }

        let h = harness();
        let services = ServiceRegistry::new()
            .with_taxonomy_registry(Arc::new(PanickingRegistry))
            .with_audit_store(h.store.clone())
            .with_change_source(h.bus.clone());
        assert!(!h.lifecycle.start(&services));
        assert!(!h.lifecycle.is_active());
        assert_eq!(h.bus.subscriber_count(), 0);
    }

    #[test]
    fn test_store_failure_is_contained_per_event() {
        let h = harness();
        assert!(h.lifecycle.start(&h.services));
        h.store.fail_with(StoreError::Unavailable("down".into()));

        h.bus.publish(&fixtures::alice_and_editors());
        h.store.recover();
        h.bus.publish(&fixtures::alice_and_editors());

        assert_eq!(h.store.write_attempts(), 2);
        assert_eq!(h.store.len(), 1);
        assert_eq!(
            h.lifecycle.stats(),
            Some(HandlerStats {
                persisted: 1,
                failed: 1
            })
        );
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let h = harness();
        h.lifecycle.stop(&h.services);
        h.lifecycle.stop(&h.services);
        assert_eq!(h.lifecycle.state(), LifecycleState::Inactive);
    }

    #[test]
    fn test_stop_unsubscribes() {
        let h = harness();
        assert!(h.lifecycle.start(&h.services));
        h.lifecycle.stop(&h.services);

        assert!(!h.lifecycle.is_active());
        assert_eq!(h.bus.subscriber_count(), 0);
        h.bus.publish(&fixtures::alice_and_editors());
        assert!(h.store.is_empty());

        h.lifecycle.stop(&h.services);
        assert!(!h.lifecycle.is_active());
    }

    #[test]
    fn test_stop_without_change_source_keeps_state() {
        let h = harness();
        assert!(h.lifecycle.start(&h.services));

        h.lifecycle.stop(&ServiceRegistry::new());

        assert!(h.lifecycle.is_active());
        assert_eq!(h.bus.subscriber_count(), 1);
    }

    /// Change source whose `unsubscribe` can be told to refuse.
    struct StubbornSource {
        bus: ChangeBus,
        refuse: std::sync::atomic::AtomicBool,
    }

    impl ChangeSource for StubbornSource {
        fn subscribe(
            &self,
            handler: Arc<dyn ChangeHandler>,
        ) -> Result<SubscriptionId, SubscribeError> {
            self.bus.subscribe(handler)
        }

        fn unsubscribe(&self, subscription: SubscriptionId) -> Result<(), UnsubscribeError> {
            if self.refuse.load(Ordering::SeqCst) {
                return Err(UnsubscribeError::Source("dispatcher busy".to_string()));
            }
            self.bus.unsubscribe(subscription)
        }
    }

    #[test]
    fn test_unsubscribe_failure_keeps_active_until_retry() {
        let h = harness();
        let source = Arc::new(StubbornSource {
            bus: ChangeBus::new(),
            refuse: std::sync::atomic::AtomicBool::new(true),
        });
        let services = ServiceRegistry::new()
            .with_taxonomy_registry(h.registry.clone())
            .with_audit_store(h.store.clone())
            .with_change_source(source.clone());
        assert!(h.lifecycle.start(&services));

        let ((), logs) = capture_logs(|| h.lifecycle.stop(&services));

        assert_eq!(h.lifecycle.state(), LifecycleState::Active);
        assert_eq!(source.bus.subscriber_count(), 1);
        assert_eq!(logs.count_lines(&["WARN", "dispatcher busy"]), 1);
        assert_eq!(logs.count_lines(&["ERROR"]), 0);

        source.refuse.store(false, Ordering::SeqCst);
        h.lifecycle.stop(&services);

        assert_eq!(h.lifecycle.state(), LifecycleState::Inactive);
        assert_eq!(source.bus.subscriber_count(), 0);
    }

    #[test]
    fn test_restart_after_stop() {
        let h = harness();
        assert!(h.lifecycle.start(&h.services));
        h.lifecycle.stop(&h.services);
        assert!(h.lifecycle.start(&h.services));
        assert_eq!(h.bus.subscriber_count(), 1);
        assert_eq!(h.registry.len(), 1);
    }
}
