//! Error taxonomy of the capture pipeline.
//!
//! None of these escape [`AuditLifecycle::start`](crate::AuditLifecycle::start),
//! [`AuditLifecycle::stop`](crate::AuditLifecycle::stop) or the per-event
//! handler; they exist so each failing step can be logged precisely.

use strum::Display;
use thiserror::Error;
use vigil_audit_types::TaxonomyError;
use vigil_common_core::SubscriptionId;

/// The four ordered startup steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StartupStep {
    ResolveRegistry,
    RegisterTaxonomy,
    ResolveStore,
    SubscribeChanges,
}

/// Failure reported by a taxonomy registry backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("taxonomy registry error: {message}")]
pub struct RegistryError {
    pub message: String,
}

impl RegistryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure reported by an audit store backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("audit store unavailable: {0}")]
    Unavailable(String),

    #[error("audit store rejected record: {0}")]
    Rejected(String),
}

/// Failure reported by a change source when subscribing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("subscription rejected: {reason}")]
pub struct SubscribeError {
    pub reason: String,
}

impl SubscribeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failure reported by a change source when unsubscribing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsubscribeError {
    #[error("unknown subscription {0}")]
    UnknownSubscription(SubscriptionId),

    #[error("change source refused to unsubscribe: {0}")]
    Source(String),
}

/// Taxonomy upsert failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("taxonomy registry handle is absent")]
    RegistryMissing,

    #[error(transparent)]
    InvalidTaxonomy(#[from] TaxonomyError),

    #[error(transparent)]
    Rejected(#[from] RegistryError),
}

/// Store write failed or returned no identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("audit store returned no identifier for a '{activity_type}' record")]
    MissingIdentifier { activity_type: String },
}

/// Any failure inside the capture pipeline.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("required dependency unavailable: {dependency}")]
    DependencyUnavailable { dependency: &'static str },

    #[error("taxonomy registration failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error("subscribing to change notifications failed: {0}")]
    Subscribe(#[from] SubscribeError),

    #[error("persisting audit record failed: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("unsubscribing from change notifications failed: {0}")]
    UnsubscribeFailure(#[from] UnsubscribeError),

    #[error("panicked: {0}")]
    Panicked(String),
}

impl CaptureError {
    pub fn dependency(dependency: &'static str) -> Self {
        Self::DependencyUnavailable { dependency }
    }

    /// Build from a caught panic payload.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self::Panicked(message)
    }
}

/// A startup failure tagged with the step that produced it.
#[derive(Debug, Error)]
#[error("audit startup failed at step '{step}': {source}")]
pub struct StartupError {
    pub step: StartupStep,
    #[source]
    pub source: CaptureError,
}
