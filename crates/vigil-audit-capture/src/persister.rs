//! Writes audit records to the store.

use crate::collaborators::AuditStore;
use crate::error::PersistenceError;
use std::sync::Arc;
use vigil_audit_types::{AuditRecord, RecordId};
use vigil_common_log::timed;

/// Blocking, exactly-once writer in front of an [`AuditStore`].
///
/// No retries happen here; a failed write is reported once and the record
/// is dropped.
#[derive(Clone)]
pub struct AuditPersister {
    store: Arc<dyn AuditStore>,
}

impl AuditPersister {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Write `record` and return the id the store assigned.
    pub fn persist(&self, record: &AuditRecord) -> Result<RecordId, PersistenceError> {
        let written = timed!(
            "audit_persist",
            self.store
                .write(&record.activity_type, &record.action, &record.data)
        );

        match written? {
            Some(id) if !id.is_nil() => Ok(id),
            _ => Err(PersistenceError::MissingIdentifier {
                activity_type: record.activity_type.clone(),
            }),
        }
    }
}

impl std::fmt::Debug for AuditPersister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditPersister").finish_non_exhaustive()
    }
}
