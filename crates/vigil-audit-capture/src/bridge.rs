//! Blocking adapter for asynchronous audit stores.

use crate::collaborators::AuditStore;
use crate::error::StoreError;
use async_trait::async_trait;
use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};
use tokio::task::block_in_place;
use vigil_audit_types::{ActionType, RecordData, RecordId};
use vigil_common_log::spans::{instrument_future, store_span};

/// An audit store whose write path is asynchronous.
#[async_trait]
pub trait AsyncAuditStore: Send + Sync {
    async fn write(
        &self,
        activity_type: &str,
        action: &ActionType,
        data: &RecordData,
    ) -> Result<Option<RecordId>, StoreError>;
}

/// Presents an [`AsyncAuditStore`] as a blocking [`AuditStore`].
///
/// Outside any runtime, writes are driven on an owned current-thread runtime.
/// On a multi-thread runtime they run on the caller's runtime through
/// [`block_in_place`]. A current-thread runtime cannot block its only worker,
/// so writes from there are refused.
pub struct BlockingStore<S> {
    inner: S,
    runtime: Runtime,
}

impl<S: AsyncAuditStore> BlockingStore<S> {
    pub fn new(inner: S) -> Result<Self, StoreError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Unavailable(format!("failed to build store runtime: {e}")))?;
        Ok(Self { inner, runtime })
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: AsyncAuditStore> AuditStore for BlockingStore<S> {
    fn write(
        &self,
        activity_type: &str,
        action: &ActionType,
        data: &RecordData,
    ) -> Result<Option<RecordId>, StoreError> {
        let write = instrument_future(
            self.inner.write(activity_type, action, data),
            store_span(activity_type),
        );
        match Handle::try_current() {
            Err(_) => self.runtime.block_on(write),
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                block_in_place(|| handle.block_on(write))
            }
            Ok(_) => Err(StoreError::Unavailable(
                "blocking store called from a current-thread runtime".to_string(),
            )),
        }
    }
}
