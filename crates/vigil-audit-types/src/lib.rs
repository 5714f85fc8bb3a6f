//! Data model for Vigil's permission-change audit pipeline.
//!
//! A [`ChangeEvent`] describes an access-rights modification on a piece of
//! content. Each event becomes exactly one [`AuditRecord`], tagged with an
//! [`ActionType`] taken from the registered [`ActivityTaxonomy`].

mod content;
mod event;
mod permission;
mod record;
mod save_type;
mod taxonomy;

pub use content::ContentRef;
pub use event::ChangeEvent;
pub use permission::{AccessLevel, EntityKind, PermissionEntry};
pub use record::{AuditRecord, RecordData, MESSAGE_KEY};
pub use save_type::SaveType;
pub use taxonomy::{ActionType, ActivityTaxonomy, TaxonomyError};

pub use vigil_common_core::RecordId;
