//! Renders change events into audit messages.

use crate::collaborators::SecurityContext;
use std::sync::Arc;
use vigil_audit_types::{ChangeEvent, PermissionEntry};

/// `"<kind>: <name> access level set to: <level>."`
pub fn describe_entry(entry: &PermissionEntry) -> String {
    format!(
        "{}: {} access level set to: {}.",
        entry.entity_kind, entry.name, entry.access_level
    )
}

/// Entry descriptions joined by single spaces, in event order.
pub fn describe_entries(entries: &[PermissionEntry]) -> String {
    entries
        .iter()
        .map(describe_entry)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full message: actor, content, save type, then the entry descriptions.
pub fn render_message(actor: &str, event: &ChangeEvent) -> String {
    let header = format!(
        "{actor} set access rights on content {} ({}).",
        event.content, event.save_type
    );
    if event.entries.is_empty() {
        header
    } else {
        format!("{header} {}", describe_entries(&event.entries))
    }
}

/// A rendered message and the principal it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedChange {
    pub actor: String,
    pub message: String,
}

impl std::fmt::Display for FormattedChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Formats events using the ambient security principal as the actor.
///
/// The event's own `creator` is ignored; emitters leave it empty.
#[derive(Clone)]
pub struct ChangeFormatter {
    security: Arc<dyn SecurityContext>,
}

impl ChangeFormatter {
    pub fn new(security: Arc<dyn SecurityContext>) -> Self {
        Self { security }
    }

    /// The acting principal, looked up now.
    pub fn actor(&self) -> String {
        self.security.current_actor_name()
    }

    /// Render `event`, looking the actor up exactly once.
    pub fn format(&self, event: &ChangeEvent) -> FormattedChange {
        let actor = self.actor();
        let message = render_message(&actor, event);
        FormattedChange { actor, message }
    }
}

impl std::fmt::Debug for ChangeFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFormatter").finish_non_exhaustive()
    }
}
