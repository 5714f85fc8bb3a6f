//! Change-event fixtures.

use vigil_audit_types::{AccessLevel, ChangeEvent, ContentRef, PermissionEntry, SaveType};

/// Content 123 saved with `alice: Full` then `Editors: Edit`.
pub fn alice_and_editors() -> ChangeEvent {
    ChangeEvent::new(ContentRef::new(123), SaveType::ItemSaved)
        .with_entry(PermissionEntry::user("alice", AccessLevel::Full))
        .with_entry(PermissionEntry::group("Editors", AccessLevel::Edit))
}

/// An event on `content` with `count` user entries named `user0..`.
pub fn numbered_users(content: u64, count: usize) -> ChangeEvent {
    (0..count).fold(ChangeEvent::new(content, SaveType::Modify), |event, i| {
        event.with_entry(PermissionEntry::user(format!("user{i}"), AccessLevel::Read))
    })
}
