//! The `replay` and `taxonomy` commands.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::info;
use vigil_audit_capture::{
    build_taxonomy, AuditLifecycle, ChangeBus, FixedActor, InMemoryRegistry, InMemoryStore,
    ServiceRegistry,
};
use vigil_audit_types::ChangeEvent;
use vigil_common_config::AuditConfig;
use vigil_common_core::{Error, Result};

use crate::cli::ReplayCommand;
use crate::output::{render_records, render_taxonomy, OutputFormat};

/// Parse change events, one JSON object per non-blank line.
pub fn parse_events(reader: impl Read) -> Result<Vec<ChangeEvent>> {
    let mut events = Vec::new();
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line)
            .map_err(|e| Error::serialization(format!("line {}: {e}", index + 1)))?;
        events.push(event);
    }
    Ok(events)
}

fn load_events(path: &Path) -> Result<Vec<ChangeEvent>> {
    if path == Path::new("-") {
        parse_events(std::io::stdin().lock())
    } else {
        parse_events(std::fs::File::open(path)?)
    }
}

pub fn run(cmd: &ReplayCommand, config: &AuditConfig, format: OutputFormat) -> anyhow::Result<()> {
    let events = load_events(&cmd.events)
        .with_context(|| format!("reading events from {}", cmd.events.display()))?;

    let store = Arc::new(InMemoryStore::new());
    let bus = Arc::new(ChangeBus::new());
    let services = ServiceRegistry::new()
        .with_taxonomy_registry(Arc::new(InMemoryRegistry::new()))
        .with_audit_store(store.clone())
        .with_change_source(bus.clone());

    let lifecycle = AuditLifecycle::from_config(config, Arc::new(FixedActor::new(&cmd.actor)));
    if !lifecycle.start(&services) {
        bail!("audit capture did not start (disabled or misconfigured)");
    }

    for event in &events {
        bus.publish(event);
    }
    let stats = lifecycle.stats().unwrap_or_default();
    lifecycle.stop(&services);

    info!(
        events = events.len(),
        persisted = stats.persisted,
        failed = stats.failed,
        "replay finished"
    );

    let rendered = render_records(&store.records(), format);
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}

pub fn print_taxonomy(config: &AuditConfig, format: OutputFormat) -> anyhow::Result<()> {
    let taxonomy = build_taxonomy(&config.activity_type)?;
    println!("{}", render_taxonomy(&taxonomy, format));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_audit_types::SaveType;

    #[test]
    fn test_parse_events_skips_blank_lines() {
        let input = "{\"content\":{\"id\":1},\"save_type\":\"Copied\"}\n\n  \n{\"content\":{\"id\":2}}\n";
        let events = parse_events(input.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].save_type, SaveType::Copied);
        assert_eq!(events[1].save_type, SaveType::None);
    }

    #[test]
    fn test_parse_events_reports_line_number() {
        let input = "{\"content\":{\"id\":1}}\nnot json\n";
        let err = parse_events(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Serialization(ref m) if m.starts_with("line 2:")));
    }
}
