//! Printing stored records.

use serde_json::json;
use vigil_audit_capture::StoredRecord;
use vigil_audit_types::{ActivityTaxonomy, MESSAGE_KEY};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One line per record: `<id> [<label>] <message>`.
pub fn render_records(records: &[StoredRecord], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => records
            .iter()
            .map(|r| {
                let message = r.data.get(MESSAGE_KEY).and_then(|m| m.as_str()).unwrap_or_default();
                format!("{} [{}] {}", r.id, r.action.label, message)
            })
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => {
            let rows: Vec<_> = records
                .iter()
                .map(|r| {
                    json!({
                        "id": r.id.to_string(),
                        "activity_type": r.activity_type,
                        "action": r.action,
                        "data": r.data,
                    })
                })
                .collect();
            serde_json::to_string_pretty(&rows).unwrap_or_default()
        }
    }
}

/// `<code>\t<label>` per action, or the taxonomy as JSON.
pub fn render_taxonomy(taxonomy: &ActivityTaxonomy, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut lines = vec![taxonomy.name().to_string()];
            lines.extend(
                taxonomy
                    .actions()
                    .iter()
                    .map(|a| format!("{}\t{}", a.code, a.label)),
            );
            lines.join("\n")
        }
        OutputFormat::Json => serde_json::to_string_pretty(taxonomy).unwrap_or_default(),
    }
}
