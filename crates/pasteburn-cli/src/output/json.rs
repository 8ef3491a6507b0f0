//! JSON output formatting for paste results.

use pasteburn_core::{Disclosure, IngestOutcome};

/// Convert an ingest outcome to JSON for output.
///
/// A published paste also carries its bare id.
pub fn ingest_json(outcome: &IngestOutcome) -> anyhow::Result<serde_json::Value> {
    let mut value = serde_json::to_value(outcome)?;
    if let (IngestOutcome::Published { url }, Some(object)) = (outcome, value.as_object_mut()) {
        if let Some(id) = url.rsplit('/').next() {
            object.insert("id".to_string(), serde_json::Value::from(id));
        }
    }
    Ok(value)
}

/// Convert a disclosed paste to JSON for output.
pub fn disclosure_json(short_id: &str, disclosure: &Disclosure) -> serde_json::Value {
    serde_json::json!({
        "id": short_id,
        "content_type": disclosure.kind.mime(),
        "content": String::from_utf8_lossy(disclosure.content.as_bytes()),
    })
}
