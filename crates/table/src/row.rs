//! Row access for any resource.

use serde_json::Value;

use backoffice_core::envelope::lookup;
use backoffice_core::{Entity, Resource, ResourceId};

/// What the table needs from a row: its id and a JSON record to read cells from.
pub trait TableRow {
    fn row_id(&self) -> ResourceId;

    fn record(&self) -> Value;
}

impl<R: Resource> TableRow for R {
    fn row_id(&self) -> ResourceId {
        self.id().clone()
    }

    fn record(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Text of the field at `path` (dot-separated) in `record`; missing is empty.
pub fn cell_text(record: &Value, path: &str) -> String {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    match lookup(record, &segments) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "Yes".to_string(),
        Some(Value::Bool(false)) => "No".to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other @ Value::Object(_)) => other.to_string(),
    }
}

/// `in_transit` / `IN-TRANSIT` -> `In transit`.
pub fn status_label(raw: &str) -> String {
    let words = raw.replace(['_', '-'], " ").to_lowercase();
    let mut chars = words.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cells_follow_dotted_paths() {
        let record = json!({
            "name": "Bolt",
            "price": 2.5,
            "active": true,
            "supplier": { "name": "Acme" },
            "tags": ["steel", "m8"],
            "note": null
        });

        assert_eq!(cell_text(&record, "name"), "Bolt");
        assert_eq!(cell_text(&record, "price"), "2.5");
        assert_eq!(cell_text(&record, "active"), "Yes");
        assert_eq!(cell_text(&record, "supplier.name"), "Acme");
        assert_eq!(cell_text(&record, "tags"), "steel, m8");
        assert_eq!(cell_text(&record, "note"), "");
        assert_eq!(cell_text(&record, "missing"), "");
    }

    #[test]
    fn status_labels_are_humanized() {
        assert_eq!(status_label("in_transit"), "In transit");
        assert_eq!(status_label("ACTIVE"), "Active");
        assert_eq!(status_label("partially-received"), "Partially received");
        assert_eq!(status_label(""), "");
    }
}
