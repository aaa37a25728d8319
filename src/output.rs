//! Output rendering for resolved bindings

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::BindingError;
use crate::record::CredentialRecord;

/// Output format enum
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text, secrets masked (default)
    #[default]
    Text,

    /// JSON document with raw values
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format '{}' (expected text or json)", other)),
        }
    }
}

/// Render records as indented `field = value` blocks
pub fn records_text(records: &[CredentialRecord], show_secrets: bool) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{}[{}]{}",
            record.label(),
            record.index(),
            record
                .name()
                .map(|name| format!(" ({})", name))
                .unwrap_or_default()
        );

        if show_secrets {
            for (field, value) in record.fields() {
                let _ = writeln!(out, "  {} = {}", field, value);
            }
        } else {
            for (field, value) in record.masked_fields() {
                let _ = writeln!(out, "  {} = {}", field, value);
            }
        }
    }
    out
}

/// JSON document for one resolved label
pub fn resolution_json(label: &str, records: &[CredentialRecord], failures: Vec<Value>) -> Value {
    json!({
        "label": label,
        "records": records,
        "failures": failures,
    })
}

pub fn failures_json(failures: &[BindingError]) -> Vec<Value> {
    failures.iter().map(failure_json).collect()
}

/// JSON form of a per-entry failure
pub fn failure_json(err: &BindingError) -> Value {
    match err {
        BindingError::IncompleteBinding {
            label,
            index,
            field,
            reason,
        } => json!({
            "code": err.code(),
            "label": label,
            "index": index,
            "field": field,
            "reason": reason.to_string(),
            "message": err.to_string(),
        }),
        other => json!({
            "code": other.code(),
            "message": other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BindingCatalog;
    use serde_json::json;

    fn resolved() -> crate::resolve::Resolution {
        let catalog = BindingCatalog::from_value(json!({
            "csb-aws-postgresql": [
                {"name": "orders", "credentials": {"hostname": "db.internal", "password": "hunter22"}},
                {"credentials": {"hostname": "db2.internal"}}
            ]
        }))
        .unwrap();
        catalog.resolve("csb-aws-postgresql", &["hostname", "password"])
    }

    #[test]
    fn parse_formats() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn text_masks_secrets_by_default() {
        let resolution = resolved();
        let text = records_text(&resolution.records, false);
        assert!(text.starts_with("csb-aws-postgresql[0] (orders)\n"));
        assert!(text.contains("  hostname = db.internal\n"));
        assert!(text.contains("  password = hun***\n"));
        assert!(!text.contains("hunter22"));
    }

    #[test]
    fn text_shows_secrets_on_request() {
        let resolution = resolved();
        let text = records_text(&resolution.records, true);
        assert!(text.contains("  password = hunter22\n"));
    }

    #[test]
    fn json_lists_records_and_failures() {
        let resolution = resolved();
        let doc = resolution_json(
            "csb-aws-postgresql",
            &resolution.records,
            failures_json(&resolution.failures),
        );

        assert_eq!(doc["label"], "csb-aws-postgresql");
        assert_eq!(doc["records"][0]["fields"]["password"], "hunter22");
        assert_eq!(doc["failures"][0]["index"], 1);
        assert_eq!(doc["failures"][0]["field"], "password");
        assert_eq!(doc["failures"][0]["reason"], "missing");
        assert_eq!(doc["failures"][0]["code"], "SVCB-010");
    }
}
