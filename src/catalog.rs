//! Binding catalog - the platform-provided service binding document
//!
//! The catalog is a JSON object mapping service labels to arrays of
//! binding entries:
//!
//! ```json
//! {
//!   "csb-aws-dynamodb": [
//!     { "name": "orders", "tags": ["aws"], "credentials": { "region": "us-east-1" } }
//!   ]
//! }
//! ```
//!
//! Parsing only validates the outer shape (object of arrays). Individual
//! entries are kept as raw JSON so a single bad entry never poisons the
//! whole document; entry problems surface later, per entry, during
//! resolution.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{BindingError, Result};

/// Parsed binding catalog (service label → ordered entries)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BindingCatalog {
    services: BTreeMap<String, Vec<Value>>,
}

impl BindingCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse catalog text
    ///
    /// Absent or blank text yields an empty catalog ("no bindings
    /// configured"), never an error. Anything else must be a JSON object
    /// whose members are all arrays.
    pub fn parse(source: Option<&str>) -> Result<Self> {
        let Some(text) = source else {
            return Ok(Self::new());
        };
        if text.trim().is_empty() {
            return Ok(Self::new());
        }

        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Build a catalog from an already-parsed JSON document
    pub fn from_value(value: Value) -> Result<Self> {
        let root = match value {
            Value::Object(root) => root,
            other => {
                return Err(BindingError::MalformedCatalog {
                    details: format!(
                        "expected a JSON object at the root, found {}",
                        type_name(&other)
                    ),
                });
            }
        };

        let mut services = BTreeMap::new();
        for (label, entries) in root {
            match entries {
                Value::Array(entries) => {
                    services.insert(label, entries);
                }
                other => {
                    return Err(BindingError::MalformedCatalog {
                        details: format!(
                            "label '{}' must map to an array, found {}",
                            label,
                            type_name(&other)
                        ),
                    });
                }
            }
        }

        Ok(Self { services })
    }

    /// Check if the catalog has no labels at all
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Service labels present in the catalog, sorted
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Raw entries bound under `label`, in catalog order
    ///
    /// Returns an empty slice when the label is absent.
    pub fn raw_entries(&self, label: &str) -> &[Value] {
        self.services.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of entries bound under `label`
    pub fn count(&self, label: &str) -> usize {
        self.raw_entries(label).len()
    }

    /// Entries under `label` that are JSON objects, with their index
    pub fn entries<'a>(&'a self, label: &str) -> impl Iterator<Item = (usize, BindingEntry<'a>)> {
        self.raw_entries(label)
            .iter()
            .enumerate()
            .filter_map(|(index, value)| BindingEntry::new(value).map(|entry| (index, entry)))
    }

    /// All entries carrying `tag`, as (label, index, entry)
    ///
    /// Labels are visited in sorted order, entries in catalog order.
    pub fn tagged<'a>(&'a self, tag: &str) -> Vec<(&'a str, usize, BindingEntry<'a>)> {
        let mut found = Vec::new();
        for label in self.services.keys() {
            for (index, entry) in self.entries(label) {
                if entry.has_tag(tag) {
                    found.push((label.as_str(), index, entry));
                }
            }
        }
        found
    }

    /// Append an entry with the given credentials under `label`
    ///
    /// Mostly useful for building fixtures; the platform normally
    /// produces the catalog.
    pub fn push<I, K, V>(&mut self, label: impl Into<String>, credentials: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let credentials: Map<String, Value> = credentials
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut entry = Map::new();
        entry.insert("credentials".to_string(), Value::Object(credentials));

        self.services
            .entry(label.into())
            .or_default()
            .push(Value::Object(entry));
        self
    }

    /// Serialize back to catalog text
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Read-only view of one bound service instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindingEntry<'a> {
    raw: &'a Map<String, Value>,
}

impl<'a> BindingEntry<'a> {
    /// View a raw entry; `None` if it is not a JSON object
    pub fn new(value: &'a Value) -> Option<Self> {
        value.as_object().map(|raw| Self { raw })
    }

    /// The `credentials` block, if present and an object
    pub fn credentials(&self) -> Option<&'a Map<String, Value>> {
        self.raw.get("credentials").and_then(Value::as_object)
    }

    /// Binding (instance) name chosen by the user
    pub fn name(&self) -> Option<&'a str> {
        self.str_field("name")
    }

    /// Service offering label as reported by the entry itself
    pub fn label(&self) -> Option<&'a str> {
        self.str_field("label")
    }

    pub fn plan(&self) -> Option<&'a str> {
        self.str_field("plan")
    }

    pub fn instance_name(&self) -> Option<&'a str> {
        self.str_field("instance_name")
    }

    pub fn binding_name(&self) -> Option<&'a str> {
        self.str_field("binding_name")
    }

    /// String tags; non-string tag values are skipped
    pub fn tags(&self) -> Vec<&'a str> {
        self.raw
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().contains(&tag)
    }

    fn str_field(&self, key: &str) -> Option<&'a str> {
        self.raw.get(key).and_then(Value::as_str)
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
