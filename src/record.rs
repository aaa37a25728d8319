//! Credential records - validated, schema-complete credential fields

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Field names that are always treated as secret
const SECRET_FIELDS: &[&str] = &["jdbcUrl", "uri", "Credentials", "PrivateKeyData"];

/// Substrings that mark a field name as secret (matched case-insensitively)
const SECRET_MARKERS: &[&str] = &["password", "secret", "key", "credential", "token"];

/// Characters of a secret shown before the mask
const VISIBLE_CHARS: usize = 3;

/// One bound service instance's credentials, every required field present
/// and non-empty
///
/// `Debug` masks secret fields; serialization emits raw values.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CredentialRecord {
    label: String,
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    fields: BTreeMap<String, String>,
}

impl CredentialRecord {
    pub(crate) fn new(
        label: impl Into<String>,
        index: usize,
        name: Option<String>,
        fields: BTreeMap<String, String>,
    ) -> Self {
        Self {
            label: label.into(),
            index,
            name,
            fields,
        }
    }

    /// Service label the record was resolved from
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Position of the entry within its label's array
    pub fn index(&self) -> usize {
        self.index
    }

    /// Binding name, when the catalog entry carries one
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields with secret values masked, for display
    pub fn masked_fields(&self) -> impl Iterator<Item = (&str, Cow<'_, str>)> {
        self.fields.iter().map(|(field, value)| {
            let shown = if is_secret_field(field) {
                Cow::Owned(mask_secret(value, VISIBLE_CHARS))
            } else {
                Cow::Borrowed(value.as_str())
            };
            (field.as_str(), shown)
        })
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked: BTreeMap<&str, Cow<'_, str>> = self.masked_fields().collect();
        f.debug_struct("CredentialRecord")
            .field("label", &self.label)
            .field("index", &self.index)
            .field("name", &self.name)
            .field("fields", &masked)
            .finish()
    }
}

/// Check whether a credential field holds a secret
pub fn is_secret_field(field: &str) -> bool {
    if SECRET_FIELDS.contains(&field) {
        return true;
    }
    let lower = field.to_ascii_lowercase();
    SECRET_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Mask a secret for display
///
/// Shows the first N chars + asterisks, e.g. "z9z***"
pub fn mask_secret(value: &str, visible_chars: usize) -> String {
    if value.is_empty() {
        return String::new();
    }

    let visible: String = value.chars().take(visible_chars).collect();
    format!("{}***", visible)
}
