//! Binding resolution - catalog text → validated credential records
//!
//! Resolution is a single pure pass over the entries of one label:
//!
//! ```text
//! catalog text ──parse──▶ BindingCatalog ──label──▶ entries
//!                                                     │
//!                              per entry: credentials[field] for field in schema
//!                                                     │
//!                                  ┌──────────────────┴─────────────────┐
//!                          CredentialRecord                     IncompleteBinding
//! ```
//!
//! Entry failures are collected next to successes; only a malformed
//! catalog aborts the call.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::{BindingCatalog, BindingEntry};
use crate::error::{BindingError, FieldDefect, Result};
use crate::record::CredentialRecord;
use crate::schema::ServiceSchema;

/// Resolve `label` from raw catalog text against the required fields
///
/// Absent/blank text or an unknown label yield an empty [`Resolution`].
/// Invalid catalog text yields [`BindingError::MalformedCatalog`].
pub fn resolve<S: AsRef<str>>(
    source: Option<&str>,
    label: &str,
    required: &[S],
) -> Result<Resolution> {
    let catalog = BindingCatalog::parse(source)?;
    Ok(catalog.resolve(label, required))
}

/// Resolve with a [`ServiceSchema`] (label and fields taken from the schema)
pub fn resolve_schema(source: Option<&str>, schema: &ServiceSchema) -> Result<Resolution> {
    resolve(source, &schema.label, &schema.required)
}

impl BindingCatalog {
    /// Resolve `label` from an already-parsed catalog
    pub fn resolve<S: AsRef<str>>(&self, label: &str, required: &[S]) -> Resolution {
        let mut resolution = Resolution::default();

        for (index, raw) in self.raw_entries(label).iter().enumerate() {
            match extract_entry(label, index, raw, required) {
                Ok(record) => resolution.records.push(record),
                Err(err) => resolution.failures.push(err),
            }
        }

        resolution
    }

    pub fn resolve_schema(&self, schema: &ServiceSchema) -> Resolution {
        self.resolve(&schema.label, &schema.required)
    }
}

fn extract_entry<S: AsRef<str>>(
    label: &str,
    index: usize,
    raw: &Value,
    required: &[S],
) -> Result<CredentialRecord> {
    let incomplete = |field: &str, reason: FieldDefect| BindingError::IncompleteBinding {
        label: label.to_string(),
        index,
        field: field.to_string(),
        reason,
    };

    let entry = BindingEntry::new(raw)
        .ok_or_else(|| incomplete("credentials", FieldDefect::NotAnObject))?;
    let credentials = match raw.get("credentials") {
        None => return Err(incomplete("credentials", FieldDefect::Missing)),
        Some(_) => entry
            .credentials()
            .ok_or_else(|| incomplete("credentials", FieldDefect::NotAnObject))?,
    };

    let mut fields = BTreeMap::new();
    for field in required {
        let field = field.as_ref();
        let value =
            extract_field(credentials, field).map_err(|reason| incomplete(field, reason))?;
        fields.insert(field.to_string(), value);
    }

    Ok(CredentialRecord::new(
        label,
        index,
        entry.name().map(str::to_string),
        fields,
    ))
}

/// Read one credential field as a string
///
/// Numbers and booleans use their JSON text as written in the catalog
/// (`"port": 3306` → `"3306"`).
fn extract_field(
    credentials: &Map<String, Value>,
    field: &str,
) -> std::result::Result<String, FieldDefect> {
    match credentials.get(field) {
        None => Err(FieldDefect::Missing),
        Some(Value::String(s)) if s.is_empty() => Err(FieldDefect::Empty),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Null | Value::Array(_) | Value::Object(_)) => Err(FieldDefect::NotAString),
    }
}

/// Outcome of resolving one label: valid records plus per-entry failures
///
/// Both lists keep catalog order. Every failure is a
/// [`BindingError::IncompleteBinding`].
#[derive(Debug, Default)]
pub struct Resolution {
    pub records: Vec<CredentialRecord>,
    pub failures: Vec<BindingError>,
}

impl Resolution {
    /// No records and no failures (nothing bound under the label)
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.failures.is_empty()
    }

    /// Every entry produced a record
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// All records, or the first failure if any entry was incomplete
    pub fn into_strict(self) -> Result<Vec<CredentialRecord>> {
        match self.failures.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.records),
        }
    }

    /// Apply a selection policy to the valid records
    ///
    /// Failed entries never count as candidates. When `First` or
    /// `ExactlyOne` finds no valid record but some entry was rejected, the
    /// first rejection is returned instead of [`BindingError::NoBinding`].
    pub fn select(self, label: &str, selection: Selection) -> Result<Vec<CredentialRecord>> {
        let Resolution {
            mut records,
            failures,
        } = self;
        if records.is_empty() && selection != Selection::All {
            return Err(failures
                .into_iter()
                .next()
                .unwrap_or_else(|| BindingError::NoBinding {
                    label: label.to_string(),
                }));
        }

        match selection {
            Selection::All => Ok(records),
            Selection::First => {
                records.truncate(1);
                Ok(records)
            }
            Selection::ExactlyOne => match records.len() {
                1 => Ok(records),
                count => Err(BindingError::AmbiguousBinding {
                    label: label.to_string(),
                    count,
                }),
            },
        }
    }
}

/// How many records a caller wants out of a [`Resolution`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Selection {
    /// First valid record in catalog order
    #[default]
    First,
    /// The single valid record; more than one is an error
    ExactlyOne,
    /// Every valid record
    All,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Selection::First => "first",
            Selection::ExactlyOne => "exactly-one",
            Selection::All => "all",
        };
        f.write_str(text)
    }
}

impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first" => Ok(Selection::First),
            "exactly-one" => Ok(Selection::ExactlyOne),
            "all" => Ok(Selection::All),
            other => Err(format!(
                "unknown selection '{}' (expected first, exactly-one or all)",
                other
            )),
        }
    }
}
