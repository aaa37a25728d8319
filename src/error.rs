//! Error types with error codes and fix suggestions
//!
//! Error code ranges:
//! - SVCB-000-009: Catalog errors
//! - SVCB-010-019: Binding entry errors
//! - SVCB-020-029: Selection errors
//! - SVCB-030-039: Configuration/IO errors

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BindingError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Why a single field of a binding entry could not be extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefect {
    /// Field is absent from the credentials block
    Missing,
    /// Field is present but holds an empty string
    Empty,
    /// Field is null, an object or an array
    NotAString,
    /// Entry or credentials block is not a JSON object
    NotAnObject,
}

impl fmt::Display for FieldDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FieldDefect::Missing => "missing",
            FieldDefect::Empty => "empty",
            FieldDefect::NotAString => "not representable as a string",
            FieldDefect::NotAnObject => "not a JSON object",
        };
        f.write_str(text)
    }
}

/// Coarse classification of [`BindingError`], for boundary layers that
/// map failures onto status or exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedCatalog,
    IncompleteBinding,
    NoBinding,
    AmbiguousBinding,
    UnknownService,
    Config,
    Io,
}

impl ErrorKind {
    /// Process exit code used by the CLI for this kind
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::MalformedCatalog => 3,
            ErrorKind::IncompleteBinding => 4,
            ErrorKind::NoBinding => 5,
            ErrorKind::AmbiguousBinding => 6,
            ErrorKind::UnknownService => 7,
            ErrorKind::Config => 8,
            ErrorKind::Io => 9,
        }
    }
}

/// All error variants are part of the public API.
#[derive(Error, Debug)]
pub enum BindingError {
    // ─────────────────────────────────────────────────────────────
    // Catalog errors (SVCB-000 to SVCB-009)
    // ─────────────────────────────────────────────────────────────
    #[error("[SVCB-001] Malformed binding catalog: {details}")]
    MalformedCatalog { details: String },

    // ─────────────────────────────────────────────────────────────
    // Entry errors (SVCB-010 to SVCB-019)
    // ─────────────────────────────────────────────────────────────
    #[error("[SVCB-010] Incomplete binding {label}[{index}]: field '{field}' is {reason}")]
    IncompleteBinding {
        label: String,
        index: usize,
        field: String,
        reason: FieldDefect,
    },

    // ─────────────────────────────────────────────────────────────
    // Selection errors (SVCB-020 to SVCB-029)
    // ─────────────────────────────────────────────────────────────
    #[error("[SVCB-020] No valid binding found for '{label}'")]
    NoBinding { label: String },

    #[error("[SVCB-021] Expected exactly one binding for '{label}', found {count}")]
    AmbiguousBinding { label: String, count: usize },

    #[error("[SVCB-022] No schema known for service label '{label}'")]
    UnknownService { label: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration/IO errors (SVCB-030 to SVCB-039)
    // ─────────────────────────────────────────────────────────────
    #[error("[SVCB-030] Configuration error: {reason}")]
    ConfigError { reason: String },

    #[error("[SVCB-031] IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BindingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BindingError::MalformedCatalog { .. } => ErrorKind::MalformedCatalog,
            BindingError::IncompleteBinding { .. } => ErrorKind::IncompleteBinding,
            BindingError::NoBinding { .. } => ErrorKind::NoBinding,
            BindingError::AmbiguousBinding { .. } => ErrorKind::AmbiguousBinding,
            BindingError::UnknownService { .. } => ErrorKind::UnknownService,
            BindingError::ConfigError { .. } => ErrorKind::Config,
            BindingError::Io(_) => ErrorKind::Io,
        }
    }

    /// Stable error code (e.g. "SVCB-010")
    pub fn code(&self) -> &'static str {
        match self {
            BindingError::MalformedCatalog { .. } => "SVCB-001",
            BindingError::IncompleteBinding { .. } => "SVCB-010",
            BindingError::NoBinding { .. } => "SVCB-020",
            BindingError::AmbiguousBinding { .. } => "SVCB-021",
            BindingError::UnknownService { .. } => "SVCB-022",
            BindingError::ConfigError { .. } => "SVCB-030",
            BindingError::Io(_) => "SVCB-031",
        }
    }
}

impl From<serde_json::Error> for BindingError {
    fn from(err: serde_json::Error) -> Self {
        BindingError::MalformedCatalog {
            details: err.to_string(),
        }
    }
}

impl FixSuggestion for BindingError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            BindingError::MalformedCatalog { .. } => {
                Some("The catalog must be a JSON object mapping labels to arrays of bindings")
            }
            BindingError::IncompleteBinding { .. } => {
                Some("Rebind the service instance or check the broker's credential output")
            }
            BindingError::NoBinding { .. } => {
                Some("Bind a service instance of this type to the application")
            }
            BindingError::AmbiguousBinding { .. } => {
                Some("Unbind the extra instances or use --select first / --select all")
            }
            BindingError::UnknownService { .. } => {
                Some("Pass --field for each required field or declare the label under [schemas]")
            }
            BindingError::ConfigError { .. } => Some("Check svcbind.toml syntax and values"),
            BindingError::Io(_) => Some("Check file path and permissions"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_binding_message_names_entry_and_field() {
        let err = BindingError::IncompleteBinding {
            label: "csb-google-bigquery".to_string(),
            index: 1,
            field: "dataset_id".to_string(),
            reason: FieldDefect::Missing,
        };
        assert_eq!(
            err.to_string(),
            "[SVCB-010] Incomplete binding csb-google-bigquery[1]: field 'dataset_id' is missing"
        );
        assert_eq!(err.kind(), ErrorKind::IncompleteBinding);
        assert_eq!(err.code(), "SVCB-010");
    }

    #[test]
    fn json_errors_become_malformed_catalog() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: BindingError = json_err.into();
        assert_eq!(err.kind(), ErrorKind::MalformedCatalog);
        assert!(err.to_string().starts_with("[SVCB-001]"));
    }

    #[test]
    fn every_kind_has_distinct_exit_code() {
        let kinds = [
            ErrorKind::MalformedCatalog,
            ErrorKind::IncompleteBinding,
            ErrorKind::NoBinding,
            ErrorKind::AmbiguousBinding,
            ErrorKind::UnknownService,
            ErrorKind::Config,
            ErrorKind::Io,
        ];
        let mut codes: Vec<i32> = kinds.iter().map(|k| k.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(!codes.contains(&0));
        assert!(!codes.contains(&1));
    }

    #[test]
    fn all_variants_have_suggestions() {
        let err = BindingError::NoBinding {
            label: "csb-aws-dynamodb".to_string(),
        };
        assert!(err.fix_suggestion().is_some());
    }
}
