//! svcbind - service binding catalog resolver
//!
//! Turns the platform-injected binding catalog (`VCAP_SERVICES`) into
//! validated credential records for a requested service label.
//!
//! ```
//! use svcbind::{resolve, ServiceKind};
//!
//! let catalog = r#"{"csb-aws-dynamodb": [{"credentials": {
//!     "access_key_id": "AK", "secret_access_key": "SK", "region": "us-east-1",
//!     "dynamodb_table_id": "id1", "dynamodb_table_name": "customers"}}]}"#;
//!
//! let kind = ServiceKind::AwsDynamodb;
//! let resolution = resolve(Some(catalog), kind.label(), kind.required_fields()).unwrap();
//! assert_eq!(resolution.records[0].get("region"), Some("us-east-1"));
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod output;
pub mod record;
pub mod resolve;
pub mod schema;
pub mod snapshot;

pub use catalog::{BindingCatalog, BindingEntry};
pub use config::ResolverConfig;
pub use error::{BindingError, ErrorKind, FieldDefect, FixSuggestion, Result};
pub use output::OutputFormat;
pub use record::CredentialRecord;
pub use resolve::{resolve, resolve_schema, Resolution, Selection};
pub use schema::{ServiceKind, ServiceSchema};
pub use snapshot::CatalogSnapshot;
