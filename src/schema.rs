//! Service schemas - the credential fields each service type requires
//!
//! The five built-in labels are a compatibility contract with the
//! brokers that produce them; field names are case-sensitive and match
//! what the brokers emit (`ProjectId`, not `project_id`).

use std::fmt;
use std::str::FromStr;

use crate::error::BindingError;

/// A service label together with its required credential fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSchema {
    pub label: String,
    pub required: Vec<String>,
}

impl ServiceSchema {
    pub fn new<I, S>(label: impl Into<String>, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            required: required.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ServiceKind> for ServiceSchema {
    fn from(kind: ServiceKind) -> Self {
        ServiceSchema::new(kind.label(), kind.required_fields().iter().copied())
    }
}

/// Built-in service types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    AwsPostgresql,
    AwsDynamodb,
    GoogleBigquery,
    GoogleSpanner,
    GoogleStorageBucket,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 5] = [
        ServiceKind::AwsPostgresql,
        ServiceKind::AwsDynamodb,
        ServiceKind::GoogleBigquery,
        ServiceKind::GoogleSpanner,
        ServiceKind::GoogleStorageBucket,
    ];

    /// Catalog label for this service type
    pub fn label(self) -> &'static str {
        match self {
            ServiceKind::AwsPostgresql => "csb-aws-postgresql",
            ServiceKind::AwsDynamodb => "csb-aws-dynamodb",
            ServiceKind::GoogleBigquery => "csb-google-bigquery",
            ServiceKind::GoogleSpanner => "csb-google-spanner",
            ServiceKind::GoogleStorageBucket => "csb-google-storage-bucket",
        }
    }

    /// Credential fields a client constructor needs
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            ServiceKind::AwsPostgresql => {
                &["hostname", "jdbcUrl", "name", "password", "port", "username"]
            }
            ServiceKind::AwsDynamodb => &[
                "access_key_id",
                "secret_access_key",
                "region",
                "dynamodb_table_id",
                "dynamodb_table_name",
            ],
            ServiceKind::GoogleBigquery => &["ProjectId", "dataset_id", "Credentials"],
            ServiceKind::GoogleSpanner => &["ProjectId", "db_name", "instance", "Credentials"],
            ServiceKind::GoogleStorageBucket => {
                &["ProjectId", "bucket_name", "Name", "Credentials"]
            }
        }
    }

    pub fn schema(self) -> ServiceSchema {
        self.into()
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ServiceKind {
    type Err = BindingError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.label() == label)
            .ok_or_else(|| BindingError::UnknownService {
                label: label.to_string(),
            })
    }
}
