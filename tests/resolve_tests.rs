//! Resolution behaviour against realistic catalogs
//!
//! Covers the empty/absent cases, malformed catalogs, per-entry failures
//! and determinism over generated catalogs.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use svcbind::{
    resolve, resolve_schema, BindingCatalog, BindingError, ErrorKind, FieldDefect, Selection,
    ServiceKind,
};

const POSTGRES_FIELDS: &[&str] = &["hostname", "jdbcUrl", "name", "password", "port", "username"];

// ============================================================================
// Empty and absent catalogs
// ============================================================================

#[test]
fn absent_or_empty_source_yields_nothing() {
    for source in [None, Some(""), Some("   ")] {
        let resolution = resolve(source, "csb-aws-postgresql", POSTGRES_FIELDS).unwrap();
        assert!(resolution.is_empty());
    }
}

#[test]
fn label_missing_from_valid_catalog_yields_nothing() {
    let text = json!({"csb-google-spanner": [{"credentials": {}}]}).to_string();
    let resolution = resolve(Some(text.as_str()), "csb-aws-postgresql", POSTGRES_FIELDS).unwrap();
    assert!(resolution.records.is_empty());
    assert!(resolution.failures.is_empty());
}

#[test]
fn invalid_json_is_malformed_catalog() {
    for text in ["{", "not json", "{\"csb-aws-postgresql\": [}", "\"just a string\"", "null"] {
        let err = resolve(Some(text), "csb-aws-postgresql", POSTGRES_FIELDS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedCatalog, "input: {text}");
    }
}

// ============================================================================
// Built-in services
// ============================================================================

#[test]
fn dynamodb_entry_resolves_all_five_fields() {
    let text = json!({
        "csb-aws-dynamodb": [{
            "credentials": {
                "access_key_id": "AK",
                "secret_access_key": "SK",
                "region": "us-east-1",
                "dynamodb_table_id": "id1",
                "dynamodb_table_name": "customers"
            }
        }]
    })
    .to_string();

    let schema = ServiceKind::AwsDynamodb.schema();
    let resolution = resolve_schema(Some(text.as_str()), &schema).unwrap();
    assert_eq!(resolution.records.len(), 1);

    let record = &resolution.records[0];
    let fields: Vec<(&str, &str)> = record
        .fields()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("access_key_id", "AK"),
            ("dynamodb_table_id", "id1"),
            ("dynamodb_table_name", "customers"),
            ("region", "us-east-1"),
            ("secret_access_key", "SK"),
        ]
    );
}

#[test]
fn bigquery_second_entry_missing_dataset_is_reported_separately() {
    let text = json!({
        "csb-google-bigquery": [
            {"credentials": {"ProjectId": "p1", "dataset_id": "d1", "Credentials": "{}"}},
            {"credentials": {"ProjectId": "p2", "Credentials": "{}"}}
        ]
    })
    .to_string();

    let schema = ServiceKind::GoogleBigquery.schema();
    let resolution = resolve_schema(Some(text.as_str()), &schema).unwrap();

    assert_eq!(resolution.records.len(), 1);
    assert_eq!(resolution.records[0].get("ProjectId"), Some("p1"));
    assert_eq!(resolution.records[0].index(), 0);

    assert_eq!(resolution.failures.len(), 1);
    match &resolution.failures[0] {
        BindingError::IncompleteBinding {
            label,
            index,
            field,
            reason,
        } => {
            assert_eq!(label, "csb-google-bigquery");
            assert_eq!(*index, 1);
            assert_eq!(field, "dataset_id");
            assert_eq!(*reason, FieldDefect::Missing);
        }
        other => panic!("unexpected failure: {other}"),
    }
}

#[test]
fn mysql_tile_numeric_port_is_stringified() {
    let text = r#"{
      "p.mysql": [{
        "label": "p.mysql",
        "name": "my-instance",
        "plan": "db-medium",
        "provider": null,
        "syslog_drain_url": null,
        "tags": ["mysql"],
        "credentials": {
          "hostname": "10.0.0.20",
          "jdbcUrl": "jdbc:mysql://10.0.0.20:3306/service_instance_db?user=u&password=p",
          "name": "service_instance_db",
          "password": "z9z6eskdbs1rhtxt",
          "port": 3306,
          "username": "fefcbe8360854a18a7994b870e7b0bf5"
        },
        "volume_mounts": []
      }]
    }"#;

    let resolution = resolve(Some(text), "p.mysql", POSTGRES_FIELDS).unwrap();
    let record = &resolution.records[0];
    assert_eq!(record.get("port"), Some("3306"));
    assert_eq!(
        record.get("jdbcUrl"),
        Some("jdbc:mysql://10.0.0.20:3306/service_instance_db?user=u&password=p")
    );
    assert_eq!(record.name(), Some("my-instance"));
}

#[test]
fn exactly_one_mirrors_single_tag_rule() {
    let catalog = BindingCatalog::from_value(json!({
        "csb-aws-postgresql": [
            {"credentials": {"hostname": "a", "jdbcUrl": "j", "name": "n", "password": "p", "port": "1", "username": "u"}},
            {"credentials": {"hostname": "b", "jdbcUrl": "j", "name": "n", "password": "p", "port": "1", "username": "u"}}
        ]
    }))
    .unwrap();

    let err = catalog
        .resolve("csb-aws-postgresql", POSTGRES_FIELDS)
        .select("csb-aws-postgresql", Selection::ExactlyOne)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AmbiguousBinding);
    assert_eq!(
        err.to_string(),
        "[SVCB-021] Expected exactly one binding for 'csb-aws-postgresql', found 2"
    );
}

// ============================================================================
// Properties
// ============================================================================

fn field_name() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,11}"
}

fn field_value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,6}",
        "[ -~]{1,24}",
        Just("true".to_string()),
        Just("007".to_string()),
    ]
}

fn entries() -> impl Strategy<Value = Vec<Vec<(String, String)>>> {
    prop::collection::vec(
        prop::collection::btree_map(field_name(), field_value(), 1..6)
            .prop_map(|m| m.into_iter().collect::<Vec<_>>()),
        0..5,
    )
}

proptest! {
    #[test]
    fn resolving_twice_gives_identical_results(entries in entries()) {
        let mut catalog = BindingCatalog::new();
        for creds in &entries {
            catalog.push("svc", creds.clone());
        }
        let text = catalog.to_json_string().unwrap();
        let required: Vec<String> = entries
            .first()
            .map(|creds| creds.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default();

        let first = resolve(Some(text.as_str()), "svc", &required).unwrap();
        let second = resolve(Some(text.as_str()), "svc", &required).unwrap();

        prop_assert_eq!(&first.records, &second.records);
        let first_failures: Vec<String> = first.failures.iter().map(|e| e.to_string()).collect();
        let second_failures: Vec<String> = second.failures.iter().map(|e| e.to_string()).collect();
        prop_assert_eq!(first_failures, second_failures);
        prop_assert_eq!(first.records.len() + first.failures.len(), entries.len());
    }

    #[test]
    fn credential_values_survive_catalog_round_trip(entries in entries()) {
        let mut catalog = BindingCatalog::new();
        for creds in &entries {
            catalog.push("svc", creds.clone());
        }
        let text = catalog.to_json_string().unwrap();

        for (index, creds) in entries.iter().enumerate() {
            let required: Vec<&str> = creds.iter().map(|(k, _)| k.as_str()).collect();
            let resolution = resolve(Some(text.as_str()), "svc", &required).unwrap();
            let record = resolution
                .records
                .iter()
                .find(|r| r.index() == index)
                .expect("entry resolves against its own fields");
            for (field, value) in creds {
                prop_assert_eq!(record.get(field), Some(value.as_str()));
            }
        }
    }
}
