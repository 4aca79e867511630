use proptest::prelude::*;
use rulebook::error::Severity;
use rulebook::validate;
use rulebook::validate::{MISSING_RESOURCE, MISSING_SCHEMA};
use std::collections::BTreeSet;

const SCHEMA: &str = r#"
root:
  key_a: "~ exactly this"
  key_b: "@ num | > 15"
  key_c: "> root:key_b"
"#;

fn resource(key_a: &str, key_b: i32, key_c: i32) -> String {
    format!(
        "root:\n  key_a: \"{}\"\n  key_b: {}\n  key_c: {}\n",
        key_a, key_b, key_c
    )
}

fn omit_schema(keys: &BTreeSet<String>) -> String {
    keys.iter()
        .map(|k| format!("{}: \"* ignored\"\n", k))
        .collect()
}

fn flat_resource(keys: &BTreeSet<String>) -> String {
    keys.iter().map(|k| format!("{}: value\n", k)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn missing_key_issues_partition_the_key_sets(
        // Keys stay clear of YAML scalar keywords (null, true, on, ...).
        schema_keys in prop::collection::btree_set("[a-m]{1,8}", 1..8),
        resource_keys in prop::collection::btree_set("[a-m]{1,8}", 1..8),
    ) {
        let report = validate(
            &omit_schema(&schema_keys),
            &flat_resource(&resource_keys),
            None,
        )
        .expect("generated documents parse");

        let missing_resource: BTreeSet<String> = report
            .issues
            .iter()
            .filter(|i| i.message == MISSING_RESOURCE)
            .filter_map(|i| i.schema.clone())
            .collect();
        let missing_schema: BTreeSet<String> = report
            .issues
            .iter()
            .filter(|i| i.message == MISSING_SCHEMA)
            .filter_map(|i| i.resource.clone())
            .collect();

        let expected_resource: BTreeSet<String> =
            schema_keys.difference(&resource_keys).cloned().collect();
        let expected_schema: BTreeSet<String> =
            resource_keys.difference(&schema_keys).cloned().collect();

        prop_assert_eq!(missing_resource, expected_resource);
        prop_assert_eq!(missing_schema, expected_schema);
        prop_assert_eq!(
            report.issues.len(),
            schema_keys.symmetric_difference(&resource_keys).count()
        );
    }

    #[test]
    fn matching_key_sets_validate_cleanly(keys in prop::collection::btree_set("[a-m]{1,8}", 1..8)) {
        let report = validate(&omit_schema(&keys), &flat_resource(&keys), None)
            .expect("generated documents parse");
        prop_assert!(!report.has_errors);
        prop_assert!(report.issues.is_empty());
    }

    #[test]
    fn validation_is_deterministic(
        key_a in "[a-z ]{0,10}",
        key_b in -100i32..=100,
        key_c in -100i32..=100,
    ) {
        let resource = resource(&key_a, key_b, key_c);
        let first = validate(SCHEMA, &resource, None).expect("generated documents parse");
        let second = validate(SCHEMA, &resource, None).expect("generated documents parse");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn exclusions_only_demote(
        key_a in "[a-z ]{0,10}",
        key_b in -100i32..=100,
        key_c in -100i32..=100,
        exclusions in "[a-z:_.*]{0,12}",
    ) {
        let resource = resource(&key_a, key_b, key_c);
        let baseline = validate(SCHEMA, &resource, None).expect("generated documents parse");
        let excluded =
            validate(SCHEMA, &resource, Some(&exclusions)).expect("generated documents parse");

        // Same findings, possibly softer severity.
        prop_assert_eq!(excluded.issues.len(), baseline.issues.len());
        for (b, e) in baseline.issues.iter().zip(excluded.issues.iter()) {
            prop_assert_eq!(&b.message, &e.message);
            prop_assert_eq!(&b.schema, &e.schema);
            prop_assert_eq!(&b.resource, &e.resource);
            prop_assert_eq!(b.severity, Severity::Error);
        }
        prop_assert_eq!(
            excluded.has_errors,
            excluded.issues.iter().any(|i| i.severity == Severity::Error)
        );
    }

    #[test]
    fn excluding_everything_clears_the_error_flag(
        key_a in "[a-z ]{0,10}",
        key_b in -100i32..=100,
        key_c in -100i32..=100,
    ) {
        let resource = resource(&key_a, key_b, key_c);
        let baseline = validate(SCHEMA, &resource, None).expect("generated documents parse");
        let excluded =
            validate(SCHEMA, &resource, Some(".*")).expect("generated documents parse");

        prop_assert!(!excluded.has_errors);
        prop_assert_eq!(excluded.issues.len(), baseline.issues.len());
        prop_assert!(
            excluded
                .issues
                .iter()
                .all(|i| i.severity == Severity::Warning)
        );
    }
}
