mod common;

use common::schema;
use dq_workbench::{
    error::WorkflowError,
    schema::{parse_schema_text, render_schema_json, ColumnKind, SchemaMap, SchemaReconciler},
};
use proptest::prelude::*;

#[test]
fn exported_document_is_importable_byte_for_byte() {
    let mut reconciler = SchemaReconciler::default();
    reconciler
        .load_from_text(r#"{"id": "int", "name": "str", "score": "float", "active": "bool"}"#)
        .expect("load schema");

    let exported = reconciler.export_json();
    let mut imported = SchemaReconciler::default();
    imported
        .load_from_file(exported.as_bytes())
        .expect("import exported document");

    assert_eq!(imported.expected(), reconciler.expected());
    assert_eq!(imported.export_json(), exported);
}

#[test]
fn file_import_rejects_invalid_payloads_without_clobbering() {
    let mut reconciler = SchemaReconciler::default();
    reconciler.seed_detected(schema(&[("id", ColumnKind::Int)]));

    let err = reconciler.load_from_file(b"{\"id\": \"int\"").unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidJson(_)));

    let err = reconciler.load_from_file(&[0xff, 0xfe, 0x00]).unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidJson(_)));

    let err = reconciler
        .load_from_file(b"{\"when\": \"datetime\"}")
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidJson(_)));

    assert_eq!(reconciler.expected(), &schema(&[("id", ColumnKind::Int)]));
}

#[test]
fn reset_to_detected_restores_the_authoritative_copy() {
    let mut reconciler = SchemaReconciler::default();
    reconciler.seed_detected(schema(&[
        ("id", ColumnKind::Int),
        ("name", ColumnKind::Str),
    ]));
    reconciler
        .load_from_text(r#"{"only": "bool"}"#)
        .expect("load schema");

    let restored = reconciler.reset_to_detected().clone();
    assert_eq!(&restored, reconciler.detected());
    assert_eq!(reconciler.editor_text(), render_schema_json(&restored));
}

#[test]
fn spec_scenario_hints_only_the_diverging_column() {
    let mut reconciler = SchemaReconciler::default();
    reconciler.seed_detected(schema(&[
        ("id", ColumnKind::Int),
        ("name", ColumnKind::Float),
    ]));
    reconciler
        .load_from_text(r#"{"id": "int", "name": "str"}"#)
        .expect("load schema");

    assert_eq!(reconciler.mismatch_hint("id"), None);
    assert_eq!(
        reconciler.mismatch_hint("name").map(|h| h.to_string()),
        Some("type mismatch, expected str but detected float".to_string())
    );
}

fn kind_strategy() -> impl Strategy<Value = ColumnKind> {
    prop_oneof![
        Just(ColumnKind::Int),
        Just(ColumnKind::Float),
        Just(ColumnKind::Str),
        Just(ColumnKind::Bool),
    ]
}

fn schema_strategy() -> impl Strategy<Value = SchemaMap> {
    prop::collection::btree_map("[a-z_][a-z0-9_]{0,11}", kind_strategy(), 0..8)
}

proptest! {
    // Round-trip law: export then import always reproduces the same map.
    #[test]
    fn schema_documents_round_trip(schema in schema_strategy()) {
        let document = render_schema_json(&schema);
        let parsed = parse_schema_text(&document).expect("parse rendered document");
        prop_assert_eq!(parsed, schema);
    }

    // A column absent from detected always hints "not found", never a type
    // mismatch, whatever the expected tag says.
    #[test]
    fn absent_columns_never_report_type_mismatches(kind in kind_strategy()) {
        let mut reconciler = SchemaReconciler::default();
        reconciler.seed_detected(SchemaMap::new());
        let mut expected = SchemaMap::new();
        expected.insert("col".to_string(), kind);
        reconciler
            .load_from_text(&render_schema_json(&expected))
            .expect("load expected schema");

        let hint = reconciler.mismatch_hint("col").expect("hint present");
        prop_assert_eq!(hint.to_string(), "column not found");
    }
}
