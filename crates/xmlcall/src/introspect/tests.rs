use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

fn param(type_name: &str, optional: bool) -> ParamDescription {
    ParamDescription {
        type_name: type_name.to_owned(),
        name: None,
        description: None,
        optional,
    }
}

#[test]
fn one_optional_parameter_folds_into_two_signatures() {
    let declared = vec![vec![param("int", false), param("string", true)]];
    let (signatures, _) = fold_signatures(&declared);
    assert_eq!(
        signatures,
        vec![vec!["int".to_owned()], vec!["int".to_owned(), "string".to_owned()]]
    );
}

#[test]
fn no_optional_parameters_fold_into_one_signature() {
    let declared = vec![vec![param("int", false), param("string", false), param("double", false)]];
    let (signatures, _) = fold_signatures(&declared);
    assert_eq!(
        signatures,
        vec![vec!["int".to_owned(), "string".to_owned(), "double".to_owned()]]
    );
}

#[test]
fn trailing_optionals_fold_into_prefix_chain() {
    let declared = vec![vec![
        param("int", false),
        param("string", false),
        param("double", true),
        param("boolean", true),
    ]];
    let (signatures, _) = fold_signatures(&declared);
    assert_eq!(
        signatures,
        vec![
            vec!["int".to_owned(), "string".to_owned()],
            vec!["int".to_owned(), "string".to_owned(), "double".to_owned()],
            vec![
                "int".to_owned(),
                "string".to_owned(),
                "double".to_owned(),
                "boolean".to_owned(),
            ],
        ]
    );
}

#[test]
fn duplicate_expansions_are_deduplicated() {
    let declared = vec![
        vec![param("int", false), param("string", true)],
        vec![param("int", false)],
        vec![param("int", false), param("string", false)],
    ];
    let (signatures, _) = fold_signatures(&declared);
    assert_eq!(
        signatures,
        vec![vec!["int".to_owned()], vec!["int".to_owned(), "string".to_owned()]]
    );
}

#[test]
fn empty_declared_signature_is_skipped() {
    let declared = vec![vec![], vec![param("string", false)]];
    let (signatures, _) = fold_signatures(&declared);
    assert_eq!(signatures, vec![vec!["string".to_owned()]]);
}

#[test]
fn parameter_docs_stay_parallel_to_signatures() {
    let declared = vec![vec![
        param("int", false),
        ParamDescription {
            type_name: "string".to_owned(),
            name: Some("needle".to_owned()),
            description: Some("text to find".to_owned()),
            optional: true,
        },
    ]];
    let (signatures, docs) = fold_signatures(&declared);
    assert_eq!(signatures.len(), docs.len());
    assert_eq!(docs[0], Vec::<String>::new());
    assert_eq!(docs[1], vec!["text to find".to_owned()]);
}

#[test]
fn ingest_records_help_and_signatures_for_known_methods() {
    let mut store = IntrospectionStore::new();
    let doc = json!({
        "methodList": [
            {
                "name": "math.add",
                "purpose": "Add two numbers.",
                "signatures": [[
                    {"type": "int"},
                    {"type": "int"},
                    {"type": "int", "optional": 1}
                ]]
            },
            {
                "name": "unknown.method",
                "purpose": "never recorded"
            }
        ]
    });

    assert!(store.ingest(&doc, |name| name == "math.add"));
    assert!(store.is_documented("math.add"));
    assert!(!store.is_documented("unknown.method"));

    let entry = store.entry("math.add").expect("entry");
    assert_eq!(entry.help.as_deref(), Some("Add two numbers."));
    assert_eq!(
        entry.signatures,
        vec![
            vec!["int".to_owned(), "int".to_owned()],
            vec!["int".to_owned(), "int".to_owned(), "int".to_owned()],
        ]
    );
}

#[test]
fn ingest_with_nothing_new_reports_false() {
    let mut store = IntrospectionStore::new();
    let doc = json!({"methodList": [{"name": "missing.method", "purpose": "x"}]});
    assert!(!store.ingest(&doc, |_| false));

    let doc = json!({"methodList": [{"name": "known.method"}]});
    assert!(!store.ingest(&doc, |_| true));
}

#[test]
fn later_signature_list_replaces_the_stored_set() {
    let mut store = IntrospectionStore::new();
    let first = json!({
        "methodList": [{
            "name": "m",
            "signatures": [[{"type": "int"}, {"type": "string"}]]
        }]
    });
    let second = json!({
        "methodList": [{
            "name": "m",
            "signatures": [[{"type": "boolean"}]]
        }]
    });
    assert!(store.ingest(&first, |_| true));
    assert!(store.ingest(&second, |_| true));
    assert_eq!(
        store.entry("m").expect("entry").signatures,
        vec![vec!["boolean".to_owned()]]
    );
}

#[test]
fn docstring_only_update_keeps_signatures() {
    let mut store = IntrospectionStore::new();
    let with_signatures = json!({
        "methodList": [{"name": "m", "signatures": [[{"type": "int"}]]}]
    });
    let help_only = json!({
        "methodList": [{"name": "m", "purpose": "does things"}]
    });
    assert!(store.ingest(&with_signatures, |_| true));
    assert!(store.ingest(&help_only, |_| true));

    let entry = store.entry("m").expect("entry");
    assert_eq!(entry.help.as_deref(), Some("does things"));
    assert_eq!(entry.signatures, vec![vec!["int".to_owned()]]);
}

#[test]
fn callback_slot_is_taken_at_most_once() {
    let store = IntrospectionStore::new();
    store.register_callback(Some(Box::new(|| json!({"methodList": []}))));
    assert!(store.take_callback().is_some());
    assert!(store.take_callback().is_none());

    store.register_callback(Some(Box::new(|| json!({"methodList": []}))));
    store.register_callback(None);
    assert!(store.take_callback().is_none());
}

#[test]
fn loose_optional_markers_are_accepted() {
    let doc = json!({
        "methodList": [{
            "name": "m",
            "signatures": [[
                {"type": "int"},
                {"type": "string", "optional": "1"},
                {"type": "double", "optional": true}
            ]]
        }]
    });
    let mut store = IntrospectionStore::new();
    assert!(store.ingest(&doc, |_| true));
    assert_eq!(store.entry("m").expect("entry").signatures.len(), 3);
}
