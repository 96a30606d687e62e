use std::path::Path;

use serde_json::json;

use xmlcall::{decode_call, decode_value, DecodedMessage};

fn load_xml(path: &str) -> String {
    let full = Path::new(env!("CARGO_MANIFEST_DIR")).join(path);
    std::fs::read_to_string(full).expect("fixture read")
}

#[test]
fn decode_call_fixture() {
    let xml = load_xml("tests/fixtures/valid/call.xml");
    let decoded = decode_call(&xml, None).expect("decoded call");
    assert_eq!(
        decoded,
        DecodedMessage::Call {
            method: "inventory.reserve".to_owned(),
            params: vec![
                json!("sku-1138"),
                json!(4),
                json!({"warehouse": "east", "rush": true}),
            ],
        }
    );
}

#[test]
fn decode_response_fixture() {
    let xml = load_xml("tests/fixtures/valid/response.xml");
    let decoded = decode_value(&xml, None).expect("decoded response");
    assert_eq!(
        decoded,
        json!([
            7,
            19.5,
            {"wireType": "datetime", "scalar": "20240101T10:00:00", "timestamp": 1_704_103_200i64},
        ])
    );
}

#[test]
fn decode_fault_fixture() {
    let xml = load_xml("tests/fixtures/valid/fault.xml");
    assert_eq!(
        decode_value(&xml, None),
        Some(json!({"faultCode": 26, "faultString": "reservation window closed"}))
    );
}

#[test]
fn decode_fragment_fixture_via_repair() {
    let xml = load_xml("tests/fixtures/edge/fragment.xml");
    assert_eq!(decode_value(&xml, None), Some(json!(["only"])));
}

#[test]
fn invalid_fixture_decodes_to_no_value() {
    let raw = load_xml("tests/fixtures/invalid/not_xml.txt");
    assert_eq!(decode_value(&raw, None), None);
    assert!(decode_call(&raw, None).is_none());
}
