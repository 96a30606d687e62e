use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use super::*;
use crate::envelope::{encode_request, encode_value};
use crate::options::EncodeOptions;
use crate::tagged::tag_scalar;

#[test]
fn plain_values_round_trip() {
    let cases = vec![
        json!(42),
        json!(-7),
        json!(true),
        json!(false),
        json!("hello"),
        json!(["a", "b", "c"]),
        json!([1, 2.5, "x"]),
        json!({"name": "n", "count": 3}),
        json!({"outer": {"inner": [1, 2]}}),
    ];
    for case in cases {
        let xml = encode_value(&case);
        assert_eq!(decode_value(&xml, None), Some(case));
    }
}

#[test]
fn tagged_scalars_round_trip() {
    let mut stamp = json!("20240101T10:00:00");
    tag_scalar(&mut stamp, "datetime").expect("tag");
    let xml = encode_value(&stamp);
    assert_eq!(decode_value(&xml, None), Some(stamp));

    let mut blob = json!("payload");
    tag_scalar(&mut blob, "base64").expect("tag");
    let xml = encode_value(&blob);
    assert_eq!(decode_value(&xml, None), Some(blob));
}

#[test]
fn fault_documents_decode_to_two_key_records() {
    let xml = encode_value(&json!({"faultCode": 7, "faultString": "broken"}));
    let decoded = decode_value(&xml, None).expect("decoded");
    assert_eq!(decoded, json!({"faultCode": 7, "faultString": "broken"}));
    assert_eq!(decoded.as_object().expect("object").len(), 2);
}

#[test]
fn request_documents_decode_to_method_and_params() {
    let xml = encode_request(
        "math.add",
        Some(&json!([1, 2])),
        &EncodeOptions::default(),
    );
    assert_eq!(
        decode_call(&xml, None),
        Some(DecodedMessage::Call {
            method: "math.add".to_owned(),
            params: vec![json!(1), json!(2)],
        })
    );
}

#[test]
fn response_documents_decode_to_their_value() {
    let xml = r#"<methodResponse><params><param><value><int>9</int></value></param></params></methodResponse>"#;
    assert_eq!(
        decode_call(xml, None),
        Some(DecodedMessage::Response { value: json!(9) })
    );
}

#[test]
fn bare_param_fragment_is_repaired() {
    let xml = "<param><value><int>5</int></value></param>";
    assert_eq!(decode_value(xml, None), Some(json!(5)));
}

#[test]
fn bare_params_fragment_is_repaired() {
    let xml = "<params><param><value><string>x</string></value></param></params>";
    assert_eq!(decode_value(xml, None), Some(json!("x")));
}

#[test]
fn bare_typed_element_is_repaired() {
    assert_eq!(decode_value("<int>5</int>", None), Some(json!(5)));
    assert_eq!(
        decode_value("<struct><member><name>k</name><value><int>1</int></value></member></struct>", None),
        Some(json!({"k": 1}))
    );
    assert_eq!(
        decode_value("<?xml version=\"1.0\"?><i4>40</i4>", None),
        Some(json!(40))
    );
}

#[test]
fn parse_failure_yields_none_not_falsy() {
    assert_eq!(decode_value("not xml at all", None), None);
    assert_eq!(decode_call("<methodCall>", None), None);
    // A decoded false is a value, not the no-value sentinel.
    assert_eq!(
        decode_value("<value><boolean>0</boolean></value>", None),
        Some(json!(false))
    );
}

#[test]
fn charset_fallback_keeps_utf8_form() {
    let xml = encode_value(&json!("price: \u{20ac}9"));
    assert_eq!(
        decode_value(&xml, Some("iso-8859-1")),
        Some(json!("price: \u{20ac}9"))
    );
}

#[test]
fn empty_base64_decodes_as_tagged_empty_scalar() {
    let xml = encode_value(&Value::Null);
    assert_eq!(
        decode_value(&xml, None),
        Some(json!({"wireType": "base64", "scalar": ""}))
    );
}

#[test]
fn struct_member_order_survives_decode() {
    let value = json!({"zebra": 1, "alpha": 2, "mid": 3});
    let xml = encode_value(&value);
    let decoded = decode_value(&xml, None).expect("decoded");
    let keys: Vec<&String> = decoded.as_object().expect("object").keys().collect();
    assert_eq!(keys, ["zebra", "alpha", "mid"]);
}
