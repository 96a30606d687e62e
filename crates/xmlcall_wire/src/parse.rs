use roxmltree::{Document, Node};

use crate::datetime::epoch_from_wire_datetime;
use crate::errors::WireError;
use crate::value::{WireDocument, WireValue};

/// Parse one XML document into its wire form.
///
/// Accepted roots: `<methodCall>`, `<methodResponse>`, and the envelope-less
/// forms `<params>` and `<value>` that fragment repair synthesizes.
pub fn parse_document(xml: &str) -> Result<WireDocument, WireError> {
    let doc = Document::parse(xml).map_err(|err| WireError::MalformedXml(err.to_string()))?;
    let root = doc.root_element();

    match root.tag_name().name() {
        "methodCall" => parse_call(root),
        "methodResponse" => parse_response(root),
        "params" => {
            let params = parse_params(root)?;
            // Repaired fragments carry a single parameter; extra parameters
            // in hand-built fragments are not meaningful here.
            params
                .into_iter()
                .next()
                .map(WireDocument::Value)
                .ok_or_else(|| WireError::MalformedXml("params block contains no param".to_owned()))
        }
        "value" => parse_value(root).map(WireDocument::Value),
        other => Err(WireError::UnexpectedRoot(other.to_owned())),
    }
}

fn parse_call(root: Node) -> Result<WireDocument, WireError> {
    let method = child_element(root, "methodName")
        .map(direct_text)
        .filter(|name| !name.trim().is_empty())
        .ok_or(WireError::MissingMethodName)?;

    let params = match child_element(root, "params") {
        Some(node) => parse_params(node)?,
        None => Vec::new(),
    };

    Ok(WireDocument::Call {
        method: method.trim().to_owned(),
        params,
    })
}

fn parse_response(root: Node) -> Result<WireDocument, WireError> {
    if let Some(fault) = child_element(root, "fault") {
        return parse_fault(fault);
    }

    let params = match child_element(root, "params") {
        Some(node) => parse_params(node)?,
        None => Vec::new(),
    };
    params
        .into_iter()
        .next()
        .map(WireDocument::Response)
        .ok_or_else(|| WireError::MalformedXml("response carries no value".to_owned()))
}

fn parse_fault(fault: Node) -> Result<WireDocument, WireError> {
    let value = child_element(fault, "value")
        .map(parse_value)
        .transpose()?
        .ok_or(WireError::MalformedFault)?;

    let code = match value.member("faultCode") {
        Some(WireValue::Int(code)) => *code,
        _ => return Err(WireError::MalformedFault),
    };
    let message = match value.member("faultString") {
        Some(WireValue::String(message)) => message.clone(),
        _ => return Err(WireError::MalformedFault),
    };

    Ok(WireDocument::Fault { code, message })
}

fn parse_params(params: Node) -> Result<Vec<WireValue>, WireError> {
    let mut out = Vec::new();
    for param in params.children().filter(|n| n.has_tag_name("param")) {
        let value = child_element(param, "value")
            .map(parse_value)
            .transpose()?
            .ok_or_else(|| WireError::MalformedXml("param carries no value".to_owned()))?;
        out.push(value);
    }
    Ok(out)
}

/// Parse one `<value>` element.
///
/// A value with no type element decodes as a string, per the wire format's
/// default-string rule. Unknown type elements also decode as strings of
/// their text content rather than failing the whole document.
fn parse_value(value: Node) -> Result<WireValue, WireError> {
    let Some(typed) = value.children().find(|n| n.is_element()) else {
        return Ok(WireValue::String(direct_text(value)));
    };

    match typed.tag_name().name() {
        "int" | "i4" | "i8" => {
            let text = direct_text(typed);
            text.trim()
                .parse::<i64>()
                .map(WireValue::Int)
                .map_err(|_| WireError::InvalidScalar {
                    kind: "int",
                    text,
                })
        }
        "double" => {
            let text = direct_text(typed);
            text.trim()
                .parse::<f64>()
                .map(WireValue::Double)
                .map_err(|_| WireError::InvalidScalar {
                    kind: "double",
                    text,
                })
        }
        "boolean" => match direct_text(typed).trim() {
            "1" | "true" => Ok(WireValue::Boolean(true)),
            "0" | "false" => Ok(WireValue::Boolean(false)),
            other => Err(WireError::InvalidScalar {
                kind: "boolean",
                text: other.to_owned(),
            }),
        },
        "string" => Ok(WireValue::String(direct_text(typed))),
        "base64" => {
            use base64::Engine;
            let text: String = direct_text(typed)
                .chars()
                .filter(|ch| !ch.is_ascii_whitespace())
                .collect();
            base64::engine::general_purpose::STANDARD
                .decode(text.as_bytes())
                .map(WireValue::Base64)
                .map_err(|_| WireError::InvalidScalar {
                    kind: "base64",
                    text,
                })
        }
        "dateTime.iso8601" => {
            let raw = direct_text(typed).trim().to_owned();
            let epoch_seconds = epoch_from_wire_datetime(&raw).unwrap_or(0);
            Ok(WireValue::DateTime { raw, epoch_seconds })
        }
        "array" => {
            let data = child_element(typed, "data")
                .ok_or_else(|| WireError::MalformedXml("array carries no data".to_owned()))?;
            let mut items = Vec::new();
            for item in data.children().filter(|n| n.has_tag_name("value")) {
                items.push(parse_value(item)?);
            }
            Ok(WireValue::Array(items))
        }
        "struct" => {
            let mut members = Vec::new();
            for member in typed.children().filter(|n| n.has_tag_name("member")) {
                let name = child_element(member, "name")
                    .map(direct_text)
                    .ok_or_else(|| WireError::MalformedXml("member carries no name".to_owned()))?;
                let value = child_element(member, "value")
                    .map(parse_value)
                    .transpose()?
                    .ok_or_else(|| {
                        WireError::MalformedXml("member carries no value".to_owned())
                    })?;
                members.push((name, value));
            }
            Ok(WireValue::Struct(members))
        }
        _ => Ok(WireValue::String(direct_text(typed))),
    }
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

/// Concatenated direct text content of one element.
/// roxmltree keeps text split around resolved entities, so this joins all
/// immediate text children.
fn direct_text(node: Node) -> String {
    node.children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ser::{serialize_call, serialize_response, SerializeOptions};

    #[test]
    fn parses_method_call() {
        let xml = r#"<?xml version="1.0"?>
<methodCall>
  <methodName>examples.getStateName</methodName>
  <params>
    <param><value><i4>40</i4></value></param>
  </params>
</methodCall>"#;
        assert_eq!(
            parse_document(xml).expect("parse"),
            WireDocument::Call {
                method: "examples.getStateName".to_owned(),
                params: vec![WireValue::Int(40)],
            }
        );
    }

    #[test]
    fn parses_response_value() {
        let xml = r#"<methodResponse><params><param><value><string>South Dakota</string></value></param></params></methodResponse>"#;
        assert_eq!(
            parse_document(xml).expect("parse"),
            WireDocument::Response(WireValue::String("South Dakota".to_owned()))
        );
    }

    #[test]
    fn parses_fault_envelope() {
        let xml = r#"<methodResponse><fault><value><struct>
<member><name>faultCode</name><value><int>7</int></value></member>
<member><name>faultString</name><value><string>nope</string></value></member>
</struct></value></fault></methodResponse>"#;
        assert_eq!(
            parse_document(xml).expect("parse"),
            WireDocument::Fault {
                code: 7,
                message: "nope".to_owned(),
            }
        );
    }

    #[test]
    fn untyped_value_decodes_as_string() {
        let xml = "<value>plain</value>";
        assert_eq!(
            parse_document(xml).expect("parse"),
            WireDocument::Value(WireValue::String("plain".to_owned()))
        );
    }

    #[test]
    fn nested_containers_round_trip() {
        let value = WireValue::Struct(vec![
            (
                "items".to_owned(),
                WireValue::Array(vec![WireValue::Int(1), WireValue::Boolean(false)]),
            ),
            ("label".to_owned(), WireValue::String("a&b".to_owned())),
        ]);
        let xml = serialize_response(&value, &SerializeOptions::default());
        assert_eq!(
            parse_document(&xml).expect("parse"),
            WireDocument::Response(value)
        );
    }

    #[test]
    fn base64_round_trips_and_tolerates_whitespace() {
        let xml = "<value><base64>b2s=\n</base64></value>";
        assert_eq!(
            parse_document(xml).expect("parse"),
            WireDocument::Value(WireValue::Base64(b"ok".to_vec()))
        );
    }

    #[test]
    fn datetime_carries_epoch() {
        let xml = "<value><dateTime.iso8601>20240101T10:00:00</dateTime.iso8601></value>";
        assert_eq!(
            parse_document(xml).expect("parse"),
            WireDocument::Value(WireValue::DateTime {
                raw: "20240101T10:00:00".to_owned(),
                epoch_seconds: 1_704_103_200,
            })
        );
    }

    #[test]
    fn call_round_trips_through_serializer() {
        let params = vec![
            WireValue::Double(2.5),
            WireValue::Struct(vec![("k".to_owned(), WireValue::String("v".to_owned()))]),
        ];
        let xml = serialize_call("m.echo", &params, &SerializeOptions::default());
        assert_eq!(
            parse_document(&xml).expect("parse"),
            WireDocument::Call {
                method: "m.echo".to_owned(),
                params,
            }
        );
    }

    #[test]
    fn missing_method_name_is_rejected() {
        let err = parse_document("<methodCall><params/></methodCall>").expect_err("must fail");
        assert_eq!(err, WireError::MissingMethodName);
    }

    #[test]
    fn broken_xml_is_rejected() {
        assert!(matches!(
            parse_document("<methodCall>"),
            Err(WireError::MalformedXml(_))
        ));
    }
}
