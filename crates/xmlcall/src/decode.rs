use std::borrow::Cow;

use serde_json::{Map, Number, Value};

use crate::charset::to_target_charset;
use crate::classify::WireType;
use crate::tagged::TaggedScalar;

use xmlcall_wire::{parse_document, WireDocument, WireValue};

/// Target charset assumed when the caller does not request one.
pub const DEFAULT_DECODE_CHARSET: &str = "iso-8859-1";

/// One decoded request-or-response document.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedMessage {
    Call { method: String, params: Vec<Value> },
    Response { value: Value },
}

/// Decode one value document into its native form.
///
/// Accepts full documents as well as the bare fragments handled by the
/// repair step. A request document decodes to the array of its parameters.
/// Returns `None` when the codec cannot parse the input; `None` is the
/// explicit no-value result, distinct from any legitimately decoded falsy
/// value.
pub fn decode_value(xml: &str, target_charset: Option<&str>) -> Option<Value> {
    let target = target_charset.unwrap_or(DEFAULT_DECODE_CHARSET);
    let repaired = repair_fragment(xml);

    match parse_document(&repaired) {
        Ok(WireDocument::Value(wire)) | Ok(WireDocument::Response(wire)) => {
            Some(wire_to_native(wire, target))
        }
        Ok(WireDocument::Fault { code, message }) => Some(fault_record(code, &message, target)),
        Ok(WireDocument::Call { params, .. }) => Some(Value::Array(
            params
                .into_iter()
                .map(|wire| wire_to_native(wire, target))
                .collect(),
        )),
        Err(err) => {
            tracing::debug!(error = %err, "decode produced no value");
            None
        }
    }
}

/// Decode one request-or-response document.
///
/// Requests yield the method name (charset-shaped) plus positional
/// parameters; responses yield their value; faults yield a response whose
/// value is the two-key fault record.
pub fn decode_call(xml: &str, target_charset: Option<&str>) -> Option<DecodedMessage> {
    let target = target_charset.unwrap_or(DEFAULT_DECODE_CHARSET);
    let repaired = repair_fragment(xml);

    match parse_document(&repaired) {
        Ok(WireDocument::Call { method, params }) => Some(DecodedMessage::Call {
            method: to_target_charset(&method, target),
            params: params
                .into_iter()
                .map(|wire| wire_to_native(wire, target))
                .collect(),
        }),
        Ok(WireDocument::Response(wire)) | Ok(WireDocument::Value(wire)) => {
            Some(DecodedMessage::Response {
                value: wire_to_native(wire, target),
            })
        }
        Ok(WireDocument::Fault { code, message }) => Some(DecodedMessage::Response {
            value: fault_record(code, &message, target),
        }),
        Err(err) => {
            tracing::debug!(error = %err, "decode produced no message");
            None
        }
    }
}

/// Synthesize missing wrapper tags around bare fragments.
///
/// Best-effort by design: only a single `<param>` block, a single
/// `<params>` block, or a single bare value/typed element is recognized.
/// Multi-parameter fragments and fragments led by XML comments are outside
/// the contract and may decode incorrectly.
fn repair_fragment(xml: &str) -> Cow<'_, str> {
    let trimmed = xml.trim_start();
    let body = match trimmed.strip_prefix("<?xml") {
        Some(rest) => match rest.find("?>") {
            Some(end) => rest[end + 2..].trim_start(),
            None => return Cow::Borrowed(xml),
        },
        None => trimmed,
    };

    if starts_with_tag(body, "param") {
        return Cow::Owned(format!("<params>{body}</params>"));
    }

    const TYPED_TAGS: [&str; 10] = [
        "int",
        "i4",
        "i8",
        "double",
        "boolean",
        "string",
        "base64",
        "dateTime.iso8601",
        "array",
        "struct",
    ];
    if TYPED_TAGS.iter().any(|tag| starts_with_tag(body, tag)) {
        return Cow::Owned(format!("<value>{body}</value>"));
    }

    Cow::Borrowed(xml)
}

fn starts_with_tag(body: &str, name: &str) -> bool {
    body.strip_prefix('<')
        .and_then(|rest| rest.strip_prefix(name))
        .is_some_and(|rest| rest.starts_with('>') || rest.starts_with(' ') || rest.starts_with('/'))
}

/// Shape one wire value into the native model.
///
/// Strings are charset-shaped for the caller's target; binary and datetime
/// payloads come back as tagged scalars so their wire type survives a
/// re-encode.
fn wire_to_native(wire: WireValue, target: &str) -> Value {
    match wire {
        WireValue::Int(v) => Value::Number(v.into()),
        WireValue::Double(v) => Number::from_f64(v).map_or(Value::Null, Value::Number),
        WireValue::Boolean(v) => Value::Bool(v),
        WireValue::String(text) => Value::String(to_target_charset(&text, target)),
        WireValue::Base64(bytes) => TaggedScalar {
            kind: Some(WireType::Base64),
            scalar: String::from_utf8_lossy(&bytes).into_owned(),
            timestamp: None,
        }
        .into_value(),
        WireValue::DateTime { raw, epoch_seconds } => TaggedScalar {
            kind: Some(WireType::DateTime),
            scalar: raw,
            timestamp: Some(epoch_seconds),
        }
        .into_value(),
        WireValue::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| wire_to_native(item, target))
                .collect(),
        ),
        WireValue::Struct(members) => {
            let mut map = Map::new();
            for (name, member) in members {
                map.insert(
                    to_target_charset(&name, target),
                    wire_to_native(member, target),
                );
            }
            Value::Object(map)
        }
    }
}

fn fault_record(code: i64, message: &str, target: &str) -> Value {
    let mut map = Map::new();
    map.insert("faultCode".to_owned(), Value::Number(code.into()));
    map.insert(
        "faultString".to_owned(),
        Value::String(to_target_charset(message, target)),
    );
    Value::Object(map)
}

#[cfg(test)]
mod tests;
