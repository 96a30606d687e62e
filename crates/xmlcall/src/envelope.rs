use serde_json::Value;

use crate::classify::{is_fault_shaped, object_is_positional, WireType};
use crate::options::EncodeOptions;
use crate::tagged::TaggedScalar;

use xmlcall_wire::datetime::epoch_from_wire_datetime;
use xmlcall_wire::{serialize_call, serialize_fault, serialize_params, serialize_response, WireValue};

/// One outbound document before serialization.
#[derive(Clone, Debug, PartialEq)]
pub enum Envelope {
    Request { method: String, params: Vec<Value> },
    Response { value: Value },
    Fault { code: i64, message: String },
}

/// Build a request envelope from a native parameter slot.
///
/// Absence of a value means zero parameters; a bare scalar becomes a single
/// parameter (the historical single-value calling convenience); a container
/// with keys exactly `0..n-1` contributes one positional parameter per
/// element; any other container shape is folded whole into a single
/// struct-classifying parameter. Fault detection is not applied here; the
/// protocol has no request fault.
pub fn build_request(method: &str, params: Option<&Value>) -> Envelope {
    Envelope::Request {
        method: method.to_owned(),
        params: normalize_params(params),
    }
}

/// Build a response or fault envelope from a native value.
pub fn build_response(value: &Value) -> Envelope {
    if let Some((code, message)) = fault_envelope_fields(value) {
        return Envelope::Fault { code, message };
    }
    Envelope::Response {
        value: value.clone(),
    }
}

/// Serialize a request document.
///
/// Options are threaded explicitly through the whole serializer chain;
/// callers wanting a transient process-wide default change wrap the call in
/// [`crate::options::ScopedOptions`] at their boundary.
pub fn encode_request(method: &str, params: Option<&Value>, options: &EncodeOptions) -> String {
    let params = normalize_params(params);
    let wire: Vec<WireValue> = params.iter().filter_map(native_to_wire).collect();
    serialize_call(method, &wire, &options.to_serialize_options())
}

/// Serialize a response document, or a fault document for fault-shaped
/// values.
pub fn encode_response(value: &Value, options: &EncodeOptions) -> String {
    if let Some((code, message)) = fault_envelope_fields(value) {
        return serialize_fault(code, &message, &options.to_serialize_options());
    }
    let wire = native_to_wire(value).unwrap_or_else(|| WireValue::String(String::new()));
    serialize_response(&wire, &options.to_serialize_options())
}

/// Serialize a request or response document in one call; `None` for the
/// method selects response/fault mode, with the parameter slot read as the
/// response value.
pub fn encode_message(
    method: Option<&str>,
    params: Option<&Value>,
    options: &EncodeOptions,
) -> String {
    match method {
        Some(method) => encode_request(method, params, options),
        None => encode_response(params.unwrap_or(&Value::Null), options),
    }
}

/// Serialize one bare value under the process-wide default options.
///
/// Wraps in `<params><param>` unless the value is fault-shaped, which
/// serializes as a fault document instead.
pub fn encode_value(value: &Value) -> String {
    let options = crate::options::process_defaults();
    if let Some((code, message)) = fault_envelope_fields(value) {
        return serialize_fault(code, &message, &options.to_serialize_options());
    }
    match native_to_wire(value) {
        Some(wire) => serialize_params(std::slice::from_ref(&wire), &options.to_serialize_options()),
        None => serialize_params(&[], &options.to_serialize_options()),
    }
}

fn normalize_params(params: Option<&Value>) -> Vec<Value> {
    match params {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(map)) => {
            if object_is_positional(map) {
                map.values().cloned().collect()
            } else {
                vec![Value::Object(map.clone())]
            }
        }
        Some(scalar) => vec![scalar.clone()],
    }
}

/// Coerced fault fields of a fault-shaped value, `None` otherwise.
fn fault_envelope_fields(value: &Value) -> Option<(i64, String)> {
    if !is_fault_shaped(value) {
        return None;
    }
    let map = value.as_object()?;
    Some(fault_fields(map.get("faultCode"), map.get("faultString")))
}

/// Coerce fault fields: the code to an integer, the message to a string.
fn fault_fields(code: Option<&Value>, message: Option<&Value>) -> (i64, String) {
    let code = match code {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_else(|| n.as_f64().unwrap_or(0.0) as i64),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        Some(Value::Bool(flag)) => i64::from(*flag),
        _ => 0,
    };
    let message = match message {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    (code, message)
}

/// Convert one classified native value into its wire form.
///
/// Returns `None` for a tagged object whose recorded tag is the no-type
/// sentinel; callers omit such values. Unclassifiable children of
/// containers are dropped the same way.
pub(crate) fn native_to_wire(value: &Value) -> Option<WireValue> {
    if let Some(tagged) = TaggedScalar::from_value(value) {
        return tagged_to_wire(tagged);
    }

    match value {
        Value::Null => Some(WireValue::Base64(Vec::new())),
        Value::Bool(flag) => Some(WireValue::Boolean(*flag)),
        Value::Number(n) => match n.as_i64() {
            Some(v) => Some(WireValue::Int(v)),
            // Floats, and integers beyond what the wire int can carry.
            None => Some(WireValue::Double(n.as_f64().unwrap_or(0.0))),
        },
        Value::String(text) => Some(WireValue::String(text.clone())),
        Value::Array(items) => Some(WireValue::Array(
            items.iter().filter_map(native_to_wire).collect(),
        )),
        Value::Object(map) => {
            if object_is_positional(map) {
                Some(WireValue::Array(
                    map.values().filter_map(native_to_wire).collect(),
                ))
            } else {
                Some(WireValue::Struct(
                    map.iter()
                        .filter_map(|(name, member)| {
                            native_to_wire(member).map(|wire| (name.clone(), wire))
                        })
                        .collect(),
                ))
            }
        }
    }
}

fn tagged_to_wire(tagged: TaggedScalar) -> Option<WireValue> {
    let Some(kind) = tagged.kind else {
        tracing::warn!("tagged value carries no wire type; omitting");
        return None;
    };

    match kind {
        WireType::Base64 => Some(WireValue::Base64(tagged.scalar.into_bytes())),
        WireType::DateTime => {
            let epoch_seconds = tagged
                .timestamp
                .or_else(|| epoch_from_wire_datetime(&tagged.scalar))
                .unwrap_or(0);
            Some(WireValue::DateTime {
                raw: tagged.scalar,
                epoch_seconds,
            })
        }
        WireType::Int => match tagged.scalar.trim().parse() {
            Ok(v) => Some(WireValue::Int(v)),
            Err(_) => Some(WireValue::String(tagged.scalar)),
        },
        WireType::Double => match tagged.scalar.trim().parse() {
            Ok(v) => Some(WireValue::Double(v)),
            Err(_) => Some(WireValue::String(tagged.scalar)),
        },
        WireType::Boolean => Some(WireValue::Boolean(matches!(
            tagged.scalar.trim(),
            "1" | "true"
        ))),
        WireType::String | WireType::Array | WireType::Struct => {
            Some(WireValue::String(tagged.scalar))
        }
    }
}
