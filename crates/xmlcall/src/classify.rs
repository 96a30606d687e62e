use serde_json::{Map, Value};

use crate::tagged::TaggedScalar;

/// Closed wire-type taxonomy of the RPC protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireType {
    Int,
    Double,
    Boolean,
    String,
    Base64,
    DateTime,
    Array,
    Struct,
}

impl WireType {
    pub fn as_wire(self) -> &'static str {
        match self {
            WireType::Int => "int",
            WireType::Double => "double",
            WireType::Boolean => "boolean",
            WireType::String => "string",
            WireType::Base64 => "base64",
            WireType::DateTime => "datetime",
            WireType::Array => "array",
            WireType::Struct => "struct",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "int" | "i4" => Some(WireType::Int),
            "double" => Some(WireType::Double),
            "boolean" => Some(WireType::Boolean),
            "string" => Some(WireType::String),
            "base64" => Some(WireType::Base64),
            "datetime" | "dateTime.iso8601" => Some(WireType::DateTime),
            "array" => Some(WireType::Array),
            "struct" => Some(WireType::Struct),
            _ => None,
        }
    }
}

/// Classify one native value into its wire type.
///
/// Rules, in priority order: tagged scalars keep their recorded tag (a
/// recorded no-type sentinel classifies as `None`); strings, integers,
/// floats, and booleans map to their scalar types; containers map to
/// `Array` when their keys are exactly `0..n-1` in order and to `Struct`
/// otherwise; null maps to `Base64`, a preserved compatibility quirk of the
/// wire format having no null type.
///
/// Allocation: none. Complexity: O(key count) for containers, O(1) otherwise.
pub fn classify(value: &Value) -> Option<WireType> {
    match value {
        Value::String(_) => Some(WireType::String),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Some(WireType::Int)
            } else {
                Some(WireType::Double)
            }
        }
        Value::Bool(_) => Some(WireType::Boolean),
        Value::Array(_) => Some(WireType::Array),
        Value::Object(map) => {
            if let Some(tagged) = TaggedScalar::from_value(value) {
                return tagged.kind;
            }
            if object_is_positional(map) {
                Some(WireType::Array)
            } else {
                Some(WireType::Struct)
            }
        }
        Value::Null => Some(WireType::Base64),
    }
}

/// String-name classification surface; `"none"` marks a tagged object whose
/// recorded tag is the no-type sentinel.
pub fn classify_type(value: &Value) -> &'static str {
    match classify(value) {
        Some(kind) => kind.as_wire(),
        None => "none",
    }
}

/// A native associative value carrying both `faultCode` and `faultString`
/// is read as an error response rather than a normal result.
pub fn is_fault_shaped(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("faultCode") && map.contains_key("faultString"),
        _ => false,
    }
}

/// Keys exactly `"0".."n-1"` in iteration order mark a positional container.
/// Only canonical decimal spellings count; `"01"` or `"+1"` are hash keys.
pub(crate) fn object_is_positional(map: &Map<String, Value>) -> bool {
    map.keys().enumerate().all(|(index, key)| {
        (key.len() == 1 || !key.starts_with('0'))
            && key.bytes().all(|b| b.is_ascii_digit())
            && key.parse::<usize>() == Ok(index)
    })
}
