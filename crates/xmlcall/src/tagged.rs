use serde_json::{Map, Value};

use crate::classify::WireType;
use crate::errors::TagError;

use xmlcall_wire::datetime::{epoch_from_wire_datetime, is_wire_datetime};

const KEY_WIRE_TYPE: &str = "wireType";
const KEY_SCALAR: &str = "scalar";
const KEY_TIMESTAMP: &str = "timestamp";

/// Tag kinds a caller may request explicitly. Only the two ambiguous scalar
/// types need a hint; everything else classifies structurally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagKind {
    Base64,
    DateTime,
}

impl TagKind {
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "base64" => Some(TagKind::Base64),
            "datetime" => Some(TagKind::DateTime),
            _ => None,
        }
    }

    fn as_wire_type(self) -> WireType {
        match self {
            TagKind::Base64 => WireType::Base64,
            TagKind::DateTime => WireType::DateTime,
        }
    }
}

/// A native scalar carrying an explicit wire-type hint.
///
/// Within the native value universe the wrapped form is a reserved object
/// shape produced and recognized only here, so classification is an
/// exhaustive match on the recovered wrapper rather than field probing.
/// `kind` is `None` when a round-tripped structured value recorded the
/// no-type sentinel.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggedScalar {
    pub kind: Option<WireType>,
    pub scalar: String,
    /// Epoch seconds derived once at tagging time for datetime scalars.
    pub timestamp: Option<i64>,
}

impl TaggedScalar {
    /// Recover the wrapper from its reserved object shape. Returns `None`
    /// for every other value, including near-miss objects with extra keys.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        if !(map.len() == 2 || map.len() == 3) {
            return None;
        }

        let kind_name = map.get(KEY_WIRE_TYPE)?.as_str()?;
        let scalar = map.get(KEY_SCALAR)?.as_str()?;
        let timestamp = match map.get(KEY_TIMESTAMP) {
            Some(raw) => Some(raw.as_i64()?),
            None if map.len() == 3 => return None,
            None => None,
        };

        let kind = match kind_name {
            "none" => None,
            name => Some(WireType::from_wire(name)?),
        };

        Some(Self {
            kind,
            scalar: scalar.to_owned(),
            timestamp,
        })
    }

    /// Render the wrapper into its reserved object shape.
    pub fn into_value(self) -> Value {
        let mut map = Map::new();
        map.insert(
            KEY_WIRE_TYPE.to_owned(),
            Value::String(
                self.kind
                    .map(WireType::as_wire)
                    .unwrap_or("none")
                    .to_owned(),
            ),
        );
        map.insert(KEY_SCALAR.to_owned(), Value::String(self.scalar));
        if let Some(timestamp) = self.timestamp {
            map.insert(KEY_TIMESTAMP.to_owned(), Value::Number(timestamp.into()));
        }
        Value::Object(map)
    }
}

/// Attach an explicit wire-type hint to a string scalar, in place.
///
/// The slot is replaced with the wrapped form only on success; every
/// rejection leaves the original value untouched. Tagging copies the
/// scalar into the wrapper and never changes how other references to the
/// same text classify.
pub fn tag_scalar(value: &mut Value, kind: &str) -> Result<(), TagError> {
    let Some(kind) = TagKind::from_wire(kind) else {
        tracing::warn!(requested = kind, "unknown tag kind requested");
        return Err(TagError::UnknownKind(kind.to_owned()));
    };

    let Value::String(scalar) = &*value else {
        return Err(TagError::NotAString);
    };

    let timestamp = match kind {
        TagKind::DateTime => {
            if !is_wire_datetime(scalar) {
                return Err(TagError::MalformedDateTime(scalar.clone()));
            }
            epoch_from_wire_datetime(scalar)
        }
        TagKind::Base64 => None,
    };

    *value = TaggedScalar {
        kind: Some(kind.as_wire_type()),
        scalar: scalar.clone(),
        timestamp,
    }
    .into_value();
    Ok(())
}
