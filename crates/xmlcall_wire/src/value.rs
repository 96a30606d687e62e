/// Canonical wire-value object model for the XML-RPC type taxonomy.
///
/// Struct members keep declaration order; the wire format is
/// order-preserving and re-serialization must not reorder members.
#[derive(Clone, Debug, PartialEq)]
pub enum WireValue {
    Int(i64),
    Double(f64),
    Boolean(bool),
    String(String),
    Base64(Vec<u8>),
    DateTime { raw: String, epoch_seconds: i64 },
    Array(Vec<WireValue>),
    Struct(Vec<(String, WireValue)>),
}

impl WireValue {
    /// Look up a struct member by name. Returns `None` on non-structs.
    pub fn member(&self, name: &str) -> Option<&WireValue> {
        match self {
            WireValue::Struct(members) => members
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

/// One fully parsed XML document at the codec boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum WireDocument {
    Call {
        method: String,
        params: Vec<WireValue>,
    },
    Response(WireValue),
    Fault {
        code: i64,
        message: String,
    },
    /// A bare value with no request/response envelope (repaired fragments).
    Value(WireValue),
}
