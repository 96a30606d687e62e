use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection reasons for explicit type-tag requests. The caller's value is
/// left untouched on every variant.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TagError {
    #[error("only string scalars can carry a type tag")]
    NotAString,
    #[error("datetime payload does not match YYYYMMDD'T'HH:MM:SS: {0}")]
    MalformedDateTime(String),
    #[error("unknown tag kind: {0}")]
    UnknownKind(String),
}

/// One protocol fault as produced by server-side handlers.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[error("fault {code}: {message}")]
pub struct Fault {
    pub code: i64,
    pub message: String,
}

impl Fault {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
