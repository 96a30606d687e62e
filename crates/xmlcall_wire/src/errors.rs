use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("input is not well-formed xml: {0}")]
    MalformedXml(String),
    #[error("unexpected root element: {0}")]
    UnexpectedRoot(String),
    #[error("method call is missing methodName")]
    MissingMethodName,
    #[error("invalid {kind} payload: {text}")]
    InvalidScalar { kind: &'static str, text: String },
    #[error("fault payload is missing faultCode or faultString")]
    MalformedFault,
}
