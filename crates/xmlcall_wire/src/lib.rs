//! Wire value model and XML codec shared by the xmlcall crates.
//!
//! This crate is the narrow codec boundary: a canonical wire-value object
//! model, a serializer from wire values to XML text, and a parser from XML
//! text back to wire documents. It knows nothing about native-value
//! classification; that lives in the `xmlcall` crate.

pub mod datetime;
pub mod errors;
pub mod parse;
pub mod ser;
pub mod value;

pub use datetime::{epoch_from_wire_datetime, is_wire_datetime};
pub use errors::WireError;
pub use parse::parse_document;
pub use ser::{
    serialize_call, serialize_fault, serialize_params, serialize_response, EscapeMode,
    SerializeOptions,
};
pub use value::{WireDocument, WireValue};
