//! Compatibility bridge between native JSON values and the XML-RPC
//! wire-type model.
//!
//! The bridge classifies `serde_json::Value` trees into the fixed wire-type
//! taxonomy, normalizes parameter lists into request/response/fault
//! envelopes, decodes wire documents back into native values with charset
//! fallback, and keeps a server-side method-introspection store. XML text
//! handling itself is delegated to the `xmlcall_wire` codec crate.

pub mod charset;
pub mod classify;
pub mod decode;
pub mod envelope;
pub mod errors;
pub mod introspect;
pub mod options;
pub mod server;
pub mod tagged;

pub use charset::to_target_charset;
pub use classify::{classify, classify_type, is_fault_shaped, WireType};
pub use decode::{decode_call, decode_value, DecodedMessage, DEFAULT_DECODE_CHARSET};
pub use envelope::{
    build_request, build_response, encode_message, encode_request, encode_response, encode_value,
    Envelope,
};
pub use errors::{Fault, TagError};
pub use introspect::{IntrospectionCallback, IntrospectionStore, MethodEntry};
pub use options::{
    process_defaults, resolve_escaping, set_process_defaults, EncodeOptions, ScopedOptions,
};
pub use server::{fault_codes, system_methods, Handler, Server};
pub use tagged::{tag_scalar, TagKind, TaggedScalar};

pub use xmlcall_wire::EscapeMode;
