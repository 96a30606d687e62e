use std::collections::HashMap;

use serde_json::Value;

use crate::classify::{classify, WireType};
use crate::decode::{decode_call, DecodedMessage};
use crate::envelope::encode_response;
use crate::errors::Fault;
use crate::introspect::{IntrospectionCallback, IntrospectionStore};
use crate::options::{EncodeOptions, ScopedOptions};

use xmlcall_wire::serialize_fault;

/// Well-known fault codes emitted by the dispatch entry point.
pub mod fault_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Reserved introspection method names served by the dispatcher itself.
pub mod system_methods {
    pub const LIST_METHODS: &str = "system.listMethods";
    pub const METHOD_HELP: &str = "system.methodHelp";
    pub const METHOD_SIGNATURE: &str = "system.methodSignature";

    pub const KNOWN: [&str; 3] = [LIST_METHODS, METHOD_HELP, METHOD_SIGNATURE];
}

/// One registered native handler.
pub type Handler = Box<dyn Fn(&[Value]) -> Result<Value, Fault> + Send>;

/// Synchronous dispatch map plus the per-instance introspection store.
///
/// The introspection methods are explicit dispatch arms calling into the
/// store, not entries in the mutable handler table, so serving them never
/// mutates the dispatch map.
pub struct Server {
    handlers: HashMap<String, Handler>,
    introspection: IntrospectionStore,
    options: EncodeOptions,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    pub fn new() -> Self {
        Self::with_options(EncodeOptions::default())
    }

    pub fn with_options(options: EncodeOptions) -> Self {
        Self {
            handlers: HashMap::new(),
            introspection: IntrospectionStore::new(),
            options,
        }
    }

    /// Register one method handler, replacing any previous registration
    /// under the same name.
    pub fn register_method(
        &mut self,
        name: impl Into<String>,
        handler: impl Fn(&[Value]) -> Result<Value, Fault> + Send + 'static,
    ) {
        let name = name.into();
        if self.handlers.insert(name.clone(), Box::new(handler)).is_some() {
            tracing::debug!(method = %name, "replacing registered handler");
        }
    }

    /// Ingest introspection data for methods present in the dispatch map.
    /// Returns whether anything was actually recorded.
    pub fn add_introspection_data(&mut self, doc: &Value) -> bool {
        let Self {
            handlers,
            introspection,
            ..
        } = self;
        introspection.ingest(doc, |name| {
            handlers.contains_key(name) || system_methods::KNOWN.contains(&name)
        })
    }

    /// Store or clear the deferred introspection supplier.
    pub fn register_introspection_callback(&mut self, callback: Option<IntrospectionCallback>) {
        self.introspection.register_callback(callback);
    }

    /// Registered method names plus the reserved introspection methods,
    /// sorted for stable output.
    pub fn list_methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .keys()
            .cloned()
            .chain(system_methods::KNOWN.iter().map(|name| (*name).to_owned()))
            .collect();
        names.sort();
        names
    }

    /// Docstring for one method. Serving this consumes any pending
    /// deferred introspection supplier first.
    pub fn method_help(&mut self, method: &str) -> Result<String, Fault> {
        self.consume_pending_introspection();
        if !self.is_known(method) {
            return Err(method_not_found(method));
        }
        Ok(self
            .introspection
            .entry(method)
            .and_then(|entry| entry.help.clone())
            .unwrap_or_default())
    }

    /// Folded signature set for one method. Serving this consumes any
    /// pending deferred introspection supplier first.
    pub fn method_signatures(&mut self, method: &str) -> Result<Vec<Vec<String>>, Fault> {
        self.consume_pending_introspection();
        if !self.is_known(method) {
            return Err(method_not_found(method));
        }
        Ok(self
            .introspection
            .entry(method)
            .map(|entry| entry.signatures.clone())
            .unwrap_or_default())
    }

    /// Full synchronous call loop: decode the request, resolve and validate
    /// the handler, envelope the outcome.
    ///
    /// The server's options are mirrored into the process-wide slot for the
    /// duration of the call and restored on every exit path.
    pub fn call(&mut self, xml: &str) -> String {
        let _scope = ScopedOptions::install(self.options.clone());
        let options = self.options.clone();

        let decoded = match decode_call(xml, Some(&options.internal_encoding)) {
            Some(decoded) => decoded,
            None => {
                return serialize_fault(
                    fault_codes::PARSE_ERROR,
                    "request is not a parseable call document",
                    &options.to_serialize_options(),
                );
            }
        };

        let (method, params) = match decoded {
            DecodedMessage::Call { method, params } => (method, params),
            DecodedMessage::Response { .. } => {
                return serialize_fault(
                    fault_codes::INVALID_REQUEST,
                    "expected a method call, got a response document",
                    &options.to_serialize_options(),
                );
            }
        };

        match self.dispatch(&method, &params) {
            Ok(value) => encode_response(&value, &options),
            Err(fault) => {
                serialize_fault(fault.code, &fault.message, &options.to_serialize_options())
            }
        }
    }

    fn dispatch(&mut self, method: &str, params: &[Value]) -> Result<Value, Fault> {
        match method {
            system_methods::LIST_METHODS => Ok(Value::Array(
                self.list_methods().into_iter().map(Value::String).collect(),
            )),
            system_methods::METHOD_HELP => {
                let name = single_name_argument(params)?;
                self.method_help(&name).map(Value::String)
            }
            system_methods::METHOD_SIGNATURE => {
                let name = single_name_argument(params)?;
                self.method_signatures(&name).map(|signatures| {
                    Value::Array(
                        signatures
                            .into_iter()
                            .map(|signature| {
                                Value::Array(
                                    signature.into_iter().map(Value::String).collect(),
                                )
                            })
                            .collect(),
                    )
                })
            }
            _ => {
                if !self.handlers.contains_key(method) {
                    return Err(method_not_found(method));
                }
                self.validate_params(method, params)?;
                let handler = self
                    .handlers
                    .get(method)
                    .ok_or_else(|| method_not_found(method))?;
                handler(params)
            }
        }
    }

    /// Check the call against the stored signature set, when one exists.
    /// At least one folded signature must match on arity and per-argument
    /// type; methods without recorded signatures accept any call.
    fn validate_params(&self, method: &str, params: &[Value]) -> Result<(), Fault> {
        let Some(entry) = self.introspection.entry(method) else {
            return Ok(());
        };
        if entry.signatures.is_empty() {
            return Ok(());
        }

        for signature in &entry.signatures {
            let expected = &signature[1..];
            if expected.len() != params.len() {
                continue;
            }
            if expected
                .iter()
                .zip(params)
                .all(|(want, have)| type_matches(want, have))
            {
                return Ok(());
            }
        }

        Err(Fault::new(
            fault_codes::INVALID_PARAMS,
            format!(
                "no declared signature of {method} accepts {} argument(s) of the given types",
                params.len()
            ),
        ))
    }

    fn is_known(&self, method: &str) -> bool {
        self.handlers.contains_key(method) || system_methods::KNOWN.contains(&method)
    }

    fn consume_pending_introspection(&mut self) {
        if let Some(callback) = self.introspection.take_callback() {
            let doc = callback();
            let recorded = self.add_introspection_data(&doc);
            tracing::debug!(recorded, "consumed deferred introspection data");
        }
    }
}

fn single_name_argument(params: &[Value]) -> Result<String, Fault> {
    match params {
        [Value::String(name)] => Ok(name.clone()),
        _ => Err(Fault::new(
            fault_codes::INVALID_PARAMS,
            "expected a single method-name string argument",
        )),
    }
}

fn method_not_found(method: &str) -> Fault {
    Fault::new(
        fault_codes::METHOD_NOT_FOUND,
        format!("method not found: {method}"),
    )
}

/// Declared-type match for one argument. Unknown declared type names are
/// accepted; an integer argument satisfies a declared double.
fn type_matches(want: &str, have: &Value) -> bool {
    let Some(declared) = WireType::from_wire(want) else {
        return true;
    };
    match classify(have) {
        Some(kind) => kind == declared || (declared == WireType::Double && kind == WireType::Int),
        None => false,
    }
}
