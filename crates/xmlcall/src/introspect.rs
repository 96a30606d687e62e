use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deferred supplier of raw introspection source data. Consumed at most
/// once per server instance.
pub type IntrospectionCallback = Box<dyn FnOnce() -> Value + Send>;

/// Raw introspection source document.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionDoc {
    #[serde(default)]
    pub method_list: Vec<MethodDescription>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescription {
    pub name: String,
    #[serde(default)]
    pub purpose: Option<String>,
    /// Each declared signature lists the return descriptor first, then the
    /// parameter descriptors in order.
    #[serde(default)]
    pub signatures: Option<Vec<Vec<ParamDescription>>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParamDescription {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub optional: bool,
}

/// Source documents mark optionality loosely (bool, 0/1, "1").
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Bool(flag) => flag,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(text) => !matches!(text.as_str(), "" | "0" | "false"),
        Value::Null => false,
        _ => true,
    })
}

/// Per-method introspection record. A method enters the documented state
/// the first time an ingest touches it and never leaves it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MethodEntry {
    pub help: Option<String>,
    /// Folded concrete signatures; each starts with the return type.
    pub signatures: Vec<Vec<String>>,
    /// Per-parameter descriptions, parallel to `signatures`.
    pub parameter_docs: Vec<Vec<String>>,
}

/// Server-side store of method docstrings and folded signature sets.
pub struct IntrospectionStore {
    entries: HashMap<String, MethodEntry>,
    callback: Mutex<Option<IntrospectionCallback>>,
}

impl Default for IntrospectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IntrospectionStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            callback: Mutex::new(None),
        }
    }

    /// Ingest one introspection source document.
    ///
    /// Only methods accepted by `known` are recorded. A provided docstring
    /// replaces the stored one; a provided non-empty signature list fully
    /// replaces the stored signature set via folding. Returns whether
    /// anything was actually recorded.
    pub fn ingest(&mut self, doc: &Value, mut known: impl FnMut(&str) -> bool) -> bool {
        let doc = match serde_json::from_value::<IntrospectionDoc>(doc.clone()) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(error = %err, "introspection document has unexpected shape");
                return false;
            }
        };

        let mut recorded = false;
        for method in doc.method_list {
            if !known(&method.name) {
                tracing::debug!(method = %method.name, "skipping introspection for unregistered method");
                continue;
            }

            let entry = self.entries.entry(method.name.clone()).or_default();
            if let Some(purpose) = method.purpose {
                entry.help = Some(purpose);
                recorded = true;
            }
            if let Some(declared) = method.signatures {
                if !declared.is_empty() {
                    let (signatures, parameter_docs) = fold_signatures(&declared);
                    entry.signatures = signatures;
                    entry.parameter_docs = parameter_docs;
                    recorded = true;
                }
            }
        }
        recorded
    }

    /// Store or clear the deferred introspection supplier.
    pub fn register_callback(&self, callback: Option<IntrospectionCallback>) {
        *self
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = callback;
    }

    /// Atomically take the deferred supplier, clearing the slot. The
    /// check-then-clear happens under one lock so concurrent consumers
    /// observe at most one supplier.
    pub fn take_callback(&self) -> Option<IntrospectionCallback> {
        self.callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn entry(&self, method: &str) -> Option<&MethodEntry> {
        self.entries.get(method)
    }

    pub fn is_documented(&self, method: &str) -> bool {
        self.entries.contains_key(method)
    }
}

/// Fold declared signatures with optional trailing parameters into
/// concrete fixed-arity signatures.
///
/// For each declared signature the running type list starts with the
/// return type; every optional parameter first snapshots the running list
/// as a complete signature, then appends itself; the full list is always
/// recorded last. Snapshots are deduplicated by tag concatenation across
/// the whole operation. A declared signature with no return descriptor is
/// skipped.
pub fn fold_signatures(declared: &[Vec<ParamDescription>]) -> (Vec<Vec<String>>, Vec<Vec<String>>) {
    let mut seen = HashSet::new();
    let mut signatures = Vec::new();
    let mut parameter_docs = Vec::new();

    let mut record = |types: &[String], docs: &[String]| {
        let key = types.concat();
        if seen.insert(key) {
            signatures.push(types.to_vec());
            parameter_docs.push(docs.to_vec());
        }
    };

    for signature in declared {
        let Some((returns, params)) = signature.split_first() else {
            tracing::debug!("skipping declared signature with no return descriptor");
            continue;
        };

        let mut running = vec![returns.type_name.clone()];
        let mut docs = Vec::new();
        for param in params {
            if param.optional {
                record(&running, &docs);
            }
            running.push(param.type_name.clone());
            docs.push(param.description.clone().unwrap_or_default());
        }
        record(&running, &docs);
    }

    (signatures, parameter_docs)
}

#[cfg(test)]
mod tests;
