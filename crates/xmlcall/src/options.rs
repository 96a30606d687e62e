use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;

use xmlcall_wire::{EscapeMode, SerializeOptions};

/// Output configuration threaded as an explicit argument through the
/// normalizer/serializer call chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Decimal digits rendered for double payloads.
    pub double_precision: u8,
    /// Encoding label declared on serialized output.
    pub encoding: String,
    /// Working charset used when shaping decoded strings for the caller.
    pub internal_encoding: String,
    pub escape: EscapeMode,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            double_precision: 6,
            encoding: "utf-8".to_owned(),
            internal_encoding: "iso-8859-1".to_owned(),
            escape: EscapeMode::default(),
        }
    }
}

impl EncodeOptions {
    pub(crate) fn to_serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            double_precision: self.double_precision,
            encoding: self.encoding.clone(),
            escape: self.escape,
        }
    }
}

static PROCESS_DEFAULTS: LazyLock<ArcSwap<EncodeOptions>> =
    LazyLock::new(|| ArcSwap::from_pointee(EncodeOptions::default()));

/// Current process-wide default options.
pub fn process_defaults() -> Arc<EncodeOptions> {
    PROCESS_DEFAULTS.load_full()
}

/// Replace the process-wide default options.
pub fn set_process_defaults(options: EncodeOptions) {
    PROCESS_DEFAULTS.store(Arc::new(options));
}

/// Scoped override of the process-wide options slot.
///
/// Snapshots the prior value on install and restores it on drop, so every
/// exit path, including unwinding, leaves the slot as it was found. The
/// override-and-restore discipline is not reentrant-safe across threads
/// sharing the slot; callers serialize access around it.
#[must_use = "the override is reverted when the guard drops"]
pub struct ScopedOptions {
    prior: Arc<EncodeOptions>,
}

impl ScopedOptions {
    pub fn install(options: EncodeOptions) -> Self {
        let prior = PROCESS_DEFAULTS.swap(Arc::new(options));
        Self { prior }
    }
}

impl Drop for ScopedOptions {
    fn drop(&mut self) {
        PROCESS_DEFAULTS.store(Arc::clone(&self.prior));
    }
}

/// Collapse requested escaping strategy labels into the two supported
/// coarse modes.
///
/// Only `markup` selects markup-only escaping. Finer strategies (`cdata`,
/// separate `non-ascii` / `non-print` handling) are not reproduced; they
/// collapse to charset escaping and the approximation is logged.
pub fn resolve_escaping(requested: &[&str]) -> EscapeMode {
    if requested == ["markup"] {
        return EscapeMode::Markup;
    }
    if requested
        .iter()
        .any(|label| matches!(*label, "cdata" | "non-ascii" | "non-print"))
    {
        tracing::debug!(
            requested = ?requested,
            "fine-grained escaping is not supported; using charset escaping"
        );
    }
    EscapeMode::Charset
}

/// Serializes tests that touch the process-wide slot; the override pattern
/// is documented non-reentrant across threads.
#[cfg(test)]
pub(crate) fn slot_test_guard() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
