//! Charset shaping for decoded text.
//!
//! Decoded strings live in the UTF-8 working representation. Shaping them
//! for a caller-requested target charset can only narrow the repertoire;
//! when the target is unknown or cannot represent every code point, the
//! UTF-8 original is returned unchanged. A charset problem never fails a
//! decode.

/// Convert decoded UTF-8 text for the requested target charset.
///
/// Supported targets: `utf-8`, `iso-8859-1`/`latin1`, `us-ascii`. The
/// fallback rule substitutes the original text on any conversion failure.
pub fn to_target_charset(text: &str, target: &str) -> String {
    let Some(limit) = max_scalar(target) else {
        if !is_utf8_label(target) {
            tracing::debug!(target, "unsupported target charset; keeping utf-8 form");
        }
        return text.to_owned();
    };

    if text.chars().any(|ch| u32::from(ch) > limit) {
        tracing::debug!(target, "text not representable in target charset; keeping utf-8 form");
        return text.to_owned();
    }

    text.to_owned()
}

fn is_utf8_label(label: &str) -> bool {
    matches!(label.to_ascii_lowercase().as_str(), "utf-8" | "utf8")
}

fn max_scalar(label: &str) -> Option<u32> {
    match label.to_ascii_lowercase().as_str() {
        "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Some(0xFF),
        "us-ascii" | "ascii" => Some(0x7F),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn representable_text_passes_through() {
        assert_eq!(to_target_charset("caf\u{e9}", "iso-8859-1"), "caf\u{e9}");
        assert_eq!(to_target_charset("plain", "us-ascii"), "plain");
    }

    #[test]
    fn unrepresentable_text_falls_back_to_utf8() {
        assert_eq!(to_target_charset("\u{20ac}10", "iso-8859-1"), "\u{20ac}10");
        assert_eq!(to_target_charset("caf\u{e9}", "us-ascii"), "caf\u{e9}");
    }

    #[test]
    fn unknown_target_falls_back_to_utf8() {
        assert_eq!(to_target_charset("text", "ebcdic"), "text");
    }
}
