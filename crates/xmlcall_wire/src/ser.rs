use std::fmt::Write as _;

use crate::value::WireValue;

/// Coarse character-escaping strategy for serialized output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EscapeMode {
    /// Escape markup characters and any code point the target character
    /// set cannot represent (numeric character references).
    #[default]
    Charset,
    /// Escape markup characters only; the payload character set stays
    /// distinct from the declared encoding label.
    Markup,
}

/// Serializer knobs threaded as an explicit argument through every call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Decimal digits rendered for `<double>` payloads.
    pub double_precision: u8,
    /// Encoding label declared in the XML prolog; in `Charset` mode it is
    /// also the escape target.
    pub encoding: String,
    pub escape: EscapeMode,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            double_precision: 6,
            encoding: "utf-8".to_owned(),
            escape: EscapeMode::default(),
        }
    }
}

/// Serialize one method call document.
/// Allocation: one output String. Complexity: O(total value size).
pub fn serialize_call(method: &str, params: &[WireValue], opts: &SerializeOptions) -> String {
    let mut out = prolog(opts);
    out.push_str("<methodCall>\n<methodName>");
    escape_text(&mut out, method, opts);
    out.push_str("</methodName>\n");
    write_params(&mut out, params, opts);
    out.push_str("</methodCall>\n");
    out
}

/// Serialize one method response document wrapping a single value.
pub fn serialize_response(value: &WireValue, opts: &SerializeOptions) -> String {
    let mut out = prolog(opts);
    out.push_str("<methodResponse>\n");
    write_params(&mut out, std::slice::from_ref(value), opts);
    out.push_str("</methodResponse>\n");
    out
}

/// Serialize one fault response document.
pub fn serialize_fault(code: i64, message: &str, opts: &SerializeOptions) -> String {
    let fault = WireValue::Struct(vec![
        ("faultCode".to_owned(), WireValue::Int(code)),
        ("faultString".to_owned(), WireValue::String(message.to_owned())),
    ]);
    let mut out = prolog(opts);
    out.push_str("<methodResponse>\n<fault>\n<value>");
    write_value(&mut out, &fault, opts);
    out.push_str("</value>\n</fault>\n</methodResponse>\n");
    out
}

/// Serialize a bare `<params>` block with no call/response envelope.
pub fn serialize_params(params: &[WireValue], opts: &SerializeOptions) -> String {
    let mut out = prolog(opts);
    write_params(&mut out, params, opts);
    out
}

fn prolog(opts: &SerializeOptions) -> String {
    format!("<?xml version=\"1.0\" encoding=\"{}\"?>\n", opts.encoding)
}

fn write_params(out: &mut String, params: &[WireValue], opts: &SerializeOptions) {
    out.push_str("<params>\n");
    for param in params {
        out.push_str("<param>\n<value>");
        write_value(out, param, opts);
        out.push_str("</value>\n</param>\n");
    }
    out.push_str("</params>\n");
}

/// Append one wire value inside an enclosing `<value>` element.
/// Allocation: output growth only. Complexity: O(value size).
pub fn write_value(out: &mut String, value: &WireValue, opts: &SerializeOptions) {
    match value {
        WireValue::Int(v) => {
            let _ = write!(out, "<int>{v}</int>");
        }
        WireValue::Double(v) => {
            let _ = write!(out, "<double>{}</double>", format_double(*v, opts.double_precision));
        }
        WireValue::Boolean(v) => {
            let _ = write!(out, "<boolean>{}</boolean>", u8::from(*v));
        }
        WireValue::String(v) => {
            out.push_str("<string>");
            escape_text(out, v, opts);
            out.push_str("</string>");
        }
        WireValue::Base64(bytes) => {
            use base64::Engine;
            let _ = write!(
                out,
                "<base64>{}</base64>",
                base64::engine::general_purpose::STANDARD.encode(bytes)
            );
        }
        WireValue::DateTime { raw, .. } => {
            let _ = write!(out, "<dateTime.iso8601>{raw}</dateTime.iso8601>");
        }
        WireValue::Array(items) => {
            out.push_str("<array>\n<data>\n");
            for item in items {
                out.push_str("<value>");
                write_value(out, item, opts);
                out.push_str("</value>\n");
            }
            out.push_str("</data>\n</array>");
        }
        WireValue::Struct(members) => {
            out.push_str("<struct>\n");
            for (name, member) in members {
                out.push_str("<member>\n<name>");
                escape_text(out, name, opts);
                out.push_str("</name>\n<value>");
                write_value(out, member, opts);
                out.push_str("</value>\n</member>\n");
            }
            out.push_str("</struct>");
        }
    }
}

fn format_double(v: f64, precision: u8) -> String {
    let mut rendered = format!("{:.*}", usize::from(precision), v);
    if rendered.contains('.') {
        while rendered.ends_with('0') {
            rendered.pop();
        }
        if rendered.ends_with('.') {
            rendered.pop();
        }
    }
    rendered
}

fn escape_text(out: &mut String, text: &str, opts: &SerializeOptions) {
    let charset_limit = match opts.escape {
        EscapeMode::Markup => None,
        EscapeMode::Charset => charset_max_scalar(&opts.encoding),
    };

    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => match charset_limit {
                Some(limit) if u32::from(ch) > limit => {
                    let _ = write!(out, "&#{};", u32::from(ch));
                }
                _ => out.push(ch),
            },
        }
    }
}

/// Highest code point the labeled charset can carry verbatim.
/// `None` means no numeric-reference escaping is needed.
fn charset_max_scalar(label: &str) -> Option<u32> {
    match label.to_ascii_lowercase().as_str() {
        "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Some(0xFF),
        "us-ascii" | "ascii" => Some(0x7F),
        _ => None,
    }
}
