//! Escaping in both directions
//!
//! Inbound text is percent-encoded by the caller so that the delimiters of
//! aggregate syntax (`,` `:` `[` `]` `{` `}`) never appear inside a value.
//! Outbound strings are emitted as double-quoted script literals.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::WireError;

/// Decode `%XX` escapes into UTF-8 text. `+` is left as-is.
pub fn percent_decode(text: &str) -> Result<String, WireError> {
    if !text.contains('%') {
        return Ok(String::from(text));
    }

    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] == b'%' {
            let hi = bytes.get(pos + 1).copied().and_then(hex_digit);
            let lo = bytes.get(pos + 2).copied().and_then(hex_digit);
            match (hi, lo) {
                (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                _ => {
                    return Err(WireError::InvalidEscape {
                        text: String::from(text),
                        position: pos,
                    })
                }
            }
            pos += 3;
        } else {
            out.push(bytes[pos]);
            pos += 1;
        }
    }

    String::from_utf8(out).map_err(|_| WireError::InvalidUtf8 {
        text: String::from(text),
    })
}

/// Percent-encode everything except ASCII letters, digits and `-_.~`.
pub fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            // Writing to a String cannot fail
            let _ = write!(out, "%{:02X}", byte);
        }
    }
    out
}

/// Escape text for use inside a double-quoted script string literal.
///
/// `"` and `\` are backslash-escaped, the common control characters use
/// their short forms, other control characters become `\u00XX`. With
/// `escape_non_ascii`, every character above U+007F is written as `\uXXXX`
/// (UTF-16 code units, so astral characters become surrogate pairs).
pub fn escape_string(text: &str, escape_non_ascii: bool) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c if escape_non_ascii && (c as u32) > 0x7f => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{:04X}", unit);
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// [`escape_string`] wrapped in double quotes.
pub fn quote_string(text: &str, escape_non_ascii: bool) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    out.push_str(&escape_string(text, escape_non_ascii));
    out.push('"');
    out
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
