//! Encodings for non-ASCII file names.
//!
//! - RFC 5987 extended values, `UTF-8''na%C3%AFve.txt`, carried by `filename*`
//! - MIME encoded-words, `"=?utf-8?B?bmHDr3ZlLnR4dA==?="`, carried by `filename`
//!
//! Only the base64 (`B`) form of encoded-words is understood; anything else
//! is reported as not encoded.

use std::borrow::Cow;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use encoding_rs::Encoding;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::quoted::is_quoted;
use crate::rule;

const RFC_5987_PREFIX: &str = "UTF-8''";
const MIME_PREFIX: &str = "=?utf-8?B?";
const MIME_SUFFIX: &str = "?=";

/// Everything but the `attr-char` production of RFC 5987 section 3.2.1.
const ATTR_CHAR_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Returns true if `input` holds a character outside of printable ASCII and DEL.
pub fn requires_encoding(input: &str) -> bool {
    input.chars().any(is_unsafe_char)
}

#[inline]
fn is_unsafe_char(c: char) -> bool {
    u32::from(c) > 0x7f || u32::from(c) < 0x20
}

/// Replaces every character that [`requires_encoding`] with `_`.
pub fn sanitize(input: &str) -> Cow<'_, str> {
    if !requires_encoding(input) {
        return Cow::Borrowed(input);
    }
    input.chars().map(|c| if is_unsafe_char(c) { '_' } else { c }).collect()
}

/// Encodes `input` as `UTF-8''` followed by its percent-encoded UTF-8 bytes.
pub fn encode_rfc5987(input: &str) -> String {
    format!("{RFC_5987_PREFIX}{}", utf8_percent_encode(input, ATTR_CHAR_ENCODE_SET))
}

/// Decodes `charset'language'value`.
///
/// Returns `None` unless there are exactly two single quotes and the charset is
/// known. Consecutive percent-escapes are transcoded together, so multi-byte
/// characters survive; a `%` not followed by two hex digits is kept literally.
pub fn decode_rfc5987(input: &str) -> Option<String> {
    let mut parts = input.split('\'');
    let (Some(charset), Some(_language), Some(data), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    let encoding = Encoding::for_label(charset.as_bytes())?;

    let bytes = data.as_bytes();
    let mut decoded = String::with_capacity(data.len());
    let mut current = 0;
    while current < bytes.len() {
        let escapes_start = current;
        while is_percent_escape(bytes, current) {
            current += 3;
        }

        if current > escapes_start {
            let escaped: Vec<u8> = percent_decode_str(&data[escapes_start..current]).collect();
            decoded.push_str(&encoding.decode_without_bom_handling(&escaped).0);
            continue;
        }

        let literal = data[current..].chars().next()?;
        decoded.push(literal);
        current += literal.len_utf8();
    }

    Some(decoded)
}

fn is_percent_escape(bytes: &[u8], index: usize) -> bool {
    bytes.get(index) == Some(&b'%')
        && bytes.get(index + 1).is_some_and(u8::is_ascii_hexdigit)
        && bytes.get(index + 2).is_some_and(u8::is_ascii_hexdigit)
}

/// Encodes `input` as a base64 encoded-word, `=?utf-8?B?...?=`.
pub fn encode_mime(input: &str) -> String {
    format!("{MIME_PREFIX}{}{MIME_SUFFIX}", STANDARD.encode(input))
}

/// Decodes a quoted base64 encoded-word, `"=?charset?B?data?="`.
///
/// Returns `None` for any other shape, an unknown charset or bad base64.
/// Bytes that are invalid in the charset decode to U+FFFD.
pub fn decode_mime(input: &str) -> Option<String> {
    // "=?e?b??=" at least
    if !is_quoted(input) || input.len() < 10 {
        return None;
    }

    let mut parts = input.split('?');
    let (Some("\"="), Some(charset), Some(kind), Some(data), Some("=\""), None) =
        (parts.next(), parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    if !kind.eq_ignore_ascii_case("b") {
        return None;
    }

    let encoding = Encoding::for_label(charset.as_bytes())?;
    let bytes = STANDARD.decode(data).ok()?;
    Some(encoding.decode_without_bom_handling(&bytes).0.into_owned())
}

/// Prepares a `filename`-like parameter value.
///
/// Text that [`requires_encoding`] becomes a quoted encoded-word; text that is
/// not a token, or arrived quoted, is quoted with `\` and `"` escaped.
pub fn encode_and_quote_mime(input: &str) -> String {
    let mut needs_quotes = false;
    let mut value = Cow::Borrowed(input);

    if is_quoted(input) {
        value = Cow::Borrowed(&input[1..input.len() - 1]);
        needs_quotes = true;
    }

    if requires_encoding(&value) {
        needs_quotes = true;
        value = Cow::Owned(encode_mime(&value));
    } else if !needs_quotes && !rule::is_token(&value) {
        needs_quotes = true;
    }

    if !needs_quotes {
        return value.into_owned();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
