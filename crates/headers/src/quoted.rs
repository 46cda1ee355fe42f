//! Helpers for moving text in and out of RFC 7230 quoted-strings.

use std::borrow::Cow;

use crate::HeaderError;

/// Returns true if `input` starts and ends with a double quote.
pub fn is_quoted(input: &str) -> bool {
    input.len() > 1 && input.starts_with('"') && input.ends_with('"')
}

/// Strips one pair of bounding double quotes, if present.
pub fn remove_quotes(input: &str) -> &str {
    if is_quoted(input) { &input[1..input.len() - 1] } else { input }
}

/// Wraps `input` in double quotes, escaping `\` and `"`.
///
/// # Errors
///
/// Control characters other than horizontal tab can not be carried by a
/// quoted-string and are rejected with [`HeaderError::InvalidArgument`].
pub fn escape_as_quoted_string(input: &str) -> Result<String, HeaderError> {
    let mut escaped = String::with_capacity(input.len() + 2);
    escaped.push('"');

    for c in input.chars() {
        match c {
            '\\' | '"' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\t' => escaped.push(c),
            c if c.is_ascii_control() => {
                return Err(HeaderError::invalid_argument(format!("invalid control character {:#04x} in input", u32::from(c))));
            }
            c => escaped.push(c),
        }
    }

    escaped.push('"');
    Ok(escaped)
}

/// Removes bounding quotes and the backslash of every quoted pair.
///
/// A backslash that is the very last character has nothing to escape and is
/// kept as is.
pub fn unescape_as_quoted_string(input: &str) -> Cow<'_, str> {
    let input = remove_quotes(input);
    if !input.contains('\\') {
        return Cow::Borrowed(input);
    }

    let mut unescaped = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next)) => {
                unescaped.push(next);
                chars.next();
            }
            (c, _) => unescaped.push(c),
        }
    }

    Cow::Owned(unescaped)
}
