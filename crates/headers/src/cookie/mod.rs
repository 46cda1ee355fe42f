//! Cookie headers (RFC 6265).
//!
//! A request `Cookie` header carries `name=value` pairs separated by `;` (and,
//! leniently, `,`). A `Set-Cookie` response header carries one such pair
//! followed by attributes, see [`SetCookie`].

mod set_cookie;

use std::fmt;
use std::hash::{Hash, Hasher};

pub use set_cookie::{SameSite, SetCookie};

use crate::parser::{HeaderParser, ParseHeader, ParseHeaderList, Separators};
use crate::rule::token_length;
use crate::utils::hash_ignore_ascii_case;
use crate::{HeaderError, ensure, rule};

/// One `name=value` pair of a request `Cookie` header.
///
/// The value is kept as sent, including its double quotes if any.
#[derive(Debug, Clone)]
pub struct Cookie {
    name: String,
    value: String,
}

impl Cookie {
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `name` is not a token or
    /// `value` is not a run of cookie-octets, optionally quoted.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, HeaderError> {
        let mut cookie = Self { name: check_name(name.into())?, value: String::new() };
        cookie.set_value(value)?;
        Ok(cookie)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `name` is not a token.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), HeaderError> {
        self.name = check_name(name.into())?;
        Ok(())
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `value` is not a run of
    /// cookie-octets, optionally quoted.
    pub fn set_value(&mut self, value: impl Into<String>) -> Result<(), HeaderError> {
        self.value = check_value(value.into())?;
        Ok(())
    }
}

pub(crate) fn check_name(name: String) -> Result<String, HeaderError> {
    ensure!(rule::is_token(&name), HeaderError::invalid_token(&name));
    Ok(name)
}

pub(crate) fn check_value(value: String) -> Result<String, HeaderError> {
    ensure!(
        cookie_value_length(&value, 0) == Some(value.len()),
        HeaderError::invalid_argument(format!("invalid cookie value '{value}'"))
    );
    Ok(value)
}

/// Any visible ASCII byte except `"`, `,`, `;` and `\`.
#[inline]
fn is_cookie_octet(byte: u8) -> bool {
    matches!(byte, 0x21..=0x7e) && !matches!(byte, b'"' | b',' | b';' | b'\\')
}

/// Length of the cookie value at `start`, which may be empty.
///
/// Returns `None` for a quoted value without its closing quote.
pub(crate) fn cookie_value_length(input: &str, start: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let quoted = bytes.get(start) == Some(&b'"');
    let mut current = if quoted { start + 1 } else { start };

    while bytes.get(current).copied().is_some_and(is_cookie_octet) {
        current += 1;
    }

    if quoted {
        if bytes.get(current) != Some(&b'"') {
            return None;
        }
        current += 1;
    }
    Some(current - start)
}

/// Scans `token "=" cookie-value` without any whitespace around `=`.
///
/// Returns the end offset of the pair together with its name and value.
pub(crate) fn scan_name_and_value(input: &str, start: usize) -> Option<(usize, String, String)> {
    let name_length = token_length(input, start);
    if name_length == 0 {
        return None;
    }

    let mut current = start + name_length;
    if input.as_bytes().get(current) != Some(&b'=') {
        return None;
    }
    current += 1;

    let value_length = cookie_value_length(input, current)?;
    let name = input[start..start + name_length].to_owned();
    let value = input[current..current + value_length].to_owned();
    Some((current + value_length, name, value))
}

fn scan_cookie(input: &str, start: usize) -> Option<(usize, Cookie)> {
    let (end, name, value) = scan_name_and_value(input, start)?;
    Some((end - start, Cookie { name, value }))
}

impl ParseHeader for Cookie {
    const PARSER: HeaderParser<Self> = HeaderParser::single(scan_cookie);
}

impl ParseHeaderList for Cookie {
    const LIST_PARSER: HeaderParser<Self> = HeaderParser::multiple(scan_cookie).with_separators(Separators::CommaOrSemicolon);
}

impl PartialEq for Cookie {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name) && self.value.eq_ignore_ascii_case(&other.value)
    }
}

impl Eq for Cookie {}

impl Hash for Cookie {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_ascii_case(&self.name, state);
        hash_ignore_ascii_case(&self.value, state);
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(name: &str, value: &str) -> Cookie {
        Cookie::new(name, value).unwrap()
    }

    #[test]
    fn check_cookie_value() {
        assert_eq!(cookie_value_length("abc; next", 0), Some(3));
        assert_eq!(cookie_value_length("\"abc\"; next", 0), Some(5));
        assert_eq!(cookie_value_length("; next", 0), Some(0));
        assert_eq!(cookie_value_length("\"\"", 0), Some(2));
        assert_eq!(cookie_value_length("\"abc", 0), None);
        assert_eq!(cookie_value_length("\"a b\"", 0), None);
        assert_eq!(cookie_value_length("a\\b", 0), Some(1));
    }

    #[test]
    fn parse_valid_values() {
        assert_eq!(Cookie::parse("name=value").unwrap(), cookie("name", "value"));
        assert_eq!(Cookie::parse(" name=\"quoted\" ").unwrap(), cookie("name", "\"quoted\""));
        assert_eq!(Cookie::parse("name=").unwrap(), cookie("name", ""));
        assert_eq!(Cookie::parse("n=a=b").unwrap().value(), "a=b");
    }

    #[test]
    fn parse_invalid_values() {
        for input in ["", "name", "=value", "name =value", "name= value", "name=\"open", "name=a b", "a=b; c=d", "na me=v"] {
            assert!(Cookie::try_parse(input).is_none(), "{input:?}");
        }
    }

    #[test]
    fn parse_lists() {
        let cookies = Cookie::parse_list(["a=1; b=\"2\", c=", "d=4;;"]).unwrap();
        assert_eq!(cookies, [cookie("a", "1"), cookie("b", "\"2\""), cookie("c", ""), cookie("d", "4")]);

        assert_eq!(Cookie::parse_list(["a=1; b c; d=4"]).unwrap(), [cookie("a", "1"), cookie("d", "4")]);
        assert!(Cookie::parse_strict_list(["a=1; b c; d=4"]).is_err());
    }

    #[test]
    fn constructors() {
        assert!(Cookie::new("", "v").is_err());
        assert!(Cookie::new("a;b", "v").is_err());
        assert!(Cookie::new("name", "a b").is_err());
        assert!(Cookie::new("name", "\"open").is_err());

        let mut value = cookie("name", "v");
        value.set_value("\"quoted\"").unwrap();
        value.set_name("other").unwrap();
        assert_eq!(value.to_string(), "other=\"quoted\"");
        assert!(value.set_value("a,b").is_err());
        assert_eq!(value.value(), "\"quoted\"");
    }

    #[test]
    fn round_trip() {
        let cookies = [cookie("session", "abc123"), cookie("empty", ""), cookie("quoted", "\"a=b\""), cookie("x", "!#$%&'()*+-./:<=>?@[]^_`{|}~")];
        for value in &cookies {
            assert_eq!(&Cookie::parse(&value.to_string()).unwrap(), value, "{value}");
        }

        let joined = cookies.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
        assert_eq!(Cookie::parse_list([joined]).unwrap(), cookies);
    }

    #[test]
    fn equality() {
        assert_eq!(cookie("Name", "Value"), cookie("name", "value"));
        assert_ne!(cookie("name", "value"), cookie("name", "\"value\""));
    }
}
