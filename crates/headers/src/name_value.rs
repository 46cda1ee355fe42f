//! `name[=value]` pairs and the parameter lists built from them.
//!
//! Parameters show up after media types (`text/plain; charset=utf-8`), in
//! content dispositions and, separated by commas, as cache-control directives.
//! Values are kept exactly as they appeared on the wire: a quoted value keeps
//! its quotes and escapes, see [`NameValue::unescaped_value`].

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::parser::{HeaderParser, ParseHeader, ParseHeaderList};
use crate::quoted::{escape_as_quoted_string, unescape_as_quoted_string};
use crate::rule::{quoted_string_length, token_length, whitespace_length};
use crate::utils::{hash_ignore_ascii_case, unordered_eq, unordered_hash};
use crate::{HeaderError, ensure, rule};

#[derive(Debug, Clone)]
pub struct NameValue {
    name: String,
    value: Option<String>,
}

impl NameValue {
    /// Creates a parameter without a value.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `name` is not a token.
    pub fn new(name: impl Into<String>) -> Result<Self, HeaderError> {
        let name = name.into();
        ensure!(rule::is_token(&name), HeaderError::invalid_token(&name));
        Ok(Self { name, value: None })
    }

    /// Creates a parameter with a raw value, which must be a token or a quoted-string.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `name` is not a token or `value`
    /// is neither empty, a token nor a quoted-string.
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Result<Self, HeaderError> {
        let mut name_value = Self::new(name)?;
        name_value.set_value(Some(value.into()))?;
        Ok(name_value)
    }

    pub(crate) fn from_parts(name: String, value: Option<String>) -> Self {
        Self { name, value }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw value, quotes and escapes included.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Replaces the raw value.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `value` is neither empty, a token
    /// nor a quoted-string.
    pub fn set_value(&mut self, value: Option<String>) -> Result<(), HeaderError> {
        if let Some(value) = &value {
            check_value_format(value)?;
        }
        self.value = value;
        Ok(())
    }

    /// The value with bounding quotes and escapes removed.
    pub fn unescaped_value(&self) -> Option<Cow<'_, str>> {
        self.value.as_deref().map(unescape_as_quoted_string)
    }

    /// Sets the value, quoting and escaping it when it is not already a token or a
    /// quoted-string.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] when the value holds control
    /// characters that can not be quoted.
    pub fn set_and_escape_value(&mut self, value: Option<&str>) -> Result<(), HeaderError> {
        self.value = match value {
            None => None,
            Some(value) if value.is_empty() || value_length(value, 0) == value.len() => Some(value.to_owned()),
            Some(value) => Some(escape_as_quoted_string(value)?),
        };
        Ok(())
    }

    fn has_empty_value(&self) -> bool {
        self.value.as_deref().is_none_or(str::is_empty)
    }
}

pub(crate) fn check_value_format(value: &str) -> Result<(), HeaderError> {
    if value.is_empty() {
        return Ok(());
    }

    ensure!(
        !value.starts_with([' ', '\t']) && !value.ends_with([' ', '\t']),
        HeaderError::invalid_argument(format!("the header value '{value}' has leading or trailing whitespace"))
    );
    ensure!(
        value_length(value, 0) == value.len(),
        HeaderError::invalid_argument(format!("the header value '{value}' is neither a token nor a quoted-string"))
    );
    Ok(())
}

/// Length of the token or quoted-string at `start`, 0 if there is neither.
pub(crate) fn value_length(input: &str, start: usize) -> usize {
    match token_length(input, start) {
        0 => quoted_string_length(input, start).unwrap_or(0),
        length => length,
    }
}

/// Scans `name [ "=" value ]`, including the whitespace that follows.
///
/// The value may be empty (`name=`), which is kept as `Some("")`.
pub(crate) fn scan_name_value(input: &str, start: usize) -> Option<(usize, NameValue)> {
    let name_length = token_length(input, start);
    if name_length == 0 {
        return None;
    }

    let name = input[start..start + name_length].to_owned();
    let mut current = start + name_length;
    current += whitespace_length(input, current);

    if input.as_bytes().get(current) != Some(&b'=') {
        return Some((current - start, NameValue::from_parts(name, None)));
    }

    current += 1;
    current += whitespace_length(input, current);

    let value_length = value_length(input, current);
    let value = input[current..current + value_length].to_owned();
    current += value_length;
    current += whitespace_length(input, current);

    Some((current - start, NameValue::from_parts(name, Some(value))))
}

/// Scans `name[=value]` pairs separated by `delimiter` into `parameters`.
///
/// Returns the length of the valid prefix: scanning stops before the first
/// byte that can not continue the list. A trailing delimiter is consumed.
pub(crate) fn scan_name_value_list(input: &str, start: usize, delimiter: u8, parameters: &mut Parameters) -> usize {
    let bytes = input.as_bytes();
    let mut current = start + whitespace_length(input, start);

    loop {
        let Some((length, parameter)) = scan_name_value(input, current) else {
            return current - start;
        };

        parameters.push(parameter);
        current += length;
        current += whitespace_length(input, current);

        if current == bytes.len() || bytes[current] != delimiter {
            return current - start;
        }

        current += 1;
        current += whitespace_length(input, current);
    }
}

impl ParseHeader for NameValue {
    const PARSER: HeaderParser<Self> = HeaderParser::single(scan_name_value);
}

impl ParseHeaderList for NameValue {
    const LIST_PARSER: HeaderParser<Self> = HeaderParser::multiple(scan_name_value);
}

impl PartialEq for NameValue {
    fn eq(&self, other: &Self) -> bool {
        if !self.name.eq_ignore_ascii_case(&other.name) {
            return false;
        }

        match (self.value.as_deref(), other.value.as_deref()) {
            _ if self.has_empty_value() => other.has_empty_value(),
            (Some(value), Some(other)) if value.starts_with('"') => value == other,
            (Some(value), Some(other)) => value.eq_ignore_ascii_case(other),
            _ => false,
        }
    }
}

impl Eq for NameValue {}

impl Hash for NameValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_ascii_case(&self.name, state);
        match self.value.as_deref() {
            None | Some("") => {}
            Some(value) if value.starts_with('"') => value.hash(state),
            Some(value) => hash_ignore_ascii_case(value, state),
        }
    }
}

impl fmt::Display for NameValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.as_deref() {
            Some(value) if !value.is_empty() => write!(f, "{}={value}", self.name),
            _ => f.write_str(&self.name),
        }
    }
}

/// An ordered list of parameters.
///
/// Names may repeat; lookups are case-insensitive and return the first match.
/// Two lists are equal when they hold the same parameters, in any order.
#[derive(Debug, Clone, Default)]
pub struct Parameters(Vec<NameValue>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NameValue> {
        self.0.iter()
    }

    pub fn push(&mut self, parameter: NameValue) {
        self.0.push(parameter);
    }

    /// Removes the first parameter equal to `parameter`.
    pub fn remove(&mut self, parameter: &NameValue) -> bool {
        match self.0.iter().position(|p| p == parameter) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn find(&self, name: &str) -> Option<&NameValue> {
        self.0.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut NameValue> {
        self.0.iter_mut().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// The raw value of the first parameter called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(NameValue::value)
    }

    /// Overwrites the value of the first parameter called `name`, or appends a new one.
    ///
    /// `None` removes the parameter. The value is trusted to be in wire format already.
    pub(crate) fn set_raw(&mut self, name: &str, value: Option<String>) {
        let Some(value) = value else {
            self.remove_named(name);
            return;
        };

        if let Some(parameter) = self.find_mut(name) {
            parameter.value = Some(value);
        } else {
            self.push(NameValue::from_parts(name.to_owned(), Some(value)));
        }
    }

    pub(crate) fn remove_named(&mut self, name: &str) {
        if let Some(index) = self.0.iter().position(|p| p.name.eq_ignore_ascii_case(name)) {
            self.0.remove(index);
        }
    }

    /// Writes every parameter preceded by `"; "`.
    pub(crate) fn fmt_prefixed(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|parameter| write!(f, "; {parameter}"))
    }
}

impl PartialEq for Parameters {
    fn eq(&self, other: &Self) -> bool {
        unordered_eq(&self.0, &other.0)
    }
}

impl Eq for Parameters {}

impl Hash for Parameters {
    fn hash<H: Hasher>(&self, state: &mut H) {
        unordered_hash(&self.0, state);
    }
}

impl FromIterator<NameValue> for Parameters {
    fn from_iter<T: IntoIterator<Item = NameValue>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a NameValue;
    type IntoIter = std::slice::Iter<'a, NameValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn nv(name: &str, value: Option<&str>) -> NameValue {
        NameValue::from_parts(name.into(), value.map(Into::into))
    }

    #[test]
    fn parse_single() {
        assert_eq!(NameValue::parse("name").unwrap(), nv("name", None));
        assert_eq!(NameValue::parse(" name = value ").unwrap(), nv("name", Some("value")));
        assert_eq!(NameValue::parse("name=\"quoted, value\"").unwrap().value(), Some("\"quoted, value\""));
        assert_eq!(NameValue::parse("name=").unwrap().value(), Some(""));

        assert!(NameValue::try_parse("").is_none());
        assert!(NameValue::try_parse("name=value, other").is_none());
        assert!(NameValue::try_parse("=value").is_none());
        assert!(NameValue::try_parse("name=\"unterminated").is_none());
    }

    #[test]
    fn parse_list() {
        let parsed = NameValue::parse_list(["a=1, b", ", c=\"x,y\""]).unwrap();
        assert_eq!(parsed, [nv("a", Some("1")), nv("b", None), nv("c", Some("\"x,y\""))]);

        assert_eq!(NameValue::parse_list(["a=1, (b), c"]).unwrap(), [nv("a", Some("1")), nv("c", None)]);
        assert!(NameValue::try_parse_strict_list(["a=1, (b), c"]).is_none());
    }

    #[test]
    fn scan_list_stops_at_garbage() {
        let mut parameters = Parameters::new();
        let input = "; a=1; b=\"2\" ;";
        assert_eq!(scan_name_value_list(input, 1, b';', &mut parameters), input.len() - 1);
        assert_eq!(parameters.len(), 2);

        let mut parameters = Parameters::new();
        assert_eq!(scan_name_value_list("a=1; b=2 c", 0, b';', &mut parameters), 9);
        assert_eq!(parameters.get("B"), Some("2"));
    }

    #[test]
    fn validating_constructors() {
        assert!(NameValue::new("").is_err());
        assert!(NameValue::new("a b").is_err());
        assert!(NameValue::with_value("name", " value").is_err());
        assert!(NameValue::with_value("name", "two words").is_err());
        assert!(NameValue::with_value("name", "\"two words\"").is_ok());
        assert!(NameValue::with_value("name", "").is_ok());
    }

    #[test]
    fn escaping_values() {
        let mut parameter = NameValue::new("filename").unwrap();
        parameter.set_and_escape_value(Some("my File \"Name\"")).unwrap();
        assert_eq!(parameter.value(), Some(r#""my File \"Name\"""#));
        assert_eq!(parameter.unescaped_value().as_deref(), Some("my File \"Name\""));

        parameter.set_and_escape_value(Some("plain")).unwrap();
        assert_eq!(parameter.value(), Some("plain"));
        assert!(parameter.set_and_escape_value(Some("bell\u{7}")).is_err());
    }

    #[test]
    fn equality() {
        assert_eq!(nv("Name", Some("Value")), nv("name", Some("VALUE")));
        assert_eq!(hash_of(&nv("Name", Some("Value"))), hash_of(&nv("name", Some("VALUE"))));
        assert_ne!(nv("name", Some("\"Value\"")), nv("name", Some("\"VALUE\"")));
        assert_eq!(nv("name", Some("")), nv("NAME", None));
        assert_eq!(hash_of(&nv("name", Some(""))), hash_of(&nv("NAME", None)));
        assert_ne!(nv("name", None), nv("name", Some("x")));

        let left: Parameters = [nv("a", Some("1")), nv("b", None)].into_iter().collect();
        let right: Parameters = [nv("B", None), nv("A", Some("1"))].into_iter().collect();
        assert_eq!(left, right);
        assert_eq!(hash_of(&left), hash_of(&right));
    }

    #[test]
    fn display() {
        assert_eq!(nv("a", Some("1")).to_string(), "a=1");
        assert_eq!(nv("a", Some("")).to_string(), "a");
        assert_eq!(nv("a", None).to_string(), "a");
    }

    #[test]
    fn set_raw_keeps_position_and_case() {
        let mut parameters: Parameters = [nv("Charset", Some("utf-8")), nv("q", Some("0.5"))].into_iter().collect();
        parameters.set_raw("charset", Some("ascii".into()));
        assert_eq!(parameters.iter().next(), Some(&nv("Charset", Some("ascii"))));
        assert_eq!(parameters.iter().next().map(NameValue::name), Some("Charset"));

        parameters.set_raw("boundary", Some("xyz".into()));
        assert_eq!(parameters.len(), 3);

        parameters.set_raw("CHARSET", None);
        assert_eq!(parameters.get("charset"), None);
        assert!(parameters.remove(&nv("Q", Some("0.5"))));
        assert_eq!(parameters.len(), 1);
    }
}
