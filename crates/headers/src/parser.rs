//! Generic header value parser engine.
//!
//! Every header grammar in this crate is expressed as a [`Scanner`]: a pure function
//! that recognizes one value starting at a byte offset and reports how many bytes it
//! consumed. A [`HeaderParser`] binds such a scanner to the list rules of its header:
//!
//! - whether the header carries a comma separated list of values,
//! - which bytes separate list entries (`,`, or `,` and `;` for cookies).
//!
//! The engine owns everything the scanners have in common:
//!
//! - skipping whitespace and empty list entries (`", ,a"`)
//! - rejecting separators on single value headers
//! - leaving the caller's cursor untouched when a value is rejected
//! - walking several raw header occurrences in strict or lenient mode
//!
//! Parser descriptors are `const` values without interior state, so a single instance
//! per header type is shared by every caller.
//!
//! The public surface of each header type is provided by the [`ParseHeader`] and
//! [`ParseHeaderList`] traits, which only need the descriptors.

use std::fmt;

use tracing::{debug, trace};

use crate::HeaderError;
use crate::rule::whitespace_length;

/// Recognizes one value at `start`.
///
/// Returns the number of bytes consumed (always greater than zero) together with
/// the value, or `None` when the input at `start` does not match the grammar. The
/// caller has already skipped leading whitespace.
pub type Scanner<T> = fn(&str, usize) -> Option<(usize, T)>;

/// The bytes that separate entries of a list header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separators {
    /// `,` only, the RFC 7230 `#rule`
    Comma,
    /// `,` or `;`, as seen in `Cookie` request headers
    CommaOrSemicolon,
}

impl Separators {
    #[inline]
    fn contains(self, byte: u8) -> bool {
        match self {
            Self::Comma => byte == b',',
            Self::CommaOrSemicolon => matches!(byte, b',' | b';'),
        }
    }
}

/// Outcome of a successful [`HeaderParser::try_parse_value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T> {
    Value(T),
    /// The list entry was empty, e.g. a bare `,` or an empty header occurrence.
    Empty,
}

impl<T> Parsed<T> {
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Empty => None,
        }
    }
}

/// A scanner bound to the list rules of one header type.
pub struct HeaderParser<T> {
    supports_multiple_values: bool,
    separators: Separators,
    scanner: Scanner<T>,
}

impl<T> HeaderParser<T> {
    /// A parser for headers that carry exactly one value.
    pub const fn single(scanner: Scanner<T>) -> Self {
        Self { supports_multiple_values: false, separators: Separators::Comma, scanner }
    }

    /// A parser for headers that carry a comma separated list of values.
    pub const fn multiple(scanner: Scanner<T>) -> Self {
        Self { supports_multiple_values: true, separators: Separators::Comma, scanner }
    }

    #[must_use]
    pub const fn with_separators(mut self, separators: Separators) -> Self {
        self.separators = separators;
        self
    }

    pub fn supports_multiple_values(&self) -> bool {
        self.supports_multiple_values
    }

    pub fn separators(&self) -> Separators {
        self.separators
    }

    /// Parses one value of `input` starting at `index`.
    ///
    /// On success `index` is moved past the value, past the following separator and
    /// past any whitespace, so calling this repeatedly walks a list. On failure `index`
    /// is left unchanged.
    ///
    /// An empty remainder is only acceptable for list headers, for which it yields
    /// [`Parsed::Empty`].
    pub fn try_parse_value(&self, input: &str, index: &mut usize) -> Option<Parsed<T>> {
        if input.is_empty() || *index == input.len() {
            return self.supports_multiple_values.then_some(Parsed::Empty);
        }
        if *index > input.len() {
            return None;
        }

        let (mut current, separator_found) = self.next_non_empty_index(input, *index);
        if separator_found && !self.supports_multiple_values {
            // leading separators are not allowed on single value headers
            return None;
        }

        if current == input.len() {
            if self.supports_multiple_values {
                *index = current;
                return Some(Parsed::Empty);
            }
            return None;
        }

        let (length, value) = (self.scanner)(input, current)?;
        if length == 0 {
            return None;
        }
        current += length;

        let (current, separator_found) = self.next_non_empty_index(input, current);
        if (separator_found && !self.supports_multiple_values) || (!separator_found && current < input.len()) {
            return None;
        }

        *index = current;
        Some(Parsed::Value(value))
    }

    /// Same as [`try_parse_value`](Self::try_parse_value) but reports where parsing started.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidFormat`] carrying the start index and the raw input.
    pub fn parse_value(&self, input: &str, index: &mut usize) -> Result<Parsed<T>, HeaderError> {
        let start = *index;
        self.try_parse_value(input, index).ok_or_else(|| HeaderError::invalid_format(start, input))
    }

    /// Parses every value of every raw header occurrence.
    ///
    /// In lenient mode a value that fails to parse is skipped one byte at a time; in
    /// strict mode the whole batch fails. Empty list entries are dropped. Returns
    /// `None` if the batch failed or no value was found at all.
    pub fn try_parse_values<I>(&self, values: I, strict: bool) -> Option<Vec<T>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let results = self.parse_values(values, strict).ok()?;
        (!results.is_empty()).then_some(results)
    }

    /// Parses every value of every raw header occurrence.
    ///
    /// # Errors
    ///
    /// In strict mode, returns [`HeaderError::InvalidFormat`] for the first entry that
    /// does not parse. Lenient mode never fails.
    pub fn parse_values<I>(&self, values: I, strict: bool) -> Result<Vec<T>, HeaderError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut results = Vec::new();

        for value in values {
            let value = value.as_ref();
            let mut index = 0;
            while index < value.len() {
                match self.try_parse_value(value, &mut index) {
                    Some(Parsed::Value(parsed)) => results.push(parsed),
                    Some(Parsed::Empty) => {}
                    None if strict => {
                        debug!(index, value, "rejected header value in strict mode");
                        return Err(HeaderError::invalid_format(index, value));
                    }
                    None => {
                        trace!(index, value, "skipping invalid header value");
                        index += 1;
                    }
                }
            }
        }

        Ok(results)
    }

    /// Skips whitespace, one separator and, for list headers, any run of empty
    /// entries after it.
    ///
    /// Returns the new index and whether a separator was crossed.
    fn next_non_empty_index(&self, input: &str, start: usize) -> (usize, bool) {
        let bytes = input.as_bytes();
        let mut current = start + whitespace_length(input, start);

        if current == bytes.len() || !self.separators.contains(bytes[current]) {
            return (current, false);
        }

        current += 1;
        current += whitespace_length(input, current);

        if self.supports_multiple_values {
            while current < bytes.len() && self.separators.contains(bytes[current]) {
                current += 1;
                current += whitespace_length(input, current);
            }
        }

        (current, true)
    }
}

impl<T> Clone for HeaderParser<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for HeaderParser<T> {}

impl<T> fmt::Debug for HeaderParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderParser")
            .field("supports_multiple_values", &self.supports_multiple_values)
            .field("separators", &self.separators)
            .finish_non_exhaustive()
    }
}

/// Parsing of a single header value.
pub trait ParseHeader: Sized {
    /// The parser used for a complete, single header value.
    const PARSER: HeaderParser<Self>;

    /// Parses `input` as exactly one value.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidFormat`] when `input` is not a valid value.
    fn parse(input: &str) -> Result<Self, HeaderError> {
        let mut index = 0;
        match Self::PARSER.parse_value(input, &mut index)? {
            Parsed::Value(value) => Ok(value),
            Parsed::Empty => Err(HeaderError::invalid_format(index, input)),
        }
    }

    /// Parses `input` as exactly one value, returning `None` when it is not valid.
    fn try_parse(input: &str) -> Option<Self> {
        Self::PARSER.try_parse_value(input, &mut 0).and_then(Parsed::into_value)
    }
}

/// Parsing of list headers, possibly spread over several header occurrences.
pub trait ParseHeaderList: ParseHeader {
    /// The parser used to walk comma separated values.
    const LIST_PARSER: HeaderParser<Self>;

    /// Parses every valid value, silently dropping invalid ones.
    ///
    /// # Errors
    ///
    /// Lenient parsing never fails; the `Result` mirrors [`parse_strict_list`](Self::parse_strict_list).
    fn parse_list<I>(values: I) -> Result<Vec<Self>, HeaderError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::LIST_PARSER.parse_values(values, false)
    }

    /// Parses every valid value, returning `None` when none was found.
    fn try_parse_list<I>(values: I) -> Option<Vec<Self>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::LIST_PARSER.try_parse_values(values, false)
    }

    /// Parses every value, failing on the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidFormat`] for the first invalid entry.
    fn parse_strict_list<I>(values: I) -> Result<Vec<Self>, HeaderError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::LIST_PARSER.parse_values(values, true)
    }

    /// Parses every value, returning `None` on the first invalid one or when none was found.
    fn try_parse_strict_list<I>(values: I) -> Option<Vec<Self>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::LIST_PARSER.try_parse_values(values, true)
    }
}
