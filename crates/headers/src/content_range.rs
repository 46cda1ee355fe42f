//! The `Content-Range` response header, `bytes 0-499/1234` or `bytes */1234`.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::parser::{HeaderParser, ParseHeader};
use crate::range::BYTES_UNIT;
use crate::rule::{MAX_INT64_DIGITS, check_count, number_length, parse_non_negative_i64, token_length, whitespace_length};
use crate::utils::hash_ignore_ascii_case;
use crate::{HeaderError, ensure, rule};

#[derive(Debug, Clone)]
pub struct ContentRange {
    unit: String,
    from: Option<u64>,
    to: Option<u64>,
    length: Option<u64>,
}

impl ContentRange {
    /// A `bytes` range of a representation of known length.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::OutOfRange`] unless `from <= to < length`, with
    /// `length` at most `i64::MAX`.
    pub fn new(from: u64, to: u64, length: u64) -> Result<Self, HeaderError> {
        let length = check_count(length, "length")?;
        ensure!(to < length, HeaderError::out_of_range(format!("range end {to} is not below the length {length}")));
        ensure!(from <= to, HeaderError::out_of_range(format!("range start {from} is greater than its end {to}")));
        Ok(Self { unit: BYTES_UNIT.to_owned(), from: Some(from), to: Some(to), length: Some(length) })
    }

    /// `bytes */length`, as sent with `416 Range Not Satisfiable`.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::OutOfRange`] for a length above `i64::MAX`.
    pub fn from_length(length: u64) -> Result<Self, HeaderError> {
        let length = check_count(length, "length")?;
        Ok(Self { unit: BYTES_UNIT.to_owned(), from: None, to: None, length: Some(length) })
    }

    /// `bytes from-to/*`, for a representation of unknown length.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::OutOfRange`] if `from` is greater than `to`, or
    /// `to` is above `i64::MAX`.
    pub fn from_range(from: u64, to: u64) -> Result<Self, HeaderError> {
        let to = check_count(to, "range end")?;
        ensure!(from <= to, HeaderError::out_of_range(format!("range start {from} is greater than its end {to}")));
        Ok(Self { unit: BYTES_UNIT.to_owned(), from: Some(from), to: Some(to), length: None })
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `unit` is not a token.
    pub fn set_unit(&mut self, unit: impl Into<String>) -> Result<(), HeaderError> {
        let unit = unit.into();
        ensure!(rule::is_token(&unit), HeaderError::invalid_token(&unit));
        self.unit = unit;
        Ok(())
    }

    pub fn from(&self) -> Option<u64> {
        self.from
    }

    pub fn to(&self) -> Option<u64> {
        self.to
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }

    pub fn has_range(&self) -> bool {
        self.from.is_some()
    }

    pub fn has_length(&self) -> bool {
        self.length.is_some()
    }
}

/// Scans `unit SP ( from "-" to | "*" ) "/" ( length | "*" )`.
fn scan_content_range(input: &str, start: usize) -> Option<(usize, ContentRange)> {
    let bytes = input.as_bytes();
    let unit_length = token_length(input, start);
    if unit_length == 0 {
        return None;
    }

    let unit = input[start..start + unit_length].to_owned();
    let mut current = start + unit_length;
    let separator_length = whitespace_length(input, current);
    if separator_length == 0 {
        return None;
    }
    current += separator_length;

    let range = if bytes.get(current) == Some(&b'*') {
        current += 1;
        None
    } else {
        let from = scan_number(input, &mut current)?;
        current += whitespace_length(input, current);
        if bytes.get(current) != Some(&b'-') {
            return None;
        }
        current += 1;
        current += whitespace_length(input, current);
        let to = scan_number(input, &mut current)?;
        Some((from, to))
    };
    current += whitespace_length(input, current);

    if bytes.get(current) != Some(&b'/') {
        return None;
    }
    current += 1;
    current += whitespace_length(input, current);

    let length = if bytes.get(current) == Some(&b'*') {
        current += 1;
        None
    } else {
        Some(scan_number(input, &mut current)?)
    };
    current += whitespace_length(input, current);

    let (from, to) = match range {
        Some((from, to)) => {
            if from > to || length.is_some_and(|length| to >= length) {
                return None;
            }
            (Some(from), Some(to))
        }
        None => (None, None),
    };

    Some((current - start, ContentRange { unit, from, to, length }))
}

/// Reads a non-empty run of at most [`MAX_INT64_DIGITS`] digits at `current`.
fn scan_number(input: &str, current: &mut usize) -> Option<u64> {
    let length = number_length(input, *current, false);
    if length == 0 || length > MAX_INT64_DIGITS {
        return None;
    }
    let value = parse_non_negative_i64(&input[*current..*current + length])?;
    *current += length;
    Some(value.unsigned_abs())
}

impl ParseHeader for ContentRange {
    const PARSER: HeaderParser<Self> = HeaderParser::single(scan_content_range);
}

impl PartialEq for ContentRange {
    fn eq(&self, other: &Self) -> bool {
        self.unit.eq_ignore_ascii_case(&other.unit) && self.from == other.from && self.to == other.to && self.length == other.length
    }
}

impl Eq for ContentRange {}

impl Hash for ContentRange {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_ascii_case(&self.unit, state);
        (self.from, self.to, self.length).hash(state);
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.unit)?;
        match (self.from, self.to) {
            (Some(from), Some(to)) => write!(f, "{from}-{to}")?,
            _ => f.write_str("*")?,
        }
        match self.length {
            Some(length) => write!(f, "/{length}"),
            None => f.write_str("/*"),
        }
    }
}
