//! The `Range` request header: a unit followed by a set of ranges,
//! `bytes=0-499, 1000-, -500`.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::parser::{HeaderParser, ParseHeader};
use crate::rule::{MAX_INT64_DIGITS, check_count, number_length, parse_non_negative_i64, token_length, whitespace_length};
use crate::utils::{hash_ignore_ascii_case, unordered_eq, unordered_hash};
use crate::{HeaderError, ensure, rule};

pub(crate) const BYTES_UNIT: &str = "bytes";

/// One range of a `Range` header: `from-to`, `from-` or `-to` (a suffix length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeItem {
    from: Option<u64>,
    to: Option<u64>,
}

impl RangeItem {
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if neither bound is given, or
    /// [`HeaderError::OutOfRange`] if `from` is greater than `to` or a bound is
    /// above `i64::MAX`.
    pub fn new(from: Option<u64>, to: Option<u64>) -> Result<Self, HeaderError> {
        ensure!(from.is_some() || to.is_some(), HeaderError::invalid_argument("a range needs at least one of 'from' and 'to'"));
        let from = from.map(|from| check_count(from, "range start")).transpose()?;
        let to = to.map(|to| check_count(to, "range end")).transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            ensure!(from <= to, HeaderError::out_of_range(format!("range start {from} is greater than its end {to}")));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> Option<u64> {
        self.from
    }

    pub fn to(&self) -> Option<u64> {
        self.to
    }
}

impl fmt::Display for RangeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(from) = self.from {
            write!(f, "{from}")?;
        }
        f.write_str("-")?;
        if let Some(to) = self.to {
            write!(f, "{to}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Range {
    unit: String,
    ranges: Vec<RangeItem>,
}

impl Range {
    /// A `bytes` range with a single item.
    ///
    /// # Errors
    ///
    /// Fails like [`RangeItem::new`].
    pub fn new(from: Option<u64>, to: Option<u64>) -> Result<Self, HeaderError> {
        Ok(Self::from_item(RangeItem::new(from, to)?))
    }

    /// A `bytes` range with a single item.
    pub fn from_item(range: RangeItem) -> Self {
        Self { unit: BYTES_UNIT.to_owned(), ranges: vec![range] }
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

    pub fn ranges(&self) -> &[RangeItem] {
        &self.ranges
    }

    pub fn push(&mut self, range: RangeItem) {
        self.ranges.push(range);
    }
}

/// Scans `unit "=" range-list`; the list must run to the end of `input`.
fn scan_range(input: &str, start: usize) -> Option<(usize, Range)> {
    let unit_length = token_length(input, start);
    if unit_length == 0 {
        return None;
    }

    let unit = input[start..start + unit_length].to_owned();
    let mut current = start + unit_length;
    current += whitespace_length(input, current);
    if input.as_bytes().get(current) != Some(&b'=') {
        return None;
    }
    current += 1;
    current += whitespace_length(input, current);

    let mut ranges = Vec::new();
    current += scan_range_item_list(input, current, &mut ranges)?;
    Some((current - start, Range { unit, ranges }))
}

/// Scans comma separated range items up to the end of `input`, skipping empty entries.
fn scan_range_item_list(input: &str, start: usize, ranges: &mut Vec<RangeItem>) -> Option<usize> {
    let (mut current, _) = next_non_empty_index(input, start);
    if current >= input.len() {
        return None;
    }

    loop {
        let (length, range) = scan_range_item(input, current)?;
        ranges.push(range);

        let (next, separator_found) = next_non_empty_index(input, current + length);
        current = next;
        if current == input.len() {
            return Some(current - start);
        }
        if !separator_found {
            return None;
        }
    }
}

/// Scans `from "-" to`, `from "-"` or `"-" to`, including trailing whitespace.
fn scan_range_item(input: &str, start: usize) -> Option<(usize, RangeItem)> {
    let bytes = input.as_bytes();
    let from_length = number_length(input, start, false);
    if from_length > MAX_INT64_DIGITS {
        return None;
    }

    let mut current = start + from_length;
    current += whitespace_length(input, current);
    if bytes.get(current) != Some(&b'-') {
        return None;
    }
    current += 1;
    current += whitespace_length(input, current);

    let to_start = current;
    let to_length = number_length(input, current, false);
    if to_length > MAX_INT64_DIGITS {
        return None;
    }
    current += to_length;
    current += whitespace_length(input, current);

    if from_length == 0 && to_length == 0 {
        return None;
    }

    let from = parse_bound(&input[start..start + from_length])?;
    let to = parse_bound(&input[to_start..to_start + to_length])?;
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return None;
    }

    Some((current - start, RangeItem { from, to }))
}

/// `Some(None)` for an omitted bound, `None` when the digits do not fit.
fn parse_bound(digits: &str) -> Option<Option<u64>> {
    if digits.is_empty() {
        return Some(None);
    }
    parse_non_negative_i64(digits).map(|value| Some(value.unsigned_abs()))
}

/// Skips whitespace and any run of commas, reporting whether a comma was seen.
fn next_non_empty_index(input: &str, start: usize) -> (usize, bool) {
    let bytes = input.as_bytes();
    let mut current = start + whitespace_length(input, start);
    let mut separator_found = false;
    while bytes.get(current) == Some(&b',') {
        separator_found = true;
        current += 1;
        current += whitespace_length(input, current);
    }
    (current, separator_found)
}

impl ParseHeader for Range {
    const PARSER: HeaderParser<Self> = HeaderParser::single(scan_range);
}

impl PartialEq for Range {
    fn eq(&self, other: &Self) -> bool {
        self.unit.eq_ignore_ascii_case(&other.unit) && unordered_eq(&self.ranges, &other.ranges)
    }
}

impl Eq for Range {}

impl Hash for Range {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_ascii_case(&self.unit, state);
        unordered_hash(&self.ranges, state);
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.unit)?;
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}
