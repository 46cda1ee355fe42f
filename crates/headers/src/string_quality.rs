//! Tokens weighted by an optional quality, as in `Accept-Encoding`,
//! `Accept-Charset` and `Accept-Language`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::parser::{HeaderParser, ParseHeader, ParseHeaderList};
use crate::quality::{Preference, check_quality, compare_qualities, format_quality, parse_quality, round_quality};
use crate::rule::{token_length, whitespace_length};
use crate::utils::hash_ignore_ascii_case;
use crate::{HeaderError, ensure, rule};

const WILDCARD: &str = "*";

#[derive(Debug, Clone)]
pub struct StringWithQuality {
    value: String,
    quality: Option<f64>,
}

impl StringWithQuality {
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `value` is not a token.
    pub fn new(value: impl Into<String>) -> Result<Self, HeaderError> {
        let value = value.into();
        ensure!(rule::is_token(&value), HeaderError::invalid_token(&value));
        Ok(Self { value, quality: None })
    }

    /// The quality is rounded to three decimals, the precision it is written with.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `value` is not a token, or
    /// [`HeaderError::OutOfRange`] for a quality outside `0..=1`.
    pub fn with_quality(value: impl Into<String>, quality: f64) -> Result<Self, HeaderError> {
        check_quality(quality)?;
        let mut result = Self::new(value)?;
        result.quality = Some(round_quality(quality));
        Ok(result)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn quality(&self) -> Option<f64> {
        self.quality
    }
}

/// Scans `token [ ";" "q" "=" qvalue ]`, including the whitespace that follows.
fn scan_string_with_quality(input: &str, start: usize) -> Option<(usize, StringWithQuality)> {
    let bytes = input.as_bytes();
    let value_length = token_length(input, start);
    if value_length == 0 {
        return None;
    }

    let value = input[start..start + value_length].to_owned();
    let mut current = start + value_length;
    current += whitespace_length(input, current);

    if bytes.get(current) != Some(&b';') {
        return Some((current - start, StringWithQuality { value, quality: None }));
    }

    current += 1;
    current += whitespace_length(input, current);
    if !matches!(bytes.get(current), Some(b'q' | b'Q')) {
        return None;
    }

    current += 1;
    current += whitespace_length(input, current);
    if bytes.get(current) != Some(&b'=') {
        return None;
    }

    current += 1;
    current += whitespace_length(input, current);
    let (quality_length, quality) = parse_quality(input, current)?;
    current += quality_length;
    current += whitespace_length(input, current);

    Some((current - start, StringWithQuality { value, quality: Some(quality) }))
}

impl ParseHeader for StringWithQuality {
    const PARSER: HeaderParser<Self> = HeaderParser::single(scan_string_with_quality);
}

impl ParseHeaderList for StringWithQuality {
    const LIST_PARSER: HeaderParser<Self> = HeaderParser::multiple(scan_string_with_quality);
}

impl Preference for StringWithQuality {
    /// Quality first, then a bare `*` ranks below any other value.
    fn compare_preference(&self, other: &Self) -> Ordering {
        let ordering = compare_qualities(self.quality, other.quality);
        if ordering != Ordering::Equal || self.value.eq_ignore_ascii_case(&other.value) {
            return ordering;
        }

        if self.value == WILDCARD {
            Ordering::Less
        } else if other.value == WILDCARD {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

impl PartialEq for StringWithQuality {
    fn eq(&self, other: &Self) -> bool {
        self.value.eq_ignore_ascii_case(&other.value) && self.quality == other.quality
    }
}

impl Eq for StringWithQuality {}

impl Hash for StringWithQuality {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_ascii_case(&self.value, state);
        // qualities are never negative, abs folds -0.0 into 0.0
        self.quality.map(|quality| quality.abs().to_bits()).hash(state);
    }
}

impl fmt::Display for StringWithQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quality {
            Some(quality) => write!(f, "{}; q={}", self.value, format_quality(quality)),
            None => f.write_str(&self.value),
        }
    }
}
