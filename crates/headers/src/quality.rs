//! Quality values (`q=0.8`) used for content negotiation.

use std::cmp::Ordering;

use crate::HeaderError;
use crate::name_value::Parameters;

/// The quality of a value that matches fully, the default when none is given.
pub const QUALITY_MATCH: f64 = 1.0;

/// The quality of a value that must not be chosen.
pub const QUALITY_NO_MATCH: f64 = 0.0;

/// Upper bound on the bytes a quality value may span, decimal digits included.
const QUALITY_MAX_LENGTH: usize = 10;

const QUALITY_PARAMETER: &str = "q";

/// Scans a quality value at `start`: `0` or `1`, optionally followed by `.` and digits.
///
/// Returns the consumed length and the value. Values above 1 are rejected.
/// Scanning stops after the integer digit, and after `QUALITY_MAX_LENGTH`
/// bytes, leaving any digits beyond to the caller.
pub fn parse_quality(input: &str, start: usize) -> Option<(usize, f64)> {
    let bytes = input.as_bytes();
    let mut quality = match bytes.get(start)? {
        b'0' => 0.0,
        b'1' => 1.0,
        _ => return None,
    };

    let mut current = start + 1;
    if bytes.get(current) == Some(&b'.') {
        current += 1;
        let mut decimal = 0u64;
        let mut power = 1u64;
        while current - start < QUALITY_MAX_LENGTH {
            let Some(&byte @ b'0'..=b'9') = bytes.get(current) else {
                break;
            };
            decimal = decimal * 10 + u64::from(byte - b'0');
            power *= 10;
            current += 1;
        }

        #[expect(clippy::cast_precision_loss, reason = "at most eight decimal digits")]
        let fraction = decimal as f64 / power as f64;
        quality += fraction;
        if quality > QUALITY_MATCH {
            return None;
        }
    }

    Some((current - start, quality))
}

/// Formats a quality with at least one and at most three decimals.
pub fn format_quality(quality: f64) -> String {
    // abs turns -0.0 into 0.0; qualities are never negative otherwise
    let mut formatted = format!("{:.3}", quality.abs());
    while formatted.ends_with('0') && !formatted.ends_with(".0") {
        formatted.pop();
    }
    formatted
}

/// Rounds `quality` to the value it reads back as once formatted.
pub(crate) fn round_quality(quality: f64) -> f64 {
    parse_quality(&format_quality(quality), 0).map_or(quality, |(_, rounded)| rounded)
}

/// Reads the `q` parameter, `None` when it is missing or malformed.
pub(crate) fn get_quality(parameters: &Parameters) -> Option<f64> {
    let value = parameters.get(QUALITY_PARAMETER)?;
    parse_quality(value, 0).map(|(_, quality)| quality)
}

/// Writes or, given `None`, removes the `q` parameter.
pub(crate) fn set_quality(parameters: &mut Parameters, quality: Option<f64>) -> Result<(), HeaderError> {
    match quality {
        Some(quality) => {
            check_quality(quality)?;
            parameters.set_raw(QUALITY_PARAMETER, Some(format_quality(quality)));
        }
        None => parameters.remove_named(QUALITY_PARAMETER),
    }
    Ok(())
}

pub(crate) fn check_quality(quality: f64) -> Result<(), HeaderError> {
    if (QUALITY_NO_MATCH..=QUALITY_MATCH).contains(&quality) {
        Ok(())
    } else {
        Err(HeaderError::out_of_range(format!("quality {quality} is not between 0 and 1")))
    }
}

/// Ranking of negotiated values, lowest preference first.
///
/// Quality is always the primary key; implementations break ties by how
/// specific the value is, a wildcard being less specific than anything else.
pub trait Preference {
    fn compare_preference(&self, other: &Self) -> Ordering;
}

/// Sorts `values` from the most to the least preferred, keeping the relative
/// order of values that rank the same.
pub fn sort_by_preference<T: Preference>(values: &mut [T]) {
    values.sort_by(|left, right| right.compare_preference(left));
}

/// Orders two optional qualities, a missing one counting as a full match.
pub(crate) fn compare_qualities(left: Option<f64>, right: Option<f64>) -> Ordering {
    left.unwrap_or(QUALITY_MATCH).total_cmp(&right.unwrap_or(QUALITY_MATCH))
}
