//! Grammar primitives shared by every header scanner.
//!
//! These functions measure runs of RFC 7230 productions (tokens, linear whitespace,
//! quoted-strings and decimal numbers) starting at a byte offset, and never allocate.
//! Offsets are byte offsets into a `&str`; every production starts and ends on an
//! ASCII byte, so the slices derived from them are always on char boundaries.
//!
//! Date handling delegates to [`httpdate`], which understands the three formats
//! allowed by RFC 7231 (IMF-fixdate, RFC 850 and asctime).

use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use httpdate::{fmt_http_date, parse_http_date};

use crate::{HeaderError, ensure};

/// Longest run of digits that can still be represented by an `i64`.
pub const MAX_INT64_DIGITS: usize = 19;

/// Largest count the number scanners read back, `i64::MAX`.
pub const MAX_COUNT: u64 = i64::MAX.unsigned_abs();

/// Seconds from the epoch to `9999-12-31T23:59:59Z`, the last instant a
/// four-digit year can express.
const MAX_DATE_SECONDS: u64 = 253_402_300_799;

/// Returns true if `byte` may appear inside an RFC 7230 `token`.
#[inline]
pub fn is_token_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(byte, b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
}

/// Length of the token starting at `start`, 0 if there is none.
pub fn token_length(input: &str, start: usize) -> usize {
    input.as_bytes().get(start..).map_or(0, |rest| rest.iter().take_while(|byte| is_token_char(**byte)).count())
}

/// Returns true if the whole of `input` is a single, non-empty token.
pub fn is_token(input: &str) -> bool {
    !input.is_empty() && token_length(input, 0) == input.len()
}

/// Length of the linear whitespace starting at `start`.
///
/// Spaces and horizontal tabs are whitespace, and so is an obsolete line fold:
/// a CRLF immediately followed by a space or a tab.
pub fn whitespace_length(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let mut current = start;

    while current < bytes.len() {
        match bytes[current] {
            b' ' | b'\t' => current += 1,
            b'\r' if bytes.get(current + 1) == Some(&b'\n') && matches!(bytes.get(current + 2), Some(b' ' | b'\t')) => {
                current += 3;
            }
            _ => break,
        }
    }

    current.saturating_sub(start)
}

/// Length of the quoted-string starting at `start`, including both quotes.
///
/// Returns `None` when `start` is not a `"` or the string is never terminated.
/// A quoted pair is only recognized when there is still room for the closing
/// quote after it, so `"a\"` is a complete quoted-string of four bytes.
pub fn quoted_string_length(input: &str, start: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(start) != Some(&b'"') {
        return None;
    }

    let mut current = start + 1;
    while current < bytes.len() {
        if current + 2 < bytes.len() && bytes[current] == b'\\' && bytes[current + 1].is_ascii() {
            current += 2;
            continue;
        }

        if bytes[current] == b'"' {
            return Some(current + 1 - start);
        }
        current += 1;
    }

    None
}

/// Length of the decimal number starting at `start`.
///
/// A leading `.` is never a number. When `allow_decimal` is set a single `.` may
/// appear after the integer part; `,` is never a decimal separator. Callers cap
/// the returned length themselves, see [`MAX_INT64_DIGITS`].
pub fn number_length(input: &str, start: usize, allow_decimal: bool) -> usize {
    let bytes = input.as_bytes();
    if bytes.get(start) == Some(&b'.') {
        return 0;
    }

    let mut have_dot = !allow_decimal;
    let mut current = start;
    while current < bytes.len() {
        match bytes[current] {
            b'0'..=b'9' => current += 1,
            b'.' if !have_dot => {
                have_dot = true;
                current += 1;
            }
            _ => break,
        }
    }

    current.saturating_sub(start)
}

/// Parses an HTTP date, tolerating surrounding linear whitespace.
pub fn try_parse_date(input: &str) -> Option<SystemTime> {
    parse_http_date(input.trim_matches([' ', '\t'])).ok()
}

/// Returns true if `date` lies between the epoch and the end of year 9999.
pub fn is_valid_date(date: SystemTime) -> bool {
    date.duration_since(UNIX_EPOCH).is_ok_and(|elapsed| elapsed.as_secs() <= MAX_DATE_SECONDS)
}

/// # Errors
///
/// Returns [`HeaderError::OutOfRange`] if `date` can not be written as an HTTP
/// date, see [`is_valid_date`].
pub fn check_date(date: SystemTime) -> Result<SystemTime, HeaderError> {
    ensure!(is_valid_date(date), HeaderError::out_of_range(format!("date {date:?} is not between 1970 and 9999")));
    Ok(date)
}

/// Formats `date` as an IMF-fixdate, optionally wrapped in double quotes.
///
/// Dates rejected by [`check_date`] are clamped to the nearest bound.
pub fn format_date(date: SystemTime, quoted: bool) -> String {
    let date = fmt_http_date(clamp_date(date));
    if quoted { format!("\"{date}\"") } else { date }
}

fn clamp_date(date: SystemTime) -> SystemTime {
    match date.duration_since(UNIX_EPOCH) {
        Ok(elapsed) if elapsed.as_secs() > MAX_DATE_SECONDS => UNIX_EPOCH + Duration::from_secs(MAX_DATE_SECONDS),
        Ok(_) => date,
        Err(_) => UNIX_EPOCH,
    }
}

/// Parses a string made only of ASCII digits into a non-negative `i64`.
///
/// Signs, whitespace and overflow are all rejected.
pub fn parse_non_negative_i64(value: &str) -> Option<i64> {
    parse_digits(value)
}

/// # Errors
///
/// Returns [`HeaderError::OutOfRange`] if `value` is above [`MAX_COUNT`].
pub fn check_count(value: u64, name: &str) -> Result<u64, HeaderError> {
    ensure!(value <= MAX_COUNT, HeaderError::out_of_range(format!("{name} {value} is above {MAX_COUNT}")));
    Ok(value)
}

/// Parses a string made only of ASCII digits into a non-negative `i32`.
pub fn parse_non_negative_i32(value: &str) -> Option<i32> {
    parse_digits(value)
}

fn parse_digits<T: FromStr>(value: &str) -> Option<T> {
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
