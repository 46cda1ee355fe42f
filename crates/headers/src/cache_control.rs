//! The `Cache-Control` header.
//!
//! The header is scanned as a comma separated list of [`NameValue`] directives
//! and then reduced into a [`CacheControl`] record. Recognized directives are
//! validated one by one:
//!
//! - flags such as `no-store` or `public` must not carry a value
//! - `max-age`, `s-maxage` and `min-fresh` need a non-negative number of seconds
//! - `max-stale` may be bare or carry seconds
//! - `no-cache` and `private` may carry a quoted list of field names
//!
//! Unknown directives are kept as extensions, so parsing only fails when a
//! recognized directive has a malformed value.
//!
//! [`contains_cache_directive`] and [`try_parse_seconds`] look up a single
//! directive in raw header values without building the record.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::name_value::{NameValue, Parameters, value_length};
use crate::parser::{HeaderParser, ParseHeader, ParseHeaderList as _, Parsed};
use crate::rule::{number_length, parse_non_negative_i32, token_length, whitespace_length};
use crate::utils::{unordered_eq_by, unordered_hash};
use crate::{HeaderError, ensure, rule};

const NO_CACHE: &str = "no-cache";
const NO_STORE: &str = "no-store";
const MAX_AGE: &str = "max-age";
const SHARED_MAX_AGE: &str = "s-maxage";
const MAX_STALE: &str = "max-stale";
const MIN_FRESH: &str = "min-fresh";
const NO_TRANSFORM: &str = "no-transform";
const ONLY_IF_CACHED: &str = "only-if-cached";
const PUBLIC: &str = "public";
const PRIVATE: &str = "private";
const MUST_REVALIDATE: &str = "must-revalidate";
const PROXY_REVALIDATE: &str = "proxy-revalidate";

const DIRECTIVES: [&str; 12] = [
    NO_CACHE,
    NO_STORE,
    MAX_AGE,
    SHARED_MAX_AGE,
    MAX_STALE,
    MIN_FRESH,
    NO_TRANSFORM,
    ONLY_IF_CACHED,
    PUBLIC,
    PRIVATE,
    MUST_REVALIDATE,
    PROXY_REVALIDATE,
];

/// Largest number of seconds a directive accepts.
const MAX_SECONDS: u32 = i32::MAX.unsigned_abs();

/// A `Cache-Control` record.
///
/// Plain flags are public fields. Directives with a value go through setters,
/// which keep seconds whole and within `0..=i32::MAX` and keep a field name
/// list or a `max-stale` limit only while its directive is set.
#[derive(Debug, Clone, Default)]
#[expect(clippy::struct_excessive_bools, reason = "one flag per cache directive")]
pub struct CacheControl {
    no_cache: bool,
    no_cache_headers: Vec<String>,
    pub no_store: bool,
    max_age: Option<Duration>,
    shared_max_age: Option<Duration>,
    max_stale: bool,
    max_stale_limit: Option<Duration>,
    min_fresh: Option<Duration>,
    pub no_transform: bool,
    pub only_if_cached: bool,
    pub public: bool,
    private: bool,
    private_headers: Vec<String>,
    pub must_revalidate: bool,
    pub proxy_revalidate: bool,
    extensions: Parameters,
}

impl CacheControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_cache(&self) -> bool {
        self.no_cache
    }

    /// Unsetting `no-cache` drops its field names.
    pub fn set_no_cache(&mut self, no_cache: bool) {
        self.no_cache = no_cache;
        if !no_cache {
            self.no_cache_headers.clear();
        }
    }

    /// Field names listed by `no-cache="..."`.
    pub fn no_cache_headers(&self) -> &[String] {
        &self.no_cache_headers
    }

    /// Adds a field name to `no-cache`, setting the directive.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `header` is not a token.
    pub fn add_no_cache_header(&mut self, header: impl Into<String>) -> Result<(), HeaderError> {
        self.no_cache_headers.push(check_field_name(header.into())?);
        self.no_cache = true;
        Ok(())
    }

    pub fn private(&self) -> bool {
        self.private
    }

    /// Unsetting `private` drops its field names.
    pub fn set_private(&mut self, private: bool) {
        self.private = private;
        if !private {
            self.private_headers.clear();
        }
    }

    /// Field names listed by `private="..."`.
    pub fn private_headers(&self) -> &[String] {
        &self.private_headers
    }

    /// Adds a field name to `private`, setting the directive.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `header` is not a token.
    pub fn add_private_header(&mut self, header: impl Into<String>) -> Result<(), HeaderError> {
        self.private_headers.push(check_field_name(header.into())?);
        self.private = true;
        Ok(())
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// # Errors
    ///
    /// Fails unless `max_age` is a whole number of seconds up to `i32::MAX`.
    pub fn set_max_age(&mut self, max_age: Option<Duration>) -> Result<(), HeaderError> {
        self.max_age = check_seconds(max_age, MAX_AGE)?;
        Ok(())
    }

    /// `s-maxage`
    pub fn shared_max_age(&self) -> Option<Duration> {
        self.shared_max_age
    }

    /// # Errors
    ///
    /// Fails like [`CacheControl::set_max_age`].
    pub fn set_shared_max_age(&mut self, shared_max_age: Option<Duration>) -> Result<(), HeaderError> {
        self.shared_max_age = check_seconds(shared_max_age, SHARED_MAX_AGE)?;
        Ok(())
    }

    /// `max-stale`, with or without a limit.
    pub fn max_stale(&self) -> bool {
        self.max_stale
    }

    /// Sets a bare `max-stale`; unsetting it drops the limit.
    pub fn set_max_stale(&mut self, max_stale: bool) {
        self.max_stale = max_stale;
        if !max_stale {
            self.max_stale_limit = None;
        }
    }

    pub fn max_stale_limit(&self) -> Option<Duration> {
        self.max_stale_limit
    }

    /// Sets the `max-stale` limit, which also sets the directive. `None`
    /// leaves a bare `max-stale`.
    ///
    /// # Errors
    ///
    /// Fails like [`CacheControl::set_max_age`].
    pub fn set_max_stale_limit(&mut self, limit: Option<Duration>) -> Result<(), HeaderError> {
        self.max_stale_limit = check_seconds(limit, MAX_STALE)?;
        self.max_stale = true;
        Ok(())
    }

    pub fn min_fresh(&self) -> Option<Duration> {
        self.min_fresh
    }

    /// # Errors
    ///
    /// Fails like [`CacheControl::set_max_age`].
    pub fn set_min_fresh(&mut self, min_fresh: Option<Duration>) -> Result<(), HeaderError> {
        self.min_fresh = check_seconds(min_fresh, MIN_FRESH)?;
        Ok(())
    }

    /// Directives that are not part of RFC 7234.
    pub fn extensions(&self) -> &Parameters {
        &self.extensions
    }

    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `extension` is named after
    /// a known directive.
    pub fn add_extension(&mut self, extension: NameValue) -> Result<(), HeaderError> {
        let name = extension.name();
        ensure!(
            !DIRECTIVES.iter().any(|directive| directive.eq_ignore_ascii_case(name)),
            HeaderError::invalid_argument(format!("'{name}' is a known cache directive, not an extension"))
        );
        self.extensions.push(extension);
        Ok(())
    }

    pub fn clear_extensions(&mut self) {
        self.extensions.clear();
    }

    /// Folds one directive into the record, `None` when its value is malformed.
    fn apply(&mut self, directive: NameValue) -> Option<()> {
        let value = directive.value();
        match directive.name().to_ascii_lowercase().as_str() {
            NO_CACHE => set_optional_token_list(value, &mut self.no_cache, &mut self.no_cache_headers),
            NO_STORE => set_flag(value, &mut self.no_store),
            MAX_AGE => set_seconds(value, &mut self.max_age),
            SHARED_MAX_AGE => set_seconds(value, &mut self.shared_max_age),
            MAX_STALE => {
                if value.is_some() {
                    set_seconds(value, &mut self.max_stale_limit)?;
                }
                self.max_stale = true;
                Some(())
            }
            MIN_FRESH => set_seconds(value, &mut self.min_fresh),
            NO_TRANSFORM => set_flag(value, &mut self.no_transform),
            ONLY_IF_CACHED => set_flag(value, &mut self.only_if_cached),
            PUBLIC => set_flag(value, &mut self.public),
            PRIVATE => set_optional_token_list(value, &mut self.private, &mut self.private_headers),
            MUST_REVALIDATE => set_flag(value, &mut self.must_revalidate),
            PROXY_REVALIDATE => set_flag(value, &mut self.proxy_revalidate),
            _ => {
                self.extensions.push(directive);
                Some(())
            }
        }
    }
}

fn check_field_name(header: String) -> Result<String, HeaderError> {
    ensure!(rule::is_token(&header), HeaderError::invalid_token(&header));
    Ok(header)
}

fn check_seconds(duration: Option<Duration>, directive: &str) -> Result<Option<Duration>, HeaderError> {
    if let Some(duration) = duration {
        ensure!(
            duration.as_secs() <= u64::from(MAX_SECONDS),
            HeaderError::out_of_range(format!("{directive} {duration:?} is above {MAX_SECONDS} seconds"))
        );
        ensure!(
            duration.subsec_nanos() == 0,
            HeaderError::invalid_argument(format!("{directive} {duration:?} is not a whole number of seconds"))
        );
    }
    Ok(duration)
}

fn set_flag(value: Option<&str>, flag: &mut bool) -> Option<()> {
    if value.is_some() {
        return None;
    }
    *flag = true;
    Some(())
}

fn set_seconds(value: Option<&str>, duration: &mut Option<Duration>) -> Option<()> {
    let seconds = parse_non_negative_i32(value?)?;
    *duration = Some(Duration::from_secs(u64::from(seconds.unsigned_abs())));
    Some(())
}

/// Accepts a bare directive or a quoted, comma separated list of tokens.
///
/// A quoted list must hold at least one token.
fn set_optional_token_list(value: Option<&str>, flag: &mut bool, headers: &mut Vec<String>) -> Option<()> {
    let Some(value) = value else {
        *flag = true;
        return Some(());
    };

    if value.len() < 3 || !value.starts_with('"') || !value.ends_with('"') {
        return None;
    }

    let end = value.len() - 1;
    let original_count = headers.len();
    let mut current = 1;
    while current < end {
        current = next_non_empty_index(value, current);
        if current >= end {
            break;
        }

        let length = token_length(value, current);
        if length == 0 {
            return None;
        }
        headers.push(value[current..current + length].to_owned());
        current += length;
    }

    if headers.len() == original_count {
        return None;
    }
    *flag = true;
    Some(())
}

/// Skips whitespace and any run of commas, with the whitespace around them.
fn next_non_empty_index(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let mut current = start + whitespace_length(input, start);
    while bytes.get(current) == Some(&b',') {
        current += 1;
        current += whitespace_length(input, current);
    }
    current
}

fn scan_cache_control(input: &str, start: usize) -> Option<(usize, CacheControl)> {
    let mut directives = Vec::new();
    let mut current = start;
    while current < input.len() {
        if let Parsed::Value(directive) = NameValue::LIST_PARSER.try_parse_value(input, &mut current)? {
            directives.push(directive);
        }
    }

    let mut cache_control = CacheControl::new();
    for directive in directives {
        cache_control.apply(directive)?;
    }

    Some((input.len() - start, cache_control))
}

impl ParseHeader for CacheControl {
    const PARSER: HeaderParser<Self> = HeaderParser::multiple(scan_cache_control);
}

/// Returns true if any of the raw `Cache-Control` values holds `directive`.
///
/// The values are not validated: only directive names are inspected, so a
/// name inside a quoted value never matches.
pub fn contains_cache_directive<I>(values: I, directive: &str) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    values.into_iter().any(|value| find_directive(value.as_ref(), directive, |_, _| Some(())).is_some())
}

/// Reads the seconds of `directive`, e.g. `max-age=3600`, from raw `Cache-Control` values.
///
/// Occurrences without a valid number are skipped.
pub fn try_parse_seconds<I>(values: I, directive: &str) -> Option<Duration>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    values.into_iter().find_map(|value| find_directive(value.as_ref(), directive, parse_directive_seconds))
}

/// Walks the directive names of `value` and returns the first `Some` produced
/// by `on_match` for a name equal to `directive`.
fn find_directive<T>(value: &str, directive: &str, on_match: impl Fn(&str, usize) -> Option<T>) -> Option<T> {
    let mut index = 0;
    while index < value.len() {
        let length = token_length(value, index);
        if length > 0 && value[index..index + length].eq_ignore_ascii_case(directive) {
            if let Some(found) = on_match(value, index + length) {
                return Some(found);
            }
        }
        index = advance_directive_index(value, index + length);
    }
    None
}

/// Moves past the value of the current directive and the following comma.
fn advance_directive_index(value: &str, start: usize) -> usize {
    let bytes = value.as_bytes();
    let mut current = start + whitespace_length(value, start);

    if bytes.get(current) == Some(&b'=') {
        current += 1;
        current += value_length(value, current);
    }

    match bytes.get(current..).and_then(|rest| rest.iter().position(|byte| *byte == b',')) {
        Some(offset) => {
            current += offset + 1;
            current + whitespace_length(value, current)
        }
        None => value.len(),
    }
}

fn parse_directive_seconds(value: &str, start: usize) -> Option<Duration> {
    let bytes = value.as_bytes();
    let mut current = start + whitespace_length(value, start);
    if bytes.get(current) != Some(&b'=') || current + 1 == bytes.len() {
        return None;
    }

    current += 1;
    current += whitespace_length(value, current);
    let length = number_length(value, current, false);
    let seconds = value[current..current + length].parse().ok()?;
    Some(Duration::from_secs(seconds))
}

fn eq_header_lists(left: &[String], right: &[String]) -> bool {
    unordered_eq_by(left, right, |left, right| left.eq_ignore_ascii_case(right))
}

fn hash_header_list<H: Hasher>(headers: &[String], state: &mut H) {
    let lowercase: Vec<String> = headers.iter().map(|header| header.to_ascii_lowercase()).collect();
    unordered_hash(&lowercase, state);
}

impl PartialEq for CacheControl {
    fn eq(&self, other: &Self) -> bool {
        self.no_cache == other.no_cache
            && self.no_store == other.no_store
            && self.max_age == other.max_age
            && self.shared_max_age == other.shared_max_age
            && self.max_stale == other.max_stale
            && self.max_stale_limit == other.max_stale_limit
            && self.min_fresh == other.min_fresh
            && self.no_transform == other.no_transform
            && self.only_if_cached == other.only_if_cached
            && self.public == other.public
            && self.private == other.private
            && self.must_revalidate == other.must_revalidate
            && self.proxy_revalidate == other.proxy_revalidate
            && eq_header_lists(&self.no_cache_headers, &other.no_cache_headers)
            && eq_header_lists(&self.private_headers, &other.private_headers)
            && self.extensions == other.extensions
    }
}

impl Eq for CacheControl {}

impl Hash for CacheControl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.no_cache, self.no_store, self.max_age, self.shared_max_age).hash(state);
        (self.max_stale, self.max_stale_limit, self.min_fresh).hash(state);
        (self.no_transform, self.only_if_cached, self.public, self.private).hash(state);
        (self.must_revalidate, self.proxy_revalidate).hash(state);
        hash_header_list(&self.no_cache_headers, state);
        hash_header_list(&self.private_headers, state);
        self.extensions.hash(state);
    }
}

/// Appends directives to a `Cache-Control` value, comma separated.
struct DirectiveWriter<'a, 'f> {
    f: &'a mut fmt::Formatter<'f>,
    first: bool,
}

impl DirectiveWriter<'_, '_> {
    fn directive(&mut self, name: &str) -> fmt::Result {
        if !self.first {
            self.f.write_str(", ")?;
        }
        self.first = false;
        self.f.write_str(name)
    }

    fn flag(&mut self, enabled: bool, name: &str) -> fmt::Result {
        if enabled { self.directive(name) } else { Ok(()) }
    }

    fn seconds(&mut self, duration: Option<Duration>, name: &str) -> fmt::Result {
        match duration {
            Some(duration) => {
                self.directive(name)?;
                write!(self.f, "={}", duration.as_secs())
            }
            None => Ok(()),
        }
    }

    fn token_list(&mut self, enabled: bool, name: &str, headers: &[String]) -> fmt::Result {
        if !enabled {
            return Ok(());
        }
        self.directive(name)?;
        if headers.is_empty() {
            return Ok(());
        }

        self.f.write_str("=\"")?;
        for (i, header) in headers.iter().enumerate() {
            if i > 0 {
                self.f.write_str(", ")?;
            }
            self.f.write_str(header)?;
        }
        self.f.write_str("\"")
    }
}

impl fmt::Display for CacheControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = DirectiveWriter { f, first: true };

        writer.flag(self.no_store, NO_STORE)?;
        writer.flag(self.no_transform, NO_TRANSFORM)?;
        writer.flag(self.only_if_cached, ONLY_IF_CACHED)?;
        writer.flag(self.public, PUBLIC)?;
        writer.flag(self.must_revalidate, MUST_REVALIDATE)?;
        writer.flag(self.proxy_revalidate, PROXY_REVALIDATE)?;
        writer.token_list(self.no_cache, NO_CACHE, &self.no_cache_headers)?;
        writer.seconds(self.max_age, MAX_AGE)?;
        writer.seconds(self.shared_max_age, SHARED_MAX_AGE)?;
        if self.max_stale {
            writer.directive(MAX_STALE)?;
            if let Some(limit) = self.max_stale_limit {
                write!(writer.f, "={}", limit.as_secs())?;
            }
        }
        writer.seconds(self.min_fresh, MIN_FRESH)?;
        writer.token_list(self.private, PRIVATE, &self.private_headers)?;

        for extension in &self.extensions {
            writer.directive(&extension.to_string())?;
        }
        Ok(())
    }
}
