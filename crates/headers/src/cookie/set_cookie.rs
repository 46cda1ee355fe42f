use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

use crate::cookie::{check_name, check_value, scan_name_and_value};
use crate::parser::{HeaderParser, ParseHeader, ParseHeaderList};
use crate::rule::{MAX_INT64_DIGITS, check_date, format_date, number_length, token_length, try_parse_date, whitespace_length};
use crate::utils::{hash_ignore_ascii_case, unordered_eq_by, unordered_hash};
use crate::{HeaderError, ensure};

const EXPIRES: &str = "expires";
const MAX_AGE: &str = "max-age";
const DOMAIN: &str = "domain";
const PATH: &str = "path";
const SECURE: &str = "secure";
const SAME_SITE: &str = "samesite";
const HTTP_ONLY: &str = "httponly";

const ATTRIBUTES: [&str; 7] = [EXPIRES, MAX_AGE, DOMAIN, PATH, SECURE, SAME_SITE, HTTP_ONLY];

/// Attribute values of a lone cookie run to the next `;`.
const SINGLE_DELIMITERS: &[char] = &[';'];
/// In a list, a `,` also ends the cookie.
const LIST_DELIMITERS: &[char] = &[';', ','];

/// The `SameSite` attribute.
///
/// `Unspecified` means the attribute is absent, which is not the same as an
/// explicit `SameSite=None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SameSite {
    #[default]
    Unspecified,
    None,
    Lax,
    Strict,
}

impl SameSite {
    fn from_attribute(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Self::Strict,
            "lax" => Self::Lax,
            "none" => Self::None,
            _ => Self::Unspecified,
        }
    }

    fn as_attribute(self) -> Option<&'static str> {
        match self {
            Self::Unspecified => None,
            Self::None => Some("none"),
            Self::Lax => Some("lax"),
            Self::Strict => Some("strict"),
        }
    }
}

/// A `Set-Cookie` header value: a cookie and the attributes that scope it.
///
/// `expires` and `max_age` are independent; both are emitted when set.
/// Unrecognized attributes are kept verbatim, in order, as extensions.
#[derive(Debug, Clone)]
pub struct SetCookie {
    name: String,
    value: String,
    expires: Option<SystemTime>,
    /// Seconds; zero or negative values expire the cookie immediately.
    pub max_age: Option<i64>,
    domain: Option<String>,
    path: Option<String>,
    pub secure: bool,
    pub same_site: SameSite,
    pub http_only: bool,
    extensions: Vec<String>,
}

impl SetCookie {
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `name` is not a token or
    /// `value` is not a run of cookie-octets, optionally quoted.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, HeaderError> {
        Ok(Self::from_parts(check_name(name.into())?, check_value(value.into())?))
    }

    fn from_parts(name: String, value: String) -> Self {
        Self {
            name,
            value,
            expires: None,
            max_age: None,
            domain: None,
            path: None,
            secure: false,
            same_site: SameSite::Unspecified,
            http_only: false,
            extensions: Vec::new(),
        }
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

    pub fn expires(&self) -> Option<SystemTime> {
        self.expires
    }

    /// # Errors
    ///
    /// Returns [`HeaderError::OutOfRange`] for a date before 1970 or after 9999.
    pub fn set_expires(&mut self, expires: Option<SystemTime>) -> Result<(), HeaderError> {
        self.expires = expires.map(check_date).transpose()?;
        Ok(())
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `domain` contains a control
    /// character, `;` or `,`.
    pub fn set_domain(&mut self, domain: Option<String>) -> Result<(), HeaderError> {
        self.domain = domain.map(check_attribute_value).transpose()?;
        Ok(())
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `path` contains a control
    /// character, `;` or `,`.
    pub fn set_path(&mut self, path: Option<String>) -> Result<(), HeaderError> {
        self.path = path.map(check_attribute_value).transpose()?;
        Ok(())
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Appends an attribute emitted verbatim after the known ones.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] unless `extension` starts with a
    /// token that is not a known attribute name, and has no trailing space,
    /// control character, `;` or `,`.
    pub fn push_extension(&mut self, extension: impl Into<String>) -> Result<(), HeaderError> {
        self.extensions.push(check_extension(extension.into())?);
        Ok(())
    }

    pub fn clear_extensions(&mut self) {
        self.extensions.clear();
    }
}

fn check_attribute_value(value: String) -> Result<String, HeaderError> {
    ensure!(
        !value.bytes().any(|byte| byte.is_ascii_control() || matches!(byte, b';' | b',')),
        HeaderError::invalid_argument(format!("invalid cookie attribute value '{value}'"))
    );
    Ok(value)
}

fn check_extension(extension: String) -> Result<String, HeaderError> {
    let extension = check_attribute_value(extension)?;
    let name = &extension[..token_length(&extension, 0)];
    ensure!(
        !name.is_empty() && !extension.ends_with(' '),
        HeaderError::invalid_argument(format!("invalid cookie extension attribute '{extension}'"))
    );
    ensure!(
        !ATTRIBUTES.iter().any(|attribute| attribute.eq_ignore_ascii_case(name)),
        HeaderError::invalid_argument(format!("'{name}' is a known cookie attribute, not an extension"))
    );
    Ok(extension)
}

fn scan_set_cookie(input: &str, start: usize) -> Option<(usize, SetCookie)> {
    scan_set_cookie_with(input, start, SINGLE_DELIMITERS)
}

fn scan_set_cookie_list(input: &str, start: usize) -> Option<(usize, SetCookie)> {
    scan_set_cookie_with(input, start, LIST_DELIMITERS)
}

/// Scans `name=value *( ";" SP cookie-av )`, attribute values ending at one of
/// `delimiters`.
///
/// A `,` between attributes ends the cookie, so that a list of cookies can
/// share one header. An empty attribute name ends the cookie as well and
/// leaves the rest to the caller.
fn scan_set_cookie_with(input: &str, start: usize, delimiters: &[char]) -> Option<(usize, SetCookie)> {
    let bytes = input.as_bytes();
    let (mut current, name, value) = scan_name_and_value(input, start)?;
    let mut cookie = SetCookie::from_parts(name, value);

    while current < bytes.len() {
        match bytes[current] {
            b',' => break,
            b';' => {}
            _ => return None,
        }
        current += 1;
        current += whitespace_length(input, current);

        let attribute_length = token_length(input, current);
        if attribute_length == 0 {
            break;
        }
        let attribute_start = current;
        let attribute = &input[current..current + attribute_length];
        current += attribute_length;

        match attribute.to_ascii_lowercase().as_str() {
            EXPIRES => {
                current = skip_equals_sign(input, current)?;
                let end = date_end(input, current, delimiters);
                cookie.expires = Some(try_parse_date(&input[current..end])?);
                current = end;
            }
            MAX_AGE => {
                current = skip_equals_sign(input, current)?;
                let sign_start = current;
                if bytes.get(current) == Some(&b'-') {
                    current += 1;
                }
                let length = number_length(input, current, false);
                if length == 0 || length > MAX_INT64_DIGITS {
                    return None;
                }
                current += length;
                cookie.max_age = Some(input[sign_start..current].parse().ok()?);
            }
            DOMAIN => {
                current = skip_equals_sign(input, current)?;
                let end = attribute_end(input, current, delimiters);
                cookie.domain = Some(input[current..end].to_owned());
                current = end;
            }
            PATH => {
                current = skip_equals_sign(input, current)?;
                let end = attribute_end(input, current, delimiters);
                cookie.path = Some(input[current..end].to_owned());
                current = end;
            }
            SECURE => cookie.secure = true,
            SAME_SITE => {
                cookie.same_site = match skip_equals_sign(input, current) {
                    Some(value_start) => {
                        current = attribute_end(input, value_start, delimiters);
                        SameSite::from_attribute(&input[value_start..current])
                    }
                    None => SameSite::Unspecified,
                };
            }
            HTTP_ONLY => cookie.http_only = true,
            _ => {
                current = attribute_end(input, current, delimiters);
                cookie.extensions.push(input[attribute_start..current].to_owned());
            }
        }
    }

    Some((current - start, cookie))
}

/// Moves past a `=` at `current`, which must not be preceded by whitespace.
fn skip_equals_sign(input: &str, current: usize) -> Option<usize> {
    (input.as_bytes().get(current) == Some(&b'=')).then_some(current + 1)
}

/// Offset of the next delimiter at or after `start`, or the end of `input`.
fn attribute_end(input: &str, start: usize, delimiters: &[char]) -> usize {
    input[start..].find(delimiters).map_or(input.len(), |offset| start + offset)
}

/// Like [`attribute_end`], except that a `,` right after a leading weekday
/// name (`Sun, 06 Nov 1994 ...`) belongs to the date.
fn date_end(input: &str, start: usize, delimiters: &[char]) -> usize {
    let weekday_length = input.as_bytes()[start..].iter().take_while(|byte| byte.is_ascii_alphabetic()).count();
    let after_weekday = start + weekday_length;
    if weekday_length > 0 && input.as_bytes().get(after_weekday) == Some(&b',') {
        return attribute_end(input, after_weekday + 1, delimiters);
    }
    attribute_end(input, start, delimiters)
}

impl ParseHeader for SetCookie {
    const PARSER: HeaderParser<Self> = HeaderParser::single(scan_set_cookie);
}

impl ParseHeaderList for SetCookie {
    const LIST_PARSER: HeaderParser<Self> = HeaderParser::multiple(scan_set_cookie_list);
}

impl PartialEq for SetCookie {
    fn eq(&self, other: &Self) -> bool {
        let eq_ignore_case = |left: &Option<String>, right: &Option<String>| match (left, right) {
            (Some(left), Some(right)) => left.eq_ignore_ascii_case(right),
            (None, None) => true,
            _ => false,
        };

        self.name.eq_ignore_ascii_case(&other.name)
            && self.value.eq_ignore_ascii_case(&other.value)
            && self.expires == other.expires
            && self.max_age == other.max_age
            && eq_ignore_case(&self.domain, &other.domain)
            && eq_ignore_case(&self.path, &other.path)
            && self.secure == other.secure
            && self.same_site == other.same_site
            && self.http_only == other.http_only
            && unordered_eq_by(&self.extensions, &other.extensions, |left, right| left.eq_ignore_ascii_case(right))
    }
}

impl Eq for SetCookie {}

impl Hash for SetCookie {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_ascii_case(&self.name, state);
        hash_ignore_ascii_case(&self.value, state);
        (self.expires, self.max_age).hash(state);
        self.domain.as_deref().map(str::to_ascii_lowercase).hash(state);
        self.path.as_deref().map(str::to_ascii_lowercase).hash(state);
        (self.secure, self.same_site, self.http_only).hash(state);
        let extensions: Vec<String> = self.extensions.iter().map(|extension| extension.to_ascii_lowercase()).collect();
        unordered_hash(&extensions, state);
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(expires) = self.expires {
            write!(f, "; {EXPIRES}={}", format_date(expires, false))?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; {MAX_AGE}={max_age}")?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; {DOMAIN}={domain}")?;
        }
        if let Some(path) = &self.path {
            write!(f, "; {PATH}={path}")?;
        }
        if self.secure {
            write!(f, "; {SECURE}")?;
        }
        if let Some(same_site) = self.same_site.as_attribute() {
            write!(f, "; {SAME_SITE}={same_site}")?;
        }
        if self.http_only {
            write!(f, "; {HTTP_ONLY}")?;
        }
        for extension in &self.extensions {
            write!(f, "; {extension}")?;
        }
        Ok(())
    }
}
