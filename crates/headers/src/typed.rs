//! Typed access to an [`http::HeaderMap`].
//!
//! [`TypedHeader`] binds a header value type to the header name it is usually
//! sent under. [`HeaderMapExt`] reads and writes such values, and also parses
//! any header by name for types that are used under several names (`Accept`
//! and `Content-Type` both carry media types).
//!
//! Occurrences that are not visible ASCII are skipped. Several occurrences of
//! a header are read as if they were joined with `", "`.

use std::fmt;

use http::header::{self, AsHeaderName, GetAll};
use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::trace;

use crate::parser::{ParseHeader, ParseHeaderList};
use crate::{CacheControl, ContentDisposition, ContentRange, Cookie, EntityTag, HeaderError, MediaType, Range, RangeCondition, SetCookie};

pub trait TypedHeader: ParseHeader + fmt::Display {
    fn header_name() -> HeaderName;

    /// Parses the value out of every occurrence of the header.
    fn from_values<'a>(values: impl IntoIterator<Item = &'a HeaderValue>) -> Option<Self> {
        Self::try_parse(&join_values(values)?)
    }

    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if the formatted value is not a
    /// valid header value.
    fn to_header_value(&self) -> Result<HeaderValue, HeaderError> {
        HeaderValue::try_from(self.to_string()).map_err(HeaderError::invalid_argument)
    }
}

impl TypedHeader for MediaType {
    fn header_name() -> HeaderName {
        header::CONTENT_TYPE
    }
}

impl TypedHeader for CacheControl {
    fn header_name() -> HeaderName {
        header::CACHE_CONTROL
    }
}

impl TypedHeader for Range {
    fn header_name() -> HeaderName {
        header::RANGE
    }
}

impl TypedHeader for ContentRange {
    fn header_name() -> HeaderName {
        header::CONTENT_RANGE
    }
}

impl TypedHeader for EntityTag {
    fn header_name() -> HeaderName {
        header::ETAG
    }
}

impl TypedHeader for RangeCondition {
    fn header_name() -> HeaderName {
        header::IF_RANGE
    }
}

impl TypedHeader for ContentDisposition {
    fn header_name() -> HeaderName {
        header::CONTENT_DISPOSITION
    }
}

impl TypedHeader for Cookie {
    fn header_name() -> HeaderName {
        header::COOKIE
    }
}

impl TypedHeader for SetCookie {
    fn header_name() -> HeaderName {
        header::SET_COOKIE
    }
}

pub trait HeaderMapExt {
    /// The value of the `T::header_name()` header, `None` when absent or invalid.
    fn typed_get<T: TypedHeader>(&self) -> Option<T>;

    /// Every valid value of the `T::header_name()` header, `None` when there is none.
    fn typed_get_list<T: TypedHeader + ParseHeaderList>(&self) -> Option<Vec<T>>;

    /// Replaces every occurrence of the `T::header_name()` header with `value`.
    ///
    /// # Errors
    ///
    /// Fails like [`TypedHeader::to_header_value`].
    fn typed_insert<T: TypedHeader>(&mut self, value: &T) -> Result<(), HeaderError>;

    /// Adds `value` as one more occurrence of the `T::header_name()` header.
    ///
    /// # Errors
    ///
    /// Fails like [`TypedHeader::to_header_value`].
    fn typed_append<T: TypedHeader>(&mut self, value: &T) -> Result<(), HeaderError>;

    /// The value of the header called `name`, `None` when absent or invalid.
    fn get_parsed<T: ParseHeader, K: AsHeaderName>(&self, name: K) -> Option<T>;

    /// Every valid value of the header called `name`, `None` when there is none.
    fn get_parsed_list<T: ParseHeaderList, K: AsHeaderName>(&self, name: K) -> Option<Vec<T>>;
}

impl HeaderMapExt for HeaderMap {
    fn typed_get<T: TypedHeader>(&self) -> Option<T> {
        T::from_values(self.get_all(T::header_name()))
    }

    fn typed_get_list<T: TypedHeader + ParseHeaderList>(&self) -> Option<Vec<T>> {
        T::try_parse_list(str_values(self.get_all(T::header_name())))
    }

    fn typed_insert<T: TypedHeader>(&mut self, value: &T) -> Result<(), HeaderError> {
        self.insert(T::header_name(), value.to_header_value()?);
        Ok(())
    }

    fn typed_append<T: TypedHeader>(&mut self, value: &T) -> Result<(), HeaderError> {
        self.append(T::header_name(), value.to_header_value()?);
        Ok(())
    }

    fn get_parsed<T: ParseHeader, K: AsHeaderName>(&self, name: K) -> Option<T> {
        T::try_parse(&join_values(self.get_all(name))?)
    }

    fn get_parsed_list<T: ParseHeaderList, K: AsHeaderName>(&self, name: K) -> Option<Vec<T>> {
        T::try_parse_list(str_values(self.get_all(name)))
    }
}

fn str_values(values: GetAll<'_, HeaderValue>) -> impl Iterator<Item = &str> {
    values.into_iter().filter_map(|value| {
        let text = value.to_str().ok();
        if text.is_none() {
            trace!(?value, "skipping header value that is not visible ascii");
        }
        text
    })
}

/// `None` when there is no usable occurrence at all.
fn join_values<'a>(values: impl IntoIterator<Item = &'a HeaderValue>) -> Option<String> {
    let mut joined: Option<String> = None;
    for value in values {
        let Ok(text) = value.to_str() else {
            trace!(?value, "skipping header value that is not visible ascii");
            continue;
        };
        match &mut joined {
            Some(joined) => {
                joined.push_str(", ");
                joined.push_str(text);
            }
            None => joined = Some(text.to_owned()),
        }
    }
    joined
}
