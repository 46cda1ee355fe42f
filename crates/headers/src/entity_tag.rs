//! Entity tags (`ETag`, `If-Match`, `If-None-Match`) and the `If-Range`
//! condition, which holds either an entity tag or a date.

use std::fmt;
use std::time::SystemTime;

use crate::parser::{HeaderParser, ParseHeader, ParseHeaderList};
use crate::rule::{check_date, format_date, quoted_string_length, try_parse_date, whitespace_length};
use crate::{HeaderError, ensure};

const ANY: &str = "*";

/// A strong (`"xyz"`) or weak (`W/"xyz"`) entity tag, or `*`.
///
/// The opaque tag keeps its double quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTag {
    tag: String,
    weak: bool,
}

impl EntityTag {
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] unless `tag` is a complete
    /// quoted-string, or `*` for a strong tag.
    pub fn new(tag: impl Into<String>, weak: bool) -> Result<Self, HeaderError> {
        let tag = tag.into();
        let is_any = !weak && tag == ANY;
        ensure!(
            is_any || quoted_string_length(&tag, 0) == Some(tag.len()),
            HeaderError::invalid_argument(format!("invalid entity tag '{tag}', a quoted-string is expected"))
        );
        Ok(Self { tag, weak })
    }

    /// The `*` tag, matching any current representation.
    pub fn any() -> Self {
        Self { tag: ANY.to_owned(), weak: false }
    }

    pub fn is_any(&self) -> bool {
        !self.weak && self.tag == ANY
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_weak(&self) -> bool {
        self.weak
    }

    /// Compares two tags as described by RFC 7232 section 2.3.2.
    ///
    /// The strong comparison only holds for two strong tags; the weak one
    /// ignores the weakness indicator.
    pub fn compare(&self, other: &Self, strong: bool) -> bool {
        if strong && (self.weak || other.weak) {
            return false;
        }
        self.tag == other.tag
    }
}

pub(crate) fn scan_entity_tag(input: &str, start: usize) -> Option<(usize, EntityTag)> {
    let bytes = input.as_bytes();
    let mut current = start;

    let entity_tag = match *bytes.get(start)? {
        b'*' => {
            current += 1;
            EntityTag::any()
        }
        first => {
            let weak = matches!(first, b'W' | b'w');
            if weak {
                current += 1;
                // `/` and two quotes at least
                if current + 2 >= bytes.len() || bytes[current] != b'/' {
                    return None;
                }
                current += 1;
                current += whitespace_length(input, current);
            }

            let tag_length = quoted_string_length(input, current)?;
            let tag = input[current..current + tag_length].to_owned();
            current += tag_length;
            EntityTag { tag, weak }
        }
    };

    current += whitespace_length(input, current);
    Some((current - start, entity_tag))
}

impl ParseHeader for EntityTag {
    const PARSER: HeaderParser<Self> = HeaderParser::single(scan_entity_tag);
}

impl ParseHeaderList for EntityTag {
    const LIST_PARSER: HeaderParser<Self> = HeaderParser::multiple(scan_entity_tag);
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            f.write_str("W/")?;
        }
        f.write_str(&self.tag)
    }
}

/// The `If-Range` header.
///
/// The `TryFrom` conversions reject `*` and dates an HTTP date can not express.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RangeCondition {
    LastModified(SystemTime),
    EntityTag(EntityTag),
}

impl RangeCondition {
    pub fn last_modified(&self) -> Option<SystemTime> {
        match self {
            Self::LastModified(date) => Some(*date),
            Self::EntityTag(_) => None,
        }
    }

    pub fn entity_tag(&self) -> Option<&EntityTag> {
        match self {
            Self::LastModified(_) => None,
            Self::EntityTag(entity_tag) => Some(entity_tag),
        }
    }
}

/// Tells an entity tag from a date by the first two bytes, then requires the
/// whole remainder of `input` to be that value.
fn scan_range_condition(input: &str, start: usize) -> Option<(usize, RangeCondition)> {
    let bytes = input.as_bytes();
    if start + 1 >= bytes.len() {
        return None;
    }

    let is_entity_tag = bytes[start] == b'"' || (matches!(bytes[start], b'W' | b'w') && bytes[start + 1] == b'/');
    let condition = if is_entity_tag {
        let (length, entity_tag) = scan_entity_tag(input, start)?;
        if start + length != bytes.len() {
            return None;
        }
        RangeCondition::EntityTag(entity_tag)
    } else {
        RangeCondition::LastModified(try_parse_date(input.get(start..)?)?)
    };

    Some((bytes.len() - start, condition))
}

impl ParseHeader for RangeCondition {
    const PARSER: HeaderParser<Self> = HeaderParser::single(scan_range_condition);
}

impl TryFrom<EntityTag> for RangeCondition {
    type Error = HeaderError;

    /// Fails for `*`, which `If-Range` does not allow.
    fn try_from(entity_tag: EntityTag) -> Result<Self, Self::Error> {
        ensure!(!entity_tag.is_any(), HeaderError::invalid_argument("'*' is not a valid range condition"));
        Ok(Self::EntityTag(entity_tag))
    }
}

impl TryFrom<SystemTime> for RangeCondition {
    type Error = HeaderError;

    fn try_from(date: SystemTime) -> Result<Self, Self::Error> {
        check_date(date).map(Self::LastModified)
    }
}

impl fmt::Display for RangeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastModified(date) => f.write_str(&format_date(*date, false)),
            Self::EntityTag(entity_tag) => entity_tag.fmt(f),
        }
    }
}
