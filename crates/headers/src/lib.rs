//! Strongly typed HTTP header values
//!
//! This crate parses, validates and formats the values of common HTTP headers.
//! It works on header *values* only: reading and writing whole header blocks is
//! left to the [`http`] crate, and [`HeaderMapExt`] bridges the two.
//!
//! # Features
//!
//! - Media types with parameters and quality (`Content-Type`, `Accept`)
//! - Strings with quality (`Accept-Charset`, `Accept-Encoding`, `Accept-Language`)
//! - `Cache-Control`, `Range`, `Content-Range`, `ETag`, `If-Match`, `If-Range`
//! - `Cookie` and `Set-Cookie`
//! - `Content-Disposition`, including RFC 5987 and MIME encoded file names
//! - Strict and lenient list parsing, see [`ParseHeaderList`]
//! - Read-only shareable copies, see [`Frozen`]
//!
//! # Example
//!
//! ```
//! use micro_headers::{MediaType, ParseHeader, ParseHeaderList, StringWithQuality, sort_by_preference};
//!
//! let media_type = MediaType::parse("text/html; charset=utf-8").unwrap();
//! assert_eq!(media_type.media_type(), "text/html");
//! assert_eq!(media_type.charset(), Some("utf-8"));
//!
//! let mut encodings = StringWithQuality::parse_list(["gzip;q=0.5, br, *;q=0"]).unwrap();
//! sort_by_preference(&mut encodings);
//! assert_eq!(encodings[0].value(), "br");
//! ```
//!
//! Parsing is a pure function of its input: values never share state, and
//! every type here is `Send + Sync`.

mod utils;

pub mod cache_control;
pub mod content_disposition;
pub mod content_range;
pub mod cookie;
pub mod entity_tag;
pub mod error;
pub mod frozen;
pub mod media_type;
pub mod name_value;
pub mod parser;
pub mod quality;
pub mod quoted;
pub mod range;
pub mod rule;
pub mod string_quality;
pub mod typed;

pub(crate) use utils::ensure;

pub use cache_control::{CacheControl, contains_cache_directive, try_parse_seconds};
pub use content_disposition::ContentDisposition;
pub use content_range::ContentRange;
pub use cookie::{Cookie, SameSite, SetCookie};
pub use entity_tag::{EntityTag, RangeCondition};
pub use error::HeaderError;
pub use frozen::{Freeze, Frozen};
pub use media_type::MediaType;
pub use name_value::{NameValue, Parameters};
pub use parser::{HeaderParser, ParseHeader, ParseHeaderList, Parsed, Separators};
pub use quality::{Preference, QUALITY_MATCH, QUALITY_NO_MATCH, sort_by_preference};
pub use range::{Range, RangeItem};
pub use string_quality::StringWithQuality;
pub use typed::{HeaderMapExt, TypedHeader};
