//! Media types as found in `Content-Type` and `Accept`.
//!
//! A media type is a `type/subtype` expression followed by `;` separated
//! parameters. Subtypes may carry a structured syntax suffix (`+json`) and
//! dot separated facets (`vnd.github.v3`), both exposed as borrowed views.
//!
//! Matching follows content negotiation rules: [`MediaType::is_subset_of`]
//! answers whether a concrete type is acceptable for a (possibly wildcarded)
//! range, and [`Preference`] ranks `Accept` entries by quality first and
//! specificity second.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use encoding_rs::Encoding;

use crate::name_value::{Parameters, check_value_format, scan_name_value_list};
use crate::parser::{HeaderParser, ParseHeader, ParseHeaderList};
use crate::quality::{Preference, compare_qualities, get_quality, set_quality};
use crate::quoted::remove_quotes;
use crate::rule::{token_length, whitespace_length};
use crate::utils::hash_ignore_ascii_case;
use crate::{HeaderError, ensure};

const WILDCARD: &str = "*";
const ALL_TYPES: &str = "*/*";
const CHARSET: &str = "charset";
const BOUNDARY: &str = "boundary";
const QUALITY: &str = "q";

#[derive(Debug, Clone)]
pub struct MediaType {
    media_type: String,
    parameters: Parameters,
}

impl MediaType {
    /// Creates a media type from a bare `type/subtype` expression.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `media_type` is not exactly a
    /// `type/subtype` expression: surrounding whitespace and parameters are rejected.
    pub fn new(media_type: &str) -> Result<Self, HeaderError> {
        Ok(Self { media_type: check_media_type_format(media_type)?, parameters: Parameters::new() })
    }

    /// Creates a media type with a `q` parameter.
    ///
    /// # Errors
    ///
    /// Fails like [`MediaType::new`], or with [`HeaderError::OutOfRange`] for a
    /// quality outside `0..=1`.
    pub fn with_quality(media_type: &str, quality: f64) -> Result<Self, HeaderError> {
        let mut value = Self::new(media_type)?;
        value.set_quality(Some(quality))?;
        Ok(value)
    }

    /// The `type/subtype` expression, without parameters.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Replaces the `type/subtype` expression, keeping the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] like [`MediaType::new`].
    pub fn set_media_type(&mut self, media_type: &str) -> Result<(), HeaderError> {
        self.media_type = check_media_type_format(media_type)?;
        Ok(())
    }

    pub fn type_(&self) -> &str {
        self.split().0
    }

    pub fn subtype(&self) -> &str {
        self.split().1
    }

    /// The subtype up to its last `+`, or the whole subtype if there is none.
    pub fn subtype_without_suffix(&self) -> &str {
        let subtype = self.subtype();
        subtype.rsplit_once('+').map_or(subtype, |(without_suffix, _)| without_suffix)
    }

    /// The structured syntax suffix after the last `+` of the subtype.
    ///
    /// `application/json+` has an empty suffix, `application/json` has none.
    pub fn suffix(&self) -> Option<&str> {
        self.subtype().rsplit_once('+').map(|(_, suffix)| suffix)
    }

    /// The dot separated parts of the subtype, suffix excluded.
    pub fn facets(&self) -> impl Iterator<Item = &str> {
        self.subtype_without_suffix().split('.')
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    /// The raw `charset` parameter.
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get(CHARSET)
    }

    /// Sets the `charset` parameter; `None` or an empty string removes it.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `charset` is neither a token
    /// nor a quoted-string.
    pub fn set_charset(&mut self, charset: Option<&str>) -> Result<(), HeaderError> {
        self.set_parameter(CHARSET, charset)
    }

    /// Resolves the `charset` parameter to a known encoding.
    pub fn encoding(&self) -> Option<&'static Encoding> {
        let charset = remove_quotes(self.charset()?);
        Encoding::for_label(charset.as_bytes())
    }

    /// Sets the `charset` parameter from an encoding; `None` removes it.
    pub fn set_encoding(&mut self, encoding: Option<&'static Encoding>) {
        self.parameters.set_raw(CHARSET, encoding.map(|encoding| encoding.name().to_ascii_lowercase()));
    }

    /// The raw `boundary` parameter of multipart types.
    pub fn boundary(&self) -> Option<&str> {
        self.parameters.get(BOUNDARY)
    }

    /// Sets the `boundary` parameter; `None` or an empty string removes it.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] if `boundary` is neither a token
    /// nor a quoted-string.
    pub fn set_boundary(&mut self, boundary: Option<&str>) -> Result<(), HeaderError> {
        self.set_parameter(BOUNDARY, boundary)
    }

    pub fn quality(&self) -> Option<f64> {
        get_quality(&self.parameters)
    }

    /// Sets the `q` parameter; `None` removes it.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::OutOfRange`] for a quality outside `0..=1`.
    pub fn set_quality(&mut self, quality: Option<f64>) -> Result<(), HeaderError> {
        set_quality(&mut self.parameters, quality)
    }

    /// `*/*`
    pub fn matches_all_types(&self) -> bool {
        self.media_type == ALL_TYPES
    }

    /// `type/*`
    pub fn matches_all_subtypes(&self) -> bool {
        self.subtype() == WILDCARD
    }

    /// `type/*+suffix`, and `type/*`
    pub fn matches_all_subtypes_without_suffix(&self) -> bool {
        self.subtype_without_suffix() == WILDCARD
    }

    /// Returns true if every value matched by `self` is also matched by `set`.
    ///
    /// Types and subtypes compare case-insensitively and honor wildcards on the
    /// `set` side. A suffix is never a wildcard: `application/*+json` contains
    /// `application/entity+json` but `application/entity+*` contains nothing
    /// but itself. A plain subtype in `set` also contains every type whose
    /// suffix it names, so `application/json` contains `application/problem+json`.
    ///
    /// Every parameter of `set` other than `*` and those after `q` must appear
    /// in `self` with a case-insensitively equal value.
    pub fn is_subset_of(&self, set: &Self) -> bool {
        self.matches_type(set) && self.matches_subtype(set) && self.contains_all_parameters(&set.parameters)
    }

    /// Returns true if the `type/subtype` expression at the start of `media_type`
    /// is contained in `self`. Parameters on both sides are ignored.
    pub fn matches_media_type(&self, media_type: &str) -> bool {
        let start = whitespace_length(media_type, 0);
        let Some((_, expression)) = scan_media_type_expression(media_type, start) else {
            return false;
        };

        let other = Self { media_type: expression, parameters: Parameters::new() };
        other.matches_type(self) && other.matches_subtype(self)
    }

    fn set_parameter(&mut self, name: &str, value: Option<&str>) -> Result<(), HeaderError> {
        match value {
            Some(value) if !value.is_empty() => {
                check_value_format(value)?;
                self.parameters.set_raw(name, Some(value.to_owned()));
            }
            _ => self.parameters.remove_named(name),
        }
        Ok(())
    }

    fn split(&self) -> (&str, &str) {
        self.media_type.split_once('/').unwrap_or((&self.media_type, ""))
    }

    fn matches_type(&self, set: &Self) -> bool {
        set.matches_all_types() || set.type_().eq_ignore_ascii_case(self.type_())
    }

    fn matches_subtype(&self, set: &Self) -> bool {
        if set.matches_all_subtypes() {
            return true;
        }

        match (set.suffix(), self.suffix()) {
            (Some(set_suffix), Some(suffix)) => {
                let without_suffix = set.matches_all_subtypes_without_suffix()
                    || set.subtype_without_suffix().eq_ignore_ascii_case(self.subtype_without_suffix());
                without_suffix && set_suffix.eq_ignore_ascii_case(suffix)
            }
            (Some(_), None) => false,
            (None, suffix) => {
                let set_subtype = set.subtype();
                set_subtype.eq_ignore_ascii_case(self.subtype()) || suffix.is_some_and(|suffix| set_subtype.eq_ignore_ascii_case(suffix))
            }
        }
    }

    fn contains_all_parameters(&self, set: &Parameters) -> bool {
        for parameter in set {
            if parameter.name().eq_ignore_ascii_case(WILDCARD) {
                continue;
            }
            if parameter.name().eq_ignore_ascii_case(QUALITY) {
                break;
            }

            let Some(local) = self.parameters.find(parameter.name()) else {
                return false;
            };
            let expected = parameter.value().unwrap_or_default();
            if !expected.eq_ignore_ascii_case(local.value().unwrap_or_default()) {
                return false;
            }
        }
        true
    }
}

fn check_media_type_format(media_type: &str) -> Result<String, HeaderError> {
    let expression = scan_media_type_expression(media_type, 0).map(|(_, expression)| expression);
    ensure!(
        expression.as_deref() == Some(media_type),
        HeaderError::invalid_argument(format!("the media type '{media_type}' is invalid, 'type/subtype' is expected"))
    );
    Ok(media_type.to_owned())
}

/// Scans `type "/" subtype`, tolerating whitespace around the `/`.
///
/// Returns the consumed length and the expression with that whitespace removed.
fn scan_media_type_expression(input: &str, start: usize) -> Option<(usize, String)> {
    let type_length = token_length(input, start);
    if type_length == 0 {
        return None;
    }

    let mut current = start + type_length;
    current += whitespace_length(input, current);
    if input.as_bytes().get(current) != Some(&b'/') {
        return None;
    }
    current += 1;
    current += whitespace_length(input, current);

    let subtype_length = token_length(input, current);
    if subtype_length == 0 {
        return None;
    }

    let length = current + subtype_length - start;
    let expression = if type_length + subtype_length + 1 == length {
        input[start..start + length].to_owned()
    } else {
        format!("{}/{}", &input[start..start + type_length], &input[current..current + subtype_length])
    };

    Some((length, expression))
}

fn scan_media_type(input: &str, start: usize) -> Option<(usize, MediaType)> {
    let (length, media_type) = scan_media_type_expression(input, start)?;
    let mut current = start + length;
    current += whitespace_length(input, current);

    let mut parameters = Parameters::new();
    if input.as_bytes().get(current) == Some(&b';') {
        current += 1;
        current += scan_name_value_list(input, current, b';', &mut parameters);
    }

    Some((current - start, MediaType { media_type, parameters }))
}

impl ParseHeader for MediaType {
    const PARSER: HeaderParser<Self> = HeaderParser::single(scan_media_type);
}

impl ParseHeaderList for MediaType {
    const LIST_PARSER: HeaderParser<Self> = HeaderParser::multiple(scan_media_type);
}

impl Preference for MediaType {
    /// Quality first, then `*/*` < `type/*` < `type/*+suffix` < `type/subtype`.
    fn compare_preference(&self, other: &Self) -> Ordering {
        let ordering = compare_qualities(self.quality(), other.quality());
        if ordering != Ordering::Equal {
            return ordering;
        }

        if !self.type_().eq_ignore_ascii_case(other.type_()) {
            if self.matches_all_types() {
                return Ordering::Less;
            }
            if other.matches_all_types() {
                return Ordering::Greater;
            }
        } else if self.subtype().eq_ignore_ascii_case(other.subtype()) {
            return Ordering::Equal;
        }

        match (self.matches_all_subtypes(), other.matches_all_subtypes()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }

        match (self.matches_all_subtypes_without_suffix(), other.matches_all_subtypes_without_suffix()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.media_type.eq_ignore_ascii_case(&other.media_type) && self.parameters == other.parameters
    }
}

impl Eq for MediaType {}

impl Hash for MediaType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_ascii_case(&self.media_type, state);
        self.parameters.hash(state);
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.media_type)?;
        self.parameters.fmt_prefixed(f)
    }
}

impl TryFrom<&mime::Mime> for MediaType {
    type Error = HeaderError;

    fn try_from(value: &mime::Mime) -> Result<Self, Self::Error> {
        Self::parse(value.as_ref())
    }
}

impl TryFrom<&MediaType> for mime::Mime {
    type Error = HeaderError;

    fn try_from(value: &MediaType) -> Result<Self, Self::Error> {
        value.to_string().parse().map_err(HeaderError::invalid_argument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name_value::NameValue;
    use crate::quality::sort_by_preference;

    fn media_type(value: &str) -> MediaType {
        MediaType::parse(value).unwrap()
    }

    fn with_parameters(value: &str, parameters: &[(&str, &str)]) -> MediaType {
        let mut media_type = MediaType::new(value).unwrap();
        for (name, value) in parameters {
            media_type.parameters_mut().push(NameValue::with_value(*name, *value).unwrap());
        }
        media_type
    }

    #[test]
    fn constructor_rejects_anything_but_an_expression() {
        for input in [
            "",
            " text/plain ",
            "text / plain",
            "text/ plain",
            "text /plain",
            "text/plain ",
            " text/plain",
            "te xt/plain",
            "te=xt/plain",
            "teäxt/plain",
            "text/pläin",
            "text",
            "\"text/plain\"",
            "text/plain; charset=utf-8; ",
            "text/plain;",
            "text/plain;charset=utf-8",
        ] {
            assert!(MediaType::new(input).is_err(), "{input}");
        }

        let value = MediaType::new("text/plain").unwrap();
        assert_eq!(value.media_type(), "text/plain");
        assert!(value.parameters().is_empty());
        assert_eq!(value.charset(), None);
    }

    #[test]
    fn suffixes() {
        for (input, without_suffix, suffix) in [
            ("application/json", "json", None),
            ("application/json+", "json", Some("")),
            ("application/+json", "", Some("json")),
            ("application/entitytype+json", "entitytype", Some("json")),
            ("applica+tion/entitytype+json", "entitytype", Some("json")),
        ] {
            let value = MediaType::new(input).unwrap();
            assert_eq!(value.subtype_without_suffix(), without_suffix, "{input}");
            assert_eq!(value.suffix(), suffix, "{input}");
        }

        for (input, without_suffix, suffix) in [
            ("    application   /  json+xml", "json", "xml"),
            ("  application /  vnd.com-pany.some+entity!.v2+js.#$&^_n  ; q=\"0.3+1\"", "vnd.com-pany.some+entity!.v2", "js.#$&^_n"),
            ("   application/    +json", "", "json"),
            ("  applica+tion/   entitytype+json    ", "entitytype", "json"),
        ] {
            let value = media_type(input);
            assert_eq!(value.subtype_without_suffix(), without_suffix, "{input}");
            assert_eq!(value.suffix(), Some(suffix), "{input}");
        }
    }

    #[test]
    fn facets() {
        assert_eq!(media_type("application/vdn.github").facets().collect::<Vec<_>>(), ["vdn", "github"]);
        assert_eq!(media_type("application/vdn.github+json").facets().collect::<Vec<_>>(), ["vdn", "github"]);
        assert_eq!(media_type("application/vdn.github.v3+json").facets().collect::<Vec<_>>(), ["vdn", "github", "v3"]);
        assert_eq!(media_type("application/vdn.github.+json").facets().collect::<Vec<_>>(), ["vdn", "github", ""]);
    }

    #[test]
    fn wildcards() {
        for (input, expected) in [
            ("*/*", true),
            ("text/*", true),
            ("text/*+suffix", true),
            ("text/*+", true),
            ("text/*+*", true),
            ("text/json+suffix", false),
            ("*/json+*", false),
        ] {
            assert_eq!(media_type(input).matches_all_subtypes_without_suffix(), expected, "{input}");
        }
        assert!(media_type("*/*").matches_all_types());
        assert!(!media_type("*/xml").matches_all_types());
        assert!(media_type("text/*").matches_all_subtypes());
    }

    #[test]
    fn charset_and_quality() {
        let mut value = MediaType::new("text/plain").unwrap();
        value.set_charset(Some("mycharset")).unwrap();
        assert_eq!(value.charset(), Some("mycharset"));
        assert_eq!(value.parameters().iter().next().map(NameValue::name), Some("charset"));
        value.set_charset(None).unwrap();
        assert!(value.parameters().is_empty());
        assert!(value.set_charset(Some("two words")).is_err());

        let mut value = media_type("text/plain; CHARSET=old_charset");
        value.set_charset(Some("new_charset")).unwrap();
        assert_eq!(value.parameters().len(), 1);
        assert_eq!(value.parameters().iter().next().map(NameValue::name), Some("CHARSET"));
        assert_eq!(value.charset(), Some("new_charset"));

        value.set_encoding(Some(encoding_rs::UTF_8));
        assert_eq!(value.charset(), Some("utf-8"));
        assert_eq!(value.encoding(), Some(encoding_rs::UTF_8));
        assert_eq!(media_type("text/plain; charset=\"latin1\"").encoding(), Some(encoding_rs::WINDOWS_1252));
        assert_eq!(media_type("text/plain; charset=unknown").encoding(), None);

        let mut value = MediaType::with_quality("application/xml", 0.08).unwrap();
        assert_eq!(value.quality(), Some(0.08));
        assert_eq!(value.parameters().len(), 1);
        value.set_quality(Some(0.563_156_454)).unwrap();
        assert_eq!(value.parameters().get("q"), Some("0.563"));
        assert!(value.set_quality(Some(1.01)).is_err());
        assert!(MediaType::with_quality("application/xml", -0.01).is_err());

        let value = media_type("text/plain; Q=0.132");
        assert_eq!(value.quality(), Some(0.132));
    }

    #[test]
    fn parse_valid_values() {
        let plain = MediaType::new("text/plain").unwrap();
        let utf8 = with_parameters("text/plain", &[("charset", "utf-8")]);

        assert_eq!(media_type("\r\n text/plain  "), plain);
        assert_eq!(media_type("text/plain;"), plain);
        assert_eq!(media_type("\r\n text   /  plain ;  charset =   utf-8 "), utf8);
        assert_eq!(media_type("  text/plain;charset=utf-8"), utf8);
        assert_eq!(media_type(" text/plain; custom=value;charset=utf-8"), with_parameters("text/plain", &[("charset", "utf-8"), ("custom", "value")]));
        assert_eq!(media_type("text / plain ; custom =\r\n \"x\" ; charset = utf-8 "), with_parameters("text/plain", &[("charset", "utf-8"), ("custom", "\"x\"")]));
        assert_eq!(media_type("text/plain;name="), with_parameters("text/plain", &[("name", "")]));
        assert_eq!(media_type("text/plain;name=value;"), with_parameters("text/plain", &[("name", "value")]));
        assert_eq!(media_type("\r\n */xml; charset=utf-8; q=0.5"), with_parameters("*/xml", &[("charset", "utf-8"), ("q", "0.5")]));
    }

    #[test]
    fn parse_invalid_values() {
        for input in [
            "",
            "  ",
            "text/plain会",
            "text/plain ,",
            "text/plain,",
            "text/plain; charset=utf-8 ,",
            "text/plain; charset=utf-8,",
            "textplain",
            "text/",
            ",, , ,,text/plain; charset=iso-8859-1; q=1.0,\r\n */xml; charset=utf-8; q=0.5,,,",
            "text/plain; charset=iso-8859-1; q=1.0, */xml; charset=utf-8; q=0.5",
            " , */xml; charset=utf-8; q=0.5 ",
            "text/plain; charset=iso-8859-1; q=1.0 , ",
        ] {
            assert!(MediaType::try_parse(input).is_none(), "{input:?}");
            assert!(MediaType::parse(input).is_err(), "{input:?}");
        }
    }

    #[test]
    fn parse_lists() {
        let expected = vec![
            MediaType::new("text/html").unwrap(),
            MediaType::new("application/xhtml+xml").unwrap(),
            MediaType::with_quality("application/xml", 0.9).unwrap(),
            MediaType::new("image/webp").unwrap(),
            MediaType::with_quality("*/*", 0.8).unwrap(),
        ];
        let inputs = ["text/html,application/xhtml+xml,", "application/xml;q=0.9,image/webp,*/*;q=0.8"];
        assert_eq!(MediaType::parse_list(inputs).unwrap(), expected);
        assert_eq!(MediaType::parse_strict_list(inputs).unwrap(), expected);
        assert_eq!(MediaType::try_parse_strict_list(inputs), Some(expected));

        assert!(MediaType::parse_list(Vec::<&str>::new()).unwrap().is_empty());
        assert_eq!(MediaType::try_parse_list([""]), None);
    }

    #[test]
    fn parse_lists_with_invalid_values() {
        let inputs = [
            "text/html,application/xhtml+xml, ignore-this, ignore/this",
            "application/xml;q=0.9,image/webp,*/*;q=0.8",
            "application/xml;q=0 4",
        ];
        let expected = vec![
            MediaType::new("text/html").unwrap(),
            MediaType::new("application/xhtml+xml").unwrap(),
            MediaType::new("ignore/this").unwrap(),
            MediaType::with_quality("application/xml", 0.9).unwrap(),
            MediaType::new("image/webp").unwrap(),
            MediaType::with_quality("*/*", 0.8).unwrap(),
        ];

        assert_eq!(MediaType::try_parse_list(inputs), Some(expected.clone()));
        assert_eq!(MediaType::parse_list(&inputs[..2]).unwrap(), expected);
        assert!(MediaType::parse_strict_list(&inputs[..2]).is_err());
        assert_eq!(MediaType::try_parse_strict_list(inputs), None);
    }

    #[test]
    fn display() {
        let mut value = MediaType::new("text/plain").unwrap();
        assert_eq!(value.to_string(), "text/plain");
        value.set_charset(Some("utf-8")).unwrap();
        assert_eq!(value.to_string(), "text/plain; charset=utf-8");
        value.parameters_mut().push(NameValue::with_value("custom", "\"custom value\"").unwrap());
        assert_eq!(value.to_string(), "text/plain; charset=utf-8; custom=\"custom value\"");
        value.set_charset(None).unwrap();
        assert_eq!(value.to_string(), "text/plain; custom=\"custom value\"");
    }

    #[test]
    fn round_trip() {
        let mut value = MediaType::with_quality("application/vnd.api+json", 0.4567).unwrap();
        value.set_charset(Some("\"utf-8\"")).unwrap();
        value.set_boundary(Some("simple")).unwrap();
        value.set_encoding(Some(encoding_rs::SHIFT_JIS));
        let mut title = NameValue::new("title").unwrap();
        title.set_and_escape_value(Some("a \"b\" c")).unwrap();
        value.parameters_mut().push(title);
        assert_eq!(value.quality(), Some(0.457));
        assert_eq!(value.charset(), Some("shift_jis"));

        let parsed = MediaType::parse(&value.to_string()).unwrap();
        assert_eq!(parsed, value);
        assert_eq!(parsed.to_string(), value.to_string());

        let values = [value, MediaType::new("*/*").unwrap(), MediaType::with_quality("text/*", 0.0).unwrap()];
        let joined = values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        assert_eq!(MediaType::parse_list([joined]).unwrap(), values);
    }

    #[test]
    fn equality() {
        let plain = MediaType::new("text/plain").unwrap();
        let utf8 = with_parameters("text/plain", &[("charset", "utf-8")]);
        let custom = with_parameters("text/plain", &[("custom", "value")]);

        assert_ne!(plain, utf8);
        assert_ne!(plain, custom);
        assert_ne!(utf8, custom);
        assert_eq!(plain, MediaType::new("TEXT/plain").unwrap());
        assert_eq!(utf8, with_parameters("text/PLAIN", &[("CHARSET", "UTF-8")]));
        assert_ne!(plain, MediaType::new("text/other").unwrap());
    }

    #[test]
    fn matches_media_type() {
        for (range, value) in [
            ("*/*;", "*/*"),
            ("text/*", "text/*"),
            ("text/*", "text/plain"),
            ("*/*;", "text/plain"),
            ("text/plain", "text/plain"),
            ("text/plain;", "text/plain"),
            ("text/plain;", "TEXT/PLAIN"),
            ("application/entity+json", "application/entity+json"),
            ("application/json", "application/entity+json"),
            ("application/*+json", "application/entity+json"),
            ("application/*+json", "application/*+json"),
            ("application/json", "application/problem+json"),
            ("application/json", "application/vnd.restful+json"),
            ("application/*", "application/*+JSON"),
            ("application/*", "application/entity+JSON"),
            ("*/*", "application/entity+json"),
        ] {
            assert!(media_type(range).matches_media_type(value), "{range} matches {value}");
            assert!(media_type(value).is_subset_of(&media_type(range)), "{value} in {range}");
        }

        for (range, value) in [
            ("application/html", "text/*"),
            ("application/json", "application/html"),
            ("text/plain;", "*/*"),
            ("application/entity+json", "application/entity+txt"),
            ("application/entity+json", "application/json"),
            ("application/entity+json", "application/entity.v2+json"),
            ("application/*+json", "application/entity+txt"),
            ("application/*+*", "application/json"),
            ("application/entity", "application/entity+"),
            ("application/entity+*", "application/entity+json"),
            ("application/*+*", "application/entity+json"),
            ("application/entity+json", "application/entity"),
        ] {
            assert!(!media_type(range).matches_media_type(value), "{range} matches {value}");
            assert!(!media_type(value).is_subset_of(&media_type(range)), "{value} in {range}");
        }

        assert!(media_type("application/json;param=1").matches_media_type("application/json;param2=1"));
        assert!(!media_type("text/plain").matches_media_type("not a media type"));
    }

    #[test]
    fn subset_with_parameters() {
        for (value, set) in [
            ("*/*;missingparam=4", "*/*"),
            ("text/*;missingparam=4;", "*/*;"),
            ("text/plain;missingparam=4", "text/*"),
            ("text/plain;charset=utf-8", "text/plain;charset=utf-8"),
            ("text/plain;version=v1", "Text/plain;Version=v1"),
            ("text/plain;version=v1", "TEXT/PLAIN;VERSION=V1"),
            ("text/plain;charset=utf-8;foo=bar;q=0.0", "text/plain;foo=bar;q=0.0;charset=utf-8"),
            ("text/plain;charset=utf-8;foo=bar;q=0.0", "*/*;charset=utf-8;foo=bar;q=0.0"),
            ("application/json;v=2", "application/json;*"),
            ("application/json;v=2;charset=utf-8", "application/json;v=2;*"),
        ] {
            assert!(media_type(value).is_subset_of(&media_type(set)), "{value} in {set}");
        }

        for (value, set) in [
            ("text/plain;version=v1", "text/plain;version="),
            ("*/*;", "text/plain;charset=utf-8;foo=bar;q=0.0"),
            ("text/*;", "text/plain;charset=utf-8;foo=bar;q=0.0"),
            ("text/*;charset=utf-8;foo=bar;q=0.0", "text/plain;missingparam=4;"),
            ("text/plain;charset=utf-8;foo=bar;q=0.0", "text/plain;missingparam=4;"),
            ("text/plain;charset=utf-8;foo=bar;q=0.0", "*/*;missingparam=4;"),
        ] {
            assert!(!media_type(value).is_subset_of(&media_type(set)), "{value} in {set}");
        }
    }

    #[test]
    fn preference_ordering() {
        let mut values = MediaType::parse_list([
            "*/*; q=0.8, text/*, text/plain, application/*+json, */*, application/json; q=0.9, text/html; q=0.9",
        ])
        .unwrap();
        sort_by_preference(&mut values);

        let sorted: Vec<String> = values.iter().map(ToString::to_string).collect();
        assert_eq!(
            sorted,
            ["text/plain", "application/*+json", "text/*", "*/*", "application/json; q=0.9", "text/html; q=0.9", "*/*; q=0.8"]
        );
    }

    #[test]
    fn mime_conversions() {
        let mime: mime::Mime = "text/plain; charset=utf-8".parse().unwrap();
        let value = MediaType::try_from(&mime).unwrap();
        assert_eq!(value.media_type(), "text/plain");
        assert_eq!(value.charset(), Some("utf-8"));

        let back = mime::Mime::try_from(&value).unwrap();
        assert_eq!(back, mime::TEXT_PLAIN_UTF_8);
    }
}
