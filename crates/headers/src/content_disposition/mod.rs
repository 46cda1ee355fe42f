//! The `Content-Disposition` header (RFC 6266, RFC 2183).
//!
//! File names are stored encoded. [`ContentDisposition::file_name`] decodes a
//! MIME encoded-word and [`ContentDisposition::file_name_star`] an RFC 5987
//! extended value; both fall back on what they find when decoding is not
//! possible, see [`encoding`].

pub mod encoding;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

use tracing::trace;

use crate::name_value::{Parameters, scan_name_value_list};
use crate::parser::{HeaderParser, ParseHeader};
use crate::quoted::remove_quotes;
use crate::rule::{check_date, format_date, parse_non_negative_i64, token_length, try_parse_date, whitespace_length};
use crate::utils::hash_ignore_ascii_case;
use crate::{HeaderError, ensure, rule};

const FORM_DATA: &str = "form-data";
const NAME: &str = "name";
const FILE_NAME: &str = "filename";
const FILE_NAME_STAR: &str = "filename*";
const CREATION_DATE: &str = "creation-date";
const MODIFICATION_DATE: &str = "modification-date";
const READ_DATE: &str = "read-date";
const SIZE: &str = "size";

#[derive(Debug, Clone)]
pub struct ContentDisposition {
    disposition_type: String,
    parameters: Parameters,
}

impl ContentDisposition {
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidArgument`] unless `disposition_type` is a
    /// single token, without parameters or surrounding whitespace.
    pub fn new(disposition_type: impl Into<String>) -> Result<Self, HeaderError> {
        Ok(Self { disposition_type: check_disposition_type(disposition_type.into())?, parameters: Parameters::new() })
    }

    pub fn disposition_type(&self) -> &str {
        &self.disposition_type
    }

    /// # Errors
    ///
    /// Fails like [`ContentDisposition::new`].
    pub fn set_disposition_type(&mut self, disposition_type: impl Into<String>) -> Result<(), HeaderError> {
        self.disposition_type = check_disposition_type(disposition_type.into())?;
        Ok(())
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    pub fn name(&self) -> Option<String> {
        self.get_name(NAME)
    }

    /// Sets `name`, MIME encoding and quoting it as needed; `None` or an
    /// empty string removes it.
    pub fn set_name(&mut self, name: Option<&str>) {
        self.set_name_parameter(NAME, name);
    }

    pub fn file_name(&self) -> Option<String> {
        self.get_name(FILE_NAME)
    }

    /// Sets `filename`, MIME encoding and quoting it as needed; `None` or an
    /// empty string removes it.
    pub fn set_file_name(&mut self, file_name: Option<&str>) {
        self.set_name_parameter(FILE_NAME, file_name);
    }

    /// The decoded `filename*`, `None` when it is missing or can not be decoded.
    pub fn file_name_star(&self) -> Option<String> {
        self.get_name(FILE_NAME_STAR)
    }

    /// Sets `filename*` as an RFC 5987 value; `None` or an empty string removes it.
    pub fn set_file_name_star(&mut self, file_name: Option<&str>) {
        self.set_name_parameter(FILE_NAME_STAR, file_name);
    }

    /// Sets both file names for HTTP clients: `filename` gets a sanitized
    /// ASCII fallback and `filename*` the encoded original.
    pub fn set_http_file_name(&mut self, file_name: Option<&str>) {
        let sanitized = file_name.map(encoding::sanitize);
        self.set_file_name(sanitized.as_deref());
        self.set_file_name_star(file_name);
    }

    /// Sets a MIME encoded `filename` and removes `filename*`.
    pub fn set_mime_file_name(&mut self, file_name: Option<&str>) {
        self.set_file_name_star(None);
        self.set_file_name(file_name);
    }

    pub fn creation_date(&self) -> Option<SystemTime> {
        self.get_date(CREATION_DATE)
    }

    /// # Errors
    ///
    /// Returns [`HeaderError::OutOfRange`] for a date before 1970 or after 9999.
    pub fn set_creation_date(&mut self, date: Option<SystemTime>) -> Result<(), HeaderError> {
        self.set_date(CREATION_DATE, date)
    }

    pub fn modification_date(&self) -> Option<SystemTime> {
        self.get_date(MODIFICATION_DATE)
    }

    /// # Errors
    ///
    /// Returns [`HeaderError::OutOfRange`] for a date before 1970 or after 9999.
    pub fn set_modification_date(&mut self, date: Option<SystemTime>) -> Result<(), HeaderError> {
        self.set_date(MODIFICATION_DATE, date)
    }

    pub fn read_date(&self) -> Option<SystemTime> {
        self.get_date(READ_DATE)
    }

    /// # Errors
    ///
    /// Returns [`HeaderError::OutOfRange`] for a date before 1970 or after 9999.
    pub fn set_read_date(&mut self, date: Option<SystemTime>) -> Result<(), HeaderError> {
        self.set_date(READ_DATE, date)
    }

    /// The `size` parameter, `None` when missing or not a non-negative number.
    pub fn size(&self) -> Option<u64> {
        parse_non_negative_i64(self.parameters.get(SIZE)?).map(i64::unsigned_abs)
    }

    /// # Errors
    ///
    /// Returns [`HeaderError::OutOfRange`] for sizes that do not fit an `i64`.
    pub fn set_size(&mut self, size: Option<u64>) -> Result<(), HeaderError> {
        if let Some(size) = size {
            ensure!(i64::try_from(size).is_ok(), HeaderError::out_of_range(format!("size {size} is too large")));
        }
        self.parameters.set_raw(SIZE, size.map(|size| size.to_string()));
        Ok(())
    }

    /// A `form-data` part that carries a file.
    pub fn is_file_disposition(&self) -> bool {
        self.is_form_data() && (has_text(self.file_name()) || has_text(self.file_name_star()))
    }

    /// A `form-data` part that carries a plain field.
    pub fn is_form_disposition(&self) -> bool {
        self.is_form_data() && !has_text(self.file_name()) && !has_text(self.file_name_star())
    }

    fn is_form_data(&self) -> bool {
        self.disposition_type.eq_ignore_ascii_case(FORM_DATA)
    }

    /// Decodes the parameter by the `*` convention: RFC 5987 for names ending
    /// with `*`, else a MIME encoded-word, else the text without its quotes.
    fn get_name(&self, name: &str) -> Option<String> {
        let value = self.parameters.get(name)?;

        if name.ends_with('*') {
            let decoded = encoding::decode_rfc5987(value);
            if decoded.is_none() {
                trace!(name, value, "undecodable extended parameter value");
            }
            return decoded;
        }

        encoding::decode_mime(value).or_else(|| {
            trace!(name, value, "parameter value is not an encoded-word, using it as is");
            Some(remove_quotes(value).to_owned())
        })
    }

    fn set_name_parameter(&mut self, name: &str, value: Option<&str>) {
        let value = value.filter(|value| !value.is_empty()).map(|value| {
            if name.ends_with('*') { encoding::encode_rfc5987(value) } else { encoding::encode_and_quote_mime(value) }
        });
        self.parameters.set_raw(name, value);
    }

    fn get_date(&self, name: &str) -> Option<SystemTime> {
        try_parse_date(remove_quotes(self.parameters.get(name)?))
    }

    fn set_date(&mut self, name: &str, date: Option<SystemTime>) -> Result<(), HeaderError> {
        let date = date.map(check_date).transpose()?;
        self.parameters.set_raw(name, date.map(|date| format_date(date, true)));
        Ok(())
    }
}

fn has_text(value: Option<String>) -> bool {
    value.is_some_and(|value| !value.is_empty())
}

fn check_disposition_type(disposition_type: String) -> Result<String, HeaderError> {
    ensure!(rule::is_token(&disposition_type), HeaderError::invalid_token(&disposition_type));
    Ok(disposition_type)
}

/// Scans `disposition-type *( ";" parameter )`.
fn scan_content_disposition(input: &str, start: usize) -> Option<(usize, ContentDisposition)> {
    let type_length = token_length(input, start);
    if type_length == 0 {
        return None;
    }

    let disposition_type = input[start..start + type_length].to_owned();
    let mut current = start + type_length;
    current += whitespace_length(input, current);

    let mut parameters = Parameters::new();
    if input.as_bytes().get(current) == Some(&b';') {
        current += 1;
        current += scan_name_value_list(input, current, b';', &mut parameters);
    }

    Some((current - start, ContentDisposition { disposition_type, parameters }))
}

impl ParseHeader for ContentDisposition {
    const PARSER: HeaderParser<Self> = HeaderParser::single(scan_content_disposition);
}

impl PartialEq for ContentDisposition {
    fn eq(&self, other: &Self) -> bool {
        self.disposition_type.eq_ignore_ascii_case(&other.disposition_type) && self.parameters == other.parameters
    }
}

impl Eq for ContentDisposition {}

impl Hash for ContentDisposition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_ascii_case(&self.disposition_type, state);
        self.parameters.hash(state);
    }
}

impl fmt::Display for ContentDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.disposition_type)?;
        self.parameters.fmt_prefixed(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name_value::NameValue;
    use std::hash::DefaultHasher;
    use std::time::{Duration, UNIX_EPOCH};

    fn disposition(disposition_type: &str) -> ContentDisposition {
        ContentDisposition::new(disposition_type).unwrap()
    }

    fn with_parameters(disposition_type: &str, parameters: &[(&str, &str)]) -> ContentDisposition {
        let mut value = disposition(disposition_type);
        for (name, parameter) in parameters {
            value.parameters_mut().push(NameValue::with_value(*name, *parameter).unwrap());
        }
        value
    }

    fn hash_of(value: &ContentDisposition) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn constructor_rejects_non_tokens() {
        for input in ["", " inline ", " inline", "inline ", "\"inline\"", "te xt", "te=xt", "te\u{e4}xt", "text;", "te/xt;", "text;name=someName"] {
            assert!(ContentDisposition::new(input).is_err(), "{input:?}");
        }

        let value = disposition("inline");
        assert!(value.parameters().is_empty());
        assert_eq!((value.name(), value.file_name(), value.creation_date(), value.size()), (None, None, None, None));
    }

    #[test]
    fn name_overwrites_in_place() {
        let mut value = disposition("inline");
        value.set_name(Some("myname"));
        assert_eq!(value.name().as_deref(), Some("myname"));
        assert_eq!(value.parameters().iter().next().unwrap().name(), "name");

        value.set_name(None);
        assert!(value.parameters().is_empty());
        value.set_name(None);

        value.parameters_mut().push(NameValue::with_value("NAME", "old_name").unwrap());
        value.set_name(Some("new_name"));
        assert_eq!(value.name().as_deref(), Some("new_name"));
        assert_eq!(value.parameters().len(), 1);
        assert_eq!(value.parameters().iter().next().unwrap().name(), "NAME");
    }

    #[test]
    fn file_name_needs_encoding() {
        let mut value = disposition("inline");
        value.set_file_name(Some("File\u{c3}Name.bat"));
        assert_eq!(value.file_name().as_deref(), Some("File\u{c3}Name.bat"));
        assert_eq!(value.parameters().get("filename"), Some("\"=?utf-8?B?RmlsZcODTmFtZS5iYXQ=?=\""));

        let mut value = with_parameters("inline", &[("FILENAME", "\"=?utf-99?Q?R=mlsZcODTmFtZS5iYXQ=?=\"")]);
        assert_eq!(value.file_name().as_deref(), Some("=?utf-99?Q?R=mlsZcODTmFtZS5iYXQ=?="));
        value.set_file_name(Some("new_name"));
        assert_eq!(value.file_name().as_deref(), Some("new_name"));
        assert_eq!(value.parameters().iter().next().unwrap().name(), "FILENAME");
    }

    #[test]
    fn file_name_star_needs_encoding() {
        let mut value = disposition("inline");
        value.set_file_name_star(Some("File\u{c3}Name.bat"));
        assert_eq!(value.file_name_star().as_deref(), Some("File\u{c3}Name.bat"));
        assert_eq!(value.parameters().get("filename*"), Some("UTF-8''File%C3%83Name.bat"));

        let mut value = with_parameters("inline", &[("FILENAME*", "old_name")]);
        assert_eq!(value.file_name_star(), None);
        value.set_file_name_star(Some("new_name"));
        assert_eq!(value.file_name_star().as_deref(), Some("new_name"));
        assert_eq!(value.parameters().get("filename*"), Some("UTF-8''new_name"));
        assert_eq!(value.parameters().iter().next().unwrap().name(), "FILENAME*");
    }

    #[test]
    fn dates() {
        let date = UNIX_EPOCH + Duration::from_secs(784_887_151);
        let mut value = with_parameters("inline", &[("Creation-DATE", "\"Tue, 15 Nov 1994 08:12:31 GMT\"")]);
        assert_eq!(value.creation_date(), Some(date));

        value.set_creation_date(Some(date + Duration::from_secs(1))).unwrap();
        assert_eq!(value.creation_date(), Some(date + Duration::from_secs(1)));
        assert_eq!(value.parameters().len(), 1);
        assert_eq!(value.parameters().get("creation-date"), Some("\"Tue, 15 Nov 1994 08:12:32 GMT\""));

        let mut value = with_parameters("inline", &[("read-DATE", "\"Tue, 15 Nov 94 08:12 GMT\"")]);
        assert_eq!(value.read_date(), None);
        value.set_read_date(None).unwrap();
        assert!(value.parameters().is_empty());

        value.set_modification_date(Some(date)).unwrap();
        assert_eq!(value.modification_date(), Some(date));
    }

    #[test]
    fn dates_out_of_range() {
        let mut value = disposition("inline");
        let before_epoch = UNIX_EPOCH - Duration::from_secs(1);
        let year_10000 = UNIX_EPOCH + Duration::from_secs(253_402_300_800);

        assert!(matches!(value.set_creation_date(Some(before_epoch)), Err(HeaderError::OutOfRange { .. })));
        assert!(matches!(value.set_modification_date(Some(year_10000)), Err(HeaderError::OutOfRange { .. })));
        assert!(matches!(value.set_read_date(Some(before_epoch)), Err(HeaderError::OutOfRange { .. })));
        assert!(value.parameters().is_empty());

        value.set_read_date(Some(UNIX_EPOCH)).unwrap();
        assert_eq!(value.to_string(), "inline; read-date=\"Thu, 01 Jan 1970 00:00:00 GMT\"");
        assert!(value.set_read_date(Some(year_10000)).is_err());
        assert_eq!(value.read_date(), Some(UNIX_EPOCH));
    }

    #[test]
    fn size() {
        let mut value = with_parameters("inline", &[("SIZE", "279172874239")]);
        assert_eq!(value.size(), Some(279_172_874_239));
        value.set_size(Some(279_172_874_240)).unwrap();
        assert_eq!(value.size(), Some(279_172_874_240));
        assert_eq!(value.parameters().iter().next().unwrap().name(), "SIZE");

        assert!(value.set_size(Some(u64::MAX)).is_err());
        assert_eq!(value.size(), Some(279_172_874_240));

        value.set_size(None).unwrap();
        assert!(value.parameters().is_empty());
        assert_eq!(with_parameters("inline", &[("size", "-1")]).size(), None);
    }

    #[test]
    fn display() {
        let mut value = disposition("inline");
        assert_eq!(value.to_string(), "inline");

        value.set_name(Some("myname"));
        assert_eq!(value.to_string(), "inline; name=myname");

        value.set_file_name(Some("my File Name"));
        assert_eq!(value.to_string(), "inline; name=myname; filename=\"my File Name\"");

        // 2011-02-15T00:00:00-08:00
        value.set_creation_date(Some(UNIX_EPOCH + Duration::from_secs(1_297_756_800))).unwrap();
        assert_eq!(value.to_string(), "inline; name=myname; filename=\"my File Name\"; creation-date=\"Tue, 15 Feb 2011 08:00:00 GMT\"");

        value.parameters_mut().push(NameValue::with_value("custom", "\"custom value\"").unwrap());
        value.set_name(None);
        value.set_file_name_star(Some("File%Name"));
        assert_eq!(
            value.to_string(),
            "inline; filename=\"my File Name\"; creation-date=\"Tue, 15 Feb 2011 08:00:00 GMT\"; custom=\"custom value\"; filename*=UTF-8''File%25Name"
        );

        value.set_file_name(None);
        value.set_creation_date(None).unwrap();
        assert_eq!(value.to_string(), "inline; custom=\"custom value\"; filename*=UTF-8''File%25Name");
    }

    #[test]
    fn http_and_mime_file_names() {
        let mut value = disposition("attachment");
        value.set_http_file_name(Some("\u{20ac} file.txt"));
        assert_eq!(value.to_string(), "attachment; filename=\"_ file.txt\"; filename*=UTF-8''%E2%82%AC%20file.txt");
        assert_eq!(value.file_name_star().as_deref(), Some("\u{20ac} file.txt"));

        value.set_mime_file_name(Some("\u{20ac}.txt"));
        assert_eq!(value.file_name_star(), None);
        assert_eq!(value.file_name().as_deref(), Some("\u{20ac}.txt"));

        value.set_http_file_name(None);
        assert!(value.parameters().is_empty());
    }

    #[test]
    fn form_data_kinds() {
        let mut value = disposition("form-data");
        value.set_name(Some("field"));
        assert!(value.is_form_disposition());
        assert!(!value.is_file_disposition());

        value.set_file_name_star(Some("a.txt"));
        assert!(value.is_file_disposition());
        assert!(!value.is_form_disposition());

        let mut value = disposition("attachment");
        value.set_file_name(Some("a.txt"));
        assert!(!value.is_file_disposition() && !value.is_form_disposition());
    }

    #[test]
    fn equality_and_hash() {
        let plain = disposition("inline");
        let mut named = disposition("inline");
        named.set_name(Some("myname"));
        let custom = with_parameters("inline", &[("name", "value")]);
        let upper = disposition("INLINE");
        let upper_named = with_parameters("INLINE", &[("NAME", "MYNAME")]);
        let upper_extra = with_parameters("INLINE", &[("NAME", "MYNAME"), ("custom", "value")]);

        assert_ne!(plain, named);
        assert_ne!(plain, custom);
        assert_ne!(named, custom);
        assert_eq!(plain, upper);
        assert_eq!(named, upper_named);
        assert_ne!(upper_named, upper_extra);
        assert_ne!(plain, disposition("attachment"));

        assert_eq!(hash_of(&plain), hash_of(&upper));
        assert_eq!(hash_of(&named), hash_of(&upper_named));
    }

    #[test]
    fn parse_valid_values() {
        let mut expected = disposition("inline");
        assert_eq!(ContentDisposition::parse("\r\n inline  ").unwrap(), expected);
        assert_eq!(ContentDisposition::parse("inline;").unwrap(), expected);

        expected.set_name(Some("myName"));
        assert_eq!(ContentDisposition::parse("\r\n inline  ;  name =   myName ").unwrap(), expected);
        assert_eq!(ContentDisposition::parse("  inline;name=myName;").unwrap(), expected);

        let value = ContentDisposition::parse("attachment; filename*=UTF-8''foo-%c3%a4.html; filename=\"foo-ae.html\"").unwrap();
        assert_eq!(value.file_name().as_deref(), Some("foo-ae.html"));
        assert_eq!(value.file_name_star().as_deref(), Some("foo-\u{e4}.html"));

        let mut expected = disposition("attachment");
        expected.set_file_name_star(Some("foo-\u{e4}.html"));
        expected.set_file_name(Some("\"foo-ae.html\""));
        assert_eq!(value, expected);

        let value = ContentDisposition::parse("form-data; name =\"dotnet\"; filename=\"example.png\"").unwrap();
        assert_eq!(value.name().as_deref(), Some("dotnet"));
        assert_eq!(value.file_name().as_deref(), Some("example.png"));

        let value = ContentDisposition::parse("attachment; filename=foo.html ;").unwrap();
        assert_eq!(value.file_name().as_deref(), Some("foo.html"));

        let value = ContentDisposition::parse("inline;name=").unwrap();
        assert_eq!(value, with_parameters("inline", &[("name", "")]));

        let value = ContentDisposition::parse("attachment; filename=\"=?utf-8?B?Zm9vLeQuaHRtbA==?=\"").unwrap();
        assert_eq!(value.file_name().as_deref(), Some("foo-\u{fffd}.html"));

        let value = ContentDisposition::parse("attachment; filename=\"=?ISO-8859-1?Q?foo-=E4.html?=\"").unwrap();
        assert_eq!(value.file_name().as_deref(), Some("=?ISO-8859-1?Q?foo-=E4.html?="));
    }

    #[test]
    fn parse_invalid_values() {
        for input in [
            "",
            "  ",
            "inline\u{4f1a}",
            "inline ,",
            "inline,",
            "inline; name=myName ,",
            "inline; name=myName,",
            "inline; name=my\u{4f1a}Name",
            "inline/",
            "\"inline\"",
            "attachment; filename=foo bar.html",
            "attachment; filename=foo[1](2).html",
            "attachment; filename=foo-\u{e4}.html",
            "filename=foo.html",
            "; filename=foo.html",
            "attachment; filename=\"foo.html\".txt",
            "attachment; filename=\"bar",
            "attachment; filename=foo\"bar;baz\"qux",
            "attachment; filename=foo.html, attachment; filename=bar.html",
            "filename=foo.html; attachment",
            "attachment; filename==?utf-8?B?Zm9vLeQuaHRtbA==?=",
        ] {
            assert!(ContentDisposition::try_parse(input).is_none(), "{input:?}");
        }
    }

    #[test]
    fn round_trip() {
        let mut value = disposition("attachment");
        value.set_http_file_name(Some("r\u{e9}sum\u{e9} \"final\".pdf"));
        value.set_size(Some(42)).unwrap();
        value.set_read_date(Some(UNIX_EPOCH + Duration::from_secs(784_111_777))).unwrap();

        let parsed = ContentDisposition::parse(&value.to_string()).unwrap();
        assert_eq!(parsed, value);
        assert_eq!(parsed.file_name_star().as_deref(), Some("r\u{e9}sum\u{e9} \"final\".pdf"));
        assert_eq!(parsed.file_name().as_deref(), Some("r_sum_ \\\"final\\\".pdf"));
    }
}
