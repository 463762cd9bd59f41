//! Media type (`type/subtype;param=value`) header values.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::reader::{HeaderReader, Parameters, append_quoted_if_non_token, read_parameters};
use crate::GrammarError;

/// An internet media type with optional parameters.
///
/// Equality considers the type and subtype only; parameters are carried but
/// never compared. The wildcard `*` matches any value on its side in
/// [`MediaType::is_compatible`].
#[derive(Debug, Clone)]
pub struct MediaType {
    type_: Cow<'static, str>,
    subtype: Cow<'static, str>,
    parameters: Parameters,
}

impl MediaType {
    pub const WILDCARD: MediaType = MediaType::from_static("*", "*");
    pub const ANY_TEXT: MediaType = MediaType::from_static("text", "*");
    pub const APPLICATION_XML: MediaType = MediaType::from_static("application", "xml");
    pub const APPLICATION_ATOM_XML: MediaType = MediaType::from_static("application", "atom+xml");
    pub const APPLICATION_XHTML_XML: MediaType = MediaType::from_static("application", "xhtml+xml");
    pub const APPLICATION_SVG_XML: MediaType = MediaType::from_static("application", "svg+xml");
    pub const APPLICATION_JSON: MediaType = MediaType::from_static("application", "json");
    pub const APPLICATION_FORM_URLENCODED: MediaType = MediaType::from_static("application", "x-www-form-urlencoded");
    pub const MULTIPART_FORM_DATA: MediaType = MediaType::from_static("multipart", "form-data");
    pub const APPLICATION_OCTET_STREAM: MediaType = MediaType::from_static("application", "octet-stream");
    pub const TEXT_PLAIN: MediaType = MediaType::from_static("text", "plain");
    pub const TEXT_XML: MediaType = MediaType::from_static("text", "xml");
    pub const TEXT_HTML: MediaType = MediaType::from_static("text", "html");
    pub const SERVER_SENT_EVENTS: MediaType = MediaType::from_static("text", "event-stream");
    pub const APPLICATION_JSON_PATCH_JSON: MediaType = MediaType::from_static("application", "json-patch+json");

    pub const fn from_static(type_: &'static str, subtype: &'static str) -> Self {
        Self { type_: Cow::Borrowed(type_), subtype: Cow::Borrowed(subtype), parameters: Parameters::new() }
    }

    pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self { type_: Cow::Owned(type_.into()), subtype: Cow::Owned(subtype.into()), parameters: Parameters::new() }
    }

    pub fn with_parameters(type_: impl Into<String>, subtype: impl Into<String>, parameters: Parameters) -> Self {
        Self { type_: Cow::Owned(type_.into()), subtype: Cow::Owned(subtype.into()), parameters }
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn is_wildcard_type(&self) -> bool {
        self.type_ == "*"
    }

    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype == "*"
    }

    /// True when the two media types match, honoring wildcards on either
    /// side. Comparison is case-insensitive and ignores parameters.
    pub fn is_compatible(&self, other: &MediaType) -> bool {
        (self.type_.eq_ignore_ascii_case(&other.type_) || self.is_wildcard_type() || other.is_wildcard_type())
            && (self.subtype.eq_ignore_ascii_case(&other.subtype)
                || self.is_wildcard_subtype()
                || other.is_wildcard_subtype())
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.type_ == other.type_ && self.subtype == other.subtype
    }
}

impl Eq for MediaType {}

impl FromStr for MediaType {
    type Err = GrammarError;

    /// Parses `type/subtype` with an optional parameter list. Fails without
    /// yielding a partial value when the slash or the subtype is missing.
    fn from_str(header: &str) -> Result<Self, Self::Err> {
        let mut reader = HeaderReader::new(header);
        reader.has_next();

        let type_ = reader.next_token()?.to_string();
        reader.next_separator('/')?;
        let subtype = reader.next_token()?.to_string();

        let parameters = if reader.has_next() { read_parameters(&mut reader, false)? } else { Parameters::new() };

        Ok(Self { type_: Cow::Owned(type_), subtype: Cow::Owned(subtype), parameters })
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = format!("{}/{}", self.type_, self.subtype);

        for (name, value) in self.parameters.iter() {
            buffer.push(';');
            buffer.push_str(name);
            buffer.push('=');
            append_quoted_if_non_token(&mut buffer, value);
        }

        f.write_str(&buffer)
    }
}
