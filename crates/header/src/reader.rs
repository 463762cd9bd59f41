//! Character-level reader for the HTTP header value grammar.
//!
//! This module implements the RFC 2616 `token` / `quoted-string` / `comment`
//! / `separator` grammar as a pull lexer over a single header string. A
//! [`HeaderReader`] classifies the next character through a fixed 128-entry
//! table and produces exactly one [`Event`] per call, advancing a
//! forward-only cursor. One reader parses one header string and is then
//! discarded.
//!
//! Quoted strings and comments are returned with backslash escapes and
//! folded CRLF line breaks removed. The decoded value borrows from the
//! input whenever no filtering was necessary and only allocates when an
//! escape or a carriage return was actually seen.
//!
//! Comments are only recognized when the reader was constructed with
//! [`HeaderReader::with_comments`]; everywhere else an opening parenthesis
//! is a grammar error.

use std::borrow::Cow;

use tracing::trace;

use crate::ensure;
use crate::GrammarError;

/// Lexical class assigned to each ASCII character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Control,
    Token,
    Separator,
    Comment,
    QuotedString,
    WhiteSpace,
}

/// The RFC 2616 `separators` production, including space and tab.
const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={} \t";

const WHITE_SPACE: &[u8] = b"\t\r\n ";

/// Classification table for bytes 0..=127. Bytes outside the table are
/// always treated as [`CharClass::Control`].
const CLASS_TABLE: [CharClass; 128] = build_class_table();

const fn build_class_table() -> [CharClass; 128] {
    let mut table = [CharClass::Control; 128];

    // Visible ASCII defaults to the token class; 0..32 and 127 stay control.
    let mut i = 32;
    while i < 127 {
        table[i] = CharClass::Token;
        i += 1;
    }

    let mut i = 0;
    while i < SEPARATORS.len() {
        table[SEPARATORS[i] as usize] = CharClass::Separator;
        i += 1;
    }

    table[b'(' as usize] = CharClass::Comment;
    table[b'"' as usize] = CharClass::QuotedString;

    // Space and tab belong to both sets; whitespace wins in the table while
    // `is_separator_char` still answers true for them.
    let mut i = 0;
    while i < WHITE_SPACE.len() {
        table[WHITE_SPACE[i] as usize] = CharClass::WhiteSpace;
        i += 1;
    }

    table
}

pub(crate) fn is_token_char(byte: u8) -> bool {
    byte < 128 && matches!(CLASS_TABLE[byte as usize], CharClass::Token)
}

fn is_white_space(byte: u8) -> bool {
    matches!(byte, b'\t' | b'\r' | b'\n' | b' ')
}

fn is_separator_char(byte: u8) -> bool {
    SEPARATORS.contains(&byte)
}

/// A single classified lexeme produced by [`HeaderReader::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    /// A maximal run of token-class characters.
    Token(&'a str),
    /// A `"`-delimited string, escapes and folded line breaks removed.
    QuotedString(Cow<'a, str>),
    /// A `(`-delimited, possibly nested sequence without its outer
    /// parentheses. Only produced by comment-aware readers.
    Comment(Cow<'a, str>),
    /// A single separator character.
    Separator(char),
    /// A single control (or non-ASCII) character.
    Control(char),
}

impl Event<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Event::Token(_) => "a token",
            Event::QuotedString(_) => "a quoted string",
            Event::Comment(_) => "a comment",
            Event::Separator(_) => "a separator",
            Event::Control(_) => "a control character",
        }
    }
}

/// Pull lexer over a single header value string.
#[derive(Debug)]
pub struct HeaderReader<'a> {
    header: &'a str,
    index: usize,
    process_comments: bool,
}

impl<'a> HeaderReader<'a> {
    /// Creates a reader that rejects comments.
    pub fn new(header: &'a str) -> Self {
        Self { header, index: 0, process_comments: false }
    }

    /// Creates a reader that recognizes `(..)` comments.
    pub fn with_comments(header: &'a str) -> Self {
        Self { header, index: 0, process_comments: true }
    }

    fn bytes(&self) -> &'a [u8] {
        self.header.as_bytes()
    }

    /// Current cursor position, in bytes from the start of the header.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Skips whitespace and reports whether any input remains.
    pub fn has_next(&mut self) -> bool {
        self.skip_white_space()
    }

    fn skip_white_space(&mut self) -> bool {
        let bytes = self.bytes();
        while self.index < bytes.len() {
            if !is_white_space(bytes[self.index]) {
                return true;
            }
            self.index += 1;
        }
        false
    }

    /// Classifies and consumes the next lexeme.
    ///
    /// With `skip_white_space` unset, whitespace at the cursor is a grammar
    /// error. `preserve_backslash` keeps backslashes literal inside quoted
    /// strings (so `\"` terminates the string), which some legacy parameter
    /// values require.
    ///
    /// # Errors
    ///
    /// Fails on end of input, an unbalanced quoted string, an unbalanced
    /// comment, a comment when comments are disabled for this reader, or
    /// leading whitespace when `skip_white_space` is unset.
    pub fn next(&mut self, skip_white_space: bool, preserve_backslash: bool) -> Result<Event<'a>, GrammarError> {
        if skip_white_space {
            self.skip_white_space();
        }

        ensure!(self.index < self.bytes().len(), GrammarError::unexpected_end(self.index));

        self.process(preserve_backslash)
    }

    fn process(&mut self, preserve_backslash: bool) -> Result<Event<'a>, GrammarError> {
        let byte = self.bytes()[self.index];

        if byte >= 128 {
            // Non-ASCII input classifies as control, consumed one scalar at a time.
            return match self.header[self.index..].chars().next() {
                Some(ch) => {
                    self.index += ch.len_utf8();
                    Ok(Event::Control(ch))
                }
                None => Err(GrammarError::unexpected_end(self.index)),
            };
        }

        match CLASS_TABLE[byte as usize] {
            CharClass::Token => {
                let start = self.index;
                self.index += 1;
                let bytes = self.bytes();
                while self.index < bytes.len() && is_token_char(bytes[self.index]) {
                    self.index += 1;
                }
                Ok(Event::Token(&self.header[start..self.index]))
            }
            CharClass::QuotedString => self.process_quoted_string(preserve_backslash).map(Event::QuotedString),
            CharClass::Comment => {
                ensure!(self.process_comments, GrammarError::comments_not_allowed(self.index));
                self.process_comment().map(Event::Comment)
            }
            CharClass::Separator => {
                self.index += 1;
                Ok(Event::Separator(byte as char))
            }
            CharClass::Control => {
                self.index += 1;
                Ok(Event::Control(byte as char))
            }
            CharClass::WhiteSpace => Err(GrammarError::whitespace_not_allowed(self.index)),
        }
    }

    fn process_quoted_string(&mut self, preserve_backslash: bool) -> Result<Cow<'a, str>, GrammarError> {
        let bytes = self.bytes();
        let mut filter = false;

        self.index += 1;
        let start = self.index;
        while self.index < bytes.len() {
            let byte = bytes[self.index];
            if !preserve_backslash && byte == b'\\' {
                // The escaped character is consumed below along with the backslash.
                self.index += 1;
                filter = true;
            } else if byte == b'\r' {
                filter = true;
            } else if byte == b'"' {
                let raw = &self.header[start..self.index];
                self.index += 1;
                return Ok(if filter {
                    Cow::Owned(filter_escapes(raw, preserve_backslash))
                } else {
                    Cow::Borrowed(raw)
                });
            }
            self.index += 1;
        }

        Err(GrammarError::unbalanced_quoted_string(self.index))
    }

    fn process_comment(&mut self) -> Result<Cow<'a, str>, GrammarError> {
        let bytes = self.bytes();
        let mut filter = false;
        let mut nesting = 1usize;

        self.index += 1;
        let start = self.index;
        while nesting > 0 && self.index < bytes.len() {
            match bytes[self.index] {
                b'\\' => {
                    self.index += 1;
                    filter = true;
                }
                b'\r' => filter = true,
                b'(' => nesting += 1,
                b')' => nesting -= 1,
                _ => {}
            }
            self.index += 1;
        }

        ensure!(nesting == 0, GrammarError::unbalanced_comment(self.index));

        let raw = &self.header[start..self.index - 1];
        Ok(if filter { Cow::Owned(filter_escapes(raw, false)) } else { Cow::Borrowed(raw) })
    }

    /// Consumes the next lexeme, which must be a token.
    pub fn next_token(&mut self) -> Result<&'a str, GrammarError> {
        match self.next(false, false)? {
            Event::Token(value) => Ok(value),
            other => Err(GrammarError::unexpected_event("a token", other.kind(), self.index)),
        }
    }

    /// Consumes the next lexeme, which must be exactly the given separator.
    pub fn next_separator(&mut self, expected: char) -> Result<(), GrammarError> {
        match self.next(false, false)? {
            Event::Separator(found) if found == expected => Ok(()),
            Event::Separator(found) => Err(GrammarError::unexpected_separator(expected, found, self.index)),
            other => Err(GrammarError::unexpected_event("a separator", other.kind(), self.index)),
        }
    }

    /// Consumes the next lexeme, which must be a quoted string.
    pub fn next_quoted_string(&mut self) -> Result<Cow<'a, str>, GrammarError> {
        match self.next(false, false)? {
            Event::QuotedString(value) => Ok(value),
            other => Err(GrammarError::unexpected_event("a quoted string", other.kind(), self.index)),
        }
    }

    /// Consumes the next lexeme, which must be a token or a quoted string.
    pub fn next_token_or_quoted_string(&mut self, preserve_backslash: bool) -> Result<Cow<'a, str>, GrammarError> {
        match self.next(false, preserve_backslash)? {
            Event::Token(value) => Ok(Cow::Borrowed(value)),
            Event::QuotedString(value) => Ok(value),
            other => Err(GrammarError::unexpected_event("a token or a quoted string", other.kind(), self.index)),
        }
    }

    /// Peeks whether the next non-consumed character is the given separator.
    pub fn has_next_separator(&mut self, separator: char, skip_white_space: bool) -> bool {
        if skip_white_space {
            self.skip_white_space();
        }

        let bytes = self.bytes();
        if self.index >= bytes.len() {
            return false;
        }

        let byte = bytes[self.index];
        is_separator_char(byte) && byte as char == separator
    }
}

/// Rebuilds a scanned value with escapes and folded line breaks removed.
fn filter_escapes(raw: &str, preserve_backslash: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut got_escape = false;
    let mut got_cr = false;

    for ch in raw.chars() {
        if ch == '\n' && got_cr {
            got_cr = false;
            continue;
        }

        got_cr = false;
        if got_escape {
            out.push(ch);
            got_escape = false;
        } else if !preserve_backslash && ch == '\\' {
            got_escape = true;
        } else if ch == '\r' {
            got_cr = true;
        } else {
            out.push(ch);
        }
    }

    out
}

/// Parameter list attached to a structured header value.
///
/// Preserves insertion order; inserting an existing name replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Reads a `;name=value` parameter list until the reader is exhausted.
///
/// Parameter names are lowercased; runs of extra `;` separators and a
/// trailing `;` are accepted. With `file_name_fix`, a parameter literally
/// named `filename` keeps its backslashes during scanning and is then
/// stripped to the text after the last backslash, undoing legacy user
/// agents that send a full path.
pub fn read_parameters(reader: &mut HeaderReader<'_>, file_name_fix: bool) -> Result<Parameters, GrammarError> {
    let mut parameters = Parameters::new();

    while reader.has_next() {
        reader.next_separator(';')?;
        while reader.has_next_separator(';', true) {
            reader.next(true, false)?;
        }

        if !reader.has_next() {
            break;
        }

        let name = reader.next_token()?.to_ascii_lowercase();
        reader.next_separator('=')?;

        let value = if file_name_fix && name == "filename" {
            let value = reader.next_token_or_quoted_string(true)?;
            match value.rfind('\\') {
                Some(pos) => value[pos + 1..].to_string(),
                None => value.into_owned(),
            }
        } else {
            reader.next_token_or_quoted_string(false)?.into_owned()
        };

        trace!(name = %name, "read header parameter");
        parameters.insert(name, value);
    }

    Ok(parameters)
}

/// True when every character of `s` belongs to the token class.
pub fn is_token_string(s: &str) -> bool {
    s.bytes().all(is_token_char)
}

/// Appends `value`, double-quoting it when it is not a valid token string
/// and escaping any embedded quotes. Empty values append nothing.
pub fn append_quoted_if_non_token(buffer: &mut String, value: &str) {
    if value.is_empty() {
        return;
    }

    let quote = !is_token_string(value);
    if quote {
        buffer.push('"');
    }
    for ch in value.chars() {
        if ch == '"' {
            buffer.push('\\');
        }
        buffer.push(ch);
    }
    if quote {
        buffer.push('"');
    }
}

/// Appends `value`, double-quoting it when it contains a space.
pub fn append_quoted_if_whitespace(buffer: &mut String, value: &str) {
    if value.contains(' ') {
        buffer.push('"');
        buffer.push_str(value);
        buffer.push('"');
    } else {
        buffer.push_str(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_reads_back_verbatim() {
        for s in ["gzip", "max-age", "W", "a", "x-my-token", "1.0"] {
            let mut reader = HeaderReader::new(s);
            assert_eq!(reader.next(true, false).unwrap(), Event::Token(s));
            assert!(!reader.has_next());
        }
    }

    #[test]
    fn token_stops_at_separator() {
        let mut reader = HeaderReader::new("text/html");
        assert_eq!(reader.next_token().unwrap(), "text");
        reader.next_separator('/').unwrap();
        assert_eq!(reader.next_token().unwrap(), "html");
        assert!(!reader.has_next());
    }

    #[test]
    fn leading_whitespace_is_skipped_only_on_request() {
        let mut reader = HeaderReader::new("  gzip");
        assert_eq!(reader.next(true, false).unwrap(), Event::Token("gzip"));

        let mut reader = HeaderReader::new("  gzip");
        assert_eq!(reader.next(false, false), Err(GrammarError::whitespace_not_allowed(0)));
    }

    #[test]
    fn end_of_input_fails() {
        let mut reader = HeaderReader::new("   ");
        assert!(!reader.has_next());
        assert_eq!(reader.next(true, false), Err(GrammarError::unexpected_end(3)));
    }

    #[test]
    fn quoted_string_borrows_when_clean() {
        let mut reader = HeaderReader::new("\"abc123\"");
        match reader.next(true, false).unwrap() {
            Event::QuotedString(Cow::Borrowed(value)) => assert_eq!(value, "abc123"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn quoted_string_unescapes() {
        let mut reader = HeaderReader::new(r#""say \"hi\"""#);
        assert_eq!(reader.next_quoted_string().unwrap(), "say \"hi\"");
    }

    #[test]
    fn quoted_string_folds_crlf() {
        let mut reader = HeaderReader::new("\"line\r\n folded\"");
        assert_eq!(reader.next_quoted_string().unwrap(), "line folded");
    }

    #[test]
    fn quoted_string_drops_bare_cr() {
        let mut reader = HeaderReader::new("\"a\rb\"");
        assert_eq!(reader.next_quoted_string().unwrap(), "ab");
    }

    #[test]
    fn unbalanced_quote_fails() {
        let mut reader = HeaderReader::new("\"never closed");
        assert_eq!(reader.next(true, false), Err(GrammarError::unbalanced_quoted_string(13)));
    }

    #[test]
    fn preserve_backslash_keeps_escapes_literal() {
        let mut reader = HeaderReader::new(r#""c:\temp\f.txt""#);
        assert_eq!(reader.next_token_or_quoted_string(true).unwrap(), r"c:\temp\f.txt");
    }

    #[test]
    fn comment_requires_opt_in() {
        let mut reader = HeaderReader::new("(a comment)");
        assert_eq!(reader.next(true, false), Err(GrammarError::comments_not_allowed(0)));
    }

    #[test]
    fn comment_nests() {
        let mut reader = HeaderReader::with_comments("(outer (inner) tail)");
        match reader.next(true, false).unwrap() {
            Event::Comment(value) => assert_eq!(value, "outer (inner) tail"),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(!reader.has_next());
    }

    #[test]
    fn unbalanced_comment_fails() {
        let mut reader = HeaderReader::with_comments("(never (closed)");
        assert_eq!(reader.next(true, false), Err(GrammarError::unbalanced_comment(15)));
    }

    #[test]
    fn separator_mismatch_fails() {
        let mut reader = HeaderReader::new(";rest");
        assert_eq!(reader.next_separator('='), Err(GrammarError::unexpected_separator('=', ';', 1)));

        let mut reader = HeaderReader::new("token");
        assert_eq!(
            reader.next_separator('='),
            Err(GrammarError::unexpected_event("a separator", "a token", 5))
        );
    }

    #[test]
    fn control_characters_come_back_one_at_a_time() {
        let mut reader = HeaderReader::new("\u{1}");
        assert_eq!(reader.next(false, false).unwrap(), Event::Control('\u{1}'));

        let mut reader = HeaderReader::new("é");
        assert_eq!(reader.next(false, false).unwrap(), Event::Control('é'));
        assert!(!reader.has_next());
    }

    #[test]
    fn has_next_separator_peeks_without_consuming() {
        let mut reader = HeaderReader::new("  ; charset=utf-8");
        assert!(reader.has_next_separator(';', true));
        assert!(reader.has_next_separator(';', false));
        reader.next_separator(';').unwrap();
        assert!(!reader.has_next_separator(';', true));
    }

    #[test]
    fn read_parameters_basic() {
        let mut reader = HeaderReader::new("; charset=utf-8; boundary=\"a b\"");
        let parameters = read_parameters(&mut reader, false).unwrap();
        assert_eq!(parameters.get("charset"), Some("utf-8"));
        assert_eq!(parameters.get("boundary"), Some("a b"));
        assert_eq!(parameters.len(), 2);
    }

    #[test]
    fn read_parameters_lowercases_names_and_keeps_order() {
        let mut reader = HeaderReader::new(";Charset=utf-8;Boundary=xyz");
        let parameters = read_parameters(&mut reader, false).unwrap();
        let names: Vec<&str> = parameters.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["charset", "boundary"]);
    }

    #[test]
    fn read_parameters_skips_extra_separators() {
        let mut reader = HeaderReader::new(";; charset=utf-8 ;;; q=1 ;");
        let parameters = read_parameters(&mut reader, false).unwrap();
        assert_eq!(parameters.get("charset"), Some("utf-8"));
        assert_eq!(parameters.get("q"), Some("1"));
    }

    #[test]
    fn read_parameters_unterminated_pair_fails() {
        let mut reader = HeaderReader::new("; charset=");
        assert!(read_parameters(&mut reader, false).is_err());
    }

    #[test]
    fn filename_fix_strips_path_prefix() {
        let mut reader = HeaderReader::new(r#"; filename="c:\temp\report.pdf""#);
        let parameters = read_parameters(&mut reader, true).unwrap();
        assert_eq!(parameters.get("filename"), Some("report.pdf"));

        let mut reader = HeaderReader::new(r#"; filename="report.pdf""#);
        let parameters = read_parameters(&mut reader, true).unwrap();
        assert_eq!(parameters.get("filename"), Some("report.pdf"));
    }

    #[test]
    fn token_string_classification() {
        assert!(is_token_string("utf-8"));
        assert!(!is_token_string("a b"));
        assert!(!is_token_string("a\"b"));
        assert!(!is_token_string("a/b"));
    }

    #[test]
    fn quoting_helpers() {
        let mut buffer = String::new();
        append_quoted_if_non_token(&mut buffer, "utf-8");
        assert_eq!(buffer, "utf-8");

        let mut buffer = String::new();
        append_quoted_if_non_token(&mut buffer, "a \"b\"");
        assert_eq!(buffer, "\"a \\\"b\\\"\"");

        let mut buffer = String::new();
        append_quoted_if_whitespace(&mut buffer, "two words");
        assert_eq!(buffer, "\"two words\"");
    }

    #[test]
    fn parameters_insert_replaces_in_place() {
        let mut parameters = Parameters::new();
        parameters.insert("charset", "ascii");
        parameters.insert("q", "0.5");
        parameters.insert("charset", "utf-8");

        assert_eq!(parameters.len(), 2);
        let entries: Vec<(&str, &str)> = parameters.iter().collect();
        assert_eq!(entries, [("charset", "utf-8"), ("q", "0.5")]);
    }
}
