//! Cookie header values (`Set-Cookie` / `Cookie` style `name=value` pairs
//! with attributes).

use std::fmt::{self, Write};
use std::str::FromStr;
use std::time::SystemTime;

use crate::ensure;
use crate::reader::append_quoted_if_whitespace;
use crate::GrammarError;

/// The `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    None,
    Lax,
    Strict,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::None => "None",
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
        })
    }
}

/// A cookie: its `name=value` identity plus the optional attributes.
///
/// Equality compares every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    version: i32,
    path: Option<String>,
    domain: Option<String>,
    comment: Option<String>,
    max_age: Option<i64>,
    expiry: Option<SystemTime>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            version: 1,
            path: None,
            domain: None,
            comment: None,
            max_age: None,
            expiry: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn expiry(&self) -> Option<SystemTime> {
        self.expiry
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    pub fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_max_age(mut self, max_age: i64) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn with_expiry(mut self, expiry: SystemTime) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }
}

impl FromStr for Cookie {
    type Err = GrammarError;

    /// Splits the header on `;`; the first segment is the cookie identity,
    /// every later segment is matched case-insensitively by prefix against
    /// the known attribute names. Unrecognized segments and attribute
    /// values that fail to parse are dropped, not errors.
    fn from_str(header: &str) -> Result<Self, Self::Err> {
        let mut cookie: Option<Cookie> = None;

        for bite in header.split(';') {
            let mut crumbs = bite.splitn(2, '=');
            let name = crumbs.next().unwrap_or("").trim();
            let mut value = crumbs.next().unwrap_or("").trim();
            if value.len() > 1 && value.starts_with('"') && value.ends_with('"') {
                value = &value[1..value.len() - 1];
            }

            match cookie.as_mut() {
                None => {
                    ensure!(!name.is_empty(), GrammarError::invalid_cookie("missing name=value identity"));
                    cookie = Some(Cookie::new(name, value));
                }
                Some(cookie) => {
                    let attribute = name.to_ascii_lowercase();
                    if attribute.starts_with("comment") {
                        cookie.comment = Some(value.to_string());
                    } else if attribute.starts_with("domain") {
                        cookie.domain = Some(value.to_string());
                    } else if attribute.starts_with("max-age") {
                        if let Ok(age) = value.parse() {
                            cookie.max_age = Some(age);
                        }
                    } else if attribute.starts_with("path") {
                        cookie.path = Some(value.to_string());
                    } else if attribute.starts_with("secure") {
                        cookie.secure = true;
                    } else if attribute.starts_with("version") {
                        if let Ok(version) = value.parse() {
                            cookie.version = version;
                        }
                    } else if attribute.starts_with("httponly") {
                        cookie.http_only = true;
                    } else if attribute.starts_with("expires") {
                        if let Ok(expiry) = httpdate::parse_http_date(value) {
                            cookie.expiry = Some(expiry);
                        }
                    }
                }
            }
        }

        cookie.ok_or_else(|| GrammarError::invalid_cookie("empty header"))
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = String::new();
        buffer.push_str(&self.name);
        buffer.push('=');
        append_quoted_if_whitespace(&mut buffer, &self.value);

        write!(buffer, ";Version={}", self.version)?;

        if let Some(comment) = &self.comment {
            buffer.push_str(";Comment=");
            append_quoted_if_whitespace(&mut buffer, comment);
        }

        if let Some(domain) = &self.domain {
            buffer.push_str(";Domain=");
            append_quoted_if_whitespace(&mut buffer, domain);
        }

        if let Some(path) = &self.path {
            buffer.push_str(";Path=");
            append_quoted_if_whitespace(&mut buffer, path);
        }

        if let Some(max_age) = self.max_age {
            if max_age != -1 {
                write!(buffer, ";Max-Age={max_age}")?;
            }
        }

        if self.secure {
            buffer.push_str(";Secure");
        }

        if self.http_only {
            buffer.push_str(";HttpOnly");
        }

        if let Some(expiry) = self.expiry {
            buffer.push_str(";Expires=");
            buffer.push_str(&httpdate::fmt_http_date(expiry));
        }

        if let Some(same_site) = self.same_site {
            write!(buffer, ";SameSite={same_site}")?;
        }

        f.write_str(&buffer)
    }
}
