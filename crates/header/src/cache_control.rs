//! `Cache-Control` header values, constructed programmatically and
//! serialized in a fixed directive order.

use std::fmt::{self, Write};

/// Sentinel for an unset `max-age` / `s-maxage` directive.
pub const UNSET_AGE: i64 = -1;

/// A set of cache-control directives.
///
/// There is no parser for this type; requests build it directly and only
/// serialization is needed. Directives render in a fixed order: `private`,
/// `no-cache`, `no-store`, `no-transform`, `must-revalidate`,
/// `proxy-revalidate`, `max-age`, `s-maxage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheControl {
    pub private: bool,
    pub no_cache: bool,
    pub no_store: bool,
    pub no_transform: bool,
    pub must_revalidate: bool,
    pub proxy_revalidate: bool,
    pub max_age: i64,
    pub s_max_age: i64,
    /// Header fields exempted from `private`, rendered as a quoted list.
    pub private_fields: Vec<String>,
    /// Header fields exempted from `no-cache`, rendered as a quoted list.
    pub no_cache_fields: Vec<String>,
}

impl Default for CacheControl {
    fn default() -> Self {
        Self {
            private: false,
            no_cache: false,
            no_store: false,
            no_transform: false,
            must_revalidate: false,
            proxy_revalidate: false,
            max_age: UNSET_AGE,
            s_max_age: UNSET_AGE,
            private_fields: Vec::new(),
            no_cache_fields: Vec::new(),
        }
    }
}

impl CacheControl {
    pub fn new() -> Self {
        Self::default()
    }
}

fn append_directive(buffer: &mut String, directive: &str) {
    if !buffer.is_empty() {
        buffer.push_str(", ");
    }
    buffer.push_str(directive);
}

fn append_directive_with_fields(buffer: &mut String, directive: &str, fields: &[String]) {
    append_directive(buffer, directive);
    if !fields.is_empty() {
        buffer.push_str("=\"");
        buffer.push_str(&fields.join(", "));
        buffer.push('"');
    }
}

impl fmt::Display for CacheControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = String::new();

        if self.private {
            append_directive_with_fields(&mut buffer, "private", &self.private_fields);
        }
        if self.no_cache {
            append_directive_with_fields(&mut buffer, "no-cache", &self.no_cache_fields);
        }
        if self.no_store {
            append_directive(&mut buffer, "no-store");
        }
        if self.no_transform {
            append_directive(&mut buffer, "no-transform");
        }
        if self.must_revalidate {
            append_directive(&mut buffer, "must-revalidate");
        }
        if self.proxy_revalidate {
            append_directive(&mut buffer, "proxy-revalidate");
        }
        if self.max_age != UNSET_AGE {
            append_directive(&mut buffer, "max-age");
            write!(buffer, "={}", self.max_age)?;
        }
        if self.s_max_age != UNSET_AGE {
            append_directive(&mut buffer, "s-maxage");
            write!(buffer, "={}", self.s_max_age)?;
        }

        f.write_str(&buffer)
    }
}
