//! Header name/value pairs for the client's default header set.

use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

use crate::collections::{Keyed, MultiValueMap};

/// A single header name/value pair.
///
/// Equality is case-insensitive on the name and exact on the value; the
/// bucket identity is the lowercased name.
#[derive(Debug, Clone, Eq)]
pub struct Header {
    name: String,
    value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name) && self.value == other.value
    }
}

impl Keyed for Header {
    fn id(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

/// Flattens a header multimap into an [`http::HeaderMap`], comma-joining
/// multiple values stored under one name. Names or values the `http` crate
/// cannot represent are skipped with a warning rather than failing the
/// whole request.
pub fn to_header_map(headers: &MultiValueMap<Header>) -> HeaderMap {
    let mut map = HeaderMap::new();

    for (key, bucket) in headers.entries() {
        let joined = bucket.iter().map(Header::value).collect::<Vec<_>>().join(",");

        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(_) => {
                warn!(name = %key, "skipping unrepresentable header name");
                continue;
            }
        };

        match HeaderValue::from_str(&joined) {
            Ok(value) => {
                map.insert(name, value);
            }
            Err(_) => warn!(name = %key, "skipping unrepresentable header value"),
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_name_case_only() {
        assert_eq!(Header::new("Vary", "encoding"), Header::new("vary", "encoding"));
        assert_ne!(Header::new("Vary", "encoding"), Header::new("Vary", "range"));
    }

    #[test]
    fn id_is_the_lowercased_name() {
        assert_eq!(Header::new("Accept", "*/*").id(), "accept");
    }

    #[test]
    fn flattens_buckets_with_comma_joins() {
        let mut headers = MultiValueMap::new();
        headers.add(Header::new("Accept", "text/html"));
        headers.add(Header::new("accept", "application/json"));
        headers.add(Header::new("User-Agent", "fluent/0.1"));

        let map = to_header_map(&headers);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(http::header::ACCEPT).unwrap(), "text/html,application/json");
        assert_eq!(map.get(http::header::USER_AGENT).unwrap(), "fluent/0.1");
    }

    #[test]
    fn skips_unrepresentable_values() {
        let mut headers = MultiValueMap::new();
        headers.add(Header::new("X-Bad", "line\nbreak"));
        headers.add(Header::new("X-Good", "ok"));

        let map = to_header_map(&headers);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("x-good").unwrap(), "ok");
    }
}
