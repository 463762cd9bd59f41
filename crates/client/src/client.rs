//! Client configuration: default headers, the filter registry, and the
//! snapshot that isolates one configuration from per-request mutation.

use std::sync::Arc;
use std::time::Duration;

use fluent_header::{CacheControl, Cookie, MediaType};

use crate::collections::MultiValueMap;
use crate::filter::{Filter, FilterRegistry};
use crate::filters::GzipDecoding;
use crate::header::{to_header_map, Header};

/// Base configuration shared by the requests built from it.
///
/// A `Client` owns its header multimap and filter registry outright; it is
/// not internally synchronized. Request execution takes a
/// [`Client::snapshot`], an explicit deep copy, so in-flight mutation never
/// leaks back into the base configuration and no locking is needed.
#[derive(Debug, Clone)]
pub struct Client {
    headers: MultiValueMap<Header>,
    filters: FilterRegistry,
    timeout: Option<Duration>,
    allow_insecure: bool,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn headers(&self) -> &MultiValueMap<Header> {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut MultiValueMap<Header> {
        &mut self.headers
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterRegistry {
        &mut self.filters
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn allow_insecure(&self) -> bool {
        self.allow_insecure
    }

    /// Returns a new owned copy of this configuration.
    ///
    /// The header multimap and the filter priority tree are deep-copied,
    /// bucket lists included; the filter objects themselves are immutable
    /// configuration and stay shared.
    pub fn snapshot(&self) -> Client {
        self.clone()
    }

    /// Flattens the default headers into the wire representation handed to
    /// the transport.
    pub fn request_headers(&self) -> http::HeaderMap {
        to_header_map(&self.headers)
    }
}

/// Builder collecting the base configuration for a [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    headers: MultiValueMap<Header>,
    filters: FilterRegistry,
    timeout: Option<Duration>,
    allow_insecure: bool,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    /// Adds a default header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(Header::new(name, value));
        self
    }

    /// Registers a filter at its declared priority.
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.register(Arc::new(filter));
        self
    }

    /// Sets the `Accept` header from a media type.
    pub fn accept(self, media_type: &MediaType) -> Self {
        self.header(http::header::ACCEPT.as_str(), media_type.to_string())
    }

    /// Attaches a cookie to every request.
    pub fn cookie(self, cookie: &Cookie) -> Self {
        self.header(http::header::COOKIE.as_str(), cookie.to_string())
    }

    /// Sets the `Cache-Control` header from a directive set.
    pub fn cache_control(self, cache_control: &CacheControl) -> Self {
        self.header(http::header::CACHE_CONTROL.as_str(), cache_control.to_string())
    }

    /// Advertises and installs a content decoding: adds its
    /// `Accept-Encoding` header and registers the decoding filter.
    pub fn decoding(mut self, decoding: GzipDecoding) -> Self {
        self.headers.add(decoding.accept_header());
        self.filters.register(Arc::new(decoding));
        self
    }

    pub fn build(self) -> Client {
        Client {
            headers: self.headers,
            filters: self.filters,
            timeout: self.timeout,
            allow_insecure: self.allow_insecure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::LoggingFilter;

    #[test]
    fn builder_collects_headers_and_filters() {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .header("User-Agent", "fluent/0.1")
            .accept(&MediaType::APPLICATION_JSON)
            .filter(LoggingFilter)
            .decoding(GzipDecoding)
            .build();

        assert_eq!(client.timeout(), Some(Duration::from_secs(30)));
        assert!(!client.allow_insecure());
        assert_eq!(client.filters().len(), 2);

        let headers = client.request_headers();
        assert_eq!(headers.get(http::header::USER_AGENT).unwrap(), "fluent/0.1");
        assert_eq!(headers.get(http::header::ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(http::header::ACCEPT_ENCODING).unwrap(), "gzip");
    }

    #[test]
    fn codec_values_serialize_into_default_headers() {
        let cookie = Cookie::new("session", "abc").with_path("/");
        let cache_control = CacheControl { no_store: true, ..CacheControl::new() };

        let client = Client::builder().cookie(&cookie).cache_control(&cache_control).build();

        let headers = client.request_headers();
        assert_eq!(headers.get(http::header::COOKIE).unwrap(), "session=abc;Version=1;Path=/");
        assert_eq!(headers.get(http::header::CACHE_CONTROL).unwrap(), "no-store");
    }

    #[test]
    fn snapshot_isolates_the_base_configuration() {
        let base = Client::builder().header("X-Base", "1").filter(LoggingFilter).build();

        let mut snapshot = base.snapshot();
        snapshot.headers_mut().add(Header::new("X-Request", "2"));
        snapshot.filters_mut().register(Arc::new(GzipDecoding));

        assert_eq!(base.headers().len(), 1);
        assert_eq!(base.filters().len(), 1);
        assert_eq!(snapshot.headers().len(), 2);
        assert_eq!(snapshot.filters().len(), 2);
    }

    #[test]
    fn duplicate_decoding_is_idempotent() {
        let client = Client::builder().decoding(GzipDecoding).decoding(GzipDecoding).build();

        assert_eq!(client.filters().len(), 1);
        assert_eq!(client.headers().get("accept-encoding").unwrap().len(), 1);
    }
}
