//! Priority-ordered filter pipeline and client configuration for the
//! fluent HTTP client.
//!
//! This crate owns everything between the header codecs
//! ([`fluent_header`]) and the wire: the ordered collections a client
//! configuration is made of, the [`Filter`] contract with its two-phase
//! priority dispatch, the built-in filter variants (logging, body logging,
//! gzip decoding), and the [`Client`] object whose [`Client::snapshot`]
//! isolates a configuration from per-request mutation.
//!
//! The actual transport is an external collaborator: it implements
//! [`RequestInformation`] and [`ResponseInformation`] over its own
//! request/response machinery, calls [`FilterRegistry::run_pre_request`]
//! before transmitting and [`FilterRegistry::run_post_request`] once a
//! response exists, and drives any [`BodyTransform`]s the filters attached.
//!
//! # Example
//!
//! ```
//! use fluent_client::{Client, GzipDecoding, LoggingFilter};
//!
//! let client = Client::builder()
//!     .header("User-Agent", "fluent/0.1")
//!     .filter(LoggingFilter)
//!     .decoding(GzipDecoding)
//!     .build();
//!
//! // One owned copy per logical request; the base stays untouched.
//! let request = client.snapshot();
//! assert_eq!(request.filters().len(), 2);
//! ```

pub mod collections;
pub mod context;
pub mod filter;
pub mod filters;

mod client;
mod header;

pub use client::{Client, ClientBuilder};
pub use collections::{DedupList, Keyed, MultiValueMap, PriorityMap};
pub use context::{BodyTransform, RequestInformation, ResponseInformation};
pub use filter::{Filter, FilterError, FilterRegistry};
pub use filters::{
    GzipDecodeTransform, GzipDecoding, LoggingFilter, RequestBodyLoggingFilter, ResponseBodyLoggingFilter,
};
pub use header::{to_header_map, Header};
