//! HTTP header grammar engine and structured header value codecs.
//!
//! This crate is the parsing core of the fluent client workspace. It
//! implements the RFC 2616 `token` / `quoted-string` / `comment` /
//! `separator` grammar as a character-level [`reader::HeaderReader`] and
//! builds the structured header value types on top of it:
//!
//! - [`MediaType`]: `type/subtype` with an ordered parameter list
//! - [`EntityTag`]: strong and weak `ETag` values
//! - [`Cookie`]: `name=value` plus prefix-matched attributes
//! - [`CacheControl`]: programmatically built directive sets
//!
//! Each codec parses through [`std::str::FromStr`] and serializes through
//! [`std::fmt::Display`], using the same quoting and escaping rules the
//! reader accepts. No I/O happens here: an external transport hands raw
//! header strings in and takes serialized header strings out.
//!
//! # Example
//!
//! ```
//! use fluent_header::MediaType;
//!
//! let media_type: MediaType = "text/html; charset=utf-8".parse().unwrap();
//! assert_eq!(media_type.type_(), "text");
//! assert_eq!(media_type.subtype(), "html");
//! assert_eq!(media_type.parameters().get("charset"), Some("utf-8"));
//!
//! assert_eq!(MediaType::TEXT_HTML, media_type);
//! ```
//!
//! Malformed input never yields a partial value; every parse failure is a
//! [`GrammarError`] that is fatal to that call, and callers that can treat
//! a bad header as absent simply drop the error.

pub mod reader;

mod cache_control;
mod cookie;
mod entity_tag;
mod error;
mod media_type;

mod utils;
pub(crate) use utils::ensure;

pub use cache_control::{CacheControl, UNSET_AGE};
pub use cookie::{Cookie, SameSite};
pub use entity_tag::EntityTag;
pub use error::GrammarError;
pub use media_type::MediaType;
pub use reader::{Event, HeaderReader, Parameters};
