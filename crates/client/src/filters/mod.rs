//! Built-in filter variants: exchange logging, body logging, and
//! transparent content decoding.

mod decoding;
mod logging;

pub use decoding::{GzipDecodeTransform, GzipDecoding};
pub use logging::{LoggingFilter, RequestBodyLoggingFilter, ResponseBodyLoggingFilter};
