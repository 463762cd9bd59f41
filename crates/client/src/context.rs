//! Request and response information views, plus the body-transform seam.
//!
//! Filters never touch sockets or wire framing. The external transport
//! layer implements these traits over whatever request/response machinery
//! it drives and hands the views to the dispatcher at exactly two points:
//! once before transmission, once after a response exists.

use std::io;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, Uri};

/// A synchronous transform applied to a request or response byte stream.
///
/// The transport feeds every chunk through [`BodyTransform::transform`] in
/// attachment order and calls [`BodyTransform::finish`] exactly once at end
/// of stream to drain buffered output.
pub trait BodyTransform: Send {
    fn transform(&mut self, chunk: &[u8]) -> io::Result<Bytes>;

    /// Flushes whatever the transform still buffers; nothing by default.
    fn finish(&mut self) -> io::Result<Bytes> {
        Ok(Bytes::new())
    }
}

/// View over the outgoing request, supplied by the transport layer.
pub trait RequestInformation {
    fn method(&self) -> &Method;

    fn uri(&self) -> &Uri;

    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Attaches a transform to the outgoing body stream.
    fn pipe(&mut self, transform: Box<dyn BodyTransform>);
}

/// View over the received response, supplied by the transport layer.
pub trait ResponseInformation {
    fn status(&self) -> StatusCode;

    fn headers(&self) -> &HeaderMap;

    /// Attaches a transform to the incoming body stream.
    fn pipe(&mut self, transform: Box<dyn BodyTransform>);
}
