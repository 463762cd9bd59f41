//! Transparent content decoding for compressed response bodies.

use std::any::Any;
use std::io::{self, Write};

use bytes::{Bytes, BytesMut};
use flate2::write::GzDecoder;
use tracing::trace;

use crate::context::{BodyTransform, RequestInformation, ResponseInformation};
use crate::filter::{order, Filter, FilterError};
use crate::header::Header;

/// Post-request filter that inflates gzip-encoded response bodies.
///
/// Runs at [`order::POST_REQUEST_DECODE`], ahead of the other post filters,
/// so they observe decoded bytes. The filter only attaches its transform
/// when the response's `Content-Encoding` starts with `gzip`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GzipDecoding;

impl GzipDecoding {
    pub const FORMAT: &'static str = "gzip";

    /// The header pair advertising this decoding to the server.
    pub fn accept_header(&self) -> Header {
        Header::new(http::header::ACCEPT_ENCODING.as_str(), Self::FORMAT)
    }
}

impl Filter for GzipDecoding {
    fn order(&self) -> i32 {
        order::POST_REQUEST_DECODE
    }

    fn filter(
        &self,
        _request: &mut dyn RequestInformation,
        response: Option<&mut dyn ResponseInformation>,
    ) -> Result<(), FilterError> {
        let Some(response) = response else {
            return Ok(());
        };

        let encoded = response
            .headers()
            .get(http::header::CONTENT_ENCODING)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(Self::FORMAT));

        if encoded {
            trace!("attaching gzip decode transform");
            response.pipe(Box::new(GzipDecodeTransform::new()));
        }

        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn filter_eq(&self, other: &dyn Filter) -> bool {
        other.as_any().downcast_ref::<Self>().is_some()
    }
}

/// Buffer the write-side decoder drains decompressed bytes into.
struct Writer {
    buf: BytesMut,
}

impl Writer {
    fn new() -> Self {
        Self { buf: BytesMut::new() }
    }

    fn take(&mut self) -> Bytes {
        self.buf.split().freeze()
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Streaming gzip inflater over the [`BodyTransform`] seam.
///
/// The decoder is consumed by `finish`; the `Option` guards against the
/// transport calling `transform` afterwards.
pub struct GzipDecodeTransform {
    decoder: Option<GzDecoder<Writer>>,
}

impl GzipDecodeTransform {
    pub fn new() -> Self {
        Self { decoder: Some(GzDecoder::new(Writer::new())) }
    }
}

impl Default for GzipDecodeTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GzipDecodeTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzipDecodeTransform").field("finished", &self.decoder.is_none()).finish()
    }
}

impl BodyTransform for GzipDecodeTransform {
    fn transform(&mut self, chunk: &[u8]) -> io::Result<Bytes> {
        match self.decoder.as_mut() {
            Some(decoder) => {
                decoder.write_all(chunk)?;
                Ok(decoder.get_mut().take())
            }
            None => Err(io::Error::other("gzip transform already finished")),
        }
    }

    fn finish(&mut self) -> io::Result<Bytes> {
        match self.decoder.take() {
            Some(decoder) => {
                let mut writer = decoder.finish()?;
                Ok(writer.take())
            }
            None => Ok(Bytes::new()),
        }
    }
}
