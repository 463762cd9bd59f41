//! Exchange and body logging filters built on `tracing`.

use std::any::Any;
use std::io;

use bytes::Bytes;
use tracing::{debug, info};

use crate::context::{BodyTransform, RequestInformation, ResponseInformation};
use crate::filter::{order, Filter, FilterError};

/// Logs the request line and, after the exchange, the response status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingFilter;

impl Filter for LoggingFilter {
    fn order(&self) -> i32 {
        order::POST_REQUEST
    }

    fn filter(
        &self,
        request: &mut dyn RequestInformation,
        response: Option<&mut dyn ResponseInformation>,
    ) -> Result<(), FilterError> {
        match response {
            Some(response) => info!(
                method = %request.method(),
                url = %request.uri(),
                status = %response.status(),
                "exchange finished"
            ),
            None => info!(method = %request.method(), url = %request.uri(), "request ready"),
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

/// Pass-through transform that accumulates the stream and logs it once the
/// transport signals end of stream.
struct CaptureTransform {
    stream: &'static str,
    captured: Vec<u8>,
}

impl CaptureTransform {
    fn new(stream: &'static str) -> Self {
        Self { stream, captured: Vec::new() }
    }
}

impl BodyTransform for CaptureTransform {
    fn transform(&mut self, chunk: &[u8]) -> io::Result<Bytes> {
        self.captured.extend_from_slice(chunk);
        Ok(Bytes::copy_from_slice(chunk))
    }

    fn finish(&mut self) -> io::Result<Bytes> {
        debug!(
            stream = self.stream,
            bytes = self.captured.len(),
            body = %String::from_utf8_lossy(&self.captured),
            "captured body"
        );
        self.captured.clear();
        Ok(Bytes::new())
    }
}

/// Captures and logs the outgoing request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestBodyLoggingFilter;

impl Filter for RequestBodyLoggingFilter {
    fn order(&self) -> i32 {
        order::PRE_REQUEST
    }

    fn filter(
        &self,
        request: &mut dyn RequestInformation,
        _response: Option<&mut dyn ResponseInformation>,
    ) -> Result<(), FilterError> {
        request.pipe(Box::new(CaptureTransform::new("request")));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn filter_eq(&self, other: &dyn Filter) -> bool {
        other.as_any().downcast_ref::<Self>().is_some()
    }
}

/// Captures and logs the incoming response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseBodyLoggingFilter;

impl Filter for ResponseBodyLoggingFilter {
    fn order(&self) -> i32 {
        order::POST_REQUEST
    }

    fn filter(
        &self,
        _request: &mut dyn RequestInformation,
        response: Option<&mut dyn ResponseInformation>,
    ) -> Result<(), FilterError> {
        if let Some(response) = response {
            response.pipe(Box::new(CaptureTransform::new("response")));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{TestRequest, TestResponse};
    use http::StatusCode;

    #[test]
    fn capture_transform_passes_chunks_through() {
        let mut transform = CaptureTransform::new("test");
        assert_eq!(transform.transform(b"hello ").unwrap(), Bytes::from_static(b"hello "));
        assert_eq!(transform.transform(b"world").unwrap(), Bytes::from_static(b"world"));
        assert_eq!(transform.captured, b"hello world");

        assert!(transform.finish().unwrap().is_empty());
        assert!(transform.captured.is_empty());
    }

    #[test]
    fn body_logging_filters_attach_to_their_stream() {
        let mut request = TestRequest::get("https://example.com/upload");
        RequestBodyLoggingFilter.filter(&mut request, None).unwrap();
        assert_eq!(request.transforms.len(), 1);

        let mut response = TestResponse::with_status(StatusCode::OK);
        ResponseBodyLoggingFilter.filter(&mut request, Some(&mut response)).unwrap();
        assert_eq!(response.transforms.len(), 1);
        assert_eq!(request.transforms.len(), 1);
    }

    #[test]
    fn logging_filters_are_structurally_equal() {
        assert!(LoggingFilter.filter_eq(&LoggingFilter));
        assert!(!LoggingFilter.filter_eq(&ResponseBodyLoggingFilter));
    }
}
