//! Runs the filter pipeline against an in-memory exchange: builds a
//! client, dispatches both phases, and lets the gzip decoding filter
//! inflate a compressed response body. No network involved; the demo
//! plays the part of the transport layer.

use std::io::Write;

use fluent_client::{
    BodyTransform, Client, GzipDecoding, LoggingFilter, RequestInformation, ResponseInformation,
};
use flate2::write::GzEncoder;
use flate2::Compression;
use http::{HeaderMap, Method, StatusCode, Uri};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

struct DemoRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    transforms: Vec<Box<dyn BodyTransform>>,
}

impl RequestInformation for DemoRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn uri(&self) -> &Uri {
        &self.uri
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn pipe(&mut self, transform: Box<dyn BodyTransform>) {
        self.transforms.push(transform);
    }
}

struct DemoResponse {
    status: StatusCode,
    headers: HeaderMap,
    transforms: Vec<Box<dyn BodyTransform>>,
}

impl ResponseInformation for DemoResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn pipe(&mut self, transform: Box<dyn BodyTransform>) {
        self.transforms.push(transform);
    }
}

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let client = Client::builder()
        .header("User-Agent", "fluent/0.1")
        .filter(LoggingFilter)
        .decoding(GzipDecoding)
        .build();

    // One owned snapshot per logical request.
    let config = client.snapshot();

    let mut request = DemoRequest {
        method: Method::GET,
        uri: "https://example.com/v1/greeting".parse().expect("demo uri"),
        headers: config.request_headers(),
        transforms: Vec::new(),
    };

    config.filters().run_pre_request(&mut request).expect("pre-request filters");

    // The "transport" answers with a gzip-compressed body.
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"hello from the demo transport").expect("compress demo body");
    let compressed = encoder.finish().expect("finish demo body");

    let mut headers = HeaderMap::new();
    headers.insert(http::header::CONTENT_ENCODING, "gzip".parse().expect("header value"));
    let mut response = DemoResponse { status: StatusCode::OK, headers, transforms: Vec::new() };

    config.filters().run_post_request(&mut request, &mut response).expect("post-request filters");

    // Drive the transforms the filters attached, the way a transport would.
    let mut body = compressed;
    for transform in &mut response.transforms {
        let mut output = Vec::new();
        for chunk in body.chunks(8) {
            output.extend_from_slice(&transform.transform(chunk).expect("transform chunk"));
        }
        output.extend_from_slice(&transform.finish().expect("finish transform"));
        body = output;
    }

    info!(body = %String::from_utf8_lossy(&body), "decoded response body");
}
