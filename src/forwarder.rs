//! Relays an intercepted export call to the upstream collector.
//!
//! The original bytes are sent as-is, with the inbound headers copied onto the
//! outbound request and the content type forced to OTLP protobuf. The upstream
//! reply is handed back unchanged: same status, same headers (repeated names
//! included), byte-identical body.

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Version, header};
use axum::response::Response;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// Headers owned by the HTTP client on the outbound leg.
static OUTBOUND_SKIP: [HeaderName; 4] = [
    header::HOST,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

/// Hop-by-hop headers not relayed back to the caller.
static RELAY_SKIP: [HeaderName; 2] = [header::TRANSFER_ENCODING, header::CONNECTION];

#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("failed to reach upstream {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read upstream response body from {endpoint}: {source}")]
    Read {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    /// Build a forwarder whose upstream exchanges are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Send `body` to `endpoint`. Returns once the upstream status line and
    /// headers are in; the body is read separately with
    /// [`UpstreamResponse::read_body`]. No retries.
    pub async fn send(
        &self,
        endpoint: &str,
        body: Bytes,
        inbound_headers: &HeaderMap,
    ) -> Result<UpstreamResponse, ForwardError> {
        debug!(endpoint, body_size = body.len(), "Forwarding OTLP payload");

        let response = self
            .client
            .post(endpoint)
            .headers(outbound_headers(inbound_headers))
            .body(body)
            .send()
            .await
            .map_err(|source| ForwardError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        Ok(UpstreamResponse {
            endpoint: endpoint.to_string(),
            response,
        })
    }
}

/// An upstream reply whose body has not been read yet.
pub struct UpstreamResponse {
    endpoint: String,
    response: reqwest::Response,
}

impl UpstreamResponse {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn version(&self) -> Version {
        self.response.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    pub async fn read_body(self) -> Result<Bytes, ForwardError> {
        let endpoint = self.endpoint;
        self.response
            .bytes()
            .await
            .map_err(|source| ForwardError::Read { endpoint, source })
    }
}

/// Inbound headers as sent upstream: every value copied in order, then the
/// content type forced to protobuf.
pub fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 1);
    for (name, value) in inbound {
        if OUTBOUND_SKIP.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(PROTOBUF_CONTENT_TYPE),
    );
    headers
}

/// Client response mirroring the upstream reply.
///
/// Every upstream header is relayed except `transfer-encoding` and
/// `connection`, which describe the upstream connection and are set afresh by
/// the server for the client's connection.
pub fn relay(status: StatusCode, upstream_headers: &HeaderMap, body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for (name, value) in upstream_headers {
        if RELAY_SKIP.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    response
}
