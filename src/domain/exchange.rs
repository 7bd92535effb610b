//! Per-call state carried through the intercept/decode/forward pipeline.
//!
//! One `ExchangeContext` is created for every inbound export call and dropped
//! once the call has been answered and its diagnostic block flushed.

use axum::http::{HeaderMap, Method, StatusCode, Uri, Version, request::Parts};
use bytes::Bytes;

use super::SignalType;
use crate::otlp::OtlpMessage;

#[derive(Debug)]
pub struct ExchangeContext {
    pub signal: SignalType,
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    /// Decoded inbound message, absent when the body failed to decode.
    pub request: Option<OtlpMessage>,
    /// Upstream address for this call's signal; `None` disables forwarding.
    pub forward_to: Option<String>,
    pub upstream: Option<UpstreamRecord>,
    /// Failure that terminated the call, if any.
    pub error: Option<String>,
}

impl ExchangeContext {
    pub fn new(signal: SignalType, parts: &Parts, forward_to: Option<String>) -> Self {
        Self {
            signal,
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            version: parts.version,
            headers: parts.headers.clone(),
            request: None,
            forward_to,
            upstream: None,
            error: None,
        }
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Origin-form target (`/v1/logs?x=y`), even when the request arrived in
    /// absolute form or over HTTP/2.
    pub fn request_target(&self) -> &str {
        self.uri
            .path_and_query()
            .map_or_else(|| self.uri.path(), |pq| pq.as_str())
    }

    pub fn record_error(&mut self, error: &dyn std::error::Error) {
        self.error = Some(error.to_string());
    }
}

/// What came back from the upstream collector.
#[derive(Debug)]
pub struct UpstreamRecord {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    /// `None` while (or if) the body could not be read.
    pub payload: Option<ResponsePayload>,
}

impl UpstreamRecord {
    pub fn new(status: StatusCode, version: Version, headers: HeaderMap) -> Self {
        Self {
            status,
            version,
            headers,
            payload: None,
        }
    }
}

/// Upstream body as recorded for diagnostics: decoded when it matched the
/// response schema, otherwise the raw bytes.
#[derive(Debug)]
pub enum ResponsePayload {
    Decoded(OtlpMessage),
    Raw(Bytes),
}
