//! OTLP protobuf payload decoding.
//!
//! Each signal maps to a fixed request/response schema pair. The mapping is a
//! static descriptor table so the three endpoints stay symmetric.

use std::fmt;

use opentelemetry_proto::tonic::collector::{
    logs::v1::{ExportLogsServiceRequest, ExportLogsServiceResponse},
    metrics::v1::{ExportMetricsServiceRequest, ExportMetricsServiceResponse},
    trace::v1::{ExportTraceServiceRequest, ExportTraceServiceResponse},
};
use prost::Message;
use thiserror::Error;

use crate::domain::SignalType;

/// Which side of an export call a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Request => f.write_str("Request"),
            Direction::Response => f.write_str("Response"),
        }
    }
}

/// A decoded OTLP collector message of any signal and direction.
#[derive(Debug, Clone, PartialEq)]
pub enum OtlpMessage {
    LogsRequest(ExportLogsServiceRequest),
    LogsResponse(ExportLogsServiceResponse),
    TracesRequest(ExportTraceServiceRequest),
    TracesResponse(ExportTraceServiceResponse),
    MetricsRequest(ExportMetricsServiceRequest),
    MetricsResponse(ExportMetricsServiceResponse),
}

impl OtlpMessage {
    pub fn direction(&self) -> Direction {
        match self {
            OtlpMessage::LogsRequest(_)
            | OtlpMessage::TracesRequest(_)
            | OtlpMessage::MetricsRequest(_) => Direction::Request,
            OtlpMessage::LogsResponse(_)
            | OtlpMessage::TracesResponse(_)
            | OtlpMessage::MetricsResponse(_) => Direction::Response,
        }
    }

    /// Multi-line JSON rendering, fields in schema declaration order.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        match self {
            OtlpMessage::LogsRequest(m) => serde_json::to_string_pretty(m),
            OtlpMessage::LogsResponse(m) => serde_json::to_string_pretty(m),
            OtlpMessage::TracesRequest(m) => serde_json::to_string_pretty(m),
            OtlpMessage::TracesResponse(m) => serde_json::to_string_pretty(m),
            OtlpMessage::MetricsRequest(m) => serde_json::to_string_pretty(m),
            OtlpMessage::MetricsResponse(m) => serde_json::to_string_pretty(m),
        }
    }
}

#[derive(Error, Debug)]
#[error("invalid protobuf for {signal} {direction} ({schema}): {source}")]
pub struct DecodeError {
    pub signal: SignalType,
    pub direction: Direction,
    pub schema: &'static str,
    #[source]
    pub source: prost::DecodeError,
}

type DecodeFn = fn(&[u8]) -> Result<OtlpMessage, prost::DecodeError>;

/// Request/response schema pair for one signal.
pub struct SignalSchema {
    pub signal: SignalType,
    pub request_schema: &'static str,
    pub response_schema: &'static str,
    decode_request: DecodeFn,
    decode_response: DecodeFn,
}

static SCHEMAS: [SignalSchema; 3] = [
    SignalSchema {
        signal: SignalType::Logs,
        request_schema: "ExportLogsServiceRequest",
        response_schema: "ExportLogsServiceResponse",
        decode_request: |b| ExportLogsServiceRequest::decode(b).map(OtlpMessage::LogsRequest),
        decode_response: |b| ExportLogsServiceResponse::decode(b).map(OtlpMessage::LogsResponse),
    },
    SignalSchema {
        signal: SignalType::Traces,
        request_schema: "ExportTraceServiceRequest",
        response_schema: "ExportTraceServiceResponse",
        decode_request: |b| ExportTraceServiceRequest::decode(b).map(OtlpMessage::TracesRequest),
        decode_response: |b| {
            ExportTraceServiceResponse::decode(b).map(OtlpMessage::TracesResponse)
        },
    },
    SignalSchema {
        signal: SignalType::Metrics,
        request_schema: "ExportMetricsServiceRequest",
        response_schema: "ExportMetricsServiceResponse",
        decode_request: |b| {
            ExportMetricsServiceRequest::decode(b).map(OtlpMessage::MetricsRequest)
        },
        decode_response: |b| {
            ExportMetricsServiceResponse::decode(b).map(OtlpMessage::MetricsResponse)
        },
    },
];

impl SignalSchema {
    pub fn for_signal(signal: SignalType) -> &'static SignalSchema {
        match signal {
            SignalType::Logs => &SCHEMAS[0],
            SignalType::Traces => &SCHEMAS[1],
            SignalType::Metrics => &SCHEMAS[2],
        }
    }

    pub fn decode(&self, direction: Direction, bytes: &[u8]) -> Result<OtlpMessage, DecodeError> {
        let (decode, schema) = match direction {
            Direction::Request => (self.decode_request, self.request_schema),
            Direction::Response => (self.decode_response, self.response_schema),
        };
        decode(bytes).map_err(|source| DecodeError {
            signal: self.signal,
            direction,
            schema,
            source,
        })
    }
}

/// Decode an inbound export request for `signal`.
pub fn decode_request(signal: SignalType, bytes: &[u8]) -> Result<OtlpMessage, DecodeError> {
    SignalSchema::for_signal(signal).decode(Direction::Request, bytes)
}

/// Decode an upstream export response for `signal`.
pub fn decode_response(signal: SignalType, bytes: &[u8]) -> Result<OtlpMessage, DecodeError> {
    SignalSchema::for_signal(signal).decode(Direction::Response, bytes)
}
