//! OpenTelemetry Protocol (OTLP) payload handling
//!
//! This module provides:
//! - Decoding of OTLP HTTP/protobuf export requests and responses per signal
//! - Rendering of an intercepted exchange into a diagnostic text block

pub mod decoder;
pub mod formatter;

pub use decoder::{
    DecodeError, Direction, OtlpMessage, SignalSchema, decode_request, decode_response,
};
pub use formatter::render;
