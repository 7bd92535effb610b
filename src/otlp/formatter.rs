//! Human-readable diagnostic rendering of one intercepted export call.
//!
//! Section order is fixed: banner, inbound headers, inbound message, then (only
//! when the call was forwarded) upstream headers and the upstream body, and
//! finally the error that ended the call, if any. Nothing time- or
//! order-dependent is rendered, so identical exchanges give identical text.

use axum::http::{HeaderMap, Version};
use tracing::warn;

use crate::domain::{ExchangeContext, ResponsePayload};
use crate::otlp::OtlpMessage;

/// Render the full diagnostic block for `exchange`.
pub fn render(exchange: &ExchangeContext) -> String {
    let mut out = String::new();

    out.push_str(&format!("===> Received OTLP request: {}\n\n", exchange.path()));

    section(&mut out, "HTTP Request Headers");
    out.push_str(&format!(
        "{} {} {}\n",
        exchange.method,
        exchange.request_target(),
        version_str(exchange.version)
    ));
    write_headers(&mut out, &exchange.headers);
    out.push('\n');

    if let Some(request) = &exchange.request {
        write_message(&mut out, request);
    }

    if let Some(upstream) = &exchange.upstream {
        section(&mut out, "Forwarded Response Headers");
        out.push_str(&format!(
            "{} {}\n",
            version_str(upstream.version),
            upstream.status
        ));
        write_headers(&mut out, &upstream.headers);
        out.push('\n');

        match &upstream.payload {
            Some(ResponsePayload::Decoded(message)) => write_message(&mut out, message),
            Some(ResponsePayload::Raw(body)) => {
                section(&mut out, "Raw Response");
                out.push_str(&String::from_utf8_lossy(body));
                out.push_str("\n\n");
            }
            None => {}
        }
    }

    if let Some(error) = &exchange.error {
        section(&mut out, "Pipeline Error");
        out.push_str(error);
        out.push_str("\n\n");
    }

    out
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("=== {title} ===\n\n"));
}

fn write_headers(out: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        out.push_str(&format!(
            "{}: {}\n",
            name,
            String::from_utf8_lossy(value.as_bytes())
        ));
    }
}

fn write_message(out: &mut String, message: &OtlpMessage) {
    section(out, &format!("OTLP Message ({})", message.direction()));
    match message.to_pretty_json() {
        Ok(json) => out.push_str(&json),
        Err(e) => {
            warn!(error = %e, "Failed to render OTLP message as JSON, using debug form");
            out.push_str(&format!("{message:#?}"));
        }
    }
    out.push_str("\n\n");
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}
