//! OTLP HTTP intercepting handlers
//!
//! Supports:
//! - POST /v1/logs (OTLP HTTP/protobuf)
//! - POST /v1/traces (OTLP HTTP/protobuf)
//! - POST /v1/metrics (OTLP HTTP/protobuf)
//!
//! Every call: read body, decode against the signal's request schema, then
//! either answer 200 (no upstream configured) or relay the original bytes
//! upstream and mirror the reply. The diagnostic block is flushed once, after
//! the outcome is known.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::post,
};
use http_body_util::BodyExt;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{ExchangeContext, ResponsePayload, SignalType, UpstreamRecord};
use crate::endpoint::ResolvedEndpoints;
use crate::forwarder::{ForwardError, Forwarder, relay};
use crate::otlp::{DecodeError, decode_request, decode_response, render};
use crate::port::DiagnosticSink;

/// Application state for OTLP handlers
#[derive(Clone)]
pub struct OtlpState {
    pub endpoints: Arc<ResolvedEndpoints>,
    pub forwarder: Forwarder,
    pub sink: Arc<dyn DiagnosticSink>,
}

/// Create Axum router for the three OTLP HTTP endpoints
pub fn otlp_routes(state: OtlpState) -> Router {
    Router::new()
        .route(SignalType::Logs.path(), post(receive_logs))
        .route(SignalType::Traces.path(), post(receive_traces))
        .route(SignalType::Metrics.path(), post(receive_metrics))
        .with_state(state)
}

async fn receive_logs(State(state): State<OtlpState>, request: Request) -> Response {
    handle_export(state, SignalType::Logs, request).await
}

async fn receive_traces(State(state): State<OtlpState>, request: Request) -> Response {
    handle_export(state, SignalType::Traces, request).await
}

async fn receive_metrics(State(state): State<OtlpState>, request: Request) -> Response {
    handle_export(state, SignalType::Metrics, request).await
}

/// Terminal failures of one intercepted call.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Forward(#[from] ForwardError),

    #[error("exchange task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

impl PipelineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::BodyRead(_) | PipelineError::Decode(_) => StatusCode::BAD_REQUEST,
            PipelineError::Forward(ForwardError::Transport { .. }) => StatusCode::BAD_GATEWAY,
            PipelineError::Forward(ForwardError::Read { .. }) | PipelineError::Aborted(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            PipelineError::BodyRead(_) => "failed to read request body",
            PipelineError::Decode(_) => "invalid protobuf",
            PipelineError::Forward(ForwardError::Transport { .. }) => "failed to forward request",
            PipelineError::Forward(ForwardError::Read { .. }) => "failed to read response",
            PipelineError::Aborted(_) => "internal error",
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        (self.status_code(), self.reason()).into_response()
    }
}

/// Run one intercepted call to completion.
///
/// The exchange runs on its own task: if the caller goes away mid-flight the
/// upstream call, response decoding and the diagnostic flush still finish.
pub async fn handle_export(state: OtlpState, signal: SignalType, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    match tokio::spawn(run_exchange(state, signal, parts, body)).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, %signal, "OTLP exchange task failed");
            PipelineError::Aborted(e).into_response()
        }
    }
}

#[instrument(skip_all, fields(%signal, path = %parts.uri.path()))]
async fn run_exchange(
    state: OtlpState,
    signal: SignalType,
    parts: Parts,
    body: Body,
) -> Response {
    let forward_to = state.endpoints.for_signal(signal).map(str::to_owned);
    let mut exchange = ExchangeContext::new(signal, &parts, forward_to);

    let response = match process(&state, &mut exchange, body).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "OTLP exchange failed");
            exchange.record_error(&e);
            e.into_response()
        }
    };

    state.sink.emit(&render(&exchange));
    response
}

async fn process(
    state: &OtlpState,
    exchange: &mut ExchangeContext,
    body: Body,
) -> Result<Response, PipelineError> {
    let signal = exchange.signal;

    let body = body
        .collect()
        .await
        .map_err(PipelineError::BodyRead)?
        .to_bytes();

    exchange.request = Some(decode_request(signal, &body)?);
    debug!(body_size = body.len(), "Decoded OTLP request");

    let Some(endpoint) = exchange.forward_to.clone() else {
        return Ok(StatusCode::OK.into_response());
    };

    let upstream = state
        .forwarder
        .send(&endpoint, body, &exchange.headers)
        .await?;
    let status = upstream.status();
    let headers = upstream.headers().clone();
    exchange.upstream = Some(UpstreamRecord::new(
        status,
        upstream.version(),
        headers.clone(),
    ));

    let reply = upstream.read_body().await?;
    let payload = match decode_response(signal, &reply) {
        Ok(message) => ResponsePayload::Decoded(message),
        Err(e) => {
            warn!(error = %e, "Upstream response is not OTLP protobuf, logging raw body");
            ResponsePayload::Raw(reply.clone())
        }
    };
    if let Some(record) = exchange.upstream.as_mut() {
        record.payload = Some(payload);
    }

    info!(%endpoint, status = status.as_u16(), "Relayed OTLP export");
    Ok(relay(status, &headers, reply))
}
