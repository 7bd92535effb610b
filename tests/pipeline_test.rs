use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request, StatusCode};
use axum_test::TestServer;
use bytes::Bytes;
use opentelemetry_proto::tonic::collector::logs::v1::{
    ExportLogsPartialSuccess, ExportLogsServiceRequest, ExportLogsServiceResponse,
};
use opentelemetry_proto::tonic::collector::trace::v1::{
    ExportTraceServiceRequest, ExportTraceServiceResponse,
};
use opentelemetry_proto::tonic::common::v1::{AnyValue, KeyValue, any_value};
use opentelemetry_proto::tonic::logs::v1::{LogRecord, ResourceLogs, ScopeLogs};
use opentelemetry_proto::tonic::resource::v1::Resource;
use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span};
use prost::Message;
use rask_spy::endpoint::ResolvedEndpoints;
use rask_spy::forwarder::Forwarder;
use rask_spy::domain::SignalType;
use rask_spy::handler::otlp::{OtlpState, handle_export, otlp_routes};
use rask_spy::test_support::MemorySink;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn otlp_state(endpoints: ResolvedEndpoints) -> (OtlpState, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let state = OtlpState {
        endpoints: Arc::new(endpoints),
        forwarder: Forwarder::new(Duration::from_secs(5)).unwrap(),
        sink: sink.clone(),
    };
    (state, sink)
}

fn create_test_server(endpoints: ResolvedEndpoints) -> (TestServer, Arc<MemorySink>) {
    let (state, sink) = otlp_state(endpoints);
    (TestServer::new(otlp_routes(state)).unwrap(), sink)
}

fn forwarding_to(base: &str) -> ResolvedEndpoints {
    ResolvedEndpoints::resolve(Some(base), None, None, None)
}

fn logs_body() -> Vec<u8> {
    ExportLogsServiceRequest {
        resource_logs: vec![ResourceLogs {
            resource: Some(Resource {
                attributes: vec![KeyValue {
                    key: "service.name".to_string(),
                    value: Some(AnyValue {
                        value: Some(any_value::Value::StringValue("test-service".to_string())),
                    }),
                }],
                ..Default::default()
            }),
            scope_logs: vec![ScopeLogs {
                log_records: vec![LogRecord {
                    time_unix_nano: 1700000000000000000,
                    severity_number: 9, // INFO
                    severity_text: "INFO".to_string(),
                    body: Some(AnyValue {
                        value: Some(any_value::Value::StringValue("Test log message".to_string())),
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
    .encode_to_vec()
}

fn traces_body() -> Vec<u8> {
    ExportTraceServiceRequest {
        resource_spans: vec![ResourceSpans {
            scope_spans: vec![ScopeSpans {
                spans: vec![Span {
                    trace_id: vec![0x01; 16],
                    span_id: vec![0x02; 8],
                    name: "test-span".to_string(),
                    kind: 2, // Server
                    start_time_unix_nano: 1700000000000000000,
                    end_time_unix_nano: 1700000001000000000,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
    .encode_to_vec()
}

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// =========================================================================
// No upstream configured
// =========================================================================

#[tokio::test]
async fn test_no_forwarding_returns_empty_ok_for_every_signal() {
    let (server, sink) = create_test_server(ResolvedEndpoints::default());

    for path in ["/v1/logs", "/v1/traces", "/v1/metrics"] {
        let response = server
            .post(path)
            .content_type("application/x-protobuf")
            .bytes(Bytes::new())
            .await;

        response.assert_status(StatusCode::OK);
        assert!(response.as_bytes().is_empty());
    }

    let blocks = sink.blocks();
    assert_eq!(blocks.len(), 3);
    for block in &blocks {
        assert!(block.contains("=== OTLP Message (Request) ==="));
        assert!(!block.contains("Forwarded Response Headers"));
        assert!(!block.contains("(Response)"));
    }
}

#[tokio::test]
async fn test_inbound_block_shows_headers_and_decoded_fields() {
    let (server, sink) = create_test_server(ResolvedEndpoints::default());

    server
        .post("/v1/logs")
        .content_type("application/x-protobuf")
        .add_header(HeaderName::from_static("x-tenant"), HeaderValue::from_static("acme"))
        .bytes(logs_body().into())
        .await
        .assert_status_ok();

    let block = sink.single_block();
    assert!(block.starts_with("===> Received OTLP request: /v1/logs"));
    assert!(block.contains("POST /v1/logs"));
    assert!(block.contains("x-tenant: acme"));
    assert!(block.contains("test-service"));
    assert!(block.contains("Test log message"));
}

// =========================================================================
// Malformed inbound payloads
// =========================================================================

#[tokio::test]
async fn test_invalid_body_is_rejected_without_forwarding() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let (server, sink) = create_test_server(forwarding_to(&upstream.uri()));

    for path in ["/v1/logs", "/v1/traces", "/v1/metrics"] {
        let response = server
            .post(path)
            .content_type("application/x-protobuf")
            .bytes(vec![0xFF, 0xFF, 0xFF, 0xFF].into())
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    assert_eq!(sink.blocks().len(), 3);
}

// =========================================================================
// Forwarding
// =========================================================================

#[tokio::test]
async fn test_forwarding_relays_status_body_and_headers() {
    let upstream = MockServer::start().await;
    let reply = ExportLogsServiceResponse {
        partial_success: Some(ExportLogsPartialSuccess {
            rejected_log_records: 2,
            error_message: "quota exceeded".to_string(),
        }),
    }
    .encode_to_vec();

    Mock::given(method("POST"))
        .and(path("/v1/logs"))
        .and(header("content-type", "application/x-protobuf"))
        .and(header("x-tenant", "acme"))
        .and(body_bytes(logs_body()))
        .respond_with(
            ResponseTemplate::new(206)
                .append_header("x-collector", "one")
                .append_header("x-collector", "two")
                .set_body_raw(reply.clone(), "application/x-protobuf"),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let (server, sink) = create_test_server(forwarding_to(&upstream.uri()));

    let response = server
        .post("/v1/logs")
        .content_type("application/json")
        .add_header(HeaderName::from_static("x-tenant"), HeaderValue::from_static("acme"))
        .bytes(logs_body().into())
        .await;

    response.assert_status(StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.as_bytes().as_ref(), reply.as_slice());
    let collectors: Vec<_> = response.headers().get_all("x-collector").iter().collect();
    assert_eq!(collectors, vec!["one", "two"]);

    let block = sink.single_block();
    let request = block.find("=== OTLP Message (Request) ===").unwrap();
    let response_headers = block.find("=== Forwarded Response Headers ===").unwrap();
    let response_message = block.find("=== OTLP Message (Response) ===").unwrap();
    assert!(request < response_headers && response_headers < response_message);
    assert!(block.contains("206 Partial Content"));
    assert!(block.contains("quota exceeded"));
}

#[tokio::test]
async fn test_upstream_error_status_is_passed_through() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/traces"))
        .respond_with(
            ResponseTemplate::new(503).set_body_raw(
                ExportTraceServiceResponse::default().encode_to_vec(),
                "application/x-protobuf",
            ),
        )
        .mount(&upstream)
        .await;
    let (server, _sink) = create_test_server(forwarding_to(&upstream.uri()));

    let response = server
        .post("/v1/traces")
        .content_type("application/x-protobuf")
        .bytes(traces_body().into())
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_undecodable_upstream_body_is_relayed_and_logged_raw() {
    let upstream = MockServer::start().await;
    let reply = b"\xff\xff\xff\xffnot protobuf".to_vec();
    Mock::given(method("POST"))
        .and(path("/v1/traces"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(reply.clone()))
        .mount(&upstream)
        .await;
    let (server, sink) = create_test_server(forwarding_to(&upstream.uri()));

    let response = server
        .post("/v1/traces")
        .content_type("application/x-protobuf")
        .bytes(traces_body().into())
        .await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), reply.as_slice());

    let block = sink.single_block();
    assert!(block.contains("=== Raw Response ==="));
    assert!(block.contains("not protobuf"));
    assert!(!block.contains("=== OTLP Message (Response) ==="));
    assert!(!block.contains("=== Pipeline Error ==="));
}

#[tokio::test]
async fn test_override_routes_only_that_signal() {
    let base = MockServer::start().await;
    let custom = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ingest/logs"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&custom)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/traces"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&base)
        .await;

    let logs_override = format!("{}/ingest/logs", custom.uri());
    let endpoints =
        ResolvedEndpoints::resolve(Some(&base.uri()), Some(&logs_override), None, None);
    let (server, _sink) = create_test_server(endpoints);

    server
        .post("/v1/logs")
        .bytes(logs_body().into())
        .await
        .assert_status_ok();
    server
        .post("/v1/traces")
        .bytes(traces_body().into())
        .await
        .assert_status_ok();
}

// =========================================================================
// Upstream failures
// =========================================================================

#[tokio::test]
async fn test_unreachable_upstream_returns_bad_gateway() {
    let base = format!("http://127.0.0.1:{}", free_port());
    let (server, sink) = create_test_server(forwarding_to(&base));

    let response = server
        .post("/v1/logs")
        .content_type("application/x-protobuf")
        .bytes(logs_body().into())
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    response.assert_text("failed to forward request");

    let block = sink.single_block();
    assert!(block.contains("=== OTLP Message (Request) ==="));
    assert!(block.contains("Test log message"));
    assert!(block.contains("=== Pipeline Error ==="));
    assert!(!block.contains("Forwarded Response Headers"));
}

#[tokio::test]
async fn test_malformed_upstream_address_returns_bad_gateway() {
    let endpoints = ResolvedEndpoints::resolve(None, None, None, Some("::not a url::"));
    let (server, _sink) = create_test_server(endpoints);

    let response = server.post("/v1/metrics").bytes(Bytes::new()).await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_truncated_upstream_body_returns_internal_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let upstream = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 64 * 1024];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nx-a: 1\r\ncontent-length: 100\r\n\r\nshort")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });
    let (server, sink) = create_test_server(forwarding_to(&format!("http://{addr}")));

    let response = server
        .post("/v1/logs")
        .content_type("application/x-protobuf")
        .bytes(logs_body().into())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_text("failed to read response");

    let block = sink.single_block();
    let request = block.find("=== OTLP Message (Request) ===").unwrap();
    let response_headers = block.find("=== Forwarded Response Headers ===").unwrap();
    let relayed_header = block.find("x-a: 1").unwrap();
    let error = block.find("=== Pipeline Error ===").unwrap();
    assert!(request < response_headers);
    assert!(response_headers < relayed_header && relayed_header < error);
    assert!(!block.contains("=== Raw Response ==="));

    upstream.await.unwrap();
}

// =========================================================================
// Inbound body failures
// =========================================================================

#[tokio::test]
async fn test_failed_body_read_returns_bad_request_without_forwarding() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let (state, sink) = otlp_state(forwarding_to(&upstream.uri()));

    let chunks = futures::stream::iter([
        Ok(Bytes::from_static(b"\x0a")),
        Err(std::io::Error::other("client reset the stream")),
    ]);
    let request = Request::post("/v1/logs")
        .body(Body::from_stream(chunks))
        .unwrap();

    let response = handle_export(state, SignalType::Logs, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.as_ref(), b"failed to read request body");

    let block = sink.single_block();
    assert!(block.contains("=== Pipeline Error ==="));
    assert!(!block.contains("=== OTLP Message (Request) ==="));
}
