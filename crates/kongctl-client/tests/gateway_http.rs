//! Integration tests for the gateway HTTP adapter, against a local mock
//! admin API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kongctl_client::{basic_auth_header, Error, Gateway};

#[derive(Debug, Serialize)]
struct ServicePayload {
    name: String,
    url: String,
    retries: u32,
}

async fn mock_gateway(server: &MockServer) -> Gateway {
    Gateway::new(&server.uri(), HeaderMap::new()).unwrap()
}

#[tokio::test]
async fn get_resolves_url_and_reads_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let gateway = mock_gateway(&server).await;
    let response = gateway.get("services", &[]).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.url().as_str(), format!("{}/services", server.uri()));
    assert_eq!(response.url().query(), None);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"data": []}));
}

#[tokio::test]
async fn post_sends_json_body_and_content_type() {
    let server = MockServer::start().await;
    let payload = ServicePayload {
        name: "orders".to_string(),
        url: "http://orders.internal:8080".to_string(),
        retries: 5,
    };

    Mock::given(method("POST"))
        .and(path("/services"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "name": "orders",
            "url": "http://orders.internal:8080",
            "retries": 5,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "abc"})))
        .mount(&server)
        .await;

    let gateway = mock_gateway(&server).await;
    let response = gateway.post("services", &[], Some(&payload)).await.unwrap();
    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn post_without_body_sends_empty_text_plain_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/orders/plugins"))
        .and(header("content-type", "text/plain"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let gateway = mock_gateway(&server).await;
    let response = gateway
        .post("services/orders/plugins", &[], None::<&()>)
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn query_parameters_are_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/routes"))
        .and(query_param("size", "50"))
        .and(query_param("offset", "cursor-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let gateway = mock_gateway(&server).await;
    let response = gateway
        .get("routes", &[("size", "50"), ("offset", "cursor-1")])
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn standing_headers_are_applied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/consumers"))
        .and(header("authorization", "Basic c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let gateway = Gateway::new(&server.uri(), basic_auth_header("c2VjcmV0").unwrap()).unwrap();
    let response = gateway.get("consumers", &[]).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn extra_headers_override_standing_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services"))
        .and(header("x-request-source", "override"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut standing = HeaderMap::new();
    standing.insert("x-request-source", HeaderValue::from_static("standing"));
    let gateway = Gateway::new(&server.uri(), standing).unwrap();

    let mut extra = HeaderMap::new();
    extra.insert("x-request-source", HeaderValue::from_static("override"));

    let response = gateway
        .send(reqwest::Method::GET, "services", &[], None::<&()>, Some(&extra))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn not_modified_passes_status_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/orders"))
        .respond_with(ResponseTemplate::new(304))
        .mount(&server)
        .await;

    let gateway = mock_gateway(&server).await;
    let response = gateway.get("services/orders", &[]).await.unwrap();
    assert_eq!(response.status().as_u16(), 304);
}

#[tokio::test]
async fn empty_error_body_yields_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let gateway = mock_gateway(&server).await;
    let err = gateway.get("services/missing", &[]).await.unwrap_err();

    assert!(matches!(err, Error::Status { status: 404, .. }));
    assert_eq!(err.to_string(), "404 Not Found");
    assert_eq!(
        err.url(),
        Some(format!("{}/services/missing", server.uri()).as_str())
    );
}

#[tokio::test]
async fn json_error_envelope_yields_remote_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "name is required"})),
        )
        .mount(&server)
        .await;

    let gateway = mock_gateway(&server).await;
    let err = gateway
        .post("services", &[], None::<&()>)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Remote { status: 400, .. }));
    assert_eq!(err.to_string(), "name is required");
}

#[tokio::test]
async fn non_json_error_body_is_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/upstreams/u1"))
        .respond_with(
            ResponseTemplate::new(500).set_body_raw("  oops  ".as_bytes().to_vec(), "text/plain"),
        )
        .mount(&server)
        .await;

    let gateway = mock_gateway(&server).await;
    let err = gateway.get("upstreams/u1", &[]).await.unwrap_err();
    assert_eq!(err.to_string(), "oops");
}

#[tokio::test]
async fn invalid_json_error_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plugins/p1"))
        .respond_with(
            ResponseTemplate::new(502)
                .set_body_raw("{not json".as_bytes().to_vec(), "application/json"),
        )
        .mount(&server)
        .await;

    let gateway = mock_gateway(&server).await;
    let err = gateway.get("plugins/p1", &[]).await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn deadline_expiry_is_a_timeout_not_a_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let gateway = mock_gateway(&server)
        .await
        .with_timeout(Duration::from_millis(50));
    let err = gateway.get("services", &[]).await.unwrap_err();
    assert!(matches!(err, Error::Timeout));
}

#[tokio::test]
async fn malformed_admin_url_fails_without_network_activity() {
    let err = Gateway::new("127.0.0.1:8001", HeaderMap::new()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("scheme://host"));
}
