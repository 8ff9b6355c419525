//! The gateway HTTP adapter.
//!
//! A [`Gateway`] is constructed once at process start and shared by every
//! resource command. Each call builds a full URL from the configured scheme
//! and host, injects the standing headers, executes under a bounded deadline
//! over a pooled transport, and classifies the response.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::AdminUrl;
use crate::error::{Error, Result};

/// Default per-request deadline.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const TCP_KEEPALIVE: Duration = Duration::from_secs(30);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const MAX_IDLE_CONNS_PER_HOST: usize = 100;

/// Client for the Kong admin REST API.
///
/// Immutable after construction and safe for concurrent use; the connection
/// pool is the only shared mutable state and is managed by the transport.
#[derive(Debug, Clone)]
pub struct Gateway {
    scheme: String,
    host: String,
    http: reqwest::Client,
    standing_headers: HeaderMap,
    timeout: Duration,
}

impl Gateway {
    /// Create a new gateway client.
    ///
    /// `admin_url` must have a `scheme://host` form. `standing_headers` are
    /// applied to every request and fixed for the life of the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a malformed admin URL; no network
    /// activity is performed in that case.
    pub fn new(admin_url: &str, standing_headers: HeaderMap) -> Result<Self> {
        let url: AdminUrl = admin_url.parse()?;

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(MAX_IDLE_CONNS_PER_HOST)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .tcp_keepalive(TCP_KEEPALIVE)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            scheme: url.scheme,
            host: url.host,
            http,
            standing_headers,
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Override the per-request deadline (defaults to [`REQUEST_TIMEOUT`]).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute a GET request.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<ServerResponse> {
        self.send(Method::GET, path, query, None::<&()>, None).await
    }

    /// Execute a POST request with an optional JSON body.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&T>,
    ) -> Result<ServerResponse> {
        self.send(Method::POST, path, query, body, None).await
    }

    /// Execute a PUT request with an optional JSON body.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&T>,
    ) -> Result<ServerResponse> {
        self.send(Method::PUT, path, query, body, None).await
    }

    /// Execute a PATCH request with an optional JSON body.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn patch<T: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&T>,
    ) -> Result<ServerResponse> {
        self.send(Method::PATCH, path, query, body, None).await
    }

    /// Execute a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<ServerResponse> {
        self.send(Method::DELETE, path, query, None::<&()>, None)
            .await
    }

    /// Build and execute a request against the admin API.
    ///
    /// The full URL is `scheme://host/path`, with the query string appended
    /// only when `query` is non-empty; path semantics are the caller's.
    /// A non-nil `body` is JSON-encoded and sent as `application/json`.
    /// POST/PUT/PATCH without a body send an empty payload, defaulting
    /// `Content-Type` to `text/plain` only if unset. Standing headers are
    /// applied first; `extra_headers` override them.
    ///
    /// On success the response handle is returned with its body un-read;
    /// draining it is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] / [`Error::Canceled`] when the deadline elapses or
    /// the request is aborted, [`Error::Connection`] for transport failures,
    /// and [`Error::Status`] / [`Error::Remote`] / [`Error::Decode`] for
    /// statuses outside [200, 400).
    pub async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&T>,
        extra_headers: Option<&HeaderMap>,
    ) -> Result<ServerResponse> {
        let url = self.api_url(path, query)?;

        let mut headers = self.standing_headers.clone();
        if let Some(extra) = extra_headers {
            for (name, value) in extra {
                headers.insert(name.clone(), value.clone());
            }
        }

        let expects_payload = matches!(method, Method::POST | Method::PUT | Method::PATCH);
        let mut request = self.http.request(method.clone(), url.clone()).timeout(self.timeout);

        if let Some(obj) = body {
            let payload = serde_json::to_vec(obj)?;
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            request = request.body(payload);
        } else if expects_payload {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
            }
            request = request.body(Vec::new());
        }

        tracing::debug!(%method, %url, "sending admin API request");

        let response = request
            .headers(headers)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        check_status(ServerResponse::new(response, url)).await
    }

    fn api_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let joined = format!(
            "{}://{}/{}",
            self.scheme,
            self.host,
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| Error::Config(format!("invalid request URL `{joined}`: {e}")))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    fn classify_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            return Error::Timeout;
        }

        let text = error_chain_text(&err);
        if text.contains("operation was canceled") {
            return Error::Canceled;
        }

        if self.scheme != "https" && text.contains("malformed") {
            return Error::Connection {
                message: format!(
                    "{text}. Is the gateway TLS-enabled? Try an https:// admin URL"
                ),
                source: err,
            };
        }

        if self.scheme == "https" && text.contains("certificate") {
            return Error::Connection {
                message: format!(
                    "the gateway probably requires client certificate authentication, \
                     check your TLS client settings: {text}"
                ),
                source: err,
            };
        }

        Error::Connection {
            message: format!("error during connect: {text}"),
            source: err,
        }
    }
}

/// A live response whose body has not been read yet.
///
/// The caller exclusively owns the body stream and must drain it (via
/// [`ServerResponse::bytes`], [`ServerResponse::json`] or
/// [`ServerResponse::text`]) to release the connection back to the pool.
#[derive(Debug)]
pub struct ServerResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: reqwest::Response,
}

impl ServerResponse {
    fn new(response: reqwest::Response, url: Url) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            url,
            body: response,
        }
    }

    /// The response status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The resolved request URL, for diagnostics.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Read the full body, consuming the handle.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] or [`Error::Connection`] when the read fails.
    pub async fn bytes(self) -> Result<Vec<u8>> {
        let bytes = self.body.bytes().await.map_err(body_read_error)?;
        Ok(bytes.to_vec())
    }

    /// Read the full body and decode it as JSON, consuming the handle.
    ///
    /// # Errors
    ///
    /// Body-read failures as in [`ServerResponse::bytes`], plus
    /// [`Error::Decode`] when the body is not valid JSON for `T`.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Read the full body as text, consuming the handle.
    ///
    /// # Errors
    ///
    /// See [`ServerResponse::bytes`].
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Error envelope returned by the gateway for failed requests.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: String,
}

/// Classify a response by status.
///
/// Statuses in [200, 400) pass through with the body untouched. Anything
/// else consumes the body and produces a typed error.
async fn check_status(response: ServerResponse) -> Result<ServerResponse> {
    let status = response.status();
    if status.is_success() || status.is_redirection() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let body = response.bytes().await?;
    if body.is_empty() {
        return Err(Error::Status {
            status: status.as_u16(),
            status_text: status.to_string(),
            url,
        });
    }

    let message = if is_json {
        let envelope: ErrorEnvelope = serde_json::from_slice(&body)?;
        envelope.message
    } else {
        String::from_utf8_lossy(&body).trim().to_string()
    };

    Err(Error::Remote {
        status: status.as_u16(),
        message,
        url,
    })
}

fn body_read_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        return Error::Timeout;
    }
    Error::Connection {
        message: format!("error reading response body: {}", error_chain_text(&err)),
        source: err,
    }
}

fn error_chain_text(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(admin_url: &str) -> Gateway {
        Gateway::new(admin_url, HeaderMap::new()).unwrap()
    }

    #[test]
    fn resolves_plain_resource_url() {
        let gw = gateway("http://127.0.0.1:8001");
        let url = gw.api_url("services", &[]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8001/services");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn resolves_nested_resource_url() {
        let gw = gateway("http://127.0.0.1:8001");
        let url = gw.api_url("upstreams/u1/targets", &[]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8001/upstreams/u1/targets");
    }

    #[test]
    fn appends_query_pairs() {
        let gw = gateway("http://127.0.0.1:8001");
        let url = gw.api_url("routes", &[("size", "100"), ("offset", "abc")]).unwrap();
        assert_eq!(url.query(), Some("size=100&offset=abc"));
    }

    #[test]
    fn tolerates_leading_slash_in_path() {
        let gw = gateway("http://127.0.0.1:8001");
        let url = gw.api_url("/consumers", &[]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8001/consumers");
    }

    #[test]
    fn rejects_unparseable_admin_url() {
        let err = Gateway::new("127.0.0.1:8001", HeaderMap::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
