//! The network seam between the client and an HTTP library.
//!
//! # Design
//! `Transport` performs exactly one HTTP exchange and reports it as plain
//! data. It never interprets status codes: a 404 or 500 is a successful
//! exchange from its point of view, and the dispatcher decides what it means.
//! Cancellation is by drop; the dispatcher drops the `send` future when the
//! deadline fires, so implementations must not spawn work that outlives it.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// One HTTP round-trip.
///
/// Returning `Ok(None)` means the exchange completed without producing a
/// response object. Real transports never do this; the dispatcher still maps
/// it to a `NotFound` error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<Option<HttpResponse>, TransportError>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new())
    }
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a preconfigured `reqwest::Client` (proxies, TLS roots, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if err.is_body() || err.is_decode() {
        TransportError::Body(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<Option<HttpResponse>, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(classify)?;

        Ok(Some(HttpResponse {
            status,
            url,
            headers,
            body,
        }))
    }
}
