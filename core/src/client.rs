//! The user-facing client: URL resolution, pre-flight guards and timing
//! around the shared dispatch routine.
//!
//! # Design
//! `HttpClient` holds an immutable `ClientConfig` and a `Transport` behind
//! `Arc`s and carries no other state, so one instance can be cloned into
//! many tasks and called concurrently. Each call builds its own
//! `HttpRequest` and its own deadline; nothing is shared between calls.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::dispatch::dispatch;
use crate::error::{HttpError, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::{ReqwestTransport, Transport};
use crate::url::resolve;

/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Replaces the client's default headers for this call when set.
    pub headers: Option<Vec<(String, String)>>,
    /// JSON body; required for every verb except GET.
    pub payload: Option<Value>,
    /// Wrap the result in [`Reply::Timed`].
    pub time_interval: bool,
    /// Overrides the client's timeout for this call.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    pub fn payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn timed(mut self) -> Self {
        self.time_interval = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `null` and `""` count as no payload.
    fn has_payload(&self) -> bool {
        match &self.payload {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}

/// Successful result of a call.
///
/// Serializes to the bare JSON body, or to `{"data": ..., "timeTaken": "12.34 ms"}`
/// when timing was requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Plain(Value),
    Timed {
        data: Value,
        #[serde(rename = "timeTaken")]
        time_taken: String,
    },
}

impl Reply {
    pub fn data(&self) -> &Value {
        match self {
            Reply::Plain(data) | Reply::Timed { data, .. } => data,
        }
    }

    pub fn into_data(self) -> Value {
        match self {
            Reply::Plain(data) | Reply::Timed { data, .. } => data,
        }
    }

    /// The `"<ms> ms"` string, if timing was requested.
    pub fn time_taken(&self) -> Option<&str> {
        match self {
            Reply::Plain(_) => None,
            Reply::Timed { time_taken, .. } => Some(time_taken),
        }
    }

    /// Deserialize the body into `T`. `path` is the URL the reply came
    /// from and ends up in the error if the body has the wrong shape.
    pub fn decode<T: DeserializeOwned>(self, path: &str) -> Result<T> {
        serde_json::from_value(self.into_data()).map_err(|e| {
            HttpError::internal(format!("response body has unexpected shape: {e}"), path)
        })
    }
}

/// JSON-over-HTTP client with base URL resolution and per-call deadlines.
#[derive(Clone)]
pub struct HttpClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Client over the default `reqwest` transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }

    /// Same as [`HttpClient::new`].
    pub fn create(config: ClientConfig) -> Self {
        Self::new(config)
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<Reply> {
        self.call(HttpMethod::Get, url, options, false).await
    }

    pub async fn post(&self, url: &str, options: RequestOptions) -> Result<Reply> {
        self.call(HttpMethod::Post, url, options, true).await
    }

    pub async fn patch(&self, url: &str, options: RequestOptions) -> Result<Reply> {
        self.call(HttpMethod::Patch, url, options, true).await
    }

    pub async fn put(&self, url: &str, options: RequestOptions) -> Result<Reply> {
        self.call(HttpMethod::Put, url, options, true).await
    }

    /// Any verb, without the payload pre-flight guard. Non-GET requests
    /// without a payload are still rejected by the dispatcher.
    pub async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        options: RequestOptions,
    ) -> Result<Reply> {
        self.call(method, url, options, false).await
    }

    async fn call(
        &self,
        method: HttpMethod,
        url: &str,
        options: RequestOptions,
        require_payload: bool,
    ) -> Result<Reply> {
        let url = resolve(self.config.base_url.as_deref(), url)?;
        if require_payload && !options.has_payload() {
            return Err(HttpError::not_found("payload must be provided", url));
        }

        let body = match (&options.payload, method) {
            (_, HttpMethod::Get) => None,
            (Some(payload), _) if options.has_payload() => {
                Some(serde_json::to_string(payload).map_err(|e| {
                    HttpError::bad_request(format!("payload is not valid JSON: {e}"), url.as_str())
                })?)
            }
            _ => None,
        };

        let RequestOptions {
            headers,
            time_interval,
            timeout,
            ..
        } = options;
        let request = HttpRequest {
            method,
            url,
            headers: headers.unwrap_or_else(|| self.config.default_headers.clone()),
            body,
        };
        let timeout = timeout.unwrap_or(self.config.timeout);

        let started = Instant::now();
        let data = dispatch(self.transport.as_ref(), request, timeout).await?;

        if time_interval {
            let millis = started.elapsed().as_secs_f64() * 1000.0;
            return Ok(Reply::Timed {
                data,
                time_taken: format!("{millis:.2} ms"),
            });
        }
        Ok(Reply::Plain(data))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::FakeTransport;

    fn client_with(transport: FakeTransport) -> (HttpClient, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        let client = HttpClient {
            config: Arc::new(ClientConfig::new().with_base_url("http://localhost:3000/")),
            transport: transport.clone(),
        };
        (client, transport)
    }

    #[tokio::test]
    async fn get_resolves_relative_url_and_sends_default_headers() {
        let (client, transport) = client_with(FakeTransport::respond(200, r#"{"id":1}"#));
        let reply = client.get("/students/get", RequestOptions::new()).await.unwrap();
        assert_eq!(reply, Reply::Plain(json!({"id": 1})));

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert_eq!(sent[0].url, "http://localhost:3000/students/get");
        assert_eq!(
            sent[0].headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
        assert!(sent[0].body.is_none());
    }

    #[tokio::test]
    async fn request_headers_replace_defaults_entirely() {
        let (client, transport) = client_with(FakeTransport::respond(200, "{}"));
        client
            .get("/s", RequestOptions::new().header("Authorization", "Bearer t"))
            .await
            .unwrap();
        assert_eq!(
            transport.requests()[0].headers,
            vec![("Authorization".to_string(), "Bearer t".to_string())]
        );
    }

    #[tokio::test]
    async fn relative_url_without_base_fails_before_network() {
        let transport = Arc::new(FakeTransport::respond(200, "{}"));
        let client = HttpClient {
            config: Arc::new(ClientConfig::new()),
            transport: transport.clone(),
        };
        let err = client.get("/p", RequestOptions::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn post_without_payload_is_rejected_before_network() {
        let (client, transport) = client_with(FakeTransport::respond(201, "{}"));
        let missing = [
            RequestOptions::new(),
            RequestOptions {
                payload: None,
                ..RequestOptions::default()
            },
            RequestOptions::new().payload(Value::Null),
        ];
        for options in missing {
            let err = client.post("/students/create", options).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::NotFound);
            assert_eq!(err.status_code, 404);
            assert_eq!(err.message, "payload must be provided");
            assert_eq!(err.path, "http://localhost:3000/students/create");
        }
        let err = client
            .patch("/students/1", RequestOptions::new().timed())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn post_serializes_payload() {
        let (client, transport) = client_with(FakeTransport::respond(201, r#"{"id":10}"#));
        let reply = client
            .post(
                "students/create",
                RequestOptions::new().payload(json!({"name": "test", "grade": 12})),
            )
            .await
            .unwrap();
        assert_eq!(reply.data(), &json!({"id": 10}));

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, HttpMethod::Post);
        let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "test", "grade": 12}));
    }

    #[tokio::test]
    async fn patch_and_put_use_their_methods() {
        let (client, transport) = client_with(FakeTransport::respond(200, "{}"));
        client
            .patch("/s/1", RequestOptions::new().payload(json!({"a": 1})))
            .await
            .unwrap();
        client
            .put("/s/1", RequestOptions::new().payload(json!({"a": 2})))
            .await
            .unwrap();
        let methods: Vec<_> = transport.requests().iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![HttpMethod::Patch, HttpMethod::Put]);
    }

    #[tokio::test]
    async fn generic_delete_without_payload_hits_dispatcher_guard() {
        let (client, transport) = client_with(FakeTransport::respond(204, ""));
        let err = client
            .request(HttpMethod::Delete, "/s/1", RequestOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert_eq!(err.message, "payload is required to DELETE");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timed_reply_reports_two_decimal_millis() {
        let (client, _) = client_with(
            FakeTransport::respond(200, r#"{"id":1}"#).delayed(Duration::from_millis(25)),
        );
        let reply = client
            .get("/students/get", RequestOptions::new().timed())
            .await
            .unwrap();
        assert_eq!(reply.data(), &json!({"id": 1}));
        assert_eq!(reply.time_taken(), Some("25.00 ms"));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"data": {"id": 1}, "timeTaken": "25.00 ms"})
        );
    }

    #[test]
    fn untimed_reply_serializes_as_bare_body() {
        let reply = Reply::Plain(json!({"id": 1}));
        assert_eq!(serde_json::to_value(&reply).unwrap(), json!({"id": 1}));
        assert!(reply.time_taken().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_calls_time_out_independently() {
        let (client, _) = client_with(
            FakeTransport::respond(200, r#"{"ok":true}"#).delayed(Duration::from_millis(100)),
        );
        let short = client.get(
            "/slow",
            RequestOptions::new().timeout(Duration::from_millis(50)),
        );
        let long = client.get(
            "/slow",
            RequestOptions::new().timeout(Duration::from_millis(500)),
        );
        let (short, long) = tokio::join!(short, long);

        assert!(short.unwrap_err().is_timeout());
        assert_eq!(long.unwrap().into_data(), json!({"ok": true}));
    }

    #[tokio::test]
    async fn status_errors_propagate_unchanged() {
        let (client, _) = client_with(FakeTransport::respond(404, r#"{"message":"not found"}"#));
        let err = client.get("/missing", RequestOptions::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::HttpStatus);
        assert_eq!(err.status_code, 404);
        assert_eq!(err.message, "not found");
    }

    #[tokio::test]
    async fn decode_into_typed_value() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Student {
            id: u32,
            name: String,
        }

        let (client, _) = client_with(FakeTransport::respond(200, r#"{"id":3,"name":"ram"}"#));
        let student: Student = client
            .get("/students/3", RequestOptions::new().timed())
            .await
            .unwrap()
            .decode("http://localhost:3000/students/3")
            .unwrap();
        assert_eq!(
            student,
            Student {
                id: 3,
                name: "ram".to_string()
            }
        );
    }

    #[test]
    fn decode_failure_names_the_url() {
        let reply = Reply::Plain(json!({"id": "not a number"}));
        let err = reply
            .decode::<u32>("http://localhost:3000/students/3")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InternalError);
        assert_eq!(err.path, "http://localhost:3000/students/3");
        assert!(err.message.starts_with("response body has unexpected shape"));
    }
}
